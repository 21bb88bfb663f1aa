use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A class group inside a grade; the unit a timetable is built for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub grade_id: i64,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewSection {
    pub name: String,
    pub grade_id: i64,
    #[serde(default)]
    pub capacity: Option<i32>,
}
