use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub grade_id: i64,
    pub credits: Option<i32>,
    pub hours_per_week: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewSubject {
    pub name: String,
    pub code: String,
    pub grade_id: i64,
    #[serde(default)]
    pub credits: Option<i32>,
    #[serde(default)]
    pub hours_per_week: Option<i32>,
}
