use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub capacity: Option<i32>,
    /// Lecture hall, lab, tutorial room... free text
    #[serde(rename = "type")]
    pub room_type: Option<String>,
    pub building: Option<String>,
    pub floor: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewRoom {
    pub name: String,
    #[serde(default)]
    pub capacity: Option<i32>,
    #[serde(default, rename = "type")]
    pub room_type: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub floor: Option<i32>,
}
