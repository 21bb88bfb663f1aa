use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Professor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department_id: i64,
    pub specialization: Option<String>,
    pub max_hours_per_week: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProfessor {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub department_id: i64,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub max_hours_per_week: Option<i32>,
}
