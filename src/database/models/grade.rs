use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Academic level within a department (first year, second year, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Grade {
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub department_id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewGrade {
    pub name: String,
    pub level: i32,
    pub department_id: i64,
}
