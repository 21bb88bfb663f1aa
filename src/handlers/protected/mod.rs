// handlers/protected/mod.rs - JWT authentication required, mounted under /api
pub mod availability;
pub mod catalog;
pub mod timetable;
