pub mod catalog_service;
pub mod timetable_service;

pub use catalog_service::{CatalogError, CatalogService};
pub use timetable_service::{TimetableError, TimetableService};
