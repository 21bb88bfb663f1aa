pub mod catalog;
pub mod department;
pub mod entry;
pub mod grade;
pub mod professor;
pub mod room;
pub mod section;
pub mod subject;

pub use catalog::{CatalogRecord, EntityKind, NewCatalogRecord};
pub use department::{Department, NewDepartment};
pub use entry::{BusySlot, EntryDraft, TimetableEntry, TimetableEntryView};
pub use grade::{Grade, NewGrade};
pub use professor::{NewProfessor, Professor};
pub use room::{NewRoom, Room};
pub use section::{NewSection, Section};
pub use subject::{NewSubject, Subject};
