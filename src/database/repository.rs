use async_trait::async_trait;
use std::sync::Arc;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    CatalogRecord, EntityKind, EntryDraft, NewCatalogRecord, TimetableEntry, TimetableEntryView,
};
use crate::database::query_builder::EntryQuery;
use crate::types::DayOfWeek;

/// Persistence of timetable entries. Implementations own the entries;
/// callers only ever receive copies.
#[async_trait]
pub trait TimetableStore: Send + Sync {
    /// Entries matching the query, ordered by (day, start time, id)
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<TimetableEntry>, DatabaseError>;

    /// Same selection and order as `list_entries`, with subject, section,
    /// professor and room names attached
    async fn list_entry_views(&self, query: &EntryQuery) -> Result<Vec<TimetableEntryView>, DatabaseError>;

    async fn get_entry(&self, id: i64) -> Result<Option<TimetableEntry>, DatabaseError>;

    async fn insert_entry(&self, draft: &EntryDraft) -> Result<TimetableEntry, DatabaseError>;

    /// Replace every field of an existing entry in one step. `None` when absent.
    async fn replace_entry(&self, id: i64, draft: &EntryDraft) -> Result<Option<TimetableEntry>, DatabaseError>;

    /// Returns whether an entry was removed
    async fn delete_entry(&self, id: i64) -> Result<bool, DatabaseError>;

    /// Entries on `day`, leaving out `exclude` when set
    async fn entries_for_day(&self, day: DayOfWeek, exclude: Option<i64>) -> Result<Vec<TimetableEntry>, DatabaseError> {
        self.list_entries(&EntryQuery::for_day(day).excluding(exclude)).await
    }

    async fn entry_exists(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.get_entry(id).await?.is_some())
    }
}

/// Persistence of the reference records (departments, grades, sections,
/// subjects, professors, rooms)
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fails with `MissingParent` when the owning record is absent and
    /// `Duplicate` when a uniqueness rule is broken
    async fn insert_record(&self, record: NewCatalogRecord) -> Result<CatalogRecord, DatabaseError>;

    async fn update_record(&self, id: i64, record: NewCatalogRecord) -> Result<Option<CatalogRecord>, DatabaseError>;

    async fn get_record(&self, kind: EntityKind, id: i64) -> Result<Option<CatalogRecord>, DatabaseError>;

    async fn list_records(&self, kind: EntityKind) -> Result<Vec<CatalogRecord>, DatabaseError>;

    /// Records of `kind` owned by parent `parent_id`, ordered by id.
    /// Empty for kinds without a parent.
    async fn list_children(&self, kind: EntityKind, parent_id: i64) -> Result<Vec<CatalogRecord>, DatabaseError>;

    /// Fails with `StillReferenced` while dependents exist
    async fn delete_record(&self, kind: EntityKind, id: i64) -> Result<bool, DatabaseError>;

    /// Child records plus timetable entries pointing at this record
    async fn count_dependents(&self, kind: EntityKind, id: i64) -> Result<i64, DatabaseError>;

    async fn exists(&self, kind: EntityKind, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.get_record(kind, id).await?.is_some())
    }
}

#[async_trait]
pub trait Store: TimetableStore + CatalogStore {
    /// Backend name for logs and the service descriptor
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

pub type SharedStore = Arc<dyn Store>;
