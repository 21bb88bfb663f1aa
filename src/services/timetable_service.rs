use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::database::models::{BusySlot, EntityKind, EntryDraft, TimetableEntry, TimetableEntryView};
use crate::database::{CatalogStore, DatabaseError, EntryQuery, SharedStore, TimetableStore};
use crate::timetable::{Conflict, ConflictChecker, TimeRange};
use crate::types::DayOfWeek;

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("Invalid timetable entry")]
    Validation(Vec<(&'static str, String)>),

    #[error("{kind} {id} does not exist")]
    Reference { kind: EntityKind, id: i64 },

    #[error("Scheduling conflict: {}", .0.first().map(|c| c.to_string()).unwrap_or_default())]
    Conflict(Vec<Conflict>),

    #[error("Timetable entry {0} not found")]
    NotFound(i64),

    #[error("Role '{0}' may not modify the timetable")]
    Forbidden(String),

    #[error(transparent)]
    Persistence(#[from] DatabaseError),
}

/// Creates, updates and removes timetable entries while keeping every
/// stored pair of same-day entries free of section, professor and room
/// collisions.
pub struct TimetableService {
    store: SharedStore,
    checker: ConflictChecker,
    day_locks: [Mutex<()>; 7],
}

impl TimetableService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            checker: ConflictChecker::new(Arc::clone(&store)),
            store,
            day_locks: std::array::from_fn(|_| Mutex::new(())),
        }
    }

    pub async fn create(&self, actor: &AuthUser, draft: EntryDraft) -> Result<TimetableEntry, TimetableError> {
        authorize(actor)?;
        validate(&draft)?;
        self.check_references(&draft).await?;

        let _day = self.day_locks[draft.day_of_week.index()].lock().await;

        let conflicts = self.checker.find_conflicts(&draft, None).await?;
        if !conflicts.is_empty() {
            warn!("Rejected new entry on {}: {} conflict(s)", draft.day_of_week, conflicts.len());
            return Err(TimetableError::Conflict(conflicts));
        }

        let entry = self.store.insert_entry(&draft).await?;
        info!("Created timetable entry {} on {}", entry.id, entry.day_of_week);
        Ok(entry)
    }

    pub async fn update(&self, actor: &AuthUser, id: i64, draft: EntryDraft) -> Result<TimetableEntry, TimetableError> {
        authorize(actor)?;
        validate(&draft)?;

        let _day = self.day_locks[draft.day_of_week.index()].lock().await;

        if !self.store.entry_exists(id).await? {
            return Err(TimetableError::NotFound(id));
        }
        self.check_references(&draft).await?;

        let conflicts = self.checker.find_conflicts(&draft, Some(id)).await?;
        if !conflicts.is_empty() {
            warn!("Rejected update of entry {}: {} conflict(s)", id, conflicts.len());
            return Err(TimetableError::Conflict(conflicts));
        }

        let entry = self
            .store
            .replace_entry(id, &draft)
            .await?
            .ok_or(TimetableError::NotFound(id))?;
        info!("Updated timetable entry {}", id);
        Ok(entry)
    }

    pub async fn delete(&self, actor: &AuthUser, id: i64) -> Result<(), TimetableError> {
        authorize(actor)?;

        if !self.store.delete_entry(id).await? {
            return Err(TimetableError::NotFound(id));
        }
        info!("Deleted timetable entry {}", id);
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<TimetableEntry, TimetableError> {
        self.store.get_entry(id).await?.ok_or(TimetableError::NotFound(id))
    }

    /// Conflicts `draft` would cause, without writing anything
    pub async fn check(&self, draft: &EntryDraft, exclude: Option<i64>) -> Result<Vec<Conflict>, TimetableError> {
        validate(draft)?;
        self.check_references(draft).await?;
        Ok(self.checker.find_conflicts(draft, exclude).await?)
    }

    pub async fn list_by_section(&self, id: i64, day: Option<DayOfWeek>) -> Result<Vec<TimetableEntryView>, TimetableError> {
        self.list_views(EntryQuery::for_section(id).on_day(day)).await
    }

    pub async fn list_by_professor(&self, id: i64, day: Option<DayOfWeek>) -> Result<Vec<TimetableEntryView>, TimetableError> {
        self.list_views(EntryQuery::for_professor(id).on_day(day)).await
    }

    pub async fn list_by_room(&self, id: i64, day: Option<DayOfWeek>) -> Result<Vec<TimetableEntryView>, TimetableError> {
        self.list_views(EntryQuery::for_room(id).on_day(day)).await
    }

    /// Busy slots for a professor, ordered by day then start time
    pub async fn professor_availability(&self, id: i64, day: Option<DayOfWeek>) -> Result<Vec<BusySlot>, TimetableError> {
        self.busy_slots(EntryQuery::for_professor(id).on_day(day)).await
    }

    pub async fn room_availability(&self, id: i64, day: Option<DayOfWeek>) -> Result<Vec<BusySlot>, TimetableError> {
        self.busy_slots(EntryQuery::for_room(id).on_day(day)).await
    }

    async fn list_views(&self, query: EntryQuery) -> Result<Vec<TimetableEntryView>, TimetableError> {
        Ok(self.store.list_entry_views(&query).await?)
    }

    async fn busy_slots(&self, query: EntryQuery) -> Result<Vec<BusySlot>, TimetableError> {
        Ok(self.store.list_entries(&query).await?.iter().map(BusySlot::from).collect())
    }

    async fn check_references(&self, draft: &EntryDraft) -> Result<(), TimetableError> {
        let references = [
            (EntityKind::Subject, draft.subject_id),
            (EntityKind::Section, draft.section_id),
            (EntityKind::Professor, draft.professor_id),
            (EntityKind::Room, draft.room_id),
        ];
        for (kind, id) in references {
            if !self.store.exists(kind, id).await? {
                return Err(TimetableError::Reference { kind, id });
            }
        }
        Ok(())
    }
}

fn authorize(actor: &AuthUser) -> Result<(), TimetableError> {
    if actor.role.can_mutate_timetable() {
        Ok(())
    } else {
        warn!("User {} ({}) denied timetable write", actor.user_id, actor.role);
        Err(TimetableError::Forbidden(actor.role.to_string()))
    }
}

fn validate(draft: &EntryDraft) -> Result<(), TimetableError> {
    let mut problems = Vec::new();

    for (field, id) in [
        ("subject_id", draft.subject_id),
        ("section_id", draft.section_id),
        ("professor_id", draft.professor_id),
        ("room_id", draft.room_id),
    ] {
        if id <= 0 {
            problems.push((field, "Must be a positive id".to_string()));
        }
    }
    if TimeRange::new(draft.start_time, draft.end_time).is_none() {
        problems.push(("end_time", "End time must be after start time".to_string()));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(TimetableError::Validation(problems))
    }
}
