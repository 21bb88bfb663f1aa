use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::database::models::{EntryDraft, TimetableEntry};
use crate::database::{DatabaseError, SharedStore, TimetableStore};
use crate::timetable::interval::overlaps;

/// Resource dimension two entries can collide on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Section,
    Professor,
    Room,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Section, Axis::Professor, Axis::Room];

    fn shared(self, candidate: &EntryDraft, existing: &TimetableEntry) -> bool {
        match self {
            Axis::Section => candidate.section_id == existing.section_id,
            Axis::Professor => candidate.professor_id == existing.professor_id,
            Axis::Room => candidate.room_id == existing.room_id,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Section => "section",
            Axis::Professor => "professor",
            Axis::Room => "room",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Conflict {
    pub entry_id: i64,
    pub axis: Axis,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} conflict with entry {}", self.axis, self.entry_id)
    }
}

/// Every (entry, axis) collision between `candidate` and `existing`,
/// ordered by entry id then axis. Entries on other days and the entry
/// named by `exclude` are ignored.
pub fn detect(candidate: &EntryDraft, existing: &[TimetableEntry], exclude: Option<i64>) -> Vec<Conflict> {
    let mut conflicts: Vec<Conflict> = existing
        .iter()
        .filter(|e| e.day_of_week == candidate.day_of_week)
        .filter(|e| Some(e.id) != exclude)
        .filter(|e| overlaps(candidate.start_time, candidate.end_time, e.start_time, e.end_time))
        .flat_map(|e| {
            Axis::ALL
                .into_iter()
                .filter(move |axis| axis.shared(candidate, e))
                .map(move |axis| Conflict { entry_id: e.id, axis })
        })
        .collect();

    conflicts.sort();
    conflicts
}

/// Read-only conflict lookup against the store
#[derive(Clone)]
pub struct ConflictChecker {
    store: SharedStore,
}

impl ConflictChecker {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn find_conflicts(
        &self,
        candidate: &EntryDraft,
        exclude: Option<i64>,
    ) -> Result<Vec<Conflict>, DatabaseError> {
        let same_day = self.store.entries_for_day(candidate.day_of_week, exclude).await?;
        let conflicts = detect(candidate, &same_day, exclude);

        debug!(
            day = %candidate.day_of_week,
            scanned = same_day.len(),
            found = conflicts.len(),
            "Conflict check complete"
        );
        Ok(conflicts)
    }
}
