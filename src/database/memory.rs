//! In-process store used by tests and `serve --memory`. Applies the same
//! referential and uniqueness rules the Postgres schema enforces.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    CatalogRecord, EntityKind, EntryDraft, NewCatalogRecord, TimetableEntry, TimetableEntryView,
};
use crate::database::query_builder::EntryQuery;
use crate::database::repository::{CatalogStore, Store, TimetableStore};

#[derive(Default)]
struct MemoryState {
    entries: BTreeMap<i64, TimetableEntry>,
    last_entry_id: i64,
    catalog: HashMap<EntityKind, BTreeMap<i64, CatalogRecord>>,
    last_ids: HashMap<EntityKind, i64>,
}

impl MemoryState {
    fn contains(&self, kind: EntityKind, id: i64) -> bool {
        self.catalog.get(&kind).map_or(false, |records| records.contains_key(&id))
    }

    fn check_parent(&self, record: &CatalogRecord) -> Result<(), DatabaseError> {
        match record.parent() {
            Some((kind, id)) if !self.contains(kind, id) => {
                Err(DatabaseError::MissingParent(format!("{} {}", kind, id)))
            }
            _ => Ok(()),
        }
    }

    fn check_unique(&self, record: &CatalogRecord) -> Result<(), DatabaseError> {
        let keys = record.unique_keys();
        let clash = self
            .catalog
            .get(&record.kind())
            .into_iter()
            .flat_map(|records| records.values())
            .filter(|other| other.id() != record.id())
            .any(|other| other.unique_keys().iter().any(|k| keys.contains(k)));

        if clash {
            return Err(DatabaseError::Duplicate(format!("{} already exists", record.kind())));
        }
        Ok(())
    }

    fn check_entry_references(&self, draft: &EntryDraft) -> Result<(), DatabaseError> {
        let references = [
            (EntityKind::Subject, draft.subject_id),
            (EntityKind::Section, draft.section_id),
            (EntityKind::Professor, draft.professor_id),
            (EntityKind::Room, draft.room_id),
        ];
        for (kind, id) in references {
            if !self.contains(kind, id) {
                return Err(DatabaseError::MissingParent(format!("{} {}", kind, id)));
            }
        }
        Ok(())
    }

    fn record(&self, kind: EntityKind, id: i64) -> Option<&CatalogRecord> {
        self.catalog.get(&kind).and_then(|records| records.get(&id))
    }

    fn view(&self, entry: &TimetableEntry) -> TimetableEntryView {
        let name = |kind, id| match self.record(kind, id) {
            Some(CatalogRecord::Subject(r)) => r.name.clone(),
            Some(CatalogRecord::Section(r)) => r.name.clone(),
            Some(CatalogRecord::Room(r)) => r.name.clone(),
            _ => String::new(),
        };
        let (first_name, last_name) = match self.record(EntityKind::Professor, entry.professor_id) {
            Some(CatalogRecord::Professor(p)) => (p.first_name.clone(), p.last_name.clone()),
            _ => Default::default(),
        };

        TimetableEntryView {
            entry: entry.clone(),
            subject_name: name(EntityKind::Subject, entry.subject_id),
            section_name: name(EntityKind::Section, entry.section_id),
            professor_first_name: first_name,
            professor_last_name: last_name,
            room_name: name(EntityKind::Room, entry.room_id),
        }
    }

    fn matching_entries(&self, query: &EntryQuery) -> Vec<&TimetableEntry> {
        let mut entries: Vec<&TimetableEntry> = self.entries.values().filter(|entry| query.matches(entry)).collect();
        entries.sort_by_key(|e| (e.day_of_week, e.start_time, e.id));
        entries
    }

    fn dependents(&self, kind: EntityKind, id: i64) -> i64 {
        let children = self
            .catalog
            .values()
            .flat_map(|records| records.values())
            .filter(|record| record.parent() == Some((kind, id)))
            .count();

        let entries = self
            .entries
            .values()
            .filter(|entry| match kind {
                EntityKind::Section => entry.section_id == id,
                EntityKind::Subject => entry.subject_id == id,
                EntityKind::Professor => entry.professor_id == id,
                EntityKind::Room => entry.room_id == id,
                EntityKind::Department | EntityKind::Grade => false,
            })
            .count();

        (children + entries) as i64
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimetableStore for MemoryStore {
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<TimetableEntry>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.matching_entries(query).into_iter().cloned().collect())
    }

    async fn list_entry_views(&self, query: &EntryQuery) -> Result<Vec<TimetableEntryView>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.matching_entries(query).into_iter().map(|entry| state.view(entry)).collect())
    }

    async fn get_entry(&self, id: i64) -> Result<Option<TimetableEntry>, DatabaseError> {
        Ok(self.state.read().await.entries.get(&id).cloned())
    }

    async fn insert_entry(&self, draft: &EntryDraft) -> Result<TimetableEntry, DatabaseError> {
        let mut state = self.state.write().await;
        state.check_entry_references(draft)?;

        state.last_entry_id += 1;
        let entry = draft.clone().into_entry(state.last_entry_id);
        state.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn replace_entry(&self, id: i64, draft: &EntryDraft) -> Result<Option<TimetableEntry>, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.entries.contains_key(&id) {
            return Ok(None);
        }
        state.check_entry_references(draft)?;

        let entry = draft.clone().into_entry(id);
        state.entries.insert(id, entry.clone());
        Ok(Some(entry))
    }

    async fn delete_entry(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.state.write().await.entries.remove(&id).is_some())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_record(&self, record: NewCatalogRecord) -> Result<CatalogRecord, DatabaseError> {
        let mut state = self.state.write().await;
        let kind = record.kind();
        let next_id = state.last_ids.get(&kind).copied().unwrap_or(0) + 1;

        let record = record.with_id(next_id);
        state.check_parent(&record)?;
        state.check_unique(&record)?;

        state.last_ids.insert(kind, next_id);
        state.catalog.entry(kind).or_default().insert(next_id, record.clone());
        Ok(record)
    }

    async fn update_record(&self, id: i64, record: NewCatalogRecord) -> Result<Option<CatalogRecord>, DatabaseError> {
        let mut state = self.state.write().await;
        let kind = record.kind();
        if !state.contains(kind, id) {
            return Ok(None);
        }

        let record = record.with_id(id);
        state.check_parent(&record)?;
        state.check_unique(&record)?;

        state.catalog.entry(kind).or_default().insert(id, record.clone());
        Ok(Some(record))
    }

    async fn get_record(&self, kind: EntityKind, id: i64) -> Result<Option<CatalogRecord>, DatabaseError> {
        Ok(self.state.read().await.record(kind, id).cloned())
    }

    async fn list_records(&self, kind: EntityKind) -> Result<Vec<CatalogRecord>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .catalog
            .get(&kind)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_children(&self, kind: EntityKind, parent_id: i64) -> Result<Vec<CatalogRecord>, DatabaseError> {
        let Some(parent_kind) = kind.parent_kind() else {
            return Ok(Vec::new());
        };
        let state = self.state.read().await;
        Ok(state
            .catalog
            .get(&kind)
            .into_iter()
            .flat_map(|records| records.values())
            .filter(|record| record.parent() == Some((parent_kind, parent_id)))
            .cloned()
            .collect())
    }

    async fn delete_record(&self, kind: EntityKind, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        if state.dependents(kind, id) > 0 {
            return Err(DatabaseError::StillReferenced(format!("{} {}", kind, id)));
        }
        Ok(state
            .catalog
            .get_mut(&kind)
            .map_or(false, |records| records.remove(&id).is_some()))
    }

    async fn count_dependents(&self, kind: EntityKind, id: i64) -> Result<i64, DatabaseError> {
        Ok(self.state.read().await.dependents(kind, id))
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
