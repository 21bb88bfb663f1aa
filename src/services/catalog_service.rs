use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::database::models::{CatalogRecord, EntityKind, NewCatalogRecord};
use crate::database::{CatalogStore, DatabaseError, SharedStore};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid {kind} payload")]
    Validation {
        kind: EntityKind,
        field_errors: Vec<(String, String)>,
    },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("{kind} {id} is still referenced by {dependents} record(s)")]
    InUse { kind: EntityKind, id: i64, dependents: i64 },

    #[error("{0}")]
    Duplicate(String),

    #[error("Referenced record does not exist: {0}")]
    MissingParent(String),

    #[error("Role '{role}' may not modify {kind} records")]
    Forbidden { role: String, kind: EntityKind },

    #[error(transparent)]
    Persistence(DatabaseError),
}

impl From<DatabaseError> for CatalogError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Duplicate(msg) => CatalogError::Duplicate(msg),
            DatabaseError::MissingParent(what) => CatalogError::MissingParent(what),
            other => CatalogError::Persistence(other),
        }
    }
}

/// CRUD over departments, grades, sections, subjects, professors and rooms
pub struct CatalogService {
    store: SharedStore,
}

impl CatalogService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(&self, kind: EntityKind) -> Result<Vec<CatalogRecord>, CatalogError> {
        Ok(self.store.list_records(kind).await?)
    }

    /// Records owned by `parent_id`, e.g. the grades of one department.
    /// Empty when the parent has none or does not exist.
    pub async fn list_children(&self, kind: EntityKind, parent_id: i64) -> Result<Vec<CatalogRecord>, CatalogError> {
        Ok(self.store.list_children(kind, parent_id).await?)
    }

    pub async fn get(&self, kind: EntityKind, id: i64) -> Result<CatalogRecord, CatalogError> {
        self.store
            .get_record(kind, id)
            .await?
            .ok_or(CatalogError::NotFound { kind, id })
    }

    pub async fn create(&self, actor: &AuthUser, kind: EntityKind, body: Value) -> Result<CatalogRecord, CatalogError> {
        authorize(actor, kind)?;
        let record = decode(kind, body)?;

        let created = self.store.insert_record(record).await?;
        info!("Created {} {}", kind, created.id());
        Ok(created)
    }

    pub async fn update(
        &self,
        actor: &AuthUser,
        kind: EntityKind,
        id: i64,
        body: Value,
    ) -> Result<CatalogRecord, CatalogError> {
        authorize(actor, kind)?;
        let record = decode(kind, body)?;

        let updated = self
            .store
            .update_record(id, record)
            .await?
            .ok_or(CatalogError::NotFound { kind, id })?;
        info!("Updated {} {}", kind, id);
        Ok(updated)
    }

    /// Refused while child records or timetable entries point at the record
    pub async fn delete(&self, actor: &AuthUser, kind: EntityKind, id: i64) -> Result<(), CatalogError> {
        authorize(actor, kind)?;

        if !self.store.exists(kind, id).await? {
            return Err(CatalogError::NotFound { kind, id });
        }

        let dependents = self.store.count_dependents(kind, id).await?;
        if dependents > 0 {
            warn!("Refused to delete {} {}: {} dependent record(s)", kind, id, dependents);
            return Err(CatalogError::InUse { kind, id, dependents });
        }

        match self.store.delete_record(kind, id).await {
            Ok(true) => {
                info!("Deleted {} {}", kind, id);
                Ok(())
            }
            Ok(false) => Err(CatalogError::NotFound { kind, id }),
            // a dependent appeared between the count and the delete
            Err(DatabaseError::StillReferenced(_)) => Err(CatalogError::InUse { kind, id, dependents: 1 }),
            Err(e) => Err(e.into()),
        }
    }
}

fn authorize(actor: &AuthUser, kind: EntityKind) -> Result<(), CatalogError> {
    if actor.role.can_manage(kind) {
        return Ok(());
    }
    warn!("User {} ({}) denied write on {}", actor.user_id, actor.role, kind);
    Err(CatalogError::Forbidden { role: actor.role.to_string(), kind })
}

fn decode(kind: EntityKind, body: Value) -> Result<NewCatalogRecord, CatalogError> {
    let record = NewCatalogRecord::from_json(kind, body).map_err(|e| CatalogError::Validation {
        kind,
        field_errors: vec![("body".to_string(), e.to_string())],
    })?;

    let problems = record.validate();
    if !problems.is_empty() {
        return Err(CatalogError::Validation {
            kind,
            field_errors: problems.into_iter().map(|(f, m)| (f.to_string(), m)).collect(),
        });
    }
    Ok(record)
}
