use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    CatalogRecord, Department, EntityKind, EntryDraft, Grade, NewCatalogRecord, Professor, Room, Section, Subject,
    TimetableEntry, TimetableEntryView,
};
use crate::database::query_builder::{entry_columns, EntryQuery};
use crate::database::repository::{CatalogStore, Store, TimetableStore};

/// Store backed by the Postgres schema in `migrations/`. Uniqueness and
/// referential rules are left to the database constraints.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select_by_id<T>(&self, table: &str, id: i64) -> Result<Option<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} WHERE id = $1", table);
        Ok(sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn select_children<T>(&self, table: &str, parent_column: &str, parent_id: i64) -> Result<Vec<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} WHERE {} = $1 ORDER BY id", table, parent_column);
        Ok(sqlx::query_as::<_, T>(&sql).bind(parent_id).fetch_all(&self.pool).await?)
    }

    async fn select_all<T>(&self, table: &str) -> Result<Vec<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} ORDER BY id", table);
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    /// Shared INSERT / UPDATE for every catalog kind. With `id` set the
    /// statement is an UPDATE and yields `None` when no row matched.
    async fn write_record(
        &self,
        id: Option<i64>,
        record: NewCatalogRecord,
    ) -> Result<Option<CatalogRecord>, DatabaseError> {
        let kind = record.kind();
        let map_err = |e: sqlx::Error| DatabaseError::from_constraint(e, kind.label());

        let written = match record {
            NewCatalogRecord::Department(r) => {
                let sql = match id {
                    None => "INSERT INTO departments (name, code, description) VALUES ($1, $2, $3) RETURNING *",
                    Some(_) => "UPDATE departments SET name = $1, code = $2, description = $3 WHERE id = $4 RETURNING *",
                };
                let mut query = sqlx::query_as::<_, Department>(sql)
                    .bind(r.name)
                    .bind(r.code)
                    .bind(r.description);
                if let Some(id) = id {
                    query = query.bind(id);
                }
                query.fetch_optional(&self.pool).await.map_err(map_err)?.map(CatalogRecord::Department)
            }
            NewCatalogRecord::Grade(r) => {
                let sql = match id {
                    None => "INSERT INTO grades (name, level, department_id) VALUES ($1, $2, $3) RETURNING *",
                    Some(_) => "UPDATE grades SET name = $1, level = $2, department_id = $3 WHERE id = $4 RETURNING *",
                };
                let mut query = sqlx::query_as::<_, Grade>(sql)
                    .bind(r.name)
                    .bind(r.level)
                    .bind(r.department_id);
                if let Some(id) = id {
                    query = query.bind(id);
                }
                query.fetch_optional(&self.pool).await.map_err(map_err)?.map(CatalogRecord::Grade)
            }
            NewCatalogRecord::Section(r) => {
                let sql = match id {
                    None => "INSERT INTO sections (name, grade_id, capacity) VALUES ($1, $2, $3) RETURNING *",
                    Some(_) => "UPDATE sections SET name = $1, grade_id = $2, capacity = $3 WHERE id = $4 RETURNING *",
                };
                let mut query = sqlx::query_as::<_, Section>(sql)
                    .bind(r.name)
                    .bind(r.grade_id)
                    .bind(r.capacity);
                if let Some(id) = id {
                    query = query.bind(id);
                }
                query.fetch_optional(&self.pool).await.map_err(map_err)?.map(CatalogRecord::Section)
            }
            NewCatalogRecord::Subject(r) => {
                let sql = match id {
                    None => {
                        "INSERT INTO subjects (name, code, grade_id, credits, hours_per_week) \
                         VALUES ($1, $2, $3, $4, $5) RETURNING *"
                    }
                    Some(_) => {
                        "UPDATE subjects SET name = $1, code = $2, grade_id = $3, credits = $4, hours_per_week = $5 \
                         WHERE id = $6 RETURNING *"
                    }
                };
                let mut query = sqlx::query_as::<_, Subject>(sql)
                    .bind(r.name)
                    .bind(r.code)
                    .bind(r.grade_id)
                    .bind(r.credits)
                    .bind(r.hours_per_week);
                if let Some(id) = id {
                    query = query.bind(id);
                }
                query.fetch_optional(&self.pool).await.map_err(map_err)?.map(CatalogRecord::Subject)
            }
            NewCatalogRecord::Professor(r) => {
                let sql = match id {
                    None => {
                        "INSERT INTO professors \
                         (first_name, last_name, email, phone, department_id, specialization, max_hours_per_week) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *"
                    }
                    Some(_) => {
                        "UPDATE professors SET first_name = $1, last_name = $2, email = $3, phone = $4, \
                         department_id = $5, specialization = $6, max_hours_per_week = $7 WHERE id = $8 RETURNING *"
                    }
                };
                let mut query = sqlx::query_as::<_, Professor>(sql)
                    .bind(r.first_name)
                    .bind(r.last_name)
                    .bind(r.email)
                    .bind(r.phone)
                    .bind(r.department_id)
                    .bind(r.specialization)
                    .bind(r.max_hours_per_week);
                if let Some(id) = id {
                    query = query.bind(id);
                }
                query.fetch_optional(&self.pool).await.map_err(map_err)?.map(CatalogRecord::Professor)
            }
            NewCatalogRecord::Room(r) => {
                let sql = match id {
                    None => {
                        "INSERT INTO rooms (name, capacity, room_type, building, floor) \
                         VALUES ($1, $2, $3, $4, $5) RETURNING *"
                    }
                    Some(_) => {
                        "UPDATE rooms SET name = $1, capacity = $2, room_type = $3, building = $4, floor = $5 \
                         WHERE id = $6 RETURNING *"
                    }
                };
                let mut query = sqlx::query_as::<_, Room>(sql)
                    .bind(r.name)
                    .bind(r.capacity)
                    .bind(r.room_type)
                    .bind(r.building)
                    .bind(r.floor);
                if let Some(id) = id {
                    query = query.bind(id);
                }
                query.fetch_optional(&self.pool).await.map_err(map_err)?.map(CatalogRecord::Room)
            }
        };

        Ok(written)
    }
}

#[async_trait]
impl TimetableStore for PgStore {
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<TimetableEntry>, DatabaseError> {
        let mut select = query.to_select();
        Ok(select.build_query_as::<TimetableEntry>().fetch_all(&self.pool).await?)
    }

    async fn list_entry_views(&self, query: &EntryQuery) -> Result<Vec<TimetableEntryView>, DatabaseError> {
        let mut select = query.to_view_select();
        Ok(select.build_query_as::<TimetableEntryView>().fetch_all(&self.pool).await?)
    }

    async fn get_entry(&self, id: i64) -> Result<Option<TimetableEntry>, DatabaseError> {
        let sql = format!("SELECT {} FROM timetable_entries WHERE id = $1", entry_columns());
        Ok(sqlx::query_as::<_, TimetableEntry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_entry(&self, draft: &EntryDraft) -> Result<TimetableEntry, DatabaseError> {
        let sql = format!(
            "INSERT INTO timetable_entries \
             (subject_id, section_id, professor_id, room_id, day_of_week, start_time, end_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            entry_columns()
        );
        sqlx::query_as::<_, TimetableEntry>(&sql)
            .bind(draft.subject_id)
            .bind(draft.section_id)
            .bind(draft.professor_id)
            .bind(draft.room_id)
            .bind(draft.day_of_week.number())
            .bind(draft.start_time)
            .bind(draft.end_time)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_constraint(e, "Timetable entry"))
    }

    async fn replace_entry(&self, id: i64, draft: &EntryDraft) -> Result<Option<TimetableEntry>, DatabaseError> {
        let sql = format!(
            "UPDATE timetable_entries SET subject_id = $1, section_id = $2, professor_id = $3, room_id = $4, \
             day_of_week = $5, start_time = $6, end_time = $7 WHERE id = $8 RETURNING {}",
            entry_columns()
        );
        sqlx::query_as::<_, TimetableEntry>(&sql)
            .bind(draft.subject_id)
            .bind(draft.section_id)
            .bind(draft.professor_id)
            .bind(draft.room_id)
            .bind(draft.day_of_week.number())
            .bind(draft.start_time)
            .bind(draft.end_time)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_constraint(e, "Timetable entry"))
    }

    async fn delete_entry(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM timetable_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_record(&self, record: NewCatalogRecord) -> Result<CatalogRecord, DatabaseError> {
        let kind = record.kind();
        self.write_record(None, record)
            .await?
            .ok_or_else(|| DatabaseError::QueryError(format!("INSERT into {} returned no row", kind.table())))
    }

    async fn update_record(&self, id: i64, record: NewCatalogRecord) -> Result<Option<CatalogRecord>, DatabaseError> {
        self.write_record(Some(id), record).await
    }

    async fn get_record(&self, kind: EntityKind, id: i64) -> Result<Option<CatalogRecord>, DatabaseError> {
        let table = kind.table();
        Ok(match kind {
            EntityKind::Department => self.select_by_id(table, id).await?.map(CatalogRecord::Department),
            EntityKind::Grade => self.select_by_id(table, id).await?.map(CatalogRecord::Grade),
            EntityKind::Section => self.select_by_id(table, id).await?.map(CatalogRecord::Section),
            EntityKind::Subject => self.select_by_id(table, id).await?.map(CatalogRecord::Subject),
            EntityKind::Professor => self.select_by_id(table, id).await?.map(CatalogRecord::Professor),
            EntityKind::Room => self.select_by_id(table, id).await?.map(CatalogRecord::Room),
        })
    }

    async fn list_records(&self, kind: EntityKind) -> Result<Vec<CatalogRecord>, DatabaseError> {
        let table = kind.table();
        Ok(match kind {
            EntityKind::Department => self.select_all(table).await?.into_iter().map(CatalogRecord::Department).collect(),
            EntityKind::Grade => self.select_all(table).await?.into_iter().map(CatalogRecord::Grade).collect(),
            EntityKind::Section => self.select_all(table).await?.into_iter().map(CatalogRecord::Section).collect(),
            EntityKind::Subject => self.select_all(table).await?.into_iter().map(CatalogRecord::Subject).collect(),
            EntityKind::Professor => self.select_all(table).await?.into_iter().map(CatalogRecord::Professor).collect(),
            EntityKind::Room => self.select_all(table).await?.into_iter().map(CatalogRecord::Room).collect(),
        })
    }

    async fn list_children(&self, kind: EntityKind, parent_id: i64) -> Result<Vec<CatalogRecord>, DatabaseError> {
        let Some(parent) = kind.parent_kind() else {
            return Ok(Vec::new());
        };
        let (table, column) = (kind.table(), parent.id_field());
        Ok(match kind {
            EntityKind::Grade => self.select_children(table, column, parent_id).await?.into_iter().map(CatalogRecord::Grade).collect(),
            EntityKind::Section => self.select_children(table, column, parent_id).await?.into_iter().map(CatalogRecord::Section).collect(),
            EntityKind::Subject => self.select_children(table, column, parent_id).await?.into_iter().map(CatalogRecord::Subject).collect(),
            EntityKind::Professor => self.select_children(table, column, parent_id).await?.into_iter().map(CatalogRecord::Professor).collect(),
            EntityKind::Department | EntityKind::Room => Vec::new(),
        })
    }

    async fn delete_record(&self, kind: EntityKind, id: i64) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_delete(e, &format!("{} {}", kind, id)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_dependents(&self, kind: EntityKind, id: i64) -> Result<i64, DatabaseError> {
        let sql = match kind {
            EntityKind::Department => {
                "SELECT (SELECT COUNT(*) FROM grades WHERE department_id = $1) \
                      + (SELECT COUNT(*) FROM professors WHERE department_id = $1)"
            }
            EntityKind::Grade => {
                "SELECT (SELECT COUNT(*) FROM sections WHERE grade_id = $1) \
                      + (SELECT COUNT(*) FROM subjects WHERE grade_id = $1)"
            }
            EntityKind::Section => "SELECT COUNT(*) FROM timetable_entries WHERE section_id = $1",
            EntityKind::Subject => "SELECT COUNT(*) FROM timetable_entries WHERE subject_id = $1",
            EntityKind::Professor => "SELECT COUNT(*) FROM timetable_entries WHERE professor_id = $1",
            EntityKind::Room => "SELECT COUNT(*) FROM timetable_entries WHERE room_id = $1",
        };
        let count: Option<i64> = sqlx::query_scalar(sql).bind(id).fetch_one(&self.pool).await?;
        Ok(count.unwrap_or(0))
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
