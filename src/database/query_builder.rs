use sqlx::{Postgres, QueryBuilder};

use crate::database::models::TimetableEntry;
use crate::types::DayOfWeek;

const ENTRY_COLUMNS: &str =
    "id, subject_id, section_id, professor_id, room_id, day_of_week, start_time, end_time";

const VIEW_SELECT: &str = "SELECT te.*, s.name AS subject_name, sec.name AS section_name, \
     p.first_name AS professor_first_name, p.last_name AS professor_last_name, r.name AS room_name \
     FROM timetable_entries te \
     JOIN subjects s ON s.id = te.subject_id \
     JOIN sections sec ON sec.id = te.section_id \
     JOIN professors p ON p.id = te.professor_id \
     JOIN rooms r ON r.id = te.room_id";

/// Filter over timetable entries. Every field is optional and the set
/// fields are AND-ed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryQuery {
    pub section_id: Option<i64>,
    pub professor_id: Option<i64>,
    pub room_id: Option<i64>,
    pub day: Option<DayOfWeek>,
    pub exclude_id: Option<i64>,
}

impl EntryQuery {
    pub fn for_section(id: i64) -> Self {
        Self { section_id: Some(id), ..Default::default() }
    }

    pub fn for_professor(id: i64) -> Self {
        Self { professor_id: Some(id), ..Default::default() }
    }

    pub fn for_room(id: i64) -> Self {
        Self { room_id: Some(id), ..Default::default() }
    }

    pub fn for_day(day: DayOfWeek) -> Self {
        Self { day: Some(day), ..Default::default() }
    }

    pub fn on_day(mut self, day: Option<DayOfWeek>) -> Self {
        self.day = day;
        self
    }

    pub fn excluding(mut self, id: Option<i64>) -> Self {
        self.exclude_id = id;
        self
    }

    /// In-memory evaluation with the same semantics as the SQL form
    pub fn matches(&self, entry: &TimetableEntry) -> bool {
        self.section_id.map_or(true, |id| entry.section_id == id)
            && self.professor_id.map_or(true, |id| entry.professor_id == id)
            && self.room_id.map_or(true, |id| entry.room_id == id)
            && self.day.map_or(true, |day| entry.day_of_week == day)
            && self.exclude_id.map_or(true, |id| entry.id != id)
    }

    /// SELECT over timetable_entries with every filter bound as a parameter,
    /// ordered by day, start time, id
    pub fn to_select(&self) -> QueryBuilder<'static, Postgres> {
        self.select_from(format!("SELECT {} FROM timetable_entries te", ENTRY_COLUMNS))
    }

    /// Same filters and order as [`to_select`](Self::to_select), joined with
    /// the subject, section, professor and room names
    pub fn to_view_select(&self) -> QueryBuilder<'static, Postgres> {
        self.select_from(VIEW_SELECT.to_string())
    }

    fn select_from(&self, head: String) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(head);
        qb.push(" WHERE TRUE");

        if let Some(id) = self.section_id {
            qb.push(" AND te.section_id = ").push_bind(id);
        }
        if let Some(id) = self.professor_id {
            qb.push(" AND te.professor_id = ").push_bind(id);
        }
        if let Some(id) = self.room_id {
            qb.push(" AND te.room_id = ").push_bind(id);
        }
        if let Some(day) = self.day {
            qb.push(" AND te.day_of_week = ").push_bind(day.number());
        }
        if let Some(id) = self.exclude_id {
            qb.push(" AND te.id <> ").push_bind(id);
        }

        qb.push(" ORDER BY te.day_of_week, te.start_time, te.id");
        qb
    }
}

/// Column list shared by the Postgres store's RETURNING clauses
pub fn entry_columns() -> &'static str {
    ENTRY_COLUMNS
}
