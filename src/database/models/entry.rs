use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use crate::types::{clock_time, DayOfWeek};

/// One scheduled session: subject + section + professor + room on a weekday slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: i64,
    pub subject_id: i64,
    pub section_id: i64,
    pub professor_id: i64,
    pub room_id: i64,
    pub day_of_week: DayOfWeek,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
}

/// Proposed placement, before an id is assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub subject_id: i64,
    pub section_id: i64,
    pub professor_id: i64,
    pub room_id: i64,
    pub day_of_week: DayOfWeek,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
}

impl EntryDraft {
    pub fn into_entry(self, id: i64) -> TimetableEntry {
        TimetableEntry {
            id,
            subject_id: self.subject_id,
            section_id: self.section_id,
            professor_id: self.professor_id,
            room_id: self.room_id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

impl TimetableEntry {
    pub fn draft(&self) -> EntryDraft {
        EntryDraft {
            subject_id: self.subject_id,
            section_id: self.section_id,
            professor_id: self.professor_id,
            room_id: self.room_id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

impl<'r> FromRow<'r, PgRow> for TimetableEntry {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let day: i16 = row.try_get("day_of_week")?;
        let day_of_week = DayOfWeek::try_from(day).map_err(|e| sqlx::Error::ColumnDecode {
            index: "day_of_week".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            subject_id: row.try_get("subject_id")?,
            section_id: row.try_get("section_id")?,
            professor_id: row.try_get("professor_id")?,
            room_id: row.try_get("room_id")?,
            day_of_week,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
        })
    }
}

/// Entry with the display names of the records it points at, as served by
/// the section, professor and room listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimetableEntryView {
    #[serde(flatten)]
    pub entry: TimetableEntry,
    pub subject_name: String,
    pub section_name: String,
    pub professor_first_name: String,
    pub professor_last_name: String,
    pub room_name: String,
}

impl<'r> FromRow<'r, PgRow> for TimetableEntryView {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            entry: TimetableEntry::from_row(row)?,
            subject_name: row.try_get("subject_name")?,
            section_name: row.try_get("section_name")?,
            professor_first_name: row.try_get("professor_first_name")?,
            professor_last_name: row.try_get("professor_last_name")?,
            room_name: row.try_get("room_name")?,
        })
    }
}

/// Occupied interval reported by the availability endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusySlot {
    pub entry_id: i64,
    pub day_of_week: DayOfWeek,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
}

impl From<&TimetableEntry> for BusySlot {
    fn from(entry: &TimetableEntry) -> Self {
        Self {
            entry_id: entry.id,
            day_of_week: entry.day_of_week,
            start_time: entry.start_time,
            end_time: entry.end_time,
        }
    }
}
