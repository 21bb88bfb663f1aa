// handlers/mod.rs - two handler tiers
//
// Public (no auth) → Protected (JWT auth, actor in request extensions)
pub mod extract;
pub mod protected; // /api/*
pub mod public; // /, /health

use serde::Deserialize;

use crate::error::ApiError;
use crate::types::DayOfWeek;

/// Optional `?day=` filter accepted by listing endpoints (`?dayOfWeek=` also works)
#[derive(Debug, Default, Deserialize)]
pub struct DayFilter {
    #[serde(alias = "dayOfWeek")]
    pub day: Option<String>,
}

impl DayFilter {
    pub fn parse(&self) -> Result<Option<DayOfWeek>, ApiError> {
        self.day
            .as_deref()
            .map(|raw| {
                raw.parse::<DayOfWeek>()
                    .map_err(|e| ApiError::bad_request(e.to_string()))
            })
            .transpose()
    }
}
