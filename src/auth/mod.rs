use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::config::MAX_JWT_EXPIRY_HOURS;
use crate::database::models::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "chef_departement")]
    DepartmentHead,
    #[serde(rename = "professor")]
    Professor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::DepartmentHead => "chef_departement",
            Role::Professor => "professor",
        }
    }

    /// Create, update and delete timetable entries
    pub fn can_mutate_timetable(self) -> bool {
        matches!(self, Role::Admin | Role::DepartmentHead)
    }

    /// Write access to a catalog kind. Departments are admin-only.
    pub fn can_manage(self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Department => self == Role::Admin,
            _ => matches!(self, Role::Admin | Role::DepartmentHead),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "chef_departement" | "department_head" => Ok(Role::DepartmentHead),
            "professor" => Ok(Role::Professor),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Lifetimes above [`MAX_JWT_EXPIRY_HOURS`] are clamped to it
    pub fn new(sub: Uuid, role: Role, department_id: Option<i64>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let lifetime = Duration::try_hours(expiry_hours.min(MAX_JWT_EXPIRY_HOURS) as i64)
            .unwrap_or_else(|| Duration::days(1));
        let exp = (now + lifetime).timestamp();

        Self {
            sub,
            role,
            department_id,
            iat: now.timestamp(),
            exp,
        }
    }
}

/// The actor behind a request
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    pub department_id: Option<i64>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            department_id: claims.department_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}
