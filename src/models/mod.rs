//! Wire models for the team board backend.
//!
//! # Entities
//!
//! - [`Project`]: Top-level container; a project owns a list of tasks.
//! - [`Task`]: Unit of work inside a project, optionally assigned to an employee.
//! - [`Employee`]: A team member created through signup.
//!
//! # Requests
//!
//! - [`MappingRequest`]: Bulk "map these tasks to these employees" payload.
//! - [`LoginInput`] / [`SignupInput`]: Session and account creation.
//!
//! Field names follow the backend's JSON (mostly camelCase); every record is
//! validated by serde at the boundary rather than trusted as loose JSON.

mod auth;
mod employee;
mod ids;
mod mapping;
mod project;
mod task;

pub use auth::*;
pub use employee::*;
pub use ids::*;
pub use mapping::*;
pub use project::*;
pub use task::*;

use serde::{Deserialize, Serialize};

/// Priority shared by projects and tasks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!(
                "invalid priority '{}', expected one of: low, medium, high",
                s
            )),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dates arrive either as `YYYY-MM-DD` or as full timestamps depending on
/// which backend handler produced the record.
pub(crate) mod date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    pub fn lenient<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => {
                let day = s.get(..10).unwrap_or(s);
                NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map(Some)
                    .map_err(serde::de::Error::custom)
            }
        }
    }
}
