use serde::{Deserialize, Serialize};

use super::EmployeeId;

/// A team member, as listed by the employee endpoint.
///
/// Only `employee_id`, `first_name` and `email` are guaranteed; the signup
/// profile fields are returned by some backend versions and are optional here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_id: EmployeeId,
    pub first_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, rename = "job_role")]
    pub job_role: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub years_of_experience: Option<String>,
}

impl Employee {
    /// Initials for avatar-style display ("Anna Lee" -> "AL").
    pub fn initials(&self) -> String {
        self.first_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

/// Minimal employee record embedded in an assigned task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRef {
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    pub first_name: String,
}
