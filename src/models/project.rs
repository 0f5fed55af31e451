use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Priority, ProjectId};

/// A project containing tasks.
///
/// Progress and task counters are computed by the backend; the client only
/// displays and sorts by them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub project_name: String,
    #[serde(default)]
    pub project_desc: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    #[serde(default, deserialize_with = "super::date::lenient")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub total_tasks: u32,
    #[serde(default)]
    pub completed_tasks: u32,
    #[serde(default)]
    pub team_members: Vec<String>,
}

/// Lifecycle status of a project.
///
/// The backend spells "in progress" with a capital letter and a space; the
/// serialized names are kept exactly as stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
    #[serde(rename = "planning", alias = "Planning")]
    Planning,
    #[serde(rename = "In progress", alias = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "on-hold")]
    OnHold,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "In progress",
            Self::Completed => "completed",
            Self::OnHold => "on-hold",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::OnHold => "On Hold",
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" | "Planning" => Ok(Self::Planning),
            "In progress" | "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "on-hold" => Ok(Self::OnHold),
            _ => Err(format!(
                "invalid project status '{}', expected one of: planning, in-progress, completed, on-hold",
                s
            )),
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a new project. New projects always start in `planning`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    pub project_name: String,
    pub project_desc: String,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub team_members: Vec<String>,
    pub status: ProjectStatus,
}

/// Full project record sent back by the project editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    pub project_name: String,
    pub project_desc: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub team_members: Vec<String>,
}

impl From<&Project> for UpdateProjectInput {
    fn from(project: &Project) -> Self {
        Self {
            project_name: project.project_name.clone(),
            project_desc: project.project_desc.clone(),
            status: project.status,
            priority: project.priority,
            due_date: project.due_date,
            team_members: project.team_members.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_backend_spelling_of_in_progress() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"In progress\"");

        let status: ProjectStatus = serde_json::from_str("\"Planning\"").unwrap();
        assert_eq!(status, ProjectStatus::Planning);
    }

    #[test]
    fn decodes_project_with_defaults() {
        let json = r#"{"id":4,"projectName":"Shop","status":"on-hold","priority":"medium"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.id, ProjectId(4));
        assert_eq!(project.status, ProjectStatus::OnHold);
        assert_eq!(project.progress, 0);
        assert!(project.team_members.is_empty());
        assert!(project.due_date.is_none());
    }
}
