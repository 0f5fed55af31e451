use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EmployeeRef, Priority, TaskId};

/// A unit of work inside a project.
///
/// Tasks are fetched in bulk per project and replaced wholesale on every
/// fetch; the client never merges them incrementally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: TaskId,
    #[serde(rename = "taskTitle")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default, deserialize_with = "super::date::lenient")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "super::date::lenient")]
    pub created_date: Option<NaiveDate>,
    /// Employee the backend has assigned this task to, if any.
    #[serde(default)]
    pub employee: Option<EmployeeRef>,
}

impl Task {
    /// Display name of the assignee.
    pub fn assignee(&self) -> &str {
        self.employee
            .as_ref()
            .map(|e| e.first_name.as_str())
            .unwrap_or("Unassigned")
    }
}

/// The progress status of a task.
///
/// - `Todo`: Not yet started
/// - `InProgress`: Someone is working on it
/// - `Completed`: Done
/// - `Blocked`: Waiting on something outside the task
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
    Blocked,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        Self::Todo,
        Self::InProgress,
        Self::Completed,
        Self::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Blocked => "Blocked",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "blocked" => Ok(Self::Blocked),
            _ => Err(format!(
                "invalid task status '{}', expected one of: todo, in-progress, completed, blocked",
                s
            )),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a task in a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    pub task_title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
    /// Stamped by the client at submit time.
    pub created_date: NaiveDate,
}

/// Full task record sent back by the task detail editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskInput {
    pub task_title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub created_date: Option<NaiveDate>,
}

impl From<&Task> for UpdateTaskInput {
    fn from(task: &Task) -> Self {
        Self {
            task_title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            created_date: task.created_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_task_shape() {
        let json = r#"{
            "taskId": 7,
            "taskTitle": "Wire checkout",
            "description": "Hook up the payment form",
            "status": "in-progress",
            "priority": "high",
            "dueDate": "2024-03-05",
            "createdDate": "2024-02-01",
            "employee": { "employeeId": 3, "firstName": "Anna" }
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.task_id, TaskId(7));
        assert_eq!(task.title, "Wire checkout");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(task.assignee(), "Anna");
    }

    #[test]
    fn unassigned_when_no_employee() {
        let json = r#"{"taskId":1,"taskTitle":"t","status":"todo","priority":"low","dueDate":null,"createdDate":null}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.assignee(), "Unassigned");
        assert!(task.description.is_empty());
    }

    #[test]
    fn accepts_timestamps_for_dates() {
        let json = r#"{"taskId":1,"taskTitle":"t","status":"todo","priority":"low","dueDate":"2024-03-05T00:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn rejects_unknown_status() {
        let json = r#"{"taskId":1,"taskTitle":"t","status":"done","priority":"low"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
        assert!("done".parse::<TaskStatus>().is_err());
    }
}
