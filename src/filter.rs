//! Pure derivations of visible lists from a store plus filter criteria.
//!
//! Nothing here mutates the stores; results borrow from them and keep their
//! order unless a sort is requested explicitly.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::{Employee, Priority, Project, ProjectStatus, Task, TaskStatus};

/// A filter value that is either the `all` sentinel or one concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: PartialEq> Choice<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }
}

impl<T: FromStr> FromStr for Choice<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(value) => value.fmt(f),
        }
    }
}

/// Case-insensitive substring test. An empty needle matches everything.
fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

/// Criteria for the task list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub search: String,
    pub status: Choice<TaskStatus>,
    pub priority: Choice<Priority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let needle = self.search.to_lowercase();
        self.matches_lowered(task, &needle)
    }

    fn matches_lowered(&self, task: &Task, needle: &str) -> bool {
        (contains_ci(&task.title, needle) || contains_ci(&task.description, needle))
            && self.status.matches(&task.status)
            && self.priority.matches(&task.priority)
    }
}

/// Tasks matching `filter`, in store order.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    let needle = filter.search.to_lowercase();
    tasks
        .iter()
        .filter(|task| filter.matches_lowered(task, &needle))
        .collect()
}

/// Employees whose first name contains `search`, case-insensitively.
pub fn filter_employees<'a>(employees: &'a [Employee], search: &str) -> Vec<&'a Employee> {
    let needle = search.to_lowercase();
    employees
        .iter()
        .filter(|employee| contains_ci(&employee.first_name, &needle))
        .collect()
}

/// Counters shown above the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl TaskStats {
    pub fn of(tasks: &[Task]) -> Self {
        let count = |status| tasks.iter().filter(|t| t.status == status).count();
        Self {
            total: tasks.len(),
            todo: count(TaskStatus::Todo),
            in_progress: count(TaskStatus::InProgress),
            completed: count(TaskStatus::Completed),
        }
    }
}

/// Sort key for the project list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectSort {
    #[default]
    Name,
    DueDate,
    Progress,
    Priority,
}

impl FromStr for ProjectSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "dueDate" | "due-date" => Ok(Self::DueDate),
            "progress" => Ok(Self::Progress),
            "priority" => Ok(Self::Priority),
            _ => Err(format!(
                "invalid sort '{}', expected one of: name, due-date, progress, priority",
                s
            )),
        }
    }
}

/// Criteria for the project list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub search: String,
    pub status: Choice<ProjectStatus>,
    pub priority: Choice<Priority>,
    pub sort: ProjectSort,
}

/// Projects matching `filter`, sorted by `filter.sort`.
///
/// Name sorts ascending ignoring case, due date ascending (undated last), progress
/// descending, priority high to low. The sort is stable.
pub fn filter_projects<'a>(projects: &'a [Project], filter: &ProjectFilter) -> Vec<&'a Project> {
    let needle = filter.search.to_lowercase();
    let mut visible: Vec<&Project> = projects
        .iter()
        .filter(|p| {
            (contains_ci(&p.project_name, &needle) || contains_ci(&p.project_desc, &needle))
                && filter.status.matches(&p.status)
                && filter.priority.matches(&p.priority)
        })
        .collect();

    visible.sort_by(|a, b| match filter.sort {
        ProjectSort::Name => a
            .project_name
            .to_lowercase()
            .cmp(&b.project_name.to_lowercase()),
        ProjectSort::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        ProjectSort::Progress => b.progress.cmp(&a.progress),
        ProjectSort::Priority => b.priority.cmp(&a.priority),
    });
    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_parses_all_sentinel() {
        assert_eq!("all".parse::<Choice<TaskStatus>>().unwrap(), Choice::All);
        assert_eq!(
            "blocked".parse::<Choice<TaskStatus>>().unwrap(),
            Choice::Only(TaskStatus::Blocked)
        );
        assert!("nope".parse::<Choice<Priority>>().is_err());
    }

    #[test]
    fn empty_needle_matches() {
        assert!(contains_ci("", ""));
        assert!(contains_ci("Anything", ""));
        assert!(contains_ci("Checkout FLOW", "flow"));
        assert!(!contains_ci("Checkout", "cart"));
    }

    #[test]
    fn priority_orders_low_to_high() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }
}
