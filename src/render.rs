//! Plain-text rendering for the terminal.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::filter::TaskStats;
use crate::models::{Employee, Project, Task, TaskStatus};
use crate::view::{LoadState, TasksView};

const TODO: char = '○';
const IN_PROGRESS: char = '◐';
const COMPLETED: char = '●';
const BLOCKED: char = '✗';

/// Status symbol for a task.
fn status_symbol(status: TaskStatus) -> char {
    match status {
        TaskStatus::Todo => TODO,
        TaskStatus::InProgress => IN_PROGRESS,
        TaskStatus::Completed => COMPLETED,
        TaskStatus::Blocked => BLOCKED,
    }
}

/// `Mar 5, 2024`, or `-` when there is no date.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One line per task:
///
/// ```text
/// [x] #12 ◐ Wire checkout  (High, Anna, due Mar 5, 2024)
/// ```
pub fn render_task_line(task: &Task, selected: bool) -> String {
    format!(
        "[{}] #{} {} {}  ({}, {}, due {})",
        if selected { 'x' } else { ' ' },
        task.task_id,
        status_symbol(task.status),
        task.title,
        task.priority.label(),
        task.assignee(),
        format_date(task.due_date),
    )
}

pub fn render_task_detail(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", task.task_id, task.title);
    let _ = writeln!(
        out,
        "{} {}  |  Priority: {}",
        status_symbol(task.status),
        task.status.label(),
        task.priority.label()
    );
    let _ = writeln!(out, "Assignee: {}", task.assignee());
    let _ = writeln!(out, "Due: {}", format_date(task.due_date));
    let _ = writeln!(out, "Created: {}", format_date(task.created_date));
    if !task.description.is_empty() {
        let _ = writeln!(out, "\n{}", task.description);
    }
    out
}

pub fn render_stats(stats: &TaskStats) -> String {
    format!(
        "Total: {}  To Do: {}  In Progress: {}  Completed: {}",
        stats.total, stats.todo, stats.in_progress, stats.completed
    )
}

pub fn render_employee_line(employee: &Employee, selected: bool) -> String {
    format!(
        "({}) #{} {} [{}] {}",
        if selected { '*' } else { ' ' },
        employee.employee_id,
        employee.first_name,
        employee.initials(),
        employee.email,
    )
}

pub fn render_project_line(project: &Project) -> String {
    format!(
        "#{} {}  [{} | {}] {}% ({}/{} tasks), due {}",
        project.id,
        project.project_name,
        project.status.label(),
        project.priority.label(),
        project.progress,
        project.completed_tasks,
        project.total_tasks,
        format_date(project.due_date),
    )
}

pub fn render_project_detail(project: &Project) -> String {
    let mut out = render_project_line(project);
    out.push('\n');
    if !project.project_desc.is_empty() {
        let _ = writeln!(out, "\n{}", project.project_desc);
    }
    if !project.team_members.is_empty() {
        let _ = writeln!(out, "\nTeam: {}", project.team_members.join(", "));
    }
    out
}

/// The "Selected Items for Mapping" summary. Empty when nothing is selected.
pub fn render_selection_summary(view: &TasksView) -> String {
    let tasks = view.selected_tasks();
    let employees = view.selected_employees();
    if tasks.is_empty() && employees.is_empty() {
        return String::new();
    }

    let mut out = String::from("Selected Items for Mapping\n");
    if !employees.is_empty() {
        let names: Vec<_> = employees.iter().map(|e| e.first_name.as_str()).collect();
        let _ = writeln!(
            out,
            "  Team Members ({}): {}",
            employees.len(),
            names.join(", ")
        );
    }
    if !tasks.is_empty() {
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        let _ = writeln!(out, "  Tasks ({}): {}", tasks.len(), titles.join(", "));
    }
    if view.can_submit() {
        let _ = writeln!(
            out,
            "  Auto Map ({} tasks, {} members) available: type `submit`",
            tasks.len(),
            employees.len()
        );
    }
    out
}

/// Full board: stats, selection summary, filtered tasks and the team panel.
pub fn render_board(view: &TasksView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Project Tasks - Project #{}", view.project_id());
    let _ = writeln!(out, "{}", render_stats(&view.stats()));

    let summary = render_selection_summary(view);
    if !summary.is_empty() {
        let _ = write!(out, "\n{}", summary);
    }

    let _ = writeln!(out);
    match view.tasks_state() {
        LoadState::Pending => {
            let _ = writeln!(out, "Loading tasks...");
        }
        LoadState::Failed if view.tasks().is_empty() => {
            let _ = writeln!(out, "Tasks could not be loaded.");
        }
        _ => {
            for task in view.visible_tasks() {
                let selected = view.selected_tasks().contains(task.task_id);
                let _ = writeln!(out, "{}", render_task_line(task, selected));
            }
        }
    }

    if view.show_team() {
        let _ = writeln!(out, "\nTeam Members");
        let visible = view.visible_employees();
        for employee in &visible {
            let selected = view.selected_employees().contains(employee.employee_id);
            let _ = writeln!(out, "{}", render_employee_line(employee, selected));
        }
        if visible.is_empty() && !view.team_search().is_empty() {
            let _ = writeln!(
                out,
                "No team members found matching \"{}\"",
                view.team_search()
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskId};

    fn task() -> Task {
        Task {
            task_id: TaskId(12),
            title: "Wire checkout".into(),
            description: String::new(),
            status: TaskStatus::InProgress,
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            created_date: None,
            employee: None,
        }
    }

    #[test]
    fn formats_dates_like_the_board() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 3, 5)), "Mar 5, 2024");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn renders_task_line_with_selection_marker() {
        assert_eq!(
            render_task_line(&task(), true),
            "[x] #12 ◐ Wire checkout  (High, Unassigned, due Mar 5, 2024)"
        );
        assert!(render_task_line(&task(), false).starts_with("[ ] #12"));
    }

    #[test]
    fn renders_stats() {
        let stats = TaskStats {
            total: 4,
            todo: 1,
            in_progress: 2,
            completed: 1,
        };
        assert_eq!(
            render_stats(&stats),
            "Total: 4  To Do: 1  In Progress: 2  Completed: 1"
        );
    }
}
