//! Interactive, line-driven Tasks view.
//!
//! Reads one command per line and interleaves them with fetch/submit
//! completions from background tasks, so typing never waits on the network.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::client::BoardClient;
use crate::filter::Choice;
use crate::models::{EmployeeId, Priority, TaskId, TaskStatus};
use crate::render;
use crate::view::{TasksEvent, TasksView};

pub const HELP: &str = "\
Commands:
  search [text]        filter tasks by title/description (empty clears)
  status <s|all>       filter by status: todo, in-progress, completed, blocked
  priority <p|all>     filter by priority: low, medium, high
  team                 show/hide the team panel
  find [text]          filter team members by first name
  task <id>            select/deselect a task
  emp <id>             select/deselect a team member
  rm-task <id>         remove a task from the selection
  rm-emp <id>          remove a team member from the selection
  clear                clear both selections
  submit               map the selected tasks to the selected members
  show                 redraw the board
  help                 this text
  quit                 leave the board";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Status(Choice<TaskStatus>),
    Priority(Choice<Priority>),
    TeamPanel,
    FindMember(String),
    ToggleTask(TaskId),
    ToggleEmployee(EmployeeId),
    RemoveTask(TaskId),
    RemoveEmployee(EmployeeId),
    Clear,
    Submit,
    Show,
    Help,
    Quit,
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    fn id<T: std::str::FromStr>(rest: &str, what: &str) -> Result<T, String> {
        rest.parse()
            .map_err(|_| format!("expected a numeric {} id, got '{}'", what, rest))
    }

    match word {
        "search" | "s" => Ok(Command::Search(rest.to_string())),
        "status" => rest.parse().map(Command::Status),
        "priority" => rest.parse().map(Command::Priority),
        "team" => Ok(Command::TeamPanel),
        "find" => Ok(Command::FindMember(rest.to_string())),
        "task" | "t" => id(rest, "task").map(Command::ToggleTask),
        "emp" | "e" => id(rest, "employee").map(Command::ToggleEmployee),
        "rm-task" => id(rest, "task").map(Command::RemoveTask),
        "rm-emp" => id(rest, "employee").map(Command::RemoveEmployee),
        "clear" => Ok(Command::Clear),
        "submit" => Ok(Command::Submit),
        "show" | "" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}', type `help`", other)),
    }
}

/// Run the board until `quit` or end of input. The view is unmounted on exit.
pub async fn run<R, W>(client: &BoardClient, view: &mut TasksView, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    view.spawn_fetches(client, &tx);
    let mut lines = input.lines();

    write!(out, "{}", render::render_board(view))?;
    writeln!(out, "Type `help` for commands.")?;

    loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                let failed = matches!(
                    &event,
                    TasksEvent::TasksLoaded(Err(_))
                        | TasksEvent::EmployeesLoaded(Err(_))
                        | TasksEvent::MappingFinished { result: Err(_), .. }
                );
                let was_mapping = matches!(&event, TasksEvent::MappingFinished { .. });
                view.apply(event);
                if was_mapping && !failed {
                    writeln!(out, "Mapping submitted.")?;
                } else if was_mapping {
                    writeln!(out, "Mapping failed; selection kept for retry.")?;
                }
                if failed && !view.session().authenticated {
                    writeln!(out, "Session expired; run `taskmap login`.")?;
                }
                write!(out, "{}", render::render_board(view))?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => handle(client, view, &tx, command, out)?,
                    Err(message) => writeln!(out, "{}", message)?,
                }
            }
        }
    }

    view.unmount();
    Ok(())
}

fn handle<W: Write>(
    client: &BoardClient,
    view: &mut TasksView,
    tx: &mpsc::UnboundedSender<TasksEvent>,
    command: Command,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Search(text) => view.set_search(text),
        Command::Status(status) => view.set_status_filter(status),
        Command::Priority(priority) => view.set_priority_filter(priority),
        Command::TeamPanel => {
            view.toggle_team_panel();
        }
        Command::FindMember(text) => view.set_team_search(text),
        Command::ToggleTask(id) => {
            if view.toggle_task(id).is_none() {
                writeln!(out, "No task #{} in this project.", id)?;
                return Ok(());
            }
        }
        Command::ToggleEmployee(id) => {
            if view.toggle_employee(id).is_none() {
                writeln!(out, "No team member #{}.", id)?;
                return Ok(());
            }
        }
        Command::RemoveTask(id) => {
            view.remove_task(id);
        }
        Command::RemoveEmployee(id) => {
            view.remove_employee(id);
        }
        Command::Clear => view.clear_selections(),
        Command::Submit => {
            match view.spawn_submit(client, tx) {
                Some(request) => writeln!(
                    out,
                    "Submitting {} tasks to {} members...",
                    request.task_ids.len(),
                    request.employee_ids.len()
                )?,
                None if view.is_submitting() => writeln!(out, "A submission is already running.")?,
                None => writeln!(out, "Nothing selected.")?,
            }
            return Ok(());
        }
        Command::Show => {}
        Command::Help => {
            writeln!(out, "{}", HELP)?;
            return Ok(());
        }
        Command::Quit => return Ok(()),
    }
    write!(out, "{}", render::render_board(view))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selection_commands() {
        assert_eq!(parse_command("task 4"), Ok(Command::ToggleTask(TaskId(4))));
        assert_eq!(parse_command("e 9"), Ok(Command::ToggleEmployee(EmployeeId(9))));
        assert_eq!(parse_command("rm-task 4"), Ok(Command::RemoveTask(TaskId(4))));
        assert_eq!(parse_command("rm-emp 2"), Ok(Command::RemoveEmployee(EmployeeId(2))));
        assert_eq!(parse_command("  clear "), Ok(Command::Clear));
    }

    #[test]
    fn parses_filters() {
        assert_eq!(
            parse_command("status in-progress"),
            Ok(Command::Status(Choice::Only(TaskStatus::InProgress)))
        );
        assert_eq!(parse_command("priority all"), Ok(Command::Priority(Choice::All)));
        assert_eq!(
            parse_command("search  checkout flow "),
            Ok(Command::Search("checkout flow".to_string()))
        );
        assert_eq!(parse_command("search"), Ok(Command::Search(String::new())));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("task abc").is_err());
        assert!(parse_command("status done").is_err());
        assert!(parse_command("launch").is_err());
    }

    #[test]
    fn blank_line_redraws() {
        assert_eq!(parse_command(""), Ok(Command::Show));
    }
}
