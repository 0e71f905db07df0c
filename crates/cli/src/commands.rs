#![forbid(unsafe_code)]

use anyhow::{Context, anyhow};
use clap::Subcommand;
use std::io::Write;
use todo_core::ids::Position;
use todo_core::model::{NewTodo, TodoPatch};
use todo_storage::{StoreError, TodoRepository, now_rfc3339};

use crate::render::{self, Style};

#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Command {
    /// Add a todo at the end of the list
    Add {
        #[arg(value_parser = non_blank)]
        task: String,
        #[arg(value_parser = non_blank)]
        category: String,
    },
    /// Delete a todo by its number
    Delete {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        number: u32,
    },
    /// Change the task and/or category of a todo
    Update {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        number: u32,
        #[arg(long, value_parser = non_blank)]
        task: Option<String>,
        #[arg(long, value_parser = non_blank)]
        category: Option<String>,
    },
    /// Mark a todo as done
    Complete {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        number: u32,
    },
    /// Show all todos
    Show {
        /// Print the list as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn non_blank(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err("must not be blank".to_string());
    }
    Ok(value.to_string())
}

/// Runs one command against the repository, then prints the list.
pub(crate) fn dispatch(
    repo: &mut TodoRepository<'_>,
    command: Command,
    out: &mut impl Write,
    style: Style,
) -> anyhow::Result<()> {
    match command {
        Command::Add { task, category } => {
            writeln!(out, "adding {task}, {category}")?;
            repo.create(NewTodo::pending(task, category, now_rfc3339()))?;
        }
        Command::Delete { number } => {
            writeln!(out, "deleting {number}")?;
            repo.delete(position(number)?)
                .map_err(|err| missing_todo(err, number))?;
        }
        Command::Update {
            number,
            task,
            category,
        } => {
            writeln!(out, "updating {number}")?;
            repo.update(position(number)?, TodoPatch { task, category })
                .map_err(|err| missing_todo(err, number))?;
        }
        Command::Complete { number } => {
            writeln!(out, "complete {number}")?;
            repo.complete(position(number)?)
                .map_err(|err| missing_todo(err, number))?;
        }
        Command::Show { json: true } => {
            let todos = repo.get_all()?;
            return render::write_json(out, &todos).context("failed to write JSON");
        }
        Command::Show { json: false } => {}
    }

    let todos = repo.get_all()?;
    render::write_table(out, &todos, style)?;
    Ok(())
}

fn position(number: u32) -> anyhow::Result<Position> {
    Position::from_display(number).map_err(|err| anyhow!("invalid todo number {number}: {err}"))
}

fn missing_todo(err: StoreError, number: u32) -> anyhow::Error {
    match err {
        StoreError::RecordNotFound { .. } => anyhow!("no todo #{number}"),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::model::TodoStatus;
    use todo_storage::SqliteStore;

    fn run(repo: &mut TodoRepository<'_>, command: Command) -> anyhow::Result<String> {
        let mut out = Vec::new();
        dispatch(repo, command, &mut out, Style::plain())?;
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }

    fn add(task: &str, category: &str) -> Command {
        Command::Add {
            task: task.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn numbers_are_translated_to_zero_based_positions() {
        let mut store = SqliteStore::open_in_memory().expect("open store");
        let mut repo = TodoRepository::new(&mut store).expect("repository");
        run(&mut repo, add("first", "Learn")).expect("add first");
        run(&mut repo, add("second", "Study")).expect("add second");

        let output = run(&mut repo, Command::Complete { number: 2 }).expect("complete 2");
        assert!(output.starts_with("complete 2\n"));

        let todos = repo.get_all().expect("get all");
        assert_eq!(todos[0].status, TodoStatus::Pending);
        assert_eq!(todos[1].status, TodoStatus::Completed);
    }

    #[test]
    fn missing_numbers_report_the_user_facing_number() {
        let mut store = SqliteStore::open_in_memory().expect("open store");
        let mut repo = TodoRepository::new(&mut store).expect("repository");

        let err = run(&mut repo, Command::Delete { number: 3 }).expect_err("empty list");
        assert_eq!(err.to_string(), "no todo #3");
    }

    #[test]
    fn update_passes_only_given_fields() {
        let mut store = SqliteStore::open_in_memory().expect("open store");
        let mut repo = TodoRepository::new(&mut store).expect("repository");
        run(&mut repo, add("Jog", "Sports")).expect("add");

        run(
            &mut repo,
            Command::Update {
                number: 1,
                task: None,
                category: Some("Health".to_string()),
            },
        )
        .expect("update");

        let todos = repo.get_all().expect("get all");
        assert_eq!(todos[0].task, "Jog");
        assert_eq!(todos[0].category, "Health");
    }

    #[test]
    fn update_without_fields_still_shows_the_list() {
        let mut store = SqliteStore::open_in_memory().expect("open store");
        let mut repo = TodoRepository::new(&mut store).expect("repository");
        run(&mut repo, add("Jog", "Sports")).expect("add");

        let output = run(
            &mut repo,
            Command::Update {
                number: 1,
                task: None,
                category: None,
            },
        )
        .expect("empty update");
        assert!(output.starts_with("updating 1\n"));
        assert!(output.contains("Jog"));

        let err = run(
            &mut repo,
            Command::Update {
                number: 2,
                task: None,
                category: None,
            },
        )
        .expect_err("no second todo");
        assert_eq!(err.to_string(), "no todo #2");
    }

    #[test]
    fn blank_values_are_rejected() {
        assert!(non_blank("   ").is_err());
        assert_eq!(non_blank("Read").as_deref(), Ok("Read"));
    }
}
