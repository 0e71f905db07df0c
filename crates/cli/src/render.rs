#![forbid(unsafe_code)]

use serde::Serialize;
use std::io::{IsTerminal, Write};
use todo_core::model::Todo;

const BOLD_MAGENTA: &str = "1;35";
const BOLD_BLUE: &str = "1;34";
const DIM: &str = "2";

const TITLE_ICON: &str = "🖥️";
const DONE_MARK: &str = "✅";
const OPEN_MARK: &str = "❌";
// Both marks render two columns wide in a terminal.
const MARK_WIDTH: usize = 2;

const NUMBER_MIN_WIDTH: usize = 6;
const TODO_MIN_WIDTH: usize = 20;
const CATEGORY_MIN_WIDTH: usize = 12;
const DONE_MIN_WIDTH: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Style {
    color: bool,
}

impl Style {
    pub(crate) fn detect(no_color_flag: bool) -> Self {
        let color = !no_color_flag
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal();
        Self { color }
    }

    #[cfg(test)]
    pub(crate) const fn plain() -> Self {
        Self { color: false }
    }

    #[cfg(test)]
    const fn colored() -> Self {
        Self { color: true }
    }

    fn paint(self, text: &str, sgr: &str) -> String {
        if self.color {
            format!("\x1b[{sgr}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Cyan,
    Red,
    Green,
    White,
}

impl Color {
    const fn sgr(self) -> &'static str {
        match self {
            Self::Cyan => "36",
            Self::Red => "31",
            Self::Green => "32",
            Self::White => "37",
        }
    }
}

fn category_color(category: &str) -> Color {
    match category {
        "Learn" | "Sports" => Color::Cyan,
        "Youtube" => Color::Red,
        "Study" => Color::Green,
        _ => Color::White,
    }
}

enum Align {
    Left,
    Right,
}

// Pads by visible width so escape codes never shift the columns.
fn pad(cell: &str, visible: usize, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(visible));
    match align {
        Align::Left => format!("{cell}{fill}"),
        Align::Right => format!("{fill}{cell}"),
    }
}

fn width_of(text: &str) -> usize {
    text.chars().count()
}

pub(crate) fn write_table(out: &mut impl Write, todos: &[Todo], style: Style) -> std::io::Result<()> {
    let numbers = (1..=todos.len()).map(|n| n.to_string()).collect::<Vec<_>>();

    let number_width = numbers
        .iter()
        .map(|n| width_of(n))
        .chain([width_of("#"), NUMBER_MIN_WIDTH])
        .max()
        .unwrap_or(NUMBER_MIN_WIDTH);
    let todo_width = todos
        .iter()
        .map(|todo| width_of(&todo.task))
        .chain([TODO_MIN_WIDTH])
        .max()
        .unwrap_or(TODO_MIN_WIDTH);
    let category_width = todos
        .iter()
        .map(|todo| width_of(&todo.category))
        .chain([CATEGORY_MIN_WIDTH])
        .max()
        .unwrap_or(CATEGORY_MIN_WIDTH);
    let done_width = DONE_MIN_WIDTH;

    writeln!(out, "{} {TITLE_ICON}", style.paint("Todos!", BOLD_MAGENTA))?;

    let header = [
        pad(&style.paint("#", BOLD_BLUE), 1, number_width, Align::Left),
        pad(&style.paint("Todo", BOLD_BLUE), 4, todo_width, Align::Left),
        pad(&style.paint("Category", BOLD_BLUE), 8, category_width, Align::Right),
        pad(&style.paint("Done", BOLD_BLUE), 4, done_width, Align::Right),
    ];
    writeln!(out, "{}", header.join("  "))?;

    let rule = [number_width, todo_width, category_width, done_width]
        .iter()
        .map(|width| "─".repeat(*width))
        .collect::<Vec<_>>();
    writeln!(out, "{}", rule.join("  "))?;

    for (number, todo) in numbers.iter().zip(todos) {
        let mark = if todo.is_completed() { DONE_MARK } else { OPEN_MARK };
        let color = category_color(&todo.category);
        let row = [
            pad(&style.paint(number, DIM), width_of(number), number_width, Align::Left),
            pad(&todo.task, width_of(&todo.task), todo_width, Align::Left),
            pad(
                &style.paint(&todo.category, color.sgr()),
                width_of(&todo.category),
                category_width,
                Align::Right,
            ),
            pad(mark, MARK_WIDTH, done_width, Align::Right),
        ];
        writeln!(out, "{}", row.join("  ").trim_end())?;
    }

    Ok(())
}

#[derive(Serialize)]
struct NumberedTodo<'a> {
    number: usize,
    #[serde(flatten)]
    todo: &'a Todo,
}

pub(crate) fn write_json(out: &mut impl Write, todos: &[Todo]) -> anyhow::Result<()> {
    let numbered = todos
        .iter()
        .enumerate()
        .map(|(index, todo)| NumberedTodo {
            number: index + 1,
            todo,
        })
        .collect::<Vec<_>>();
    serde_json::to_writer_pretty(&mut *out, &numbered)?;
    writeln!(out)?;
    Ok(())
}
