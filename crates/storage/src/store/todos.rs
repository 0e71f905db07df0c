#![forbid(unsafe_code)]

use super::support::schema::ensure_todos_table;
use super::support::time::now_rfc3339;
use super::{SqliteStore, StoreError};
use rusqlite::{Connection, OptionalExtension, Row, params};
use todo_core::ids::Position;
use todo_core::model::{NewTodo, Todo, TodoPatch, TodoStatus};

const SELECT_COLUMNS: &str =
    "SELECT task, category, date_added, date_completed, status, position FROM todos";

/// Todos over a borrowed [`SqliteStore`]; positions stay exactly `0..N`.
#[derive(Debug)]
pub struct TodoRepository<'s> {
    conn: &'s mut Connection,
}

impl<'s> TodoRepository<'s> {
    pub fn new(store: &'s mut SqliteStore) -> Result<Self, StoreError> {
        let conn = store.connection_mut()?;
        ensure_todos_table(conn)?;
        restore_density(conn)?;
        Ok(Self { conn })
    }

    pub fn create(&mut self, todo: NewTodo) -> Result<Todo, StoreError> {
        let NewTodo {
            task,
            category,
            date_added,
            status,
        } = todo;

        let tx = self.conn.transaction()?;
        // MAX + 1 equals the row count while positions are dense and cannot
        // collide with an existing row when they are not.
        let next = tx.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM todos",
            [],
            |row| row.get::<_, i64>(0),
        )?;
        let position = Position::try_from_i64(next)
            .map_err(|_| StoreError::InvalidInput("todo position overflow"))?;

        tx.execute(
            r#"
            INSERT INTO todos (task, category, date_added, date_completed, status, position)
            VALUES (?1, ?2, ?3, NULL, ?4, ?5)
            "#,
            params![
                task,
                category,
                date_added,
                status.as_i64(),
                position.as_i64()
            ],
        )?;
        tx.commit()?;

        tracing::debug!(%position, "created todo");
        Ok(Todo {
            task,
            category,
            date_added,
            date_completed: None,
            status,
            position,
        })
    }

    pub fn get_all(&self) -> Result<Vec<Todo>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY position ASC"))?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(todo_from_row(row)?);
        }
        Ok(out)
    }

    pub fn get(&self, position: Position) -> Result<Option<Todo>, StoreError> {
        select_at(&*self.conn, position)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM todos", [], |row| row.get::<_, i64>(0))?;
        usize::try_from(count).map_err(|_| StoreError::InvalidInput("negative row count"))
    }

    pub fn delete(&mut self, position: Position) -> Result<Todo, StoreError> {
        let tx = self.conn.transaction()?;

        // The shift range comes from the count before the delete.
        let count = tx.query_row("SELECT COUNT(*) FROM todos", [], |row| {
            row.get::<_, i64>(0)
        })?;
        let Some(removed) = select_at(&tx, position)? else {
            return Err(not_found(position));
        };

        tx.execute(
            "DELETE FROM todos WHERE position = ?1",
            params![position.as_i64()],
        )?;

        let mut shifted = 0usize;
        for old in position.as_i64() + 1..count {
            shifted += tx.execute(
                "UPDATE todos SET position = ?1 WHERE position = ?2",
                params![old - 1, old],
            )?;
        }

        tx.commit()?;
        tracing::debug!(%position, shifted, "deleted todo");
        Ok(removed)
    }

    pub fn update(&mut self, position: Position, patch: TodoPatch) -> Result<Todo, StoreError> {
        let tx = self.conn.transaction()?;
        let Some(current) = select_at(&tx, position)? else {
            return Err(not_found(position));
        };

        if patch.is_empty() {
            tx.commit()?;
            return Ok(current);
        }

        tx.execute(
            r#"
            UPDATE todos
            SET task = COALESCE(?1, task), category = COALESCE(?2, category)
            WHERE position = ?3
            "#,
            params![patch.task, patch.category, position.as_i64()],
        )?;
        tx.commit()?;

        tracing::debug!(
            %position,
            task = patch.task.is_some(),
            category = patch.category.is_some(),
            "updated todo"
        );
        Ok(Todo {
            task: patch.task.unwrap_or(current.task),
            category: patch.category.unwrap_or(current.category),
            ..current
        })
    }

    pub fn complete(&mut self, position: Position) -> Result<Todo, StoreError> {
        let date_completed = now_rfc3339();

        let tx = self.conn.transaction()?;
        let Some(current) = select_at(&tx, position)? else {
            return Err(not_found(position));
        };

        tx.execute(
            "UPDATE todos SET status = ?1, date_completed = ?2 WHERE position = ?3",
            params![
                TodoStatus::Completed.as_i64(),
                date_completed,
                position.as_i64()
            ],
        )?;
        tx.commit()?;

        tracing::debug!(%position, "completed todo");
        Ok(Todo {
            status: TodoStatus::Completed,
            date_completed: Some(date_completed),
            ..current
        })
    }
}

// Older files can hold negative, duplicate, missing or gapped positions (for
// example after `delete 0` shifted every row down without removing one).
// Those rows are renumbered in their current order; dense files are untouched.
fn restore_density(conn: &mut Connection) -> Result<(), StoreError> {
    let (count, dense) = conn.query_row(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) = 0 OR (
                SUM(typeof(position) != 'integer') = 0
                AND COUNT(DISTINCT position) = COUNT(*)
                AND MIN(position) = 0
                AND MAX(position) = COUNT(*) - 1
            )
        FROM todos
        "#,
        [],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, bool>(1)?)),
    )?;
    if dense {
        return Ok(());
    }

    let tx = conn.transaction()?;
    let rowids = {
        let mut stmt = tx.prepare(
            "SELECT rowid FROM todos ORDER BY typeof(position) != 'integer', position, rowid",
        )?;
        let mut rows = stmt.query([])?;
        let mut rowids = Vec::new();
        while let Some(row) = rows.next()? {
            rowids.push(row.get::<_, i64>(0)?);
        }
        rowids
    };
    for (index, rowid) in rowids.iter().enumerate() {
        let position = i64::try_from(index)
            .map_err(|_| StoreError::InvalidInput("todo position overflow"))?;
        tx.execute(
            "UPDATE todos SET position = ?1 WHERE rowid = ?2",
            params![position, rowid],
        )?;
    }
    tx.commit()?;

    tracing::warn!(count, "renumbered todo positions");
    Ok(())
}

fn select_at(conn: &Connection, position: Position) -> Result<Option<Todo>, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE position = ?1 LIMIT 1"))?;
    stmt.query_row(params![position.as_i64()], RawTodo::read)
        .optional()?
        .map(RawTodo::into_todo)
        .transpose()
}

fn todo_from_row(row: &Row<'_>) -> Result<Todo, StoreError> {
    RawTodo::read(row)?.into_todo()
}

fn not_found(position: Position) -> StoreError {
    StoreError::RecordNotFound {
        position: position.as_i64(),
    }
}

// Columns are untyped and nullable on disk; rows are validated on the way out.
struct RawTodo {
    task: Option<String>,
    category: Option<String>,
    date_added: Option<String>,
    date_completed: Option<String>,
    status: Option<i64>,
    position: Option<i64>,
}

impl RawTodo {
    fn read(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            task: row.get(0)?,
            category: row.get(1)?,
            date_added: row.get(2)?,
            date_completed: row.get(3)?,
            status: row.get(4)?,
            position: row.get(5)?,
        })
    }

    fn into_todo(self) -> Result<Todo, StoreError> {
        let position = self
            .position
            .ok_or(StoreError::InvalidInput("todo row has no position"))?;
        let position = Position::try_from_i64(position)
            .map_err(|_| StoreError::InvalidInput("todo row has an invalid position"))?;
        let status = match self.status {
            None => TodoStatus::Pending,
            Some(value) => TodoStatus::from_i64(value)
                .map_err(|_| StoreError::InvalidInput("todo row has an unknown status"))?,
        };

        Ok(Todo {
            task: self.task.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            date_added: self.date_added.unwrap_or_default(),
            date_completed: self.date_completed.filter(|value| !value.is_empty()),
            status,
            position,
        })
    }
}
