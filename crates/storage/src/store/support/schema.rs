#![forbid(unsafe_code)]

use super::super::StoreError;
use rusqlite::Connection;

// Must stay readable by files written by earlier versions of the tool: same
// columns and affinities, no key, no index.
const TODOS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
  task TEXT,
  category TEXT,
  date_added TEXT,
  date_completed TEXT,
  status INTEGER,
  position INTEGER
);
"#;

pub(in crate::store) fn ensure_todos_table(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(TODOS_TABLE_SQL)?;
    Ok(())
}
