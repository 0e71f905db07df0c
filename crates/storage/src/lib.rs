#![forbid(unsafe_code)]

mod store;

pub use store::{SqliteStore, StoreError, TodoRepository, now_rfc3339};
