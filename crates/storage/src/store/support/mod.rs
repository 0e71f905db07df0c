#![forbid(unsafe_code)]

pub(super) mod schema;
pub(super) mod time;
