//! Domain model structs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row. Inbound payloads are validated in `todo_core` before
//! they reach this crate.

pub mod todo;
