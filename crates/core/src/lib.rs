//! Domain logic for the todo service.
//!
//! Everything here is pure: payload validation, partial-update
//! reconciliation and the shared error type. No database or HTTP types.

pub mod error;
pub mod todo;
pub mod types;
