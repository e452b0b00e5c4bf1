//! Shared utilities for the Utakata chat service.
//!
//! Cross-cutting concerns used by the server crate: logging setup and
//! time/clock helpers.

pub mod logger;
pub mod time;
