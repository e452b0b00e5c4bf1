//! Ephemeral room-based chat server library.
//!
//! Clients create or join short-lived rooms identified by a short code,
//! exchange messages over a WebSocket connection, and see live participant /
//! typing / read-receipt updates. Rooms live only in memory and are reaped
//! after a period of inactivity.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
