//! Shared utilities for the lobby workspace.
//!
//! Nothing in here knows about chat sessions; it only carries the
//! cross-cutting pieces (logging setup, wall-clock time) used by the server.

pub mod logger;
pub mod time;
