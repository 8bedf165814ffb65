//! WebSocket / HTTP transport of the lobby.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, router};
