//! axum handlers.

mod http;
mod websocket;

pub use http::{get_presence, health_check};
pub use websocket::websocket_handler;
