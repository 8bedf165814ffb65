//! Chat lobby server: reconnectable sessions, grace-period departures and
//! presence broadcast over WebSocket.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
