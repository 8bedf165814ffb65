//! GraceScheduler 実装
//!
//! - `timer`: tokio のタイマー（単調時計）を使った実装

pub mod timer;

pub use timer::TokioGraceScheduler;
