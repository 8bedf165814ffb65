//! Repository 実装
//!
//! - `inmemory`: プロセス内メモリを使った実装（再起動でセッションは失われる）

pub mod inmemory;

pub use inmemory::InMemoryLobbyRepository;
