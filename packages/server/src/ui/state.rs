//! Shared application state.

use std::sync::Arc;

use crate::usecase::ChatService;

/// State handed to every axum handler
pub struct AppState {
    /// ロビーの入口（全イベントはここを通る）
    pub chat_service: Arc<ChatService>,
}
