//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{infrastructure::dto::http::PresenceDto, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current presence list and lobby counters
pub async fn get_presence(State(state): State<Arc<AppState>>) -> Json<PresenceDto> {
    let snapshot = state.chat_service.presence_snapshot().await;

    // Domain Model から DTO への変換
    Json(PresenceDto {
        usernames: snapshot
            .usernames
            .into_iter()
            .map(|name| name.into_string())
            .collect(),
        connections: snapshot.connections,
        sessions: snapshot.sessions,
    })
}
