//! WebSocket frame DTOs.
//!
//! Every frame is an envelope `{"event": "<name>", "data": {...}}`.

use serde::{Deserialize, Serialize};

/// Frames sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerFrame {
    JoinError(JoinErrorPayload),
    SessionCreated(SessionCreatedPayload),
    UserJoined(UserNoticePayload),
    UserReconnected(UserNoticePayload),
    Message(ChatMessagePayload),
    UserDisconnected(UserNoticePayload),
    UserLeft(UserNoticePayload),
    UserList(UserListPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreatedPayload {
    pub session_id: String,
    pub username: String,
    pub reconnected: bool,
}

/// Payload of join / reconnect / disconnect / left notices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNoticePayload {
    pub username: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessagePayload {
    pub username: String,
    pub message: String,
    /// RFC 3339, UTC, millisecond precision
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListPayload {
    pub usernames: Vec<String>,
}

/// Frames sent by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientFrame {
    Join(JoinPayload),
    Message(MessagePayload),
}

/// `data` is read leniently: a missing or non-object payload, or a field that
/// is not a string, counts as absent so the join is still answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Option<serde_json::Value>")]
pub struct JoinPayload {
    pub username: Option<String>,
    pub session_id: Option<String>,
}

impl From<Option<serde_json::Value>> for JoinPayload {
    fn from(data: Option<serde_json::Value>) -> Self {
        let text = |key: &str| {
            data.as_ref()
                .and_then(|data| data.get(key))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };
        Self {
            username: text("username"),
            session_id: text("sessionId"),
        }
    }
}

/// `message` is kept untyped so a non-string value can be told apart from a
/// malformed frame and dropped quietly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl MessagePayload {
    /// The message text, if it was sent as a JSON string.
    pub fn into_text(self) -> Option<String> {
        match self.message {
            Some(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }
}
