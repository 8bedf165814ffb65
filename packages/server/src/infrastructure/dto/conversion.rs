//! Conversion logic between DTOs and domain types.

use lobby_shared::time::timestamp_to_rfc3339;

use crate::domain::{JoinRequest, ServerEvent, SessionToken, Username};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain
// ========================================

impl From<dto::JoinPayload> for JoinRequest {
    fn from(payload: dto::JoinPayload) -> Self {
        Self {
            username: payload.username,
            // 空のトークンは未指定と同じ扱い
            token: payload
                .session_id
                .and_then(|id| SessionToken::new(id).ok()),
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

fn notice(username: &Username, action: &str) -> dto::UserNoticePayload {
    dto::UserNoticePayload {
        username: username.as_str().to_string(),
        message: format!("{} {} the chat", username, action),
    }
}

impl From<&ServerEvent> for dto::ServerFrame {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::JoinError { message } => Self::JoinError(dto::JoinErrorPayload {
                message: message.clone(),
            }),
            ServerEvent::SessionCreated {
                token,
                username,
                reconnected,
            } => Self::SessionCreated(dto::SessionCreatedPayload {
                session_id: token.as_str().to_string(),
                username: username.as_str().to_string(),
                reconnected: *reconnected,
            }),
            ServerEvent::UserJoined { username } => Self::UserJoined(notice(username, "joined")),
            ServerEvent::UserReconnected { username } => {
                Self::UserReconnected(notice(username, "reconnected to"))
            }
            ServerEvent::Message {
                username,
                content,
                timestamp,
            } => Self::Message(dto::ChatMessagePayload {
                username: username.as_str().to_string(),
                message: content.as_str().to_string(),
                timestamp: timestamp_to_rfc3339(timestamp.value()),
            }),
            ServerEvent::UserDisconnected { username } => {
                Self::UserDisconnected(notice(username, "disconnected from"))
            }
            ServerEvent::UserLeft { username } => Self::UserLeft(notice(username, "left")),
            ServerEvent::UserList { usernames } => Self::UserList(dto::UserListPayload {
                usernames: usernames
                    .iter()
                    .map(|name| name.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageContent, Timestamp};

    fn name(value: &str) -> Username {
        Username::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_join_payload_to_request() {
        // テスト項目: join ペイロードがドメインの JoinRequest に変換される
        // given (前提条件):
        let payload = dto::JoinPayload {
            username: Some("alice".to_string()),
            session_id: Some("t1".to_string()),
        };

        // when (操作):
        let request: JoinRequest = payload.into();

        // then (期待する結果):
        assert_eq!(request.username.as_deref(), Some("alice"));
        assert_eq!(
            request.token,
            Some(SessionToken::new("t1".to_string()).unwrap())
        );
    }

    #[test]
    fn test_join_payload_with_empty_session_id_has_no_token() {
        // テスト項目: 空の sessionId はトークンなしとして扱われる
        // given (前提条件):
        let payload = dto::JoinPayload {
            username: Some("alice".to_string()),
            session_id: Some(String::new()),
        };

        // when (操作):
        let request: JoinRequest = payload.into();

        // then (期待する結果):
        assert_eq!(request.token, None);
    }

    #[test]
    fn test_notice_events_carry_human_readable_message() {
        // テスト項目: 入退室系イベントに表示用メッセージが付与される
        // given (前提条件):
        let alice = name("alice");
        let cases = vec![
            (
                ServerEvent::UserJoined {
                    username: alice.clone(),
                },
                "alice joined the chat",
            ),
            (
                ServerEvent::UserReconnected {
                    username: alice.clone(),
                },
                "alice reconnected to the chat",
            ),
            (
                ServerEvent::UserDisconnected {
                    username: alice.clone(),
                },
                "alice disconnected from the chat",
            ),
            (
                ServerEvent::UserLeft {
                    username: alice.clone(),
                },
                "alice left the chat",
            ),
        ];

        for (event, expected) in cases {
            // when (操作):
            let frame = dto::ServerFrame::from(&event);

            // then (期待する結果):
            let payload = match frame {
                dto::ServerFrame::UserJoined(p)
                | dto::ServerFrame::UserReconnected(p)
                | dto::ServerFrame::UserDisconnected(p)
                | dto::ServerFrame::UserLeft(p) => p,
                other => panic!("unexpected frame: {:?}", other),
            };
            assert_eq!(payload.username, "alice");
            assert_eq!(payload.message, expected);
        }
    }

    #[test]
    fn test_message_event_to_frame() {
        // テスト項目: メッセージイベントのタイムスタンプが RFC 3339 に変換される
        // given (前提条件):
        let event = ServerEvent::Message {
            username: name("bob"),
            content: MessageContent::new("hi".to_string()).unwrap(),
            timestamp: Timestamp::new(1672531200123),
        };

        // when (操作):
        let frame = dto::ServerFrame::from(&event);

        // then (期待する結果):
        assert_eq!(
            frame,
            dto::ServerFrame::Message(dto::ChatMessagePayload {
                username: "bob".to_string(),
                message: "hi".to_string(),
                timestamp: "2023-01-01T00:00:00.123Z".to_string(),
            })
        );
    }

    #[test]
    fn test_user_list_event_to_frame() {
        // テスト項目: プレゼンスイベントがユーザー名の配列に変換される
        // given (前提条件):
        let event = ServerEvent::UserList {
            usernames: vec![name("alice"), name("bob")],
        };

        // when (操作):
        let json = serde_json::to_value(dto::ServerFrame::from(&event)).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({"event": "userList", "data": {"usernames": ["alice", "bob"]}})
        );
    }
}
