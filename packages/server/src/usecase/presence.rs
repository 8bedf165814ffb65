//! UseCase: プレゼンス通知

use std::sync::Arc;

use crate::domain::{LobbyRepository, MessagePusher, ServerEvent, Username};

/// HTTP API 向けのロビーの読み取り専用ビュー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub usernames: Vec<Username>,
    pub connections: usize,
    pub sessions: usize,
}

/// プレゼンス一覧（差分ではなくスナップショット）を全接続に送る
pub struct PresenceBroadcaster {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl PresenceBroadcaster {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 現在のプレゼンス一覧をブロードキャストして返す
    pub async fn emit(&self) -> Vec<Username> {
        let usernames = self.repository.presence().await;
        let targets = self.repository.connection_ids().await;
        let event = ServerEvent::UserList {
            usernames: usernames.clone(),
        };

        if let Err(e) = self.message_pusher.broadcast(targets, &event).await {
            tracing::warn!("Failed to broadcast presence list: {}", e);
        }
        tracing::debug!("Presence list emitted ({} online)", usernames.len());

        usernames
    }

    pub async fn snapshot(&self) -> PresenceSnapshot {
        PresenceSnapshot {
            usernames: self.repository.presence().await,
            connections: self.repository.count_connections().await,
            sessions: self.repository.count_sessions().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{JoinRequest, SessionToken},
        infrastructure::repository::InMemoryLobbyRepository,
        usecase::test_support::{Delivery, RecordingPusher, cid},
    };

    #[tokio::test]
    async fn test_emit_sends_snapshot_to_every_connection() {
        // テスト項目: プレゼンスリストは未 join の接続を含む全ての接続に送られる
        // given (前提条件):
        let repository = Arc::new(InMemoryLobbyRepository::default());
        let pusher = Arc::new(RecordingPusher::default());
        let broadcaster = PresenceBroadcaster::new(repository.clone(), pusher.clone());
        repository.register_connection(cid("c1")).await.unwrap();
        repository.register_connection(cid("c2")).await.unwrap();
        repository
            .join(
                &cid("c1"),
                JoinRequest::fresh("alice"),
                SessionToken::new("t1".to_string()).unwrap(),
            )
            .await
            .unwrap();

        // when (操作):
        let usernames = broadcaster.emit().await;

        // then (期待する結果):
        assert_eq!(usernames, vec![Username::new("alice".to_string()).unwrap()]);
        let log = pusher.take().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, Delivery::Broadcast(vec![cid("c1"), cid("c2")]));
        assert_eq!(log[0].1, ServerEvent::UserList { usernames });
    }

    #[tokio::test]
    async fn test_snapshot_counts_sessions_in_grace() {
        // テスト項目: スナップショットのセッション数には猶予期間中のものも含まれる
        // given (前提条件):
        let repository = Arc::new(InMemoryLobbyRepository::default());
        let pusher = Arc::new(RecordingPusher::default());
        let broadcaster = PresenceBroadcaster::new(repository.clone(), pusher);
        repository.register_connection(cid("c1")).await.unwrap();
        repository
            .join(
                &cid("c1"),
                JoinRequest::fresh("alice"),
                SessionToken::new("t1".to_string()).unwrap(),
            )
            .await
            .unwrap();
        repository.remove_connection(&cid("c1")).await.unwrap();

        // when (操作):
        let snapshot = broadcaster.snapshot().await;

        // then (期待する結果):
        assert!(snapshot.usernames.is_empty());
        assert_eq!(snapshot.connections, 0);
        assert_eq!(snapshot.sessions, 1);
    }
}
