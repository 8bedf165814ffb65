//! UseCase: 猶予期間満了処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ExpireSessionUseCase::execute() メソッド
//! - 満了通知の世代番号チェックと userLeft の送信
//!
//! ### なぜこのテストが必要か
//! - 再接続に負けた古いタイマーがセッションを削除しないことを保証する
//! - セッション削除と userLeft の送信が厳密に 1 回であることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：猶予期間中のセッションの満了
//! - エッジケース：再接続済みセッションへの古い満了通知
//! - エッジケース：同じ満了通知の二重配送

use std::sync::Arc;

use crate::domain::{GraceExpired, LobbyRepository, MessagePusher, ServerEvent, Session};

use super::presence::PresenceBroadcaster;

/// 猶予期間満了のユースケース
pub struct ExpireSessionUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    presence: Arc<PresenceBroadcaster>,
}

impl ExpireSessionUseCase {
    /// 新しい ExpireSessionUseCase を作成
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        presence: Arc<PresenceBroadcaster>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            presence,
        }
    }

    /// 満了を実行
    ///
    /// # Returns
    ///
    /// * `Some(Session)` - 削除されたセッション
    /// * `None` - 再接続済み、または既に削除済み（何もしない）
    pub async fn execute(&self, expired: GraceExpired) -> Option<Session> {
        let Some(session) = self
            .repository
            .expire_session(&expired.token, expired.epoch)
            .await
        else {
            tracing::debug!(
                "Stale grace expiry ignored for session '{}' (epoch {})",
                expired.token,
                expired.epoch.value()
            );
            return None;
        };

        tracing::info!(
            "User left: {} (Session: {} expired)",
            session.username,
            session.token
        );
        let targets = self.repository.connection_ids().await;
        let event = ServerEvent::UserLeft {
            username: session.username.clone(),
        };
        if let Err(e) = self.message_pusher.broadcast(targets, &event).await {
            tracing::warn!("Failed to broadcast '{}': {}", event.name(), e);
        }
        self.presence.emit().await;

        Some(session)
    }
}
