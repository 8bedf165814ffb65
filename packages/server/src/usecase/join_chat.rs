//! UseCase: join / 再接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinChatUseCase::execute() メソッド
//! - 新規 join と、セッショントークンによる再接続の通知内容と順序
//!
//! ### なぜこのテストが必要か
//! - 再接続ではセッションに保存されたユーザー名が正であることを保証する
//! - 再接続時に猶予期間タイマーが確実にキャンセルされることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規 join、猶予期間中の再接続
//! - 異常系：ユーザー名なしの新規 join（joinError のみ送信）
//! - エッジケース：期限切れトークンでの join（新規 join にフォールバック）

use std::sync::Arc;

use crate::domain::{
    ConnectionId, GraceScheduler, JoinOutcome, JoinRequest, LobbyError, LobbyRepository,
    MessagePusher, ServerEvent, SessionTokenFactory,
};

use super::{error::JoinError, presence::PresenceBroadcaster};

/// join / 再接続のユースケース
pub struct JoinChatUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    scheduler: Arc<dyn GraceScheduler>,
    presence: Arc<PresenceBroadcaster>,
}

impl JoinChatUseCase {
    /// 新しい JoinChatUseCase を作成
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        scheduler: Arc<dyn GraceScheduler>,
        presence: Arc<PresenceBroadcaster>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            scheduler,
            presence,
        }
    }

    /// join を実行
    ///
    /// 通知の順序:
    /// 1. `userJoined`（全員）または `userReconnected`（本人以外）
    /// 2. `sessionCreated`（本人のみ）
    /// 3. `userList`（全員）
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 解決されたユーザー名とトークン
    /// * `Err(JoinError::UsernameRequired)` - 本人に `joinError` を送信済み、状態は変化なし
    pub async fn execute(
        &self,
        id: &ConnectionId,
        request: JoinRequest,
    ) -> Result<JoinOutcome, JoinError> {
        let fresh_token = SessionTokenFactory::generate();

        let outcome = match self.repository.join(id, request, fresh_token).await {
            Ok(outcome) => outcome,
            Err(LobbyError::UsernameRequired) => {
                tracing::warn!("Join attempt failed: username not provided by '{}'", id);
                self.push(id, &ServerEvent::username_required()).await;
                return Err(JoinError::UsernameRequired);
            }
            Err(e) => return Err(e.into()),
        };

        // 1. タイマーの整理
        if outcome.cancelled_grace.is_some() {
            self.scheduler.cancel(&outcome.token).await;
            tracing::info!(
                "Grace period cancelled for session '{}' ({})",
                outcome.token,
                outcome.username
            );
        }
        if let Some(orphaned) = &outcome.orphaned {
            tracing::info!(
                "Connection '{}' re-joined; session '{}' ({}) enters grace period",
                id,
                orphaned.token,
                orphaned.username
            );
            self.scheduler
                .schedule(orphaned.token.clone(), orphaned.epoch)
                .await;
        }
        for displaced in &outcome.displaced {
            tracing::warn!(
                "Connection '{}' displaced from session '{}' by '{}'",
                displaced,
                outcome.token,
                id
            );
        }

        // 2. 入室 / 再接続の通知
        let all = self.repository.connection_ids().await;
        if outcome.reconnected {
            tracing::info!(
                "User reconnected: {} (Connection: {}, Session: {})",
                outcome.username,
                id,
                outcome.token
            );
            let others: Vec<ConnectionId> = all.into_iter().filter(|target| target != id).collect();
            let event = ServerEvent::UserReconnected {
                username: outcome.username.clone(),
            };
            self.broadcast(others, &event).await;
        } else {
            tracing::info!(
                "User joined: {} (Connection: {}, Session: {})",
                outcome.username,
                id,
                outcome.token
            );
            let event = ServerEvent::UserJoined {
                username: outcome.username.clone(),
            };
            self.broadcast(all, &event).await;
        }

        // 3. セッション情報を本人に返す
        let created = ServerEvent::SessionCreated {
            token: outcome.token.clone(),
            username: outcome.username.clone(),
            reconnected: outcome.reconnected,
        };
        self.push(id, &created).await;

        // 4. プレゼンス
        self.presence.emit().await;

        Ok(outcome)
    }

    async fn push(&self, id: &ConnectionId, event: &ServerEvent) {
        if let Err(e) = self.message_pusher.push_to(id, event).await {
            tracing::warn!("Failed to push '{}' to '{}': {}", event.name(), id, e);
        }
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, event: &ServerEvent) {
        if let Err(e) = self.message_pusher.broadcast(targets, event).await {
            tracing::warn!("Failed to broadcast '{}': {}", event.name(), e);
        }
    }
}
