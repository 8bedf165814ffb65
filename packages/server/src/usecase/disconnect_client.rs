//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - 切断時の通知と、猶予期間タイマーの起動条件
//!
//! ### なぜこのテストが必要か
//! - 切断してもセッションは即座に削除されず、猶予期間に入ることを保証する
//! - 紐付けを失った接続の切断がセッションに影響しないことを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：join 済み接続の切断（userDisconnected + userList + タイマー起動）
//! - エッジケース：未 join 接続の切断（通知なし）
//! - エッジケース：再接続で紐付けを奪われた古い接続の切断（通知なし）

use std::sync::Arc;

use crate::domain::{
    ConnectionId, DisconnectOutcome, GraceScheduler, LobbyError, LobbyRepository, MessagePusher,
    ServerEvent,
};

use super::presence::PresenceBroadcaster;

/// 切断のユースケース
pub struct DisconnectClientUseCase {
    repository: Arc<dyn LobbyRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    scheduler: Arc<dyn GraceScheduler>,
    presence: Arc<PresenceBroadcaster>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
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

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Some(DisconnectOutcome))` - join 済み接続の切断
    /// * `Ok(None)` - 未 join 接続の切断（通知なし）
    /// * `Err(LobbyError::ConnectionNotFound)` - 登録されていない接続
    pub async fn execute(
        &self,
        id: &ConnectionId,
    ) -> Result<Option<DisconnectOutcome>, LobbyError> {
        self.message_pusher.unregister_client(id).await;

        let Some(outcome) = self.repository.remove_connection(id).await? else {
            tracing::info!("Connection '{}' closed before joining", id);
            return Ok(None);
        };

        let username = outcome.identity.username.clone();
        tracing::info!(
            "User disconnected: {} (Connection: {}, Session: {})",
            username,
            id,
            outcome.identity.token
        );

        let remaining = self.repository.connection_ids().await;
        let event = ServerEvent::UserDisconnected { username };
        if let Err(e) = self.message_pusher.broadcast(remaining, &event).await {
            tracing::warn!("Failed to broadcast '{}': {}", event.name(), e);
        }
        self.presence.emit().await;

        if let Some(grace) = &outcome.grace {
            tracing::info!(
                "Session '{}' ({}) enters grace period",
                grace.token,
                grace.username
            );
            self.scheduler
                .schedule(grace.token.clone(), grace.epoch)
                .await;
        }

        Ok(Some(outcome))
    }
}
