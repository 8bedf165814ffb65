//! UseCase: 接続受付処理
//!
//! トランスポートの `connect` イベントに対応します。アイデンティティを持たない
//! 接続を登録するだけで、通知は行いません。

use std::sync::Arc;

use crate::domain::{ConnectionId, LobbyError, LobbyRepository, MessagePusher, PusherChannel};

/// 接続受付のユースケース
pub struct ConnectClientUseCase {
    /// Repository（ロビー状態の抽象化）
    repository: Arc<dyn LobbyRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続受付を実行
    ///
    /// # Arguments
    ///
    /// * `id` - トランスポートが割り当てた接続 ID
    /// * `sender` - 接続へのフレーム送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 登録成功
    /// * `Err(LobbyError::ConnectionAlreadyRegistered)` - 同じ ID が登録済み
    pub async fn execute(&self, id: ConnectionId, sender: PusherChannel) -> Result<(), LobbyError> {
        self.repository.register_connection(id.clone()).await?;
        self.message_pusher.register_client(id.clone(), sender).await;
        tracing::info!("Connection '{}' opened", id);
        Ok(())
    }
}
