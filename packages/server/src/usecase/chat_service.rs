//! ChatService: ロビーの入口
//!
//! トランスポート層が呼び出すのはこの型だけです。各イベント（connect / join /
//! message / disconnect / 猶予期間満了）を対応するユースケースに振り分けます。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 実際の `TokioGraceScheduler` と組み合わせたイベント列全体の振る舞い
//!
//! ### なぜこのテストが必要か
//! - 猶予期間の満了と再接続の競合が正しく解決されることを保証する
//! - 外から観測できる通知の列が、接続・再接続・退出のシナリオ通りであることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規 join、猶予期間内の再接続、猶予期間の満了
//! - エッジケース：古い満了通知と新しい猶予期間の競合、満了後のトークン再利用

use std::sync::Arc;

use lobby_shared::time::Clock;
use tokio::sync::mpsc;

use crate::domain::{
    ConnectionId, DisconnectOutcome, GraceExpired, GraceScheduler, JoinOutcome, JoinRequest,
    LobbyError, LobbyRepository, MessagePusher, PusherChannel, Session,
};

use super::{
    connect_client::ConnectClientUseCase,
    disconnect_client::DisconnectClientUseCase,
    error::{JoinError, SendMessageError},
    expire_session::ExpireSessionUseCase,
    join_chat::JoinChatUseCase,
    presence::{PresenceBroadcaster, PresenceSnapshot},
    send_message::SendMessageUseCase,
};

/// ロビーのインスタンス 1 つ分の入口
pub struct ChatService {
    connect_client_usecase: ConnectClientUseCase,
    join_chat_usecase: JoinChatUseCase,
    send_message_usecase: SendMessageUseCase,
    disconnect_client_usecase: DisconnectClientUseCase,
    expire_session_usecase: ExpireSessionUseCase,
    presence: Arc<PresenceBroadcaster>,
}

impl ChatService {
    /// 依存を受け取ってユースケースを組み立てる
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        scheduler: Arc<dyn GraceScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let presence = Arc::new(PresenceBroadcaster::new(
            repository.clone(),
            message_pusher.clone(),
        ));

        Self {
            connect_client_usecase: ConnectClientUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            ),
            join_chat_usecase: JoinChatUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                scheduler.clone(),
                presence.clone(),
            ),
            send_message_usecase: SendMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock,
            ),
            disconnect_client_usecase: DisconnectClientUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                scheduler,
                presence.clone(),
            ),
            expire_session_usecase: ExpireSessionUseCase::new(
                repository,
                message_pusher,
                presence.clone(),
            ),
            presence,
        }
    }

    pub async fn on_connect(
        &self,
        id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<(), LobbyError> {
        self.connect_client_usecase.execute(id, sender).await
    }

    pub async fn on_join(
        &self,
        id: &ConnectionId,
        request: JoinRequest,
    ) -> Result<JoinOutcome, JoinError> {
        self.join_chat_usecase.execute(id, request).await
    }

    pub async fn on_message(
        &self,
        id: &ConnectionId,
        text: Option<String>,
    ) -> Result<Vec<ConnectionId>, SendMessageError> {
        self.send_message_usecase.execute(id, text).await
    }

    pub async fn on_disconnect(
        &self,
        id: &ConnectionId,
    ) -> Result<Option<DisconnectOutcome>, LobbyError> {
        self.disconnect_client_usecase.execute(id).await
    }

    pub async fn on_grace_expired(&self, expired: GraceExpired) -> Option<Session> {
        self.expire_session_usecase.execute(expired).await
    }

    pub async fn presence_snapshot(&self) -> PresenceSnapshot {
        self.presence.snapshot().await
    }

    /// 猶予期間の満了通知を 1 件ずつ処理する
    ///
    /// 送信側（スケジューラ）がすべて破棄されると終了します。
    pub async fn run_expiry_loop(
        self: Arc<Self>,
        mut expired_rx: mpsc::UnboundedReceiver<GraceExpired>,
    ) {
        while let Some(expired) = expired_rx.recv().await {
            self.on_grace_expired(expired).await;
        }
        tracing::debug!("Grace expiry loop stopped");
    }
}
