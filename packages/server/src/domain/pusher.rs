//! MessagePusher trait 定義
//!
//! 接続へのイベント通知のインターフェース。配送はベストエフォートで、
//! ロビーのコアは配送完了を待たずに次の状態遷移へ進みます。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, ServerEvent};

/// 接続ごとの送信チャンネル（エンコード済みのフレームを流す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    async fn unregister_client(&self, id: &ConnectionId);

    /// 1 つの接続にイベントを送信
    async fn push_to(&self, id: &ConnectionId, event: &ServerEvent)
    -> Result<(), MessagePushError>;

    /// 複数の接続にイベントを送信（一部の失敗は許容される）
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;
}
