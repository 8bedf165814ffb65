//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージのトリムとブロードキャスト対象（送信者を含む全接続）
//!
//! ### なぜこのテストが必要か
//! - 送信者自身にもエコーされることを保証する
//! - 空白のみ・文字列以外のメッセージが黙って破棄されることを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：join 済みの接続からのメッセージ
//! - 異常系：未 join の接続からのメッセージ
//! - エッジケース：空白のみのメッセージ、メッセージなし

use std::sync::Arc;

use lobby_shared::time::Clock;

use crate::domain::{
    ConnectionId, LobbyRepository, MessageContent, MessagePusher, ServerEvent, Timestamp,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（ロビー状態の抽象化）
    repository: Arc<dyn LobbyRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// 時刻取得の抽象化
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `from` - 送信者の接続 ID
    /// * `text` - 受信したメッセージ本文（文字列以外は `None`）
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - ブロードキャスト対象（送信者を含む）
    /// * `Err(SendMessageError)` - メッセージを破棄した理由
    pub async fn execute(
        &self,
        from: &ConnectionId,
        text: Option<String>,
    ) -> Result<Vec<ConnectionId>, SendMessageError> {
        // 1. 送信者の解決
        let identity = self
            .repository
            .identity_of(from)
            .await
            .ok_or_else(|| SendMessageError::NotJoined(from.as_str().to_string()))?;

        // 2. 本文の検証（トリム後に空なら破棄）
        let content = text
            .and_then(|text| MessageContent::new(text).ok())
            .ok_or(SendMessageError::BlankMessage)?;

        // 3. 全接続へブロードキャスト
        let targets = self.repository.connection_ids().await;
        let event = ServerEvent::Message {
            username: identity.username.clone(),
            content,
            timestamp: Timestamp::new(self.clock.now_utc_millis()),
        };
        if let Err(e) = self.message_pusher.broadcast(targets.clone(), &event).await {
            tracing::warn!("Failed to broadcast message from '{}': {}", from, e);
        }
        tracing::debug!(
            "Message from {} broadcast to {} connection(s)",
            identity.username,
            targets.len()
        );

        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{JoinRequest, SessionToken, Username},
        infrastructure::repository::InMemoryLobbyRepository,
        usecase::test_support::{Delivery, RecordingPusher, cid},
    };
    use lobby_shared::time::FixedClock;

    const NOW: i64 = 1_672_531_200_123;

    async fn setup() -> (SendMessageUseCase, Arc<RecordingPusher>) {
        let repository = Arc::new(InMemoryLobbyRepository::default());
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
        let pusher = Arc::new(RecordingPusher::default());
        let usecase = SendMessageUseCase::new(
            repository,
            pusher.clone(),
            Arc::new(FixedClock::new(NOW)),
        );
        (usecase, pusher)
    }

    #[tokio::test]
    async fn test_message_is_trimmed_and_echoed_to_sender() {
        // テスト項目: メッセージはトリムされ、送信者を含む全接続に届く
        // given (前提条件):
        let (usecase, pusher) = setup().await;

        // when (操作):
        let targets = usecase
            .execute(&cid("c1"), Some("  hello  ".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(targets, vec![cid("c1"), cid("c2")]);
        let log = pusher.take().await;
        assert_eq!(
            log,
            vec![(
                Delivery::Broadcast(vec![cid("c1"), cid("c2")]),
                ServerEvent::Message {
                    username: Username::new("alice".to_string()).unwrap(),
                    content: MessageContent::new("hello".to_string()).unwrap(),
                    timestamp: Timestamp::new(NOW),
                }
            )]
        );
    }

    #[tokio::test]
    async fn test_whitespace_only_message_is_dropped() {
        // テスト項目: 空白のみのメッセージはブロードキャストされない
        // given (前提条件):
        let (usecase, pusher) = setup().await;

        // when (操作):
        let result = usecase.execute(&cid("c1"), Some("  ".to_string())).await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::BlankMessage));
        assert_eq!(pusher.count("message").await, 0);
    }

    #[tokio::test]
    async fn test_missing_message_is_dropped() {
        // テスト項目: 本文のないメッセージはブロードキャストされない
        // given (前提条件):
        let (usecase, pusher) = setup().await;

        // when (操作):
        let result = usecase.execute(&cid("c1"), None).await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::BlankMessage));
        assert!(pusher.take().await.is_empty());
    }

    #[tokio::test]
    async fn test_message_from_unjoined_connection_is_dropped() {
        // テスト項目: 未 join の接続からのメッセージは破棄される
        // given (前提条件):
        let (usecase, pusher) = setup().await;

        // when (操作):
        let result = usecase.execute(&cid("c2"), Some("hi".to_string())).await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::NotJoined("c2".to_string())));
        assert!(pusher.take().await.is_empty());
    }
}
