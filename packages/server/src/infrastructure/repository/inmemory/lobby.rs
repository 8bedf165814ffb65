//! InMemory Lobby Repository 実装
//!
//! ドメイン層が定義する LobbyRepository trait の具体的な実装。
//! `Lobby` 集約を Mutex の内側に保持し、各メソッドはロックを取ったまま
//! 1 回の状態遷移を完了させます。これにより同じトークン・同じ接続に対する
//! 操作は常に直列化されます。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, DisconnectOutcome, GraceEpoch, Identity, JoinOutcome, JoinRequest, Lobby,
    LobbyError, LobbyRepository, Session, SessionToken, Username,
};

/// インメモリ Lobby Repository 実装
pub struct InMemoryLobbyRepository {
    /// Lobby ドメインモデル
    lobby: Arc<Mutex<Lobby>>,
}

impl InMemoryLobbyRepository {
    /// 新しい InMemoryLobbyRepository を作成
    pub fn new(lobby: Arc<Mutex<Lobby>>) -> Self {
        Self { lobby }
    }
}

impl Default for InMemoryLobbyRepository {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(Lobby::new())))
    }
}

#[async_trait]
impl LobbyRepository for InMemoryLobbyRepository {
    async fn register_connection(&self, id: ConnectionId) -> Result<(), LobbyError> {
        let mut lobby = self.lobby.lock().await;
        lobby.connect(id)
    }

    async fn join(
        &self,
        id: &ConnectionId,
        request: JoinRequest,
        fresh_token: SessionToken,
    ) -> Result<JoinOutcome, LobbyError> {
        let mut lobby = self.lobby.lock().await;
        lobby.join(id, request, fresh_token)
    }

    async fn remove_connection(
        &self,
        id: &ConnectionId,
    ) -> Result<Option<DisconnectOutcome>, LobbyError> {
        let mut lobby = self.lobby.lock().await;
        lobby.disconnect(id)
    }

    async fn expire_session(&self, token: &SessionToken, epoch: GraceEpoch) -> Option<Session> {
        let mut lobby = self.lobby.lock().await;
        lobby.expire(token, epoch)
    }

    async fn identity_of(&self, id: &ConnectionId) -> Option<Identity> {
        let lobby = self.lobby.lock().await;
        lobby.identity_of(id).cloned()
    }

    async fn presence(&self) -> Vec<Username> {
        let lobby = self.lobby.lock().await;
        lobby.presence()
    }

    async fn connection_ids(&self) -> Vec<ConnectionId> {
        let lobby = self.lobby.lock().await;
        lobby.connection_ids()
    }

    async fn count_connections(&self) -> usize {
        let lobby = self.lobby.lock().await;
        lobby.connection_count()
    }

    async fn count_sessions(&self) -> usize {
        let lobby = self.lobby.lock().await;
        lobby.session_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryLobbyRepository が Lobby 集約の状態遷移を正しく委譲すること
    // - 複数タスクから同時に操作しても不変条件が崩れないこと
    //
    // 【なぜこのテストが必要か】
    // - Repository は UseCase から呼ばれる状態管理の中核
    // - 並行アクセス時に 1 トークンに 2 つの接続が紐付かないことを保証する
    // ========================================

    fn cid(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn token(value: &str) -> SessionToken {
        SessionToken::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_register_join_and_remove() {
        // テスト項目: 接続登録・join・切断がリポジトリ経由で反映される
        // given (前提条件):
        let repo = InMemoryLobbyRepository::default();
        repo.register_connection(cid("c1")).await.unwrap();

        // when (操作):
        let outcome = repo
            .join(&cid("c1"), JoinRequest::fresh("alice"), token("t1"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.username.as_str(), "alice");
        assert_eq!(repo.count_connections().await, 1);
        assert_eq!(repo.count_sessions().await, 1);
        assert_eq!(
            repo.identity_of(&cid("c1")).await.map(|i| i.token),
            Some(token("t1"))
        );

        let removed = repo.remove_connection(&cid("c1")).await.unwrap();
        assert!(removed.is_some());
        assert_eq!(repo.count_connections().await, 0);
        assert_eq!(repo.count_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_expire_session_through_repository() {
        // テスト項目: 猶予期間満了のセッション削除がリポジトリ経由で行える
        // given (前提条件):
        let repo = InMemoryLobbyRepository::default();
        repo.register_connection(cid("c1")).await.unwrap();
        repo.join(&cid("c1"), JoinRequest::fresh("alice"), token("t1"))
            .await
            .unwrap();
        let grace = repo
            .remove_connection(&cid("c1"))
            .await
            .unwrap()
            .and_then(|outcome| outcome.grace)
            .unwrap();

        // when (操作):
        let removed = repo.expire_session(&grace.token, grace.epoch).await;

        // then (期待する結果):
        assert!(removed.is_some());
        assert_eq!(repo.count_sessions().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reconnects_keep_single_holder() {
        // テスト項目: 同じトークンでの並行再接続でも、紐付く接続は常に 1 つ
        // given (前提条件):
        let lobby = Arc::new(Mutex::new(Lobby::new()));
        let repo = Arc::new(InMemoryLobbyRepository::new(lobby.clone()));
        repo.register_connection(cid("origin")).await.unwrap();
        repo.join(&cid("origin"), JoinRequest::fresh("alice"), token("t1"))
            .await
            .unwrap();

        // when (操作): 16 の接続が同時に t1 で再接続する
        let mut handles = Vec::new();
        for n in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                let id = cid(&format!("c{}", n));
                repo.register_connection(id.clone()).await.unwrap();
                repo.join(&id, JoinRequest::resume(token("t1")), token(&format!("x{}", n)))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().reconnected);
        }

        // then (期待する結果):
        let lobby = lobby.lock().await;
        assert_eq!(lobby.holders_of(&token("t1")).len(), 1);
        assert_eq!(lobby.session_count(), 1);
    }
}
