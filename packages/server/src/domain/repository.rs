//! Repository trait 定義
//!
//! ドメイン層が必要とするロビー状態へのアクセスインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 各メソッドは `Lobby` の状態遷移 1 回分に対応し、実装はそれをアトミックに
//! 実行しなければなりません。

use async_trait::async_trait;

use super::{
    ConnectionId, DisconnectOutcome, GraceEpoch, Identity, JoinOutcome, JoinRequest, LobbyError,
    Session, SessionToken, Username,
};

/// Lobby Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait LobbyRepository: Send + Sync {
    /// 未認証の接続を登録
    async fn register_connection(&self, id: ConnectionId) -> Result<(), LobbyError>;

    /// 接続をセッションに紐付ける（新規 join または再接続）
    async fn join(
        &self,
        id: &ConnectionId,
        request: JoinRequest,
        fresh_token: SessionToken,
    ) -> Result<JoinOutcome, LobbyError>;

    /// 接続を削除（セッションは猶予期間の間保持される）
    async fn remove_connection(
        &self,
        id: &ConnectionId,
    ) -> Result<Option<DisconnectOutcome>, LobbyError>;

    /// 猶予期間が満了したセッションを削除
    async fn expire_session(&self, token: &SessionToken, epoch: GraceEpoch) -> Option<Session>;

    /// 接続に紐付いたアイデンティティを取得
    async fn identity_of(&self, id: &ConnectionId) -> Option<Identity>;

    /// 重複排除済みのオンラインユーザー名一覧を取得
    async fn presence(&self) -> Vec<Username>;

    /// 登録済みの全ての接続 ID を取得
    async fn connection_ids(&self) -> Vec<ConnectionId>;

    /// 接続数を取得
    async fn count_connections(&self) -> usize;

    /// セッション数を取得（猶予期間中のものを含む）
    async fn count_sessions(&self) -> usize;
}
