//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクトの検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// ConnectionId が空
    #[error("ConnectionId must not be empty")]
    ConnectionIdEmpty,

    /// Username が空
    #[error("Username must not be empty")]
    UsernameEmpty,

    /// SessionToken が空
    #[error("SessionToken must not be empty")]
    SessionTokenEmpty,

    /// MessageContent が空、または空白のみ
    #[error("MessageContent must not be blank")]
    MessageContentBlank,
}

/// Lobby 集約のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    /// 同じ接続に対して `connect` が二度発生した
    #[error("Connection '{0}' is already registered")]
    ConnectionAlreadyRegistered(String),

    /// 登録されていない（または削除済みの）接続
    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),

    /// ユーザー名なしで新規 join しようとした
    #[error("Username is required to join")]
    UsernameRequired,

    /// 生成したトークンが既に使われている
    #[error("Generated session token is already in use")]
    TokenCollision,
}

/// 通知送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 接続の送信チャンネルが登録されていない
    #[error("Client '{0}' not found")]
    ClientNotFound(String),

    /// 送信チャンネルが閉じている
    #[error("Failed to push message: {0}")]
    PushFailed(String),

    /// イベントをフレームにエンコードできない
    #[error("Failed to encode event: {0}")]
    Encode(String),
}
