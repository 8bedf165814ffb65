//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::LobbyError;

/// join の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// ユーザー名なしの新規 join（本人に `joinError` として通知）
    #[error("Username is required to join")]
    UsernameRequired,

    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

/// メッセージを破棄する理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// join していない接続
    #[error("Connection '{0}' has not joined")]
    NotJoined(String),

    /// 本文がない、文字列でない、または空白のみ
    #[error("Message is empty")]
    BlankMessage,
}
