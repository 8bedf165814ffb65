//! ロビーが接続へ送る通知

use super::value_object::{MessageContent, SessionToken, Timestamp, Username};

/// ロビーのコアが発行する通知イベント
///
/// ワイヤー上の表現は `infrastructure::dto::websocket` にある。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// ユーザー名なしの新規 join を拒否（本人のみ）
    JoinError { message: String },
    /// join した接続に返すセッション情報（本人のみ）
    SessionCreated {
        token: SessionToken,
        username: Username,
        reconnected: bool,
    },
    UserJoined { username: Username },
    UserReconnected { username: Username },
    Message {
        username: Username,
        content: MessageContent,
        timestamp: Timestamp,
    },
    UserDisconnected { username: Username },
    /// 再接続のないまま猶予期間が満了した
    UserLeft { username: Username },
    /// プレゼンスのスナップショット（差分ではない）
    UserList { usernames: Vec<Username> },
}

impl ServerEvent {
    pub const USERNAME_REQUIRED: &'static str = "Username is required to join.";

    pub fn username_required() -> Self {
        Self::JoinError {
            message: Self::USERNAME_REQUIRED.to_string(),
        }
    }

    /// ワイヤー上のイベント名
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinError { .. } => "joinError",
            Self::SessionCreated { .. } => "sessionCreated",
            Self::UserJoined { .. } => "userJoined",
            Self::UserReconnected { .. } => "userReconnected",
            Self::Message { .. } => "message",
            Self::UserDisconnected { .. } => "userDisconnected",
            Self::UserLeft { .. } => "userLeft",
            Self::UserList { .. } => "userList",
        }
    }
}
