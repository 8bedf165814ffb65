//! 識別子のファクトリ

use uuid::Uuid;

use super::value_object::{ConnectionId, SessionToken};

/// 受け付けたソケットごとに新しい `ConnectionId` を生成
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4().to_string())
    }
}

/// 推測できないセッショントークンを生成
pub struct SessionTokenFactory;

impl SessionTokenFactory {
    pub fn generate() -> SessionToken {
        SessionToken(Uuid::new_v4().simple().to_string())
    }
}
