//! UseCase 層: ロビーへの入力イベントごとのユースケースと、
//! トランスポートが呼び出す `ChatService`

mod chat_service;
mod connect_client;
mod disconnect_client;
mod error;
mod expire_session;
mod join_chat;
mod presence;
mod send_message;

#[cfg(test)]
pub(crate) mod test_support;

pub use chat_service::ChatService;
pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{JoinError, SendMessageError};
pub use expire_session::ExpireSessionUseCase;
pub use join_chat::JoinChatUseCase;
pub use presence::{PresenceBroadcaster, PresenceSnapshot};
pub use send_message::SendMessageUseCase;
