//! Domain 層: Lobby 集約、値オブジェクト、外部に求めるインターフェース

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod lobby;
pub mod pusher;
pub mod repository;
pub mod scheduler;
pub mod value_object;

pub use entity::{Connection, Identity, Session, SessionState};
pub use error::{LobbyError, MessagePushError, ValueObjectError};
pub use event::ServerEvent;
pub use factory::{ConnectionIdFactory, SessionTokenFactory};
pub use lobby::{DisconnectOutcome, GraceStart, JoinOutcome, JoinRequest, Lobby};
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::LobbyRepository;
pub use scheduler::{GraceExpired, GraceScheduler};
pub use value_object::{
    ConnectionId, GraceEpoch, MessageContent, SessionToken, Timestamp, Username,
};

#[cfg(test)]
pub use pusher::MockMessagePusher;
#[cfg(test)]
pub use scheduler::MockGraceScheduler;
