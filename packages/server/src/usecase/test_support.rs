//! ユースケースのテストで共有するテストダブル

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, ServerEvent};

/// イベントの送信先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    To(ConnectionId),
    Broadcast(Vec<ConnectionId>),
}

/// 送信したイベントを順に記録する MessagePusher
#[derive(Default)]
pub struct RecordingPusher {
    log: Mutex<Vec<(Delivery, ServerEvent)>>,
}

impl RecordingPusher {
    /// 記録したイベントを取り出す
    pub async fn take(&self) -> Vec<(Delivery, ServerEvent)> {
        std::mem::take(&mut *self.log.lock().await)
    }

    /// 記録したイベント名（取り出さない）
    pub async fn names(&self) -> Vec<&'static str> {
        self.log
            .lock()
            .await
            .iter()
            .map(|(_, event)| event.name())
            .collect()
    }

    pub async fn count(&self, name: &str) -> usize {
        self.names().await.into_iter().filter(|n| *n == name).count()
    }
}

#[async_trait]
impl MessagePusher for RecordingPusher {
    async fn register_client(&self, _id: ConnectionId, _sender: PusherChannel) {}

    async fn unregister_client(&self, _id: &ConnectionId) {}

    async fn push_to(
        &self,
        id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        self.log
            .lock()
            .await
            .push((Delivery::To(id.clone()), event.clone()));
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        self.log
            .lock()
            .await
            .push((Delivery::Broadcast(targets), event.clone()));
        Ok(())
    }
}

pub fn cid(value: &str) -> ConnectionId {
    ConnectionId::new(value.to_string()).unwrap()
}
