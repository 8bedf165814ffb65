//! tokio タイマーを使った GraceScheduler 実装
//!
//! トークンごとに `sleep` するタスクを 1 つ起動し、その `AbortHandle` を
//! 猶予期間の世代番号と一緒に HashMap に保持します（キャンセルは O(1)）。
//! 古い世代のスケジュールが遅れて届いても、新しい世代のタイマーは上書きしません。
//! タイマーが満了すると自分のエントリを片付けてから
//! `GraceExpired` をチャンネルに送るだけで、セッションの削除は受信側
//! （`ChatService` の満了ループ）がロビーの状態と世代番号を確認してから行います。

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::{Mutex, mpsc},
    task::AbortHandle,
};

use crate::domain::{GraceEpoch, GraceExpired, GraceScheduler, SessionToken};

/// 再接続猶予期間の既定値
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(60);

/// 起動中のタイマー（どの猶予期間のものかを世代番号で保持）
struct ArmedTimer {
    epoch: GraceEpoch,
    handle: AbortHandle,
}

type TimerTable = Arc<Mutex<HashMap<SessionToken, ArmedTimer>>>;

/// tokio タイマーを使った GraceScheduler 実装
pub struct TokioGraceScheduler {
    grace_period: Duration,
    expired_tx: mpsc::UnboundedSender<GraceExpired>,
    timers: TimerTable,
}

impl TokioGraceScheduler {
    /// 新しい TokioGraceScheduler を作成
    pub fn new(grace_period: Duration, expired_tx: mpsc::UnboundedSender<GraceExpired>) -> Self {
        Self {
            grace_period,
            expired_tx,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// スケジューラと、満了通知を受け取るチャンネルをまとめて作成
    pub fn with_channel(grace_period: Duration) -> (Self, mpsc::UnboundedReceiver<GraceExpired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(grace_period, tx), rx)
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// 満了待ちのタイマー数
    #[cfg(test)]
    pub(crate) async fn pending(&self) -> usize {
        let timers = self.timers.lock().await;
        timers
            .values()
            .filter(|armed| !armed.handle.is_finished())
            .count()
    }

    /// 起動中のタイマーの世代番号
    #[cfg(test)]
    pub(crate) async fn armed_epoch(&self, token: &SessionToken) -> Option<GraceEpoch> {
        let timers = self.timers.lock().await;
        timers.get(token).map(|armed| armed.epoch)
    }
}

#[async_trait]
impl GraceScheduler for TokioGraceScheduler {
    async fn schedule(&self, token: SessionToken, epoch: GraceEpoch) {
        let mut timers = self.timers.lock().await;

        // 新しい猶予期間のタイマーを、遅れて届いた古い世代で上書きしない
        if let Some(armed) = timers.get(&token)
            && armed.epoch.value() > epoch.value()
        {
            tracing::debug!(
                "Ignored late grace timer for session '{}' (epoch {} < armed {})",
                token,
                epoch.value(),
                armed.epoch.value()
            );
            return;
        }

        let grace_period = self.grace_period;
        let expired_tx = self.expired_tx.clone();
        let table = self.timers.clone();
        let expired = GraceExpired {
            token: token.clone(),
            epoch,
        };

        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace_period).await;
            {
                let mut timers = table.lock().await;
                if timers
                    .get(&expired.token)
                    .is_some_and(|armed| armed.epoch == expired.epoch)
                {
                    timers.remove(&expired.token);
                }
            }
            if expired_tx.send(expired).is_err() {
                tracing::warn!("Grace expiry receiver dropped; expiry is lost");
            }
        });

        let armed = ArmedTimer {
            epoch,
            handle: handle.abort_handle(),
        };
        if let Some(previous) = timers.insert(token.clone(), armed) {
            previous.handle.abort();
            tracing::debug!(
                "Replaced grace timer for session '{}' (epoch {} -> {})",
                token,
                previous.epoch.value(),
                epoch.value()
            );
        }
        tracing::debug!(
            "Grace timer armed for session '{}' ({:?}, epoch {})",
            token,
            grace_period,
            epoch.value()
        );
    }

    async fn cancel(&self, token: &SessionToken) -> bool {
        let mut timers = self.timers.lock().await;
        match timers.remove(token) {
            Some(armed) => {
                let pending = !armed.handle.is_finished();
                armed.handle.abort();
                pending
            }
            None => false,
        }
    }
}
