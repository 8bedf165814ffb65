//! GraceScheduler trait 定義
//!
//! 再接続猶予期間のタイマーのインターフェース。

use async_trait::async_trait;

use super::{GraceEpoch, SessionToken};

/// 再接続のないまま猶予期間が経過したときの通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraceExpired {
    pub token: SessionToken,
    pub epoch: GraceEpoch,
}

/// トークンごとの猶予期間タイマー
///
/// 1 トークンにつき起動中のタイマーは高々 1 つ。満了しても `GraceExpired` を
/// 通知するだけで、実際に削除するかはロビーが世代番号を見て決める。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraceScheduler: Send + Sync {
    /// `token` のタイマーを起動
    ///
    /// 同じか古い世代の起動中タイマーは置き換える。起動中より古い世代での呼び出しは無視する。
    async fn schedule(&self, token: SessionToken, epoch: GraceEpoch);

    /// `token` のタイマーを停止。満了待ちだったかを返す
    async fn cancel(&self, token: &SessionToken) -> bool;
}
