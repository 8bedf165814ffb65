//! ロビーのエンティティ

use super::value_object::{ConnectionId, GraceEpoch, SessionToken, Username};

/// join 成功時に接続へ紐付くアイデンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: Username,
    pub token: SessionToken,
}

impl Identity {
    pub fn new(username: Username, token: SessionToken) -> Self {
        Self { username, token }
    }
}

/// トランスポート上の接続 1 本
///
/// `connect` 時はアイデンティティなしで作られ、`join` で `identity` が埋まる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Option<Identity>,
}

impl Connection {
    pub fn new(id: ConnectionId) -> Self {
        Self { id, identity: None }
    }

    pub fn is_bound(&self) -> bool {
        self.identity.is_some()
    }

    pub fn holds(&self, token: &SessionToken) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| &identity.token == token)
    }

    pub fn bind(&mut self, identity: Identity) -> Option<Identity> {
        self.identity.replace(identity)
    }

    pub fn unbind(&mut self) -> Option<Identity> {
        self.identity.take()
    }
}

/// セッションの状態
///
/// 削除済み（REMOVED）は表現しない。削除されたセッションはセッションテーブルに存在しないだけ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// トークンを保持する接続が 1 つ以上ある
    Active,
    /// 接続がなく、世代 `epoch` の猶予タイマーが動いている
    Grace { epoch: GraceEpoch },
}

/// 個々の接続より長く生きうる論理的なチャット参加者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub username: Username,
    pub state: SessionState,
    last_epoch: GraceEpoch,
}

impl Session {
    pub fn new(token: SessionToken, username: Username) -> Self {
        Self {
            token,
            username,
            state: SessionState::Active,
            last_epoch: GraceEpoch::new(0),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// 猶予期間に入り、新しい猶予期間の世代番号を返す
    ///
    /// 既に猶予期間中であれば現在の世代のまま。
    pub fn enter_grace(&mut self) -> GraceEpoch {
        if let SessionState::Grace { epoch } = self.state {
            return epoch;
        }
        self.last_epoch = self.last_epoch.next();
        self.state = SessionState::Grace {
            epoch: self.last_epoch,
        };
        self.last_epoch
    }

    /// `Active` に戻す。キャンセルした猶予期間があればその世代番号を返す
    pub fn resume(&mut self) -> Option<GraceEpoch> {
        match std::mem::replace(&mut self.state, SessionState::Active) {
            SessionState::Grace { epoch } => Some(epoch),
            SessionState::Active => None,
        }
    }

    pub fn is_in_grace(&self, epoch: GraceEpoch) -> bool {
        self.state == SessionState::Grace { epoch }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(name: &str) -> Session {
        Session::new(
            SessionToken::new(format!("token-{}", name)).unwrap(),
            Username::new(name.to_string()).unwrap(),
        )
    }

    #[test]
    fn test_new_session_is_active() {
        // テスト項目: 作成直後のセッションは Active 状態
        // when (操作):
        let session = session("alice");

        // then (期待する結果):
        assert!(session.is_active());
    }

    #[test]
    fn test_enter_grace_yields_fresh_epoch_each_window() {
        // テスト項目: 猶予期間に入るたびに新しい世代番号が割り当てられる
        // given (前提条件):
        let mut session = session("alice");

        // when (操作):
        let first = session.enter_grace();
        session.resume();
        let second = session.enter_grace();

        // then (期待する結果):
        assert_ne!(first, second);
        assert!(session.is_in_grace(second));
        assert!(!session.is_in_grace(first));
    }

    #[test]
    fn test_enter_grace_twice_keeps_current_window() {
        // テスト項目: 猶予期間中に再度 enter_grace しても世代は変わらない
        // given (前提条件):
        let mut session = session("alice");
        let first = session.enter_grace();

        // when (操作):
        let again = session.enter_grace();

        // then (期待する結果):
        assert_eq!(first, again);
    }

    #[test]
    fn test_resume_reports_cancelled_epoch() {
        // テスト項目: resume はキャンセルした猶予期間の世代を返す
        // given (前提条件):
        let mut session = session("alice");
        let epoch = session.enter_grace();

        // when (操作):
        let cancelled = session.resume();
        let cancelled_again = session.resume();

        // then (期待する結果):
        assert_eq!(cancelled, Some(epoch));
        assert_eq!(cancelled_again, None);
        assert!(session.is_active());
    }

    #[test]
    fn test_connection_bind_and_unbind() {
        // テスト項目: 接続へのアイデンティティの紐付けと解除
        // given (前提条件):
        let mut connection = Connection::new(ConnectionId::new("c1".to_string()).unwrap());
        let token = SessionToken::new("t1".to_string()).unwrap();
        let identity = Identity::new(Username::new("alice".to_string()).unwrap(), token.clone());

        // when (操作):
        let previous = connection.bind(identity.clone());

        // then (期待する結果):
        assert_eq!(previous, None);
        assert!(connection.is_bound());
        assert!(connection.holds(&token));
        assert_eq!(connection.unbind(), Some(identity));
        assert!(!connection.holds(&token));
    }
}
