//! Lobby 集約: 接続レジストリとセッションテーブル
//!
//! 各メソッドは同期的で全域的な状態遷移です。呼び出し側がアクセスを直列化する
//! （インメモリ Repository が Mutex の内側に保持する）ため、1 つの遷移は
//! 必ず次の遷移の開始前に完了します。

use std::collections::{BTreeSet, HashMap};

use super::{
    entity::{Connection, Identity, Session},
    error::LobbyError,
    value_object::{ConnectionId, GraceEpoch, SessionToken, Username},
};

/// `join` でクライアントが提示する情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinRequest {
    pub username: Option<String>,
    pub token: Option<SessionToken>,
}

impl JoinRequest {
    pub fn fresh(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            token: None,
        }
    }

    pub fn resume(token: SessionToken) -> Self {
        Self {
            username: None,
            token: Some(token),
        }
    }
}

/// 最後の接続を失ったばかりのセッション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraceStart {
    pub token: SessionToken,
    pub username: Username,
    pub epoch: GraceEpoch,
}

/// join 成功の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub username: Username,
    pub token: SessionToken,
    pub reconnected: bool,
    /// この再接続でキャンセルされた猶予期間
    pub cancelled_grace: Option<GraceEpoch>,
    /// 紐付け直しで接続を失った、この接続の以前のセッション
    pub orphaned: Option<GraceStart>,
    /// 以前トークンを保持していて、紐付けを解除された接続
    pub displaced: Vec<ConnectionId>,
}

/// join 済み接続の切断結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    pub identity: Identity,
    /// トークンを保持する接続が他に残っていない場合に設定される
    pub grace: Option<GraceStart>,
}

/// 接続レジストリとセッションテーブル
#[derive(Debug, Default)]
pub struct Lobby {
    connections: HashMap<ConnectionId, Connection>,
    sessions: HashMap<SessionToken, Session>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    /// アイデンティティを持たない接続を登録
    pub fn connect(&mut self, id: ConnectionId) -> Result<(), LobbyError> {
        if self.connections.contains_key(&id) {
            return Err(LobbyError::ConnectionAlreadyRegistered(id.into_string()));
        }
        self.connections.insert(id.clone(), Connection::new(id));
        Ok(())
    }

    /// 接続をセッションに紐付ける
    ///
    /// セッションテーブルに残っているトークンなら再接続で、保存済みのユーザー名が
    /// クライアントの送った名前より優先される。それ以外は `fresh_token` をキーに
    /// 新しいセッションを作る（ユーザー名が必須）。
    pub fn join(
        &mut self,
        id: &ConnectionId,
        request: JoinRequest,
        fresh_token: SessionToken,
    ) -> Result<JoinOutcome, LobbyError> {
        if !self.connections.contains_key(id) {
            return Err(LobbyError::ConnectionNotFound(id.as_str().to_string()));
        }

        let known = request.token.and_then(|token| {
            let username = self.sessions.get(&token)?.username.clone();
            Some((token, username))
        });

        if let Some((token, username)) = known {
            return Ok(self.reconnect(id, token, username));
        }

        let username = request
            .username
            .and_then(|name| Username::new(name).ok())
            .ok_or(LobbyError::UsernameRequired)?;
        if self.sessions.contains_key(&fresh_token) {
            return Err(LobbyError::TokenCollision);
        }
        Ok(self.fresh_join(id, username, fresh_token))
    }

    fn reconnect(
        &mut self,
        id: &ConnectionId,
        token: SessionToken,
        username: Username,
    ) -> JoinOutcome {
        let orphaned = self.release(id, Some(&token));
        let displaced = self.displace(&token, id);
        let cancelled_grace = self.sessions.get_mut(&token).and_then(Session::resume);

        if let Some(connection) = self.connections.get_mut(id) {
            connection.bind(Identity::new(username.clone(), token.clone()));
        }

        JoinOutcome {
            username,
            token,
            reconnected: true,
            cancelled_grace,
            orphaned,
            displaced,
        }
    }

    fn fresh_join(
        &mut self,
        id: &ConnectionId,
        username: Username,
        token: SessionToken,
    ) -> JoinOutcome {
        let orphaned = self.release(id, None);
        self.sessions.insert(
            token.clone(),
            Session::new(token.clone(), username.clone()),
        );
        if let Some(connection) = self.connections.get_mut(id) {
            connection.bind(Identity::new(username.clone(), token.clone()));
        }

        JoinOutcome {
            username,
            token,
            reconnected: false,
            cancelled_grace: None,
            orphaned,
            displaced: Vec::new(),
        }
    }

    /// `id` が `keep` を保持していなければ現在の紐付けを外す
    fn release(&mut self, id: &ConnectionId, keep: Option<&SessionToken>) -> Option<GraceStart> {
        let connection = self.connections.get_mut(id)?;
        if keep.is_some_and(|token| connection.holds(token)) {
            return None;
        }
        let previous = connection.unbind()?;
        self.enter_grace_if_orphaned(&previous.token)
    }

    /// `token` を保持する他の接続の紐付けをすべて外す
    fn displace(&mut self, token: &SessionToken, keep: &ConnectionId) -> Vec<ConnectionId> {
        let mut displaced: Vec<ConnectionId> = self
            .connections
            .values_mut()
            .filter(|connection| &connection.id != keep && connection.holds(token))
            .map(|connection| {
                connection.unbind();
                connection.id.clone()
            })
            .collect();
        displaced.sort();
        displaced
    }

    fn enter_grace_if_orphaned(&mut self, token: &SessionToken) -> Option<GraceStart> {
        if self.is_held(token) {
            return None;
        }
        let session = self.sessions.get_mut(token)?;
        let epoch = session.enter_grace();
        Some(GraceStart {
            token: token.clone(),
            username: session.username.clone(),
            epoch,
        })
    }

    /// 接続をレジストリから削除
    ///
    /// join していない接続なら `Ok(None)` を返す。セッションは残り、これが最後の
    /// 接続だった場合は猶予期間に入る。
    pub fn disconnect(
        &mut self,
        id: &ConnectionId,
    ) -> Result<Option<DisconnectOutcome>, LobbyError> {
        let mut connection = self
            .connections
            .remove(id)
            .ok_or_else(|| LobbyError::ConnectionNotFound(id.as_str().to_string()))?;

        let Some(identity) = connection.unbind() else {
            return Ok(None);
        };
        let grace = self.enter_grace_if_orphaned(&identity.token);
        Ok(Some(DisconnectOutcome { identity, grace }))
    }

    /// 猶予期間を確定させる
    ///
    /// セッションが `epoch` の猶予期間中で、トークンを保持する接続がない場合のみ削除する。
    /// 再接続に負けたタイマーでは何もしない。
    pub fn expire(&mut self, token: &SessionToken, epoch: GraceEpoch) -> Option<Session> {
        let session = self.sessions.get(token)?;
        if !session.is_in_grace(epoch) || self.is_held(token) {
            return None;
        }
        self.sessions.remove(token)
    }

    fn is_held(&self, token: &SessionToken) -> bool {
        self.connections
            .values()
            .any(|connection| connection.holds(token))
    }

    /// join 済み接続のユーザー名（重複なし、ソート済み）
    pub fn presence(&self) -> Vec<Username> {
        self.connections
            .values()
            .filter_map(|connection| connection.identity.as_ref())
            .map(|identity| identity.username.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 登録済みの全接続（join の有無を問わない、ソート済み）
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self.connections.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn identity_of(&self, id: &ConnectionId) -> Option<&Identity> {
        self.connections.get(id)?.identity.as_ref()
    }

    pub fn session(&self, token: &SessionToken) -> Option<&Session> {
        self.sessions.get(token)
    }

    /// `token` を保持している接続
    pub fn holders_of(&self, token: &SessionToken) -> Vec<ConnectionId> {
        let mut holders: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|connection| connection.holds(token))
            .map(|connection| connection.id.clone())
            .collect();
        holders.sort();
        holders
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
