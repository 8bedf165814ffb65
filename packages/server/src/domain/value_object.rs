//! ロビーの値オブジェクト
//!
//! 文字列ベースの識別子は生成時に空文字列を拒否するので、ドメインの他の部分で
//! 再検証する必要はない。

use std::fmt;

use super::error::ValueObjectError;

/// トランスポート上の接続 1 本の識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub(super) String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::ConnectionIdEmpty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// join 時にクライアントが名乗る表示名
///
/// 空文字列のみ拒否し、前後の空白は送られたまま保持する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::UsernameEmpty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 接続とセッションを対応付ける不透明なトークン
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(pub(super) String);

impl SessionToken {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::SessionTokenEmpty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SessionToken {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// チャットメッセージ本文（トリム済み、空白のみではない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::MessageContentBlank);
        }
        if trimmed.len() == value.len() {
            return Ok(Self(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix タイムスタンプ（ミリ秒、UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// セッションの猶予期間の世代番号
///
/// 猶予期間に入るたびに新しい世代になるため、以前の猶予期間に起動したタイマーを
/// 現在のものと区別できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraceEpoch(u64);

impl GraceEpoch {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rejects_empty() {
        // テスト項目: 空文字列のユーザー名は作成できない
        // given (前提条件):
        let value = String::new();

        // when (操作):
        let result = Username::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::UsernameEmpty));
    }

    #[test]
    fn test_username_keeps_surrounding_whitespace() {
        // テスト項目: ユーザー名の前後の空白はそのまま保持される
        // given (前提条件):
        let value = " alice ".to_string();

        // when (操作):
        let username = Username::new(value).unwrap();

        // then (期待する結果):
        assert_eq!(username.as_str(), " alice ");
    }

    #[test]
    fn test_session_token_rejects_empty() {
        // テスト項目: 空のセッショントークンは作成できない
        // given (前提条件):
        let value = String::new();

        // when (操作):
        let result = SessionToken::try_from(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::SessionTokenEmpty));
    }

    #[test]
    fn test_message_content_is_trimmed() {
        // テスト項目: メッセージ本文は前後の空白が取り除かれる
        // given (前提条件):
        let value = "  hello world \n".to_string();

        // when (操作):
        let content = MessageContent::new(value).unwrap();

        // then (期待する結果):
        assert_eq!(content.as_str(), "hello world");
    }

    #[test]
    fn test_message_content_rejects_whitespace_only() {
        // テスト項目: 空白のみのメッセージは作成できない
        // given (前提条件):
        let blank = "  \t ".to_string();
        let empty = String::new();

        // when (操作):
        let blank_result = MessageContent::new(blank);
        let empty_result = MessageContent::new(empty);

        // then (期待する結果):
        assert_eq!(blank_result, Err(ValueObjectError::MessageContentBlank));
        assert_eq!(empty_result, Err(ValueObjectError::MessageContentBlank));
    }

    #[test]
    fn test_grace_epoch_next_increments() {
        // テスト項目: GraceEpoch::next は世代を 1 つ進める
        // given (前提条件):
        let epoch = GraceEpoch::new(41);

        // when (操作):
        let next = epoch.next();

        // then (期待する結果):
        assert_eq!(next.value(), 42);
        assert_ne!(next, epoch);
    }
}
