//! ドメイン層の値オブジェクト定義
//!
//! プリミティブ型（String, i64, Uuid）をドメインの語彙でラップし、
//! 生成時にバリデーションを行います。

use std::fmt;

use uuid::Uuid;

use super::error::DomainError;

/// Room identifier: a short opaque code, assigned at creation.
///
/// Accepts trimmed, non-empty, ASCII-alphanumeric codes up to 32 characters.
/// Server-generated codes come from [`RoomIdFactory`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(raw: String) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.len() > 32
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(DomainError::InvalidRoomId(raw));
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

impl TryFrom<String> for RoomId {
    type Error = DomainError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Factory for server-assigned room codes.
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// Generate a fresh 8-character uppercase room code.
    ///
    /// Codes are derived from a v4 UUID, so collisions are unlikely but not
    /// impossible; callers that insert into a store must retry on collision.
    pub fn generate() -> RoomId {
        let simple = Uuid::new_v4().simple().to_string();
        RoomId(simple[..8].to_uppercase())
    }
}

/// Participant identity, server-assigned per join.
///
/// Rejoining a room creates a new identity; there is no session resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message identity, server-assigned at append time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Live transport handle identity.
///
/// Assigned when a WebSocket connection is accepted and stable for the
/// lifetime of that connection. This is the key of the Connection Registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User-supplied display name. Not unique, not checked for collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nickname(String);

impl Nickname {
    pub const DEFAULT: &'static str = "Anonymous";

    /// Create a nickname from user input. Whitespace-only input falls back to
    /// the default.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self(Self::DEFAULT.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for Nickname {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

/// Chat message body. Trimmed, never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(raw: String) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyMessageContent);
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

/// Unix timestamp in JST (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
