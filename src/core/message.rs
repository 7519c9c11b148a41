use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::core::constants::UNTITLED_SOURCE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_bot(self) -> bool {
        self == Role::Bot
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "bot" => Ok(Role::Bot),
            _ => Err(format!("invalid message role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// A web page cited by the model. Two sources are the same source when their
/// `uri` matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

impl Source {
    /// Builds a source, substituting the placeholder title when `title` is
    /// missing or blank.
    pub fn new(uri: impl Into<String>, title: Option<&str>) -> Self {
        let title = title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(UNTITLED_SOURCE);
        Self {
            uri: uri.into(),
            title: title.to_string(),
        }
    }
}

/// Opaque message identifier. Lexical order matches creation order within a
/// process.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Allocates a fresh id from the wall clock and a process-wide sequence
/// number, so two messages created in the same millisecond still differ and
/// keep their order.
pub fn next_message_id() -> MessageId {
    let millis = chrono::Utc::now().timestamp_millis().max(0);
    let sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MessageId(format!("{millis:013}-{sequence:08}"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            id: next_message_id(),
            role,
            text: text.into(),
            sources,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text, Vec::new())
    }

    pub fn bot(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self::new(Role::Bot, text, sources)
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_bot(&self) -> bool {
        self.role.is_bot()
    }
}
