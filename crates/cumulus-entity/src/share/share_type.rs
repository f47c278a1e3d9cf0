//! Share type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of share recipient, stored as its legacy integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ShareType {
    /// Shared with a single local user.
    User,
    /// Shared with every member of a group.
    Group,
    /// Public link identified by a token.
    Link,
    /// Shared with a user on another server.
    Remote,
}

/// Integer that does not name a share type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown share type {0}")]
pub struct UnknownShareType(pub i32);

impl ShareType {
    /// The legacy integer code.
    pub fn code(self) -> i32 {
        match self {
            Self::User => 0,
            Self::Group => 1,
            Self::Link => 3,
            Self::Remote => 6,
        }
    }

    /// Whether shares of this type carry a token.
    pub fn uses_token(self) -> bool {
        matches!(self, Self::Link | Self::Remote)
    }
}

impl TryFrom<i32> for ShareType {
    type Error = UnknownShareType;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::User),
            1 => Ok(Self::Group),
            3 => Ok(Self::Link),
            6 => Ok(Self::Remote),
            other => Err(UnknownShareType(other)),
        }
    }
}

impl From<ShareType> for i32 {
    fn from(value: ShareType) -> Self {
        value.code()
    }
}

impl fmt::Display for ShareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Link => "link",
            Self::Remote => "remote",
        };
        f.write_str(name)
    }
}
