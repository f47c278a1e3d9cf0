//! Share permission bitmask.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Permission bitmask granted by a share.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Permissions(pub i32);

impl Permissions {
    /// No rights.
    pub const NONE: Self = Self(0);
    /// Read content.
    pub const READ: Self = Self(1);
    /// Modify content.
    pub const UPDATE: Self = Self(2);
    /// Create children.
    pub const CREATE: Self = Self(4);
    /// Delete.
    pub const DELETE: Self = Self(8);
    /// Re-share.
    pub const SHARE: Self = Self(16);
    /// Every bit above.
    pub const ALL: Self = Self(31);

    /// Parse a raw value, rejecting bits outside [`Permissions::ALL`].
    pub fn from_bits(bits: i32) -> Option<Self> {
        if (0..=Self::ALL.0).contains(&bits) {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Raw bits.
    pub fn bits(self) -> i32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no bit is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Clear the bits of `other`.
    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Permissions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_operations() {
        let rw = Permissions::READ | Permissions::UPDATE;
        assert!(rw.contains(Permissions::READ));
        assert!(!rw.contains(Permissions::SHARE));
        assert_eq!(Permissions::ALL.without(Permissions::DELETE | Permissions::CREATE).bits(), 19);
        assert_eq!(Permissions::from_bits(32), None);
        assert_eq!(Permissions::from_bits(-1), None);
    }
}
