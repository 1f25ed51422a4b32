//! Fixed-width git object identifiers.

use std::fmt;
use std::str::FromStr;

/// Length of an object id in raw bytes.
const RAW_LEN: usize = 20;

/// A 160-bit git object id, rendered as 40 lowercase hex characters.
///
/// Identifies both commits (revisions) and blobs. The all-zero id never names
/// a real object; the cache uses it on disk to mark a frozen record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; RAW_LEN]);

/// Error returned when a string is not a 40-character hex object id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object id '{input}': expected 40 hex characters")]
pub struct ParseObjectIdError {
    /// The rejected input.
    pub input: String,
}

impl ObjectId {
    /// The all-zero id.
    pub const ZERO: ObjectId = ObjectId([0; RAW_LEN]);

    /// Wraps raw id bytes.
    pub const fn from_raw(bytes: [u8; RAW_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds an id from a slice, returning `None` unless it is exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; RAW_LEN] = bytes.try_into().ok()?;
        Some(Self(raw))
    }

    /// Returns the raw id bytes.
    pub fn as_bytes(&self) -> &[u8; RAW_LEN] {
        &self.0
    }

    /// Returns `true` for the all-zero id.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; RAW_LEN]
    }

    /// Returns the first seven hex characters, as git abbreviates.
    pub fn short(&self) -> String {
        self.to_string()[..7].to_string()
    }
}

impl FromStr for ObjectId {
    type Err = ParseObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseObjectIdError {
            input: s.to_string(),
        };
        if s.len() != RAW_LEN * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let mut raw = [0u8; RAW_LEN];
        for (i, byte) in raw.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| err())?;
        }
        Ok(Self(raw))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short())
    }
}
