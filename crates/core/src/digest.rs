//! Salted SHA-256 digest of a linkage string

use std::ffi::OsString;
use std::fmt;

use sha2::{Digest, Sha256};

use crate::canonical::LinkageString;
use crate::error::LinkageError;

/// Secret mixed into every digest of a run
///
/// `Debug` is redacted and the type is neither `Display` nor `Serialize`.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(String);

impl Salt {
    pub fn new(salt: impl Into<String>) -> Self {
        Self(salt.into())
    }

    /// Build a salt from raw bytes, which must be valid UTF-8
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LinkageError> {
        std::str::from_utf8(bytes)
            .map(Self::new)
            .map_err(|e| LinkageError::Encoding(format!("salt is not valid UTF-8: {}", e)))
    }

    /// Build a salt from an OS string such as an environment variable
    pub fn from_os_string(value: OsString) -> Result<Self, LinkageError> {
        value
            .into_string()
            .map(Self)
            .map_err(|_| LinkageError::Encoding("salt is not valid UTF-8".to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(<redacted>)")
    }
}

/// Lowercase hex SHA-256 digest (64 characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexDigest(String);

impl HexDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash `linkage || salt` with no separator.
///
/// The missing separator matches identifiers issued by earlier pipeline
/// runs and must stay that way.
pub fn digest(linkage: &LinkageString, salt: &Salt) -> HexDigest {
    let mut hasher = Sha256::new();
    hasher.update(linkage.as_bytes());
    hasher.update(salt.as_bytes());
    HexDigest(hex::encode(hasher.finalize()))
}
