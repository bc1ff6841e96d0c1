//! Deterministic fingerprint of the raw inputs using SHA256 hashing.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Content hash over one or more input documents.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDigest(String);

impl SourceDigest {
    /// Hash the given byte slices in order.
    /// Uses SHA256 and takes the first 16 characters for brevity.
    pub fn of(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(part);
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SourceDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceDigest({})", self.0)
    }
}

impl From<&str> for SourceDigest {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        let a = SourceDigest::of(&[b"stats", b"matchups"]);
        let b = SourceDigest::of(&[b"stats", b"matchups"]);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 16);
    }

    #[test]
    fn test_digest_order_and_separator_matter() {
        let a = SourceDigest::of(&[b"stats", b"matchups"]);
        let swapped = SourceDigest::of(&[b"matchups", b"stats"]);
        let joined = SourceDigest::of(&[b"statsmatchups"]);
        assert_ne!(a, swapped);
        assert_ne!(a, joined);
    }

    #[test]
    fn test_digest_display() {
        let digest = SourceDigest::from("abc123");
        assert_eq!(format!("{}", digest), "abc123");
        assert_eq!(format!("{:?}", digest), "SourceDigest(abc123)");
    }
}
