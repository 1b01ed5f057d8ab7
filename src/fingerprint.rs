//! Content fingerprints used for change detection.
//!
//! A fingerprint is a short lowercase hex digest. Source files are
//! fingerprinted individually; a sprite's fingerprint aggregates the
//! sorted per-file fingerprints, so directory listing order never changes
//! it.

use std::fmt;

/// Number of hex characters kept from the blake3 digest.
pub const FINGERPRINT_LEN: usize = 12;

/// A truncated blake3 content hash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint raw file contents.
    pub fn of_bytes(contents: &[u8]) -> Self {
        let hash = blake3::hash(contents);
        Self(hash.to_hex()[..FINGERPRINT_LEN].to_string())
    }

    /// Aggregate a set of fingerprints.
    ///
    /// The inputs are sorted by value before hashing.
    pub fn aggregate<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a Fingerprint>,
    {
        let mut sorted: Vec<&str> = parts.into_iter().map(|f| f.as_str()).collect();
        sorted.sort_unstable();

        let mut hasher = blake3::Hasher::new();
        for (i, part) in sorted.iter().enumerate() {
            if i > 0 {
                hasher.update(b"\n");
            }
            hasher.update(part.as_bytes());
        }
        Self(hasher.finalize().to_hex()[..FINGERPRINT_LEN].to_string())
    }

    /// Wrap a fingerprint read back from a persisted sprite.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
