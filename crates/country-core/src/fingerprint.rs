//! # Fingerprints — Content-Addressed Configuration Keys
//!
//! A `Fingerprint` is the SHA-256 digest of a value's canonical bytes. It is
//! the cache address for effective tables and resolved lists: two
//! configurations share a cache entry exactly when their canonical encodings
//! are byte-identical.
//!
//! ## Invariant
//!
//! A `Fingerprint` can only be computed from `CanonicalBytes`, so every key
//! in the caches flows through the same canonicalization pipeline. This is
//! enforced by the signature of [`Fingerprint::from_canonical()`].

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;

/// SHA-256 digest of a canonically encoded configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of any serializable value.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonicalizationError`] from [`CanonicalBytes::new()`].
    pub fn of(value: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let cb = CanonicalBytes::new(value)?;
        Ok(Self::from_canonical(&cb))
    }

    /// Digest canonical bytes.
    pub fn from_canonical(data: &CanonicalBytes) -> Self {
        let hash = Sha256::digest(data.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// First 12 hex characters, for log fields.
    pub fn short(&self) -> String {
        self.0[..6].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

// Serialized as hex so a table fingerprint can be nested inside the
// ordering configuration that is itself fingerprinted.
impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
