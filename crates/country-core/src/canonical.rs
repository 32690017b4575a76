//! # Canonical Encoding
//!
//! [`CanonicalBytes`] is the RFC 8785 (JCS) encoding of a configuration
//! value and the only input accepted by [`Fingerprint`](crate::Fingerprint).
//!
//! Object keys are sorted and separators are compact, so a configuration
//! encodes to the same bytes whichever layer supplied it and whatever order
//! its maps were filled in. Non-integral numbers are refused: no option
//! carries one, and JCS number formatting is where implementations drift.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// JCS-encoded bytes of a float-free value. Built only by [`CanonicalBytes::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Encode `value`.
    ///
    /// # Errors
    ///
    /// [`CanonicalizationError::FloatRejected`] for a non-integral number,
    /// [`CanonicalizationError::SerializationFailed`] when serde cannot
    /// represent the value as JSON.
    pub fn new(value: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let tree = serde_json::to_value(value)?;
        ensure_integral(&tree)?;
        Ok(Self(serde_jcs::to_vec(&tree)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn ensure_integral(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) if !(n.is_i64() || n.is_u64()) => Err(
            CanonicalizationError::FloatRejected(n.as_f64().unwrap_or(f64::NAN)),
        ),
        Value::Array(items) => items.iter().try_for_each(ensure_integral),
        Value::Object(map) => map.values().try_for_each(ensure_integral),
        _ => Ok(()),
    }
}
