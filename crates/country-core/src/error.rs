//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the country-list crates. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Dataset errors are fatal and carry the offending row and field.
//! - Configuration errors name the option or code that is malformed so they
//!   surface close to their source.
//! - Lookups that simply find nothing return `Option::None`, never an error.

use thiserror::Error;

/// Convenience alias used by the resolver and facade layers.
pub type CountriesResult<T> = Result<T, CountriesError>;

/// Top-level error type for country-list resolution.
#[derive(Error, Debug)]
pub enum CountriesError {
    /// The embedded base dataset is malformed.
    #[error("data integrity error: {0}")]
    DataIntegrity(#[from] DataIntegrityError),

    /// A restriction list names a code that does not exist after overrides.
    #[error("unknown country code '{code}' in {option} restriction")]
    UnknownCountry {
        /// The code that could not be found.
        code: String,
        /// The configuration option that referenced it (e.g. `ONLY`).
        option: &'static str,
    },

    /// Settings, options, or override descriptors are malformed.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Fingerprint encoding failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// The base dataset (or region table) failed validation at load time.
///
/// Cloneable so a failed load can be memoized and reported identically on
/// every subsequent call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    /// The embedded document could not be parsed at all.
    #[error("cannot parse {source_name}: {reason}")]
    Parse {
        /// Name of the embedded document.
        source_name: String,
        /// Parser message.
        reason: String,
    },

    /// A required field is absent or empty.
    #[error("row {row}: missing required field '{field}'")]
    MissingField {
        /// Zero-based row index.
        row: usize,
        /// Field name.
        field: &'static str,
    },

    /// A field holds a value of the wrong shape.
    #[error("row {row}: invalid {field} '{value}'")]
    InvalidValue {
        /// Zero-based row index.
        row: usize,
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// A field that must be unique across the table is repeated.
    #[error("row {row}: duplicate {field} '{value}'")]
    Duplicate {
        /// Zero-based row index.
        row: usize,
        /// Field name.
        field: &'static str,
        /// Repeated value.
        value: String,
    },

    /// An auxiliary table references a code the main table does not define.
    #[error("{table} references unknown code '{code}'")]
    UnknownReference {
        /// Auxiliary table name.
        table: &'static str,
        /// Dangling code.
        code: String,
    },
}

/// Misconfiguration detected while loading settings or resolving a table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A country code does not match the 2–3 character identifier pattern.
    #[error("invalid country code '{value}': expected 2 or 3 ASCII letters or digits, not all digits")]
    InvalidCode {
        /// The rejected input.
        value: String,
    },

    /// A locale tag could not be parsed.
    #[error("invalid locale '{value}'")]
    InvalidLocale {
        /// The rejected input.
        value: String,
    },

    /// An `OVERRIDE` entry is malformed.
    #[error("invalid override for '{code}': {reason}")]
    InvalidOverride {
        /// Override key.
        code: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A named setting holds an unusable value.
    #[error("invalid setting {key}: {reason}")]
    InvalidSetting {
        /// Setting name.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A settings or catalog document could not be parsed.
    #[error("cannot parse {source_name}: {reason}")]
    Parse {
        /// Document name or path.
        source_name: String,
        /// Parser message.
        reason: String,
    },

    /// A settings or catalog file could not be read.
    #[error("cannot read {path}: {reason}")]
    Io {
        /// File path.
        path: String,
        /// OS error message.
        reason: String,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
