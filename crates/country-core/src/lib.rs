//! # country-core — Foundational Types for Country Lists
//!
//! This crate is the leaf of the workspace. It defines the primitives every
//! other crate builds on; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtypes.** `CountryCode` and `Locale` are constructed only
//!    through validating constructors (and validating `Deserialize`). No
//!    bare strings for codes or locale tags.
//!
//! 2. **Lazy names.** `TranslatableName` carries a message key; resolution
//!    to a locale string happens through a `Translator` at the display or
//!    lookup boundary, never earlier.
//!
//! 3. **Pluggable collation.** All name sorting flows through a `Collator`;
//!    `FoldingCollator` is the built-in fallback.
//!
//! 4. **Canonical fingerprints.** Cache keys are SHA-256 digests of
//!    `CanonicalBytes` (RFC 8785), so equal configurations always share a
//!    cache entry.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `country-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod code;
pub mod collation;
pub mod error;
pub mod fingerprint;
pub mod locale;
pub mod name;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use code::{parse_codes, CountryCode};
pub use collation::{fold_key, Collator, FoldingCollator};
pub use error::{
    CanonicalizationError, ConfigurationError, CountriesError, CountriesResult,
    DataIntegrityError,
};
pub use fingerprint::Fingerprint;
pub use locale::Locale;
pub use name::{Catalog, TranslatableName, Translator, Untranslated};
