//! # Country Codes
//!
//! `CountryCode` is the validated key of every country table: an ISO 3166-1
//! alpha-2 code, or a user-defined 2–3 character identifier introduced
//! through overrides.
//!
//! ## Validation
//!
//! Codes are trimmed and uppercased at construction. They must be 2 or 3
//! ASCII alphanumeric characters and must not be all digits, so a numeric
//! ISO code (`"554"`) can never be confused with a table key. An empty code
//! is therefore unrepresentable, which is what keeps a list separator from
//! ever being a valid country value.

use std::borrow::Borrow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A validated, uppercase country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Validate and normalize a code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidCode`] when the trimmed input is
    /// not 2–3 ASCII alphanumerics, or is all digits.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ConfigurationError> {
        let trimmed = value.as_ref().trim();
        let well_formed = (2..=3).contains(&trimmed.len())
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric())
            && !trimmed.chars().all(|c| c.is_ascii_digit());
        if !well_formed {
            return Err(ConfigurationError::InvalidCode {
                value: trimmed.to_string(),
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Access the code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for two-letter codes, the only shape that can name an ISO
    /// territory or be detected from a locale's region subtag.
    pub fn is_alpha2(&self) -> bool {
        self.0.len() == 2 && self.0.chars().all(|c| c.is_ascii_alphabetic())
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CountryCode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for CountryCode {
    type Error = ConfigurationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets tables keyed by `CountryCode` be queried with an uppercase `&str`.
impl Borrow<str> for CountryCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Parse a list of codes, failing on the first malformed entry.
///
/// # Errors
///
/// Returns the [`ConfigurationError`] of the first invalid code.
pub fn parse_codes<I, S>(codes: I) -> Result<Vec<CountryCode>, ConfigurationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes.into_iter().map(CountryCode::new).collect()
}
