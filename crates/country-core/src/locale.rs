//! # Locale Tags
//!
//! Parses locale input such as `en`, `fr-CA`, `fr_CA`, `zh-Hans-TW` or a
//! POSIX-style `de_AT.UTF-8@euro` into a normalized [`Locale`]. Hyphen and
//! underscore separators are equivalent; the language is lowercased, a
//! script subtag is titlecased and a region subtag is uppercased.
//!
//! The region subtag drives auto-detection of a "first" country, and the
//! language drives base-language lookups in `FIRST_BY_LANGUAGE`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::code::CountryCode;
use crate::error::ConfigurationError;

/// A normalized locale tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    language: String,
    script: Option<String>,
    region: Option<String>,
}

impl Locale {
    /// Parse and normalize a locale tag.
    ///
    /// `C` and `POSIX` map to `en`. Variant subtags (5–8 characters) are
    /// accepted and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidLocale`] when the language
    /// subtag is missing or malformed, or a later subtag has no recognizable
    /// shape.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let invalid = || ConfigurationError::InvalidLocale {
            value: raw.to_string(),
        };

        let trimmed = raw.trim();
        let trimmed = trimmed.split('@').next().unwrap_or(trimmed);
        let trimmed = trimmed.split('.').next().unwrap_or(trimmed).trim();
        if trimmed.eq_ignore_ascii_case("c") || trimmed.eq_ignore_ascii_case("posix") {
            return Ok(Self::language_only("en"));
        }

        let normalized = trimmed.replace('_', "-");
        let mut subtags = normalized.split('-');

        let language = subtags.next().unwrap_or_default();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut locale = Self::language_only(language);
        for subtag in subtags {
            let len = subtag.len();
            let alpha = subtag.chars().all(|c| c.is_ascii_alphabetic());
            let digits = subtag.chars().all(|c| c.is_ascii_digit());
            if len == 4 && alpha && locale.script.is_none() && locale.region.is_none() {
                let mut chars = subtag.chars();
                let script: String = chars
                    .next()
                    .map(|c| c.to_ascii_uppercase())
                    .into_iter()
                    .chain(chars.map(|c| c.to_ascii_lowercase()))
                    .collect();
                locale.script = Some(script);
            } else if ((len == 2 && alpha) || (len == 3 && digits)) && locale.region.is_none() {
                locale.region = Some(subtag.to_ascii_uppercase());
            } else if is_variant(subtag) {
                continue;
            } else {
                return Err(invalid());
            }
        }
        Ok(locale)
    }

    fn language_only(language: &str) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            script: None,
            region: None,
        }
    }

    /// The lowercase language subtag (`fr` for `fr-CA`).
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The titlecased script subtag, if any.
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// The uppercase region subtag, if any (alphabetic or UN M.49 digits).
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// The locale reduced to its language subtag.
    pub fn base(&self) -> Locale {
        Self::language_only(&self.language)
    }

    /// True when the locale carries nothing beyond a language.
    pub fn is_base(&self) -> bool {
        self.script.is_none() && self.region.is_none()
    }

    /// The region subtag as a country code, when it is a two-letter region.
    ///
    /// Numeric regions such as `es-419` name a UN M.49 area, not a country,
    /// and yield `None`.
    pub fn country(&self) -> Option<CountryCode> {
        self.region
            .as_deref()
            .filter(|r| r.chars().all(|c| c.is_ascii_alphabetic()))
            .and_then(|r| CountryCode::new(r).ok())
    }

    /// The normalized tag, joined with hyphens (`fr-CA`, `zh-Hant-TW`).
    pub fn tag(&self) -> String {
        let mut tag = self.language.clone();
        for part in [&self.script, &self.region].into_iter().flatten() {
            tag.push('-');
            tag.push_str(part);
        }
        tag
    }
}

/// BCP 47 variant: 5–8 alphanumerics, or 4 starting with a digit.
fn is_variant(subtag: &str) -> bool {
    let alnum = subtag.chars().all(|c| c.is_ascii_alphanumeric());
    let starts_with_digit = subtag.starts_with(|c: char| c.is_ascii_digit());
    alnum && ((5..=8).contains(&subtag.len()) || (subtag.len() == 4 && starts_with_digit))
}

impl Default for Locale {
    fn default() -> Self {
        Self::language_only("en")
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Locale {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Locale {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
