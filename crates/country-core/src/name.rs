//! # Lazy Translatable Names
//!
//! Country and region names are stored as [`TranslatableName`] message keys
//! and only resolved to a concrete string when a locale is known (ordering,
//! lookup, display). One effective table therefore serves every locale.
//!
//! The translation engine itself is external. It is modelled by the
//! [`Translator`] trait; [`Untranslated`] returns every key as-is and
//! [`Catalog`] is a small in-memory message catalog loadable from YAML.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::locale::Locale;

/// A deferred, translatable name. The inner string is the message key,
/// which by convention is the English text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslatableName(String);

impl TranslatableName {
    /// Wrap a message key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The untranslated message key.
    pub fn key(&self) -> &str {
        &self.0
    }

    /// Resolve the name for `locale`, falling back to the key itself when
    /// the translator has no entry.
    pub fn resolve(&self, translator: &dyn Translator, locale: &Locale) -> String {
        translator
            .translate(&self.0, locale)
            .unwrap_or_else(|| self.0.clone())
    }
}

impl fmt::Display for TranslatableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TranslatableName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TranslatableName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// The `translate(key, locale)` capability supplied by the host framework.
pub trait Translator: Send + Sync + fmt::Debug {
    /// Translate `key` into `locale`, or `None` when no translation exists.
    fn translate(&self, key: &str, locale: &Locale) -> Option<String>;
}

/// A translator with no catalog: every name resolves to its key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Untranslated;

impl Translator for Untranslated {
    fn translate(&self, _key: &str, _locale: &Locale) -> Option<String> {
        None
    }
}

/// In-memory message catalog keyed by locale tag.
///
/// Lookup tries the exact tag (`fr-CA`) and then the base language (`fr`).
///
/// ```yaml
/// fr:
///   Germany: Allemagne
///   New Zealand: Nouvelle-Zélande
/// fr-CA:
///   United States: États-Unis d'Amérique
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    messages: BTreeMap<String, BTreeMap<String, String>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one translation.
    pub fn insert(&mut self, locale: &Locale, key: impl Into<String>, value: impl Into<String>) {
        self.messages
            .entry(locale.tag())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Builder-style bulk insert for one locale.
    pub fn with_messages<I, K, V>(mut self, locale: &Locale, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in messages {
            self.insert(locale, key, value);
        }
        self
    }

    /// Parse a YAML document mapping locale tags to `key: translation` maps.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] for malformed YAML and
    /// [`ConfigurationError::InvalidLocale`] for an unparseable locale key.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigurationError> {
        let raw: BTreeMap<String, BTreeMap<String, String>> =
            serde_yaml::from_str(source).map_err(|e| ConfigurationError::Parse {
                source_name: "message catalog".to_string(),
                reason: e.to_string(),
            })?;
        let mut catalog = Self::new();
        for (tag, messages) in raw {
            let locale = Locale::parse(&tag)?;
            catalog = catalog.with_messages(&locale, messages);
        }
        Ok(catalog)
    }

    /// Read and parse a YAML catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Io`] if the file cannot be read, then
    /// the errors of [`Catalog::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Number of locales with at least one message.
    pub fn locale_count(&self) -> usize {
        self.messages.len()
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str, locale: &Locale) -> Option<String> {
        self.messages
            .get(&locale.tag())
            .and_then(|m| m.get(key))
            .or_else(|| {
                self.messages
                    .get(locale.language())
                    .and_then(|m| m.get(key))
            })
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fr() -> Locale {
        Locale::parse("fr").unwrap()
    }

    #[test]
    fn untranslated_returns_key() {
        let name = TranslatableName::new("New Zealand");
        assert_eq!(name.resolve(&Untranslated, &fr()), "New Zealand");
    }

    #[test]
    fn catalog_exact_then_base_language() {
        let fr_ca = Locale::parse("fr-CA").unwrap();
        let catalog = Catalog::new()
            .with_messages(&fr(), [("Germany", "Allemagne"), ("United States", "États-Unis")])
            .with_messages(&fr_ca, [("United States", "États-Unis d'Amérique")]);

        let us = TranslatableName::new("United States");
        let de = TranslatableName::new("Germany");
        assert_eq!(us.resolve(&catalog, &fr_ca), "États-Unis d'Amérique");
        assert_eq!(us.resolve(&catalog, &fr()), "États-Unis");
        assert_eq!(de.resolve(&catalog, &fr_ca), "Allemagne");
        assert_eq!(de.resolve(&catalog, &Locale::default()), "Germany");
    }

    #[test]
    fn catalog_from_yaml() {
        let catalog = Catalog::from_yaml_str(
            "fr:\n  Germany: Allemagne\nde_AT:\n  Germany: Deutschland\n",
        )
        .unwrap();
        assert_eq!(catalog.locale_count(), 2);
        let de_at = Locale::parse("de-AT").unwrap();
        assert_eq!(catalog.translate("Germany", &de_at).as_deref(), Some("Deutschland"));
    }

    #[test]
    fn catalog_rejects_bad_locale_key() {
        let err = Catalog::from_yaml_str("'!!':\n  Germany: x\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidLocale { .. }));
    }
}
