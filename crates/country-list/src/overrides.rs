//! # Override and Restriction Entries
//!
//! Value types for the `OVERRIDE` and `ONLY` options.
//!
//! An `OVERRIDE` value is one of:
//!
//! ```yaml
//! OVERRIDE:
//!   AU: null                      # exclude
//!   NZ: "Aotearoa New Zealand"    # rename, keep metadata
//!   GB: { flag_url: "uk.png" }    # metadata only, keep name
//!   XK:                           # custom entry
//!     name: "Kosovo"
//!     alpha3: "XKX"
//!     ioc_code: "KOS"
//! ```
//!
//! An `ONLY` entry is a bare code or a `[code, name]` pair.
//!
//! Descriptors reject unknown keys while the document is parsed. Shape
//! checks that need the table (a new entry without a name, `name` and
//! `names` together) run in the resolver.

use country_core::{ConfigurationError, CountryCode, TranslatableName};
use serde::{Deserialize, Serialize};

/// One `OVERRIDE` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    /// Remove the code from the table.
    Exclude,
    /// Replace the names, keeping every other field.
    Name(TranslatableName),
    /// Build a new record; omitted fields fall back to the existing one.
    Descriptor(OverrideDescriptor),
}

impl OverrideValue {
    pub fn exclude() -> Self {
        Self::Exclude
    }

    pub fn name(name: impl Into<TranslatableName>) -> Self {
        Self::Name(name.into())
    }
}

impl From<OverrideDescriptor> for OverrideValue {
    fn from(descriptor: OverrideDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

/// Structured override of a record's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<TranslatableName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<TranslatableName>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ioc_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_url: Option<String>,
}

impl OverrideDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<TranslatableName>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_names<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<TranslatableName>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_alpha3(mut self, alpha3: impl Into<String>) -> Self {
        self.alpha3 = Some(alpha3.into());
        self
    }

    pub fn with_numeric(mut self, numeric: u16) -> Self {
        self.numeric = Some(numeric);
        self
    }

    pub fn with_ioc_code(mut self, ioc_code: impl Into<String>) -> Self {
        self.ioc_code = Some(ioc_code.into());
        self
    }

    pub fn with_flag_url(mut self, flag_url: impl Into<String>) -> Self {
        self.flag_url = Some(flag_url.into());
        self
    }

    /// Check the descriptor's own fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidOverride`] when both `name` and
    /// `names` are given, `names` is empty or holds a blank name, or a code
    /// field has the wrong shape.
    pub fn validate(&self, code: &CountryCode) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidOverride {
            code: code.to_string(),
            reason,
        };
        if self.name.is_some() && self.names.is_some() {
            return Err(invalid("give either 'name' or 'names', not both".into()));
        }
        if matches!(&self.names, Some(names) if names.is_empty()) {
            return Err(invalid("'names' must not be empty".into()));
        }
        for name in self.name.iter().chain(self.names.iter().flatten()) {
            checked_name(code, name)?;
        }
        for (field, value) in [("alpha3", &self.alpha3), ("ioc_code", &self.ioc_code)] {
            if let Some(value) = value {
                if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(invalid(format!("{field} '{value}' is not three ASCII letters")));
                }
            }
        }
        if let Some(numeric) = self.numeric {
            if numeric > 999 {
                return Err(invalid(format!("numeric {numeric} is out of range 0-999")));
            }
        }
        Ok(())
    }
}

/// Trim an override or `ONLY` name. A blank name is refused.
pub(crate) fn checked_name(
    code: &CountryCode,
    name: &TranslatableName,
) -> Result<TranslatableName, ConfigurationError> {
    let trimmed = name.key().trim();
    if trimmed.is_empty() {
        return Err(ConfigurationError::InvalidOverride {
            code: code.to_string(),
            reason: "name must not be blank".to_string(),
        });
    }
    Ok(TranslatableName::new(trimmed))
}

/// One `ONLY` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OnlyEntry {
    /// Keep the code with its current record.
    Code(CountryCode),
    /// Keep (or create) the code under another name.
    Named(CountryCode, TranslatableName),
}

impl OnlyEntry {
    pub fn code(&self) -> &CountryCode {
        match self {
            Self::Code(code) | Self::Named(code, _) => code,
        }
    }
}

impl From<CountryCode> for OnlyEntry {
    fn from(code: CountryCode) -> Self {
        Self::Code(code)
    }
}
