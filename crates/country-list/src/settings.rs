//! # Settings and Options
//!
//! Two views of the same flat option namespace:
//!
//! - [`Settings`] is the process-wide layer. Every field has a value, and
//!   defaults match an unconfigured deployment (common names on, no first
//!   countries, `flags/{code}.gif`).
//! - [`CountriesOptions`] is a partial layer. It is used for per-field
//!   options and for context frames; an unset (`None`) field falls through
//!   to the next layer. An explicitly set empty value counts as set.
//!
//! ## Documents
//!
//! Both load from YAML or JSON with `SCREAMING_SNAKE_CASE` keys. Keys may
//! carry a `COUNTRIES_` prefix, so a block lifted from a framework settings
//! module works unchanged:
//!
//! ```yaml
//! COUNTRIES_FIRST: [US, GB]
//! COUNTRIES_FIRST_BREAK: "──────"
//! FIRST_BY_LANGUAGE:
//!   fr: [FR, CH, BE, LU]
//!   fr-CA: [CA, US]
//! OVERRIDE:
//!   AU: null
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use country_core::{ConfigurationError, CountryCode, Locale};
use country_data::RegionCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::overrides::{OnlyEntry, OverrideValue};

/// Default flag image template.
pub const DEFAULT_FLAG_URL: &str = "flags/{code}.gif";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Process-wide options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default, deny_unknown_fields)]
pub struct Settings {
    /// Restrict the table to these codes.
    #[serde(alias = "COUNTRIES_ONLY")]
    pub only: Vec<OnlyEntry>,
    /// Exclude, rename, or redefine individual codes.
    #[serde(rename = "OVERRIDE", alias = "COUNTRIES_OVERRIDE")]
    pub overrides: BTreeMap<CountryCode, OverrideValue>,
    /// Substitute registered common names for ISO names.
    #[serde(alias = "COUNTRIES_COMMON_NAMES")]
    pub common_names: bool,
    /// Countries shown ahead of the alphabetical list.
    #[serde(alias = "COUNTRIES_FIRST")]
    pub first: Vec<CountryCode>,
    /// Sort the first countries by name instead of keeping their order.
    #[serde(alias = "COUNTRIES_FIRST_SORT")]
    pub first_sort: bool,
    /// Repeat the first countries in the alphabetical list.
    #[serde(alias = "COUNTRIES_FIRST_REPEAT")]
    pub first_repeat: bool,
    /// Separator label between the first countries and the rest.
    #[serde(alias = "COUNTRIES_FIRST_BREAK")]
    pub first_break: Option<String>,
    /// First countries per locale tag or base language.
    #[serde(alias = "COUNTRIES_FIRST_BY_LANGUAGE")]
    pub first_by_language: BTreeMap<Locale, Vec<CountryCode>>,
    /// Promote the locale's own country.
    #[serde(alias = "COUNTRIES_FIRST_AUTO_DETECT")]
    pub first_auto_detect: bool,
    /// Flag image template with `{code}` and `{code_upper}` placeholders.
    #[serde(alias = "COUNTRIES_FLAG_URL")]
    pub flag_url: String,
    /// Restrict the table to countries inside these UN M.49 regions.
    #[serde(alias = "COUNTRIES_REGION_ONLY")]
    pub region_only: Vec<RegionCode>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            only: Vec::new(),
            overrides: BTreeMap::new(),
            common_names: true,
            first: Vec::new(),
            first_sort: false,
            first_repeat: false,
            first_break: None,
            first_by_language: BTreeMap::new(),
            first_auto_detect: false,
            flag_url: DEFAULT_FLAG_URL.to_string(),
            region_only: Vec::new(),
        }
    }
}

impl Settings {
    /// Parse a YAML settings document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] for malformed YAML, unknown
    /// keys, invalid codes or locale tags, and bad override values.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigurationError> {
        parse_yaml(source, "settings")
    }

    /// Parse a JSON settings document.
    ///
    /// # Errors
    ///
    /// As [`Settings::from_yaml_str`].
    pub fn from_json_str(source: &str) -> Result<Self, ConfigurationError> {
        parse_json(source, "settings")
    }

    /// Read a settings file; `.json` files are parsed as JSON, anything
    /// else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Io`] if the file cannot be read, then
    /// the parse errors of the chosen format.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        from_path(path.as_ref())
    }

    /// This layer as a fully populated [`CountriesOptions`].
    pub fn as_options(&self) -> CountriesOptions {
        CountriesOptions {
            only: Some(self.only.clone()),
            overrides: Some(self.overrides.clone()),
            common_names: Some(self.common_names),
            first: Some(self.first.clone()),
            first_sort: Some(self.first_sort),
            first_repeat: Some(self.first_repeat),
            first_break: Some(self.first_break.clone().unwrap_or_default()),
            first_by_language: Some(self.first_by_language.clone()),
            first_auto_detect: Some(self.first_auto_detect),
            flag_url: Some(self.flag_url.clone()),
            region_only: Some(self.region_only.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// CountriesOptions
// ---------------------------------------------------------------------------

/// A partial option layer: per-field options or one context frame.
///
/// Build with the `with_*` methods or load from a document. An empty
/// `first_break` label means "no separator".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct CountriesOptions {
    #[serde(default, alias = "COUNTRIES_ONLY", skip_serializing_if = "Option::is_none")]
    pub only: Option<Vec<OnlyEntry>>,
    #[serde(
        default,
        rename = "OVERRIDE",
        alias = "COUNTRIES_OVERRIDE",
        skip_serializing_if = "Option::is_none"
    )]
    pub overrides: Option<BTreeMap<CountryCode, OverrideValue>>,
    #[serde(default, alias = "COUNTRIES_COMMON_NAMES", skip_serializing_if = "Option::is_none")]
    pub common_names: Option<bool>,
    #[serde(default, alias = "COUNTRIES_FIRST", skip_serializing_if = "Option::is_none")]
    pub first: Option<Vec<CountryCode>>,
    #[serde(default, alias = "COUNTRIES_FIRST_SORT", skip_serializing_if = "Option::is_none")]
    pub first_sort: Option<bool>,
    #[serde(default, alias = "COUNTRIES_FIRST_REPEAT", skip_serializing_if = "Option::is_none")]
    pub first_repeat: Option<bool>,
    #[serde(default, alias = "COUNTRIES_FIRST_BREAK", skip_serializing_if = "Option::is_none")]
    pub first_break: Option<String>,
    #[serde(
        default,
        alias = "COUNTRIES_FIRST_BY_LANGUAGE",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_by_language: Option<BTreeMap<Locale, Vec<CountryCode>>>,
    #[serde(
        default,
        alias = "COUNTRIES_FIRST_AUTO_DETECT",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_auto_detect: Option<bool>,
    #[serde(default, alias = "COUNTRIES_FLAG_URL", skip_serializing_if = "Option::is_none")]
    pub flag_url: Option<String>,
    #[serde(default, alias = "COUNTRIES_REGION_ONLY", skip_serializing_if = "Option::is_none")]
    pub region_only: Option<Vec<RegionCode>>,
}

impl CountriesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML options document.
    ///
    /// # Errors
    ///
    /// As [`Settings::from_yaml_str`].
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigurationError> {
        parse_yaml(source, "options")
    }

    /// Read an options file (`.json` or YAML).
    ///
    /// # Errors
    ///
    /// As [`Settings::from_path`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        from_path(path.as_ref())
    }

    /// Bare codes for `ONLY`.
    pub fn with_only<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = CountryCode>,
    {
        self.only = Some(codes.into_iter().map(OnlyEntry::Code).collect());
        self
    }

    /// Mixed `ONLY` entries (bare codes and renames).
    pub fn with_only_entries(mut self, entries: Vec<OnlyEntry>) -> Self {
        self.only = Some(entries);
        self
    }

    /// Add one `OVERRIDE` entry.
    pub fn with_override(mut self, code: CountryCode, value: impl Into<OverrideValue>) -> Self {
        self.overrides
            .get_or_insert_with(BTreeMap::new)
            .insert(code, value.into());
        self
    }

    pub fn with_common_names(mut self, enabled: bool) -> Self {
        self.common_names = Some(enabled);
        self
    }

    pub fn with_first<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = CountryCode>,
    {
        self.first = Some(codes.into_iter().collect());
        self
    }

    pub fn with_first_sort(mut self, enabled: bool) -> Self {
        self.first_sort = Some(enabled);
        self
    }

    pub fn with_first_repeat(mut self, enabled: bool) -> Self {
        self.first_repeat = Some(enabled);
        self
    }

    pub fn with_first_break(mut self, label: impl Into<String>) -> Self {
        self.first_break = Some(label.into());
        self
    }

    /// Add one `FIRST_BY_LANGUAGE` entry.
    pub fn with_first_for_language<I>(mut self, locale: Locale, codes: I) -> Self
    where
        I: IntoIterator<Item = CountryCode>,
    {
        self.first_by_language
            .get_or_insert_with(BTreeMap::new)
            .insert(locale, codes.into_iter().collect());
        self
    }

    /// Replace the whole `FIRST_BY_LANGUAGE` map (an empty map still counts
    /// as set).
    pub fn with_first_by_language(mut self, map: BTreeMap<Locale, Vec<CountryCode>>) -> Self {
        self.first_by_language = Some(map);
        self
    }

    pub fn with_first_auto_detect(mut self, enabled: bool) -> Self {
        self.first_auto_detect = Some(enabled);
        self
    }

    pub fn with_flag_url(mut self, template: impl Into<String>) -> Self {
        self.flag_url = Some(template.into());
        self
    }

    pub fn with_region_only<I>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = RegionCode>,
    {
        self.region_only = Some(regions.into_iter().collect());
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Field-wise merge: every field set here wins, unset fields come from
    /// `lower`.
    pub fn over(&self, lower: &CountriesOptions) -> CountriesOptions {
        fn pick<T: Clone>(upper: &Option<T>, lower: &Option<T>) -> Option<T> {
            upper.as_ref().or(lower.as_ref()).cloned()
        }
        CountriesOptions {
            only: pick(&self.only, &lower.only),
            overrides: pick(&self.overrides, &lower.overrides),
            common_names: pick(&self.common_names, &lower.common_names),
            first: pick(&self.first, &lower.first),
            first_sort: pick(&self.first_sort, &lower.first_sort),
            first_repeat: pick(&self.first_repeat, &lower.first_repeat),
            first_break: pick(&self.first_break, &lower.first_break),
            first_by_language: pick(&self.first_by_language, &lower.first_by_language),
            first_auto_detect: pick(&self.first_auto_detect, &lower.first_auto_detect),
            flag_url: pick(&self.flag_url, &lower.flag_url),
            region_only: pick(&self.region_only, &lower.region_only),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn parse_yaml<T: DeserializeOwned>(source: &str, source_name: &str) -> Result<T, ConfigurationError> {
    serde_yaml::from_str(source).map_err(|e| ConfigurationError::Parse {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })
}

fn parse_json<T: DeserializeOwned>(source: &str, source_name: &str) -> Result<T, ConfigurationError> {
    serde_json::from_str(source).map_err(|e| ConfigurationError::Parse {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })
}

fn from_path<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigurationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let source_name = path.display().to_string();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_json(&content, &source_name)
    } else {
        parse_yaml(&content, &source_name)
    }
}
