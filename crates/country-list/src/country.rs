//! # Country Value Object
//!
//! A code bundled with its effective record and the facade that produced it,
//! so attribute access needs no further lookups.

use std::collections::BTreeMap;
use std::fmt;

use country_core::{CountryCode, Locale};
use country_data::CountryRecord;
use serde::Serialize;
use serde_json::Value;

use crate::countries::Countries;

/// First regional indicator symbol (U+1F1E6, "A").
const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;

/// One country of an effective table.
#[derive(Debug, Clone)]
pub struct Country {
    countries: Countries,
    record: CountryRecord,
    flag_url: Option<String>,
}

impl Country {
    pub(crate) fn new(countries: Countries, record: CountryRecord, flag_url: Option<String>) -> Self {
        Self {
            countries,
            record,
            flag_url,
        }
    }

    pub fn code(&self) -> &CountryCode {
        self.record.code()
    }

    /// Display name in `locale`.
    pub fn name(&self, locale: &Locale) -> String {
        self.record.name().resolve(self.countries.translator(), locale)
    }

    pub fn alpha3(&self) -> Option<&str> {
        self.record.alpha3()
    }

    pub fn numeric(&self) -> Option<u16> {
        self.record.numeric()
    }

    pub fn numeric_padded(&self) -> Option<String> {
        self.record.numeric_padded()
    }

    pub fn ioc_code(&self) -> Option<&str> {
        self.record.ioc_code()
    }

    pub fn flag_url(&self) -> Option<&str> {
        self.flag_url.as_deref()
    }

    pub fn unicode_flag(&self) -> Option<String> {
        unicode_flag(self.code().as_str())
    }

    /// Value of a registered extension for this country.
    pub fn extension(&self, name: &str) -> Option<Value> {
        self.countries.extensions().call(name, self.code())
    }

    /// Every attribute, names resolved in `locale`.
    pub fn info(&self, locale: &Locale) -> CountryInfo {
        let extensions = self
            .countries
            .extensions()
            .names()
            .filter_map(|name| Some((name.to_string(), self.extension(name)?)))
            .collect();
        CountryInfo {
            code: self.code().clone(),
            name: self.name(locale),
            alpha3: self.alpha3().map(str::to_string),
            numeric: self.numeric(),
            numeric_padded: self.numeric_padded(),
            ioc_code: self.ioc_code().map(str::to_string),
            flag_url: self.flag_url.clone(),
            unicode_flag: self.unicode_flag(),
            extensions,
        }
    }
}

impl PartialEq for Country {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for Country {}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code().as_str())
    }
}

/// Serializable snapshot of a [`Country`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryInfo {
    pub code: CountryCode,
    pub name: String,
    pub alpha3: Option<String>,
    pub numeric: Option<u16>,
    pub numeric_padded: Option<String>,
    pub ioc_code: Option<String>,
    pub flag_url: Option<String>,
    pub unicode_flag: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, Value>,
}

/// The regional-indicator pair for a two-letter code, e.g. 🇳🇿 for `NZ`.
pub fn unicode_flag(code: &str) -> Option<String> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    code.chars()
        .map(|c| char::from_u32(REGIONAL_INDICATOR_A + (c.to_ascii_uppercase() as u32 - 'A' as u32)))
        .collect()
}
