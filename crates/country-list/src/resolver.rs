//! # Override Resolver
//!
//! Turns the immutable base table plus the table-shaping options into an
//! [`EffectiveTable`]:
//!
//! 1. common names replace ISO display names (the ISO name stays as an
//!    alias for lookups);
//! 2. `OVERRIDE` entries exclude, rename or redefine codes;
//! 3. `ONLY` intersects the table, renaming or creating entries given as
//!    `[code, name]` pairs;
//! 4. `REGION_ONLY` keeps countries inside the listed UN M.49 regions.
//!
//! Names stay translatable tokens. The same effective table serves every
//! locale, so it is cached by [`TableConfig::fingerprint`] alone.

use std::collections::BTreeMap;

use country_core::{
    CanonicalizationError, ConfigurationError, CountriesError, CountriesResult, CountryCode,
    Fingerprint,
};
use country_data::{BaseTable, CountryRecord, RegionCode, RegionTable};
use serde::Serialize;

use crate::overrides::{checked_name, OnlyEntry, OverrideValue};
use crate::settings::CountriesOptions;

/// The options that shape the table (as opposed to its ordering).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableConfig {
    pub overrides: BTreeMap<CountryCode, OverrideValue>,
    pub only: Vec<OnlyEntry>,
    pub common_names: bool,
    pub region_only: Vec<RegionCode>,
}

impl TableConfig {
    /// Extract the table fields from a merged option set. Unset fields take
    /// their defaults.
    pub fn from_options(options: &CountriesOptions) -> Self {
        Self {
            overrides: options.overrides.clone().unwrap_or_default(),
            only: options.only.clone().unwrap_or_default(),
            common_names: options.common_names.unwrap_or(true),
            region_only: options.region_only.clone().unwrap_or_default(),
        }
    }

    /// The cache key for the table this configuration produces.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonicalizationError`].
    pub fn fingerprint(&self) -> Result<Fingerprint, CanonicalizationError> {
        Fingerprint::of(self)
    }
}

/// The post-override, post-restriction table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveTable {
    records: BTreeMap<CountryCode, CountryRecord>,
    by_alpha3: BTreeMap<String, CountryCode>,
    by_numeric: BTreeMap<u16, CountryCode>,
    fingerprint: Fingerprint,
}

impl EffectiveTable {
    /// Index and fingerprint a finished record map.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonicalizationError`] from fingerprinting.
    pub fn new(records: BTreeMap<CountryCode, CountryRecord>) -> Result<Self, CanonicalizationError> {
        let fingerprint = Fingerprint::of(&records)?;
        let mut by_alpha3 = BTreeMap::new();
        let mut by_numeric = BTreeMap::new();
        for (code, record) in &records {
            if let Some(alpha3) = record.alpha3() {
                by_alpha3.entry(alpha3.to_string()).or_insert_with(|| code.clone());
            }
            if let Some(numeric) = record.numeric() {
                by_numeric.entry(numeric).or_insert_with(|| code.clone());
            }
        }
        Ok(Self {
            records,
            by_alpha3,
            by_numeric,
            fingerprint,
        })
    }

    /// Look up by table key. Keys are uppercase.
    pub fn get(&self, code: &str) -> Option<&CountryRecord> {
        self.records.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.records.contains_key(code)
    }

    /// Find a record by table key, alpha-3 or numeric code, in any case.
    ///
    /// A key that exists in the table always wins, so a three-character
    /// custom code is never reinterpreted as someone else's alpha-3.
    pub fn find(&self, code: &str) -> Option<&CountryRecord> {
        let code = code.trim().to_ascii_uppercase();
        if let Some(record) = self.records.get(code.as_str()) {
            return Some(record);
        }
        let key = if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
            code.parse::<u16>().ok().and_then(|n| self.by_numeric.get(&n))
        } else if code.len() == 3 {
            self.by_alpha3.get(&code)
        } else {
            None
        };
        key.and_then(|k| self.records.get(k))
    }

    /// Records in code order.
    pub fn records(&self) -> impl Iterator<Item = &CountryRecord> {
        self.records.values()
    }

    pub fn codes(&self) -> impl Iterator<Item = &CountryCode> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Digest of the table contents.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }
}

/// Build the effective table.
///
/// `regions` is only consulted when `REGION_ONLY` is set.
///
/// # Errors
///
/// - [`ConfigurationError::InvalidOverride`] for a malformed descriptor, a
///   blank override or `ONLY` name, or a new entry without a name.
/// - [`CountriesError::UnknownCountry`] when a bare `ONLY` code is not in
///   the table after overrides.
/// - [`ConfigurationError::InvalidSetting`] when `REGION_ONLY` names an
///   unknown region or no region table is available.
pub fn resolve(
    base: &BaseTable,
    regions: Option<&RegionTable>,
    config: &TableConfig,
) -> CountriesResult<EffectiveTable> {
    let mut records: BTreeMap<CountryCode, CountryRecord> = base
        .records()
        .map(|record| (record.code().clone(), record.clone()))
        .collect();

    if config.common_names {
        for (code, common) in base.common_names() {
            if let Some(record) = records.remove(code) {
                records.insert(code.clone(), record.with_display_name(common.clone()));
            }
        }
    }

    for (code, value) in &config.overrides {
        match value {
            OverrideValue::Exclude => {
                records.remove(code);
            }
            OverrideValue::Name(name) => {
                let name = checked_name(code, name)?;
                let record = match records.remove(code) {
                    Some(existing) => existing.with_name(name),
                    None => CountryRecord::new(code.clone(), name),
                };
                records.insert(code.clone(), record);
            }
            OverrideValue::Descriptor(descriptor) => {
                descriptor.validate(code)?;
                let existing = records.remove(code);
                let name = descriptor
                    .name
                    .as_ref()
                    .map(|n| checked_name(code, n))
                    .transpose()?;
                let names = descriptor
                    .names
                    .as_ref()
                    .map(|names| {
                        names
                            .iter()
                            .map(|n| checked_name(code, n))
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .transpose()?;
                let named = name
                    .clone()
                    .or_else(|| names.as_ref().and_then(|n| n.first().cloned()));
                let mut record = match (existing, named) {
                    (Some(existing), _) => existing,
                    (None, Some(name)) => CountryRecord::new(code.clone(), name),
                    (None, None) => {
                        return Err(ConfigurationError::InvalidOverride {
                            code: code.to_string(),
                            reason: "a new entry needs a 'name' or 'names'".to_string(),
                        }
                        .into())
                    }
                };
                if let Some(name) = name {
                    record = record.with_name(name);
                }
                if let Some(names) = names {
                    record = record.with_names(names);
                }
                if let Some(alpha3) = &descriptor.alpha3 {
                    record = record.with_alpha3(alpha3.to_ascii_uppercase());
                }
                if let Some(numeric) = descriptor.numeric {
                    record = record.with_numeric(numeric);
                }
                if let Some(ioc_code) = &descriptor.ioc_code {
                    record = record.with_ioc_code(ioc_code.to_ascii_uppercase());
                }
                if let Some(flag_url) = &descriptor.flag_url {
                    record = record.with_flag_url(flag_url.clone());
                }
                records.insert(code.clone(), record);
            }
        }
    }

    if !config.only.is_empty() {
        let mut restricted = BTreeMap::new();
        for entry in &config.only {
            let record = match entry {
                OnlyEntry::Code(code) => records.get(code).cloned().ok_or_else(|| {
                    CountriesError::UnknownCountry {
                        code: code.to_string(),
                        option: "ONLY",
                    }
                })?,
                OnlyEntry::Named(code, name) => {
                    let name = checked_name(code, name)?;
                    match records.get(code) {
                        Some(existing) => existing.clone().with_name(name),
                        None => CountryRecord::new(code.clone(), name),
                    }
                }
            };
            restricted.insert(entry.code().clone(), record);
        }
        records = restricted;
    }

    if !config.region_only.is_empty() {
        let regions = regions.ok_or_else(|| ConfigurationError::InvalidSetting {
            key: "REGION_ONLY".to_string(),
            reason: "no region table is available".to_string(),
        })?;
        if let Some(unknown) = config.region_only.iter().find(|r| !regions.contains(**r)) {
            return Err(ConfigurationError::InvalidSetting {
                key: "REGION_ONLY".to_string(),
                reason: format!("unknown region {unknown:03}"),
            }
            .into());
        }
        records.retain(|_, record| {
            record.numeric().is_some_and(|n| {
                config
                    .region_only
                    .iter()
                    .any(|region| regions.is_subdivision_of(n, *region))
            })
        });
    }

    let table = EffectiveTable::new(records)?;
    tracing::debug!(
        countries = table.len(),
        overrides = config.overrides.len(),
        only = config.only.len(),
        fingerprint = %table.fingerprint().short(),
        "resolved effective country table"
    );
    Ok(table)
}
