//! # ISO 3166-1 Base Dataset
//!
//! The base table is parsed from the embedded `data/iso3166-1.yaml` at first
//! use and never mutated afterwards. Every later layer (overrides, `ONLY`
//! restrictions, common names) produces new [`CountryRecord`] values instead
//! of editing the ones held here, so the base stays available for resets
//! and tests.
//!
//! ## Validation
//!
//! Loading fails fast with a [`DataIntegrityError`] when a row is missing
//! its code or name, when a field has the wrong shape, or when a code,
//! alpha-3 or numeric value is repeated. The failure is memoized: every
//! call to [`load()`] reports the same error.
//!
//! ## Names
//!
//! A record's first name is its display name. Former names listed under
//! `old_names` are appended after it so name lookups still accept them.
//! Common names (`COMMON_NAMES`) are kept in a side table and only applied
//! by the resolver when the setting is enabled.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use country_core::{CountryCode, DataIntegrityError, TranslatableName};
use serde::{Deserialize, Serialize};

const ISO_3166_1: &str = include_str!("../data/iso3166-1.yaml");
const ISO_3166_1_NAME: &str = "iso3166-1.yaml";

// ---------------------------------------------------------------------------
// CountryRecord
// ---------------------------------------------------------------------------

/// Immutable metadata for one territory.
///
/// A record always has a display name; further names (the ISO name when a
/// common name is active, former names) follow it in `aliases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryRecord {
    code: CountryCode,
    name: TranslatableName,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<TranslatableName>,
    alpha3: Option<String>,
    numeric: Option<u16>,
    ioc_code: Option<String>,
    flag_url: Option<String>,
}

impl CountryRecord {
    /// A record with a code and a display name and no other metadata.
    pub fn new(code: CountryCode, name: impl Into<TranslatableName>) -> Self {
        Self {
            code,
            name: name.into(),
            aliases: Vec::new(),
            alpha3: None,
            numeric: None,
            ioc_code: None,
            flag_url: None,
        }
    }

    /// The table key.
    pub fn code(&self) -> &CountryCode {
        &self.code
    }

    /// The display name.
    pub fn name(&self) -> &TranslatableName {
        &self.name
    }

    /// All names, display name first.
    pub fn names(&self) -> impl Iterator<Item = &TranslatableName> {
        std::iter::once(&self.name).chain(&self.aliases)
    }

    /// ISO 3166-1 alpha-3 code.
    pub fn alpha3(&self) -> Option<&str> {
        self.alpha3.as_deref()
    }

    /// ISO 3166-1 numeric code.
    pub fn numeric(&self) -> Option<u16> {
        self.numeric
    }

    /// Numeric code zero-padded to three digits (`"036"`).
    pub fn numeric_padded(&self) -> Option<String> {
        self.numeric.map(|n| format!("{n:03}"))
    }

    /// International Olympic Committee code.
    pub fn ioc_code(&self) -> Option<&str> {
        self.ioc_code.as_deref()
    }

    /// Per-record flag URL, overriding the `FLAG_URL` template.
    pub fn flag_url(&self) -> Option<&str> {
        self.flag_url.as_deref()
    }

    /// Replace every name with a single display name.
    pub fn with_name(mut self, name: impl Into<TranslatableName>) -> Self {
        self.name = name.into();
        self.aliases.clear();
        self
    }

    /// Replace every name: the first becomes the display name.
    ///
    /// An empty list leaves the names unchanged.
    pub fn with_names(mut self, names: Vec<TranslatableName>) -> Self {
        let mut names = names.into_iter();
        if let Some(first) = names.next() {
            self.name = first;
            self.aliases = names.collect();
        }
        self
    }

    /// Promote `name` to display name, keeping the previous display name
    /// reachable as the first alias.
    pub fn with_display_name(mut self, name: impl Into<TranslatableName>) -> Self {
        let previous = std::mem::replace(&mut self.name, name.into());
        self.aliases.insert(0, previous);
        self
    }

    /// Append a secondary name.
    pub fn with_alias(mut self, alias: impl Into<TranslatableName>) -> Self {
        self.aliases.push(alias.into());
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

    /// The same metadata under another key.
    pub fn with_code(mut self, code: CountryCode) -> Self {
        self.code = code;
        self
    }
}

// ---------------------------------------------------------------------------
// Raw document
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDataset {
    countries: Vec<RawRow>,
    #[serde(default)]
    common_names: BTreeMap<String, String>,
    #[serde(default)]
    old_names: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRow {
    code: Option<String>,
    name: Option<String>,
    alpha3: Option<String>,
    numeric: Option<u32>,
    ioc: Option<String>,
}

fn is_alpha3_shape(value: &str) -> bool {
    value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// BaseTable
// ---------------------------------------------------------------------------

/// The validated ISO 3166-1 table with its alternate-code indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTable {
    records: BTreeMap<CountryCode, CountryRecord>,
    by_alpha3: BTreeMap<String, CountryCode>,
    by_numeric: BTreeMap<u16, CountryCode>,
    common_names: BTreeMap<CountryCode, TranslatableName>,
}

impl BaseTable {
    /// Parse and validate a dataset document.
    ///
    /// # Errors
    ///
    /// Returns [`DataIntegrityError`] for unparseable YAML, rows with a
    /// missing or malformed field, repeated codes, and common or old names
    /// that reference a code the table does not define.
    pub fn from_yaml_str(source: &str, source_name: &str) -> Result<Self, DataIntegrityError> {
        let raw: RawDataset =
            serde_yaml::from_str(source).map_err(|e| DataIntegrityError::Parse {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;

        let mut table = Self {
            records: BTreeMap::new(),
            by_alpha3: BTreeMap::new(),
            by_numeric: BTreeMap::new(),
            common_names: BTreeMap::new(),
        };
        for (row, raw_row) in raw.countries.into_iter().enumerate() {
            table.insert_row(row, raw_row)?;
        }

        for (code, names) in raw.old_names {
            let code = table.known_code("old_names", &code)?;
            if let Some(record) = table.records.remove(&code) {
                let record = names
                    .into_iter()
                    .filter_map(|n| non_blank(Some(n)))
                    .fold(record, |record, name| record.with_alias(name));
                table.records.insert(code, record);
            }
        }

        for (code, name) in raw.common_names {
            let code = table.known_code("common_names", &code)?;
            if let Some(name) = non_blank(Some(name)) {
                table.common_names.insert(code, TranslatableName::new(name));
            }
        }

        Ok(table)
    }

    fn insert_row(&mut self, row: usize, raw: RawRow) -> Result<(), DataIntegrityError> {
        let code = non_blank(raw.code).ok_or(DataIntegrityError::MissingField { row, field: "code" })?;
        let code = CountryCode::new(&code)
            .ok()
            .filter(CountryCode::is_alpha2)
            .ok_or_else(|| DataIntegrityError::InvalidValue {
                row,
                field: "code",
                value: code.clone(),
            })?;
        if self.records.contains_key(&code) {
            return Err(DataIntegrityError::Duplicate {
                row,
                field: "code",
                value: code.to_string(),
            });
        }

        let name = non_blank(raw.name).ok_or(DataIntegrityError::MissingField { row, field: "name" })?;
        let mut record = CountryRecord::new(code.clone(), name);

        if let Some(alpha3) = non_blank(raw.alpha3) {
            if !is_alpha3_shape(&alpha3) {
                return Err(DataIntegrityError::InvalidValue { row, field: "alpha3", value: alpha3 });
            }
            let alpha3 = alpha3.to_ascii_uppercase();
            if self.by_alpha3.contains_key(&alpha3) {
                return Err(DataIntegrityError::Duplicate { row, field: "alpha3", value: alpha3 });
            }
            self.by_alpha3.insert(alpha3.clone(), code.clone());
            record = record.with_alpha3(alpha3);
        }

        if let Some(numeric) = raw.numeric {
            let numeric = u16::try_from(numeric)
                .ok()
                .filter(|n| *n <= 999)
                .ok_or_else(|| DataIntegrityError::InvalidValue {
                    row,
                    field: "numeric",
                    value: numeric.to_string(),
                })?;
            if self.by_numeric.contains_key(&numeric) {
                return Err(DataIntegrityError::Duplicate {
                    row,
                    field: "numeric",
                    value: numeric.to_string(),
                });
            }
            self.by_numeric.insert(numeric, code.clone());
            record = record.with_numeric(numeric);
        }

        if let Some(ioc) = non_blank(raw.ioc) {
            if !is_alpha3_shape(&ioc) {
                return Err(DataIntegrityError::InvalidValue { row, field: "ioc", value: ioc });
            }
            record = record.with_ioc_code(ioc.to_ascii_uppercase());
        }

        self.records.insert(code, record);
        Ok(())
    }

    fn known_code(&self, table: &'static str, raw: &str) -> Result<CountryCode, DataIntegrityError> {
        CountryCode::new(raw)
            .ok()
            .filter(|code| self.records.contains_key(code))
            .ok_or_else(|| DataIntegrityError::UnknownReference {
                table,
                code: raw.to_string(),
            })
    }

    /// Look up a record by alpha-2 code (uppercase).
    pub fn get(&self, code: &str) -> Option<&CountryRecord> {
        self.records.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.records.contains_key(code)
    }

    /// All records in code order.
    pub fn records(&self) -> impl Iterator<Item = &CountryRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The alpha-2 code for an alpha-3 code, in any case.
    pub fn code_for_alpha3(&self, alpha3: &str) -> Option<&CountryCode> {
        self.by_alpha3.get(&alpha3.trim().to_ascii_uppercase())
    }

    /// The alpha-2 code for a numeric code.
    pub fn code_for_numeric(&self, numeric: u16) -> Option<&CountryCode> {
        self.by_numeric.get(&numeric)
    }

    /// The registered common name for `code`, if any.
    pub fn common_name(&self, code: &str) -> Option<&TranslatableName> {
        self.common_names.get(code)
    }

    /// Every `(code, common name)` pair.
    pub fn common_names(&self) -> impl Iterator<Item = (&CountryCode, &TranslatableName)> {
        self.common_names.iter()
    }
}

/// The embedded ISO 3166-1 table, parsed and validated on first call.
///
/// # Errors
///
/// Returns the memoized [`DataIntegrityError`] when the embedded dataset
/// fails validation.
pub fn load() -> Result<&'static BaseTable, DataIntegrityError> {
    static BASE: OnceLock<Result<BaseTable, DataIntegrityError>> = OnceLock::new();
    BASE.get_or_init(|| {
        let table = BaseTable::from_yaml_str(ISO_3166_1, ISO_3166_1_NAME);
        match &table {
            Ok(table) => tracing::debug!(
                countries = table.len(),
                common_names = table.common_names.len(),
                "loaded ISO 3166-1 base dataset"
            ),
            Err(e) => tracing::error!(error = %e, "ISO 3166-1 base dataset is malformed"),
        }
        table
    })
    .as_ref()
    .map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
countries:
  - { code: "NZ", name: "New Zealand", alpha3: "NZL", numeric: 554, ioc: "NZL" }
  - { code: "AU", name: "Australia", alpha3: "AUS", numeric: 36, ioc: "AUS" }
  - { code: "SZ", name: "Eswatini", alpha3: "SWZ", numeric: 748 }
common_names:
  AU: "Oz"
old_names:
  SZ: ["Swaziland"]
"#;

    fn small() -> BaseTable {
        BaseTable::from_yaml_str(SMALL, "test").unwrap()
    }

    #[test]
    fn parses_rows_and_indexes() {
        let table = small();
        assert_eq!(table.len(), 3);
        let nz = table.get("NZ").unwrap();
        assert_eq!(nz.name().key(), "New Zealand");
        assert_eq!(nz.alpha3(), Some("NZL"));
        assert_eq!(nz.numeric(), Some(554));
        assert_eq!(nz.ioc_code(), Some("NZL"));
        assert_eq!(table.code_for_alpha3("aus").unwrap().as_str(), "AU");
        assert_eq!(table.code_for_numeric(36).unwrap().as_str(), "AU");
        assert_eq!(table.get("AU").unwrap().numeric_padded().as_deref(), Some("036"));
    }

    #[test]
    fn old_names_become_aliases() {
        let table = small();
        let names: Vec<&str> = table.get("SZ").unwrap().names().map(|n| n.key()).collect();
        assert_eq!(names, vec!["Eswatini", "Swaziland"]);
    }

    #[test]
    fn common_names_are_kept_aside() {
        let table = small();
        assert_eq!(table.get("AU").unwrap().name().key(), "Australia");
        assert_eq!(table.common_name("AU").unwrap().key(), "Oz");
        assert!(table.common_name("NZ").is_none());
    }

    #[test]
    fn missing_name_is_fatal() {
        let err = BaseTable::from_yaml_str("countries:\n  - { code: \"NZ\" }\n", "test").unwrap_err();
        assert_eq!(err, DataIntegrityError::MissingField { row: 0, field: "name" });
    }

    #[test]
    fn missing_code_is_fatal() {
        let err = BaseTable::from_yaml_str(
            "countries:\n  - { name: \"A\" }\n  - { code: \"  \", name: \"B\" }\n",
            "test",
        )
        .unwrap_err();
        assert_eq!(err, DataIntegrityError::MissingField { row: 0, field: "code" });
    }

    #[test]
    fn three_character_base_code_is_invalid() {
        let err = BaseTable::from_yaml_str("countries:\n  - { code: \"NZL\", name: \"x\" }\n", "test")
            .unwrap_err();
        assert!(matches!(err, DataIntegrityError::InvalidValue { field: "code", .. }));
    }

    #[test]
    fn duplicates_are_fatal() {
        let dup_code = "countries:\n  - { code: \"NZ\", name: \"a\" }\n  - { code: \"nz\", name: \"b\" }\n";
        assert_eq!(
            BaseTable::from_yaml_str(dup_code, "test").unwrap_err(),
            DataIntegrityError::Duplicate { row: 1, field: "code", value: "NZ".into() }
        );

        let dup_numeric = "countries:\n  - { code: \"NZ\", name: \"a\", numeric: 1 }\n  - { code: \"AU\", name: \"b\", numeric: 1 }\n";
        assert!(matches!(
            BaseTable::from_yaml_str(dup_numeric, "test").unwrap_err(),
            DataIntegrityError::Duplicate { field: "numeric", .. }
        ));
    }

    #[test]
    fn numeric_out_of_range() {
        let err = BaseTable::from_yaml_str("countries:\n  - { code: \"NZ\", name: \"a\", numeric: 1000 }\n", "test")
            .unwrap_err();
        assert!(matches!(err, DataIntegrityError::InvalidValue { field: "numeric", .. }));
    }

    #[test]
    fn dangling_common_name() {
        let err = BaseTable::from_yaml_str(
            "countries:\n  - { code: \"NZ\", name: \"a\" }\ncommon_names:\n  XX: \"b\"\n",
            "test",
        )
        .unwrap_err();
        assert_eq!(
            err,
            DataIntegrityError::UnknownReference { table: "common_names", code: "XX".into() }
        );
    }

    #[test]
    fn unknown_row_field_is_a_parse_error() {
        let err = BaseTable::from_yaml_str("countries:\n  - { code: \"NZ\", name: \"a\", capital: \"b\" }\n", "test")
            .unwrap_err();
        assert!(matches!(err, DataIntegrityError::Parse { .. }));
    }

    #[test]
    fn record_builders_do_not_touch_the_original() {
        let table = small();
        let nz = table.get("NZ").unwrap();
        let renamed = nz.clone().with_display_name("Aotearoa");
        assert_eq!(renamed.name().key(), "Aotearoa");
        assert_eq!(renamed.names().nth(1).unwrap().key(), "New Zealand");
        assert_eq!(nz.name().key(), "New Zealand");

        let replaced = renamed.with_names(vec![]);
        assert_eq!(replaced.name().key(), "Aotearoa");
        let replaced = replaced.with_name("NZ");
        assert_eq!(replaced.names().count(), 1);
    }

    #[test]
    fn embedded_dataset_loads() {
        let table = load().unwrap();
        assert_eq!(table.len(), 249);
        assert!(std::ptr::eq(table, load().unwrap()));
    }
}
