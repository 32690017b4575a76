//! # Ordering Engine
//!
//! Computes the display sequence for one locale:
//!
//! ```text
//! [ first countries ] [ separator ] [ remaining countries, sorted by name ]
//! ```
//!
//! ## First-list precedence
//!
//! [`OrderingConfig::from_layers`] picks the first-list source from the
//! highest layer (context, then per-field options, then settings) that has
//! something to say for the locale: a `FIRST_BY_LANGUAGE` entry for the
//! full tag or the base language, or a `FIRST` value (an empty `FIRST`
//! counts). Within that layer, [`OrderingConfig::first_for`] applies:
//!
//! | Match                         | First list                         |
//! |-------------------------------|------------------------------------|
//! | exact tag (`fr-CA`)           | the mapped list, no auto-detect    |
//! | base language (`fr`)          | mapped list, with auto-detect      |
//! | neither                       | `FIRST`, with auto-detect          |
//!
//! Auto-detect moves the locale's region to the front of the list, adding
//! it when absent. Codes missing from the effective table are skipped.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use country_core::{
    CanonicalizationError, Collator, CountryCode, Fingerprint, Locale, Translator,
};
use serde::Serialize;

use crate::resolver::EffectiveTable;
use crate::settings::CountriesOptions;

// ---------------------------------------------------------------------------
// OrderingConfig
// ---------------------------------------------------------------------------

/// Every input of the ordering step for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderingConfig {
    pub first: Vec<CountryCode>,
    pub first_sort: bool,
    pub first_repeat: bool,
    pub first_break: Option<String>,
    pub first_by_language: BTreeMap<Locale, Vec<CountryCode>>,
    pub first_auto_detect: bool,
    pub only: Option<Vec<CountryCode>>,
}

impl OrderingConfig {
    /// Assemble the configuration from option layers, highest priority
    /// first.
    ///
    /// Scalar fields are resolved independently: the first layer that sets
    /// a field wins. `FIRST` and `FIRST_BY_LANGUAGE` are taken together
    /// from the first layer that produces a list for `locale`.
    pub fn from_layers(layers: &[&CountriesOptions], locale: &Locale) -> Self {
        fn pick<T: Clone>(
            layers: &[&CountriesOptions],
            field: impl Fn(&CountriesOptions) -> &Option<T>,
        ) -> Option<T> {
            layers.iter().find_map(|layer| field(*layer).clone())
        }

        let base = locale.base();
        let source = layers.iter().find(|layer| {
            let by_language = layer
                .first_by_language
                .as_ref()
                .is_some_and(|map| map.contains_key(locale) || map.contains_key(&base));
            by_language || layer.first.is_some()
        });

        Self {
            first: source
                .and_then(|layer| layer.first.clone())
                .unwrap_or_default(),
            first_sort: pick(layers, |l| &l.first_sort).unwrap_or(false),
            first_repeat: pick(layers, |l| &l.first_repeat).unwrap_or(false),
            first_break: pick(layers, |l| &l.first_break).filter(|label| !label.is_empty()),
            first_by_language: source
                .and_then(|layer| layer.first_by_language.clone())
                .unwrap_or_default(),
            first_auto_detect: pick(layers, |l| &l.first_auto_detect).unwrap_or(false),
            only: pick(layers, |l| &l.only)
                .filter(|only| !only.is_empty())
                .map(|only| only.iter().map(|entry| entry.code().clone()).collect()),
        }
    }

    /// The first list for `locale`, before filtering against the table.
    pub fn first_for(&self, locale: &Locale) -> Vec<CountryCode> {
        if let Some(exact) = self.first_by_language.get(locale) {
            return dedup(exact.iter().cloned());
        }
        let list = self
            .first_by_language
            .get(&locale.base())
            .unwrap_or(&self.first);
        let detected = if self.first_auto_detect {
            locale.country()
        } else {
            None
        };
        dedup(detected.into_iter().chain(list.iter().cloned()))
    }

    /// Cache key for a list built from this configuration over `table`.
    ///
    /// # Errors
    ///
    /// Propagates [`CanonicalizationError`].
    pub fn fingerprint(&self, table: &EffectiveTable) -> Result<Fingerprint, CanonicalizationError> {
        #[derive(Serialize)]
        struct Key<'a> {
            ordering: &'a OrderingConfig,
            table: String,
        }
        Fingerprint::of(&Key {
            ordering: self,
            table: table.fingerprint().to_hex(),
        })
    }
}

fn dedup(codes: impl Iterator<Item = CountryCode>) -> Vec<CountryCode> {
    let mut seen = BTreeSet::new();
    codes.filter(|code| seen.insert(code.clone())).collect()
}

// ---------------------------------------------------------------------------
// Choices
// ---------------------------------------------------------------------------

/// One entry of the display sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Choice {
    Country { code: CountryCode, name: String },
    /// Visual break after the first countries. Carries no code.
    Separator { label: String },
}

impl Choice {
    /// The country code, `None` for a separator.
    pub fn code(&self) -> Option<&CountryCode> {
        match self {
            Self::Country { code, .. } => Some(code),
            Self::Separator { .. } => None,
        }
    }

    /// The form value: the code, or an empty string for a separator.
    pub fn value(&self) -> &str {
        self.code().map_or("", CountryCode::as_str)
    }

    /// The display text.
    pub fn label(&self) -> &str {
        match self {
            Self::Country { name, .. } => name.as_str(),
            Self::Separator { label } => label.as_str(),
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator { .. })
    }
}

/// The ordered sequence for one locale and configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedList {
    choices: Vec<Choice>,
    first_len: usize,
}

impl ResolvedList {
    /// Number of entries, counting repeated first countries and the
    /// separator.
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Choice> {
        self.choices.iter()
    }

    pub fn as_slice(&self) -> &[Choice] {
        &self.choices
    }

    /// Country codes in display order, skipping the separator.
    pub fn codes(&self) -> impl Iterator<Item = &CountryCode> {
        self.choices.iter().filter_map(Choice::code)
    }

    /// Number of entries in the first segment.
    pub fn first_len(&self) -> usize {
        self.first_len
    }

    /// True when `value` is a country in this list, the check a required
    /// selection must pass. The separator's empty value never passes.
    pub fn selectable(&self, value: &str) -> bool {
        let Ok(code) = CountryCode::new(value) else {
            return false;
        };
        self.codes().any(|c| *c == code)
    }
}

impl<'a> IntoIterator for &'a ResolvedList {
    type Item = &'a Choice;
    type IntoIter = std::slice::Iter<'a, Choice>;

    fn into_iter(self) -> Self::IntoIter {
        self.choices.iter()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Build the display sequence.
pub fn order(
    table: &EffectiveTable,
    locale: &Locale,
    config: &OrderingConfig,
    translator: &dyn Translator,
    collator: &dyn Collator,
) -> ResolvedList {
    let by_name = |a: &(CountryCode, String), b: &(CountryCode, String)| -> Ordering {
        collator
            .compare(&a.1, &b.1, locale)
            .then_with(|| a.0.cmp(&b.0))
    };

    let mut first: Vec<(CountryCode, String)> = Vec::new();
    for candidate in config.first_for(locale) {
        let Some(record) = table.find(candidate.as_str()) else {
            tracing::trace!(code = %candidate, "first country not in table, skipped");
            continue;
        };
        if first.iter().any(|(code, _)| code == record.code()) {
            continue;
        }
        first.push((record.code().clone(), record.name().resolve(translator, locale)));
    }
    if config.first_sort {
        first.sort_by(by_name);
    }

    let promoted: BTreeSet<&CountryCode> = first.iter().map(|(code, _)| code).collect();
    let mut main: Vec<(CountryCode, String)> = table
        .records()
        .filter(|record| config.first_repeat || !promoted.contains(record.code()))
        .map(|record| (record.code().clone(), record.name().resolve(translator, locale)))
        .collect();
    main.sort_by(by_name);

    let first_len = first.len();
    let separator = config
        .first_break
        .as_ref()
        .filter(|label| first_len > 0 && !label.is_empty())
        .map(|label| Choice::Separator { label: label.clone() });

    let choices = first
        .into_iter()
        .map(|(code, name)| Choice::Country { code, name })
        .chain(separator)
        .chain(main.into_iter().map(|(code, name)| Choice::Country { code, name }))
        .collect();

    ResolvedList { choices, first_len }
}

#[cfg(test)]
mod tests {
    use super::*;
    use country_core::{Catalog, FoldingCollator, Untranslated};
    use country_data::{BaseTable, CountryRecord};

    fn code(s: &str) -> CountryCode {
        CountryCode::new(s).unwrap()
    }

    fn codes(list: &[&str]) -> Vec<CountryCode> {
        list.iter().map(|c| code(c)).collect()
    }

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    fn table() -> EffectiveTable {
        let base = BaseTable::from_yaml_str(
            r#"
countries:
  - { code: "AU", name: "Australia", alpha3: "AUS", numeric: 36 }
  - { code: "BE", name: "Belgium" }
  - { code: "CA", name: "Canada" }
  - { code: "CH", name: "Switzerland" }
  - { code: "FR", name: "France" }
  - { code: "GB", name: "United Kingdom" }
  - { code: "NZ", name: "New Zealand" }
  - { code: "US", name: "United States" }
"#,
            "test",
        )
        .unwrap();
        let records = base
            .records()
            .map(|r: &CountryRecord| (r.code().clone(), r.clone()))
            .collect();
        EffectiveTable::new(records).unwrap()
    }

    fn run(config: &OrderingConfig, tag: &str) -> Vec<String> {
        order(&table(), &locale(tag), config, &Untranslated, &FoldingCollator)
            .iter()
            .map(|c| c.value().to_string())
            .collect()
    }

    #[test]
    fn alphabetical_by_default() {
        let list = run(&OrderingConfig::default(), "en");
        assert_eq!(list, vec!["AU", "BE", "CA", "FR", "NZ", "CH", "GB", "US"]);
    }

    #[test]
    fn first_then_rest_without_duplicates() {
        let config = OrderingConfig { first: codes(&["US", "GB"]), ..Default::default() };
        let list = run(&config, "en");
        assert_eq!(&list[..3], ["US", "GB", "AU"]);
        assert_eq!(list.len(), 8);
    }

    #[test]
    fn first_repeat_keeps_entries_in_main_list() {
        let config = OrderingConfig {
            first: codes(&["US"]),
            first_repeat: true,
            ..Default::default()
        };
        let list = run(&config, "en");
        assert_eq!(list.len(), 9);
        assert_eq!(list.iter().filter(|c| *c == "US").count(), 2);
    }

    #[test]
    fn first_sort_sorts_the_first_segment() {
        let config = OrderingConfig {
            first: codes(&["US", "GB", "AU"]),
            first_sort: true,
            ..Default::default()
        };
        assert_eq!(&run(&config, "en")[..3], ["AU", "GB", "US"]);
    }

    #[test]
    fn separator_only_after_a_non_empty_first_segment() {
        let config = OrderingConfig {
            first: codes(&["US"]),
            first_break: Some("---".into()),
            ..Default::default()
        };
        let list = order(&table(), &locale("en"), &config, &Untranslated, &FoldingCollator);
        let sep = list.get(1).unwrap();
        assert!(sep.is_separator());
        assert_eq!(sep.value(), "");
        assert_eq!(sep.label(), "---");
        assert!(!list.selectable(""));
        assert!(list.selectable("us"));
        assert_eq!(list.codes().count(), 8);

        let no_first = OrderingConfig { first_break: Some("---".into()), ..Default::default() };
        assert!(!run(&no_first, "en").contains(&String::new()));
    }

    #[test]
    fn unknown_first_codes_are_skipped() {
        let config = OrderingConfig { first: codes(&["ZZ", "NZ", "NZ"]), ..Default::default() };
        let list = run(&config, "en");
        assert_eq!(list[0], "NZ");
        assert_eq!(list.len(), 8);
    }

    #[test]
    fn first_accepts_alpha3() {
        let config = OrderingConfig { first: codes(&["AUS"]), ..Default::default() };
        assert_eq!(run(&config, "en")[0], "AU");
    }

    #[test]
    fn auto_detect_prepends_and_moves() {
        let config = OrderingConfig {
            first: codes(&["US", "GB"]),
            first_auto_detect: true,
            ..Default::default()
        };
        assert_eq!(&run(&config, "en-AU")[..3], ["AU", "US", "GB"]);
        let gb = run(&config, "en-GB");
        assert_eq!(&gb[..2], ["GB", "US"]);
        assert_eq!(gb.iter().filter(|c| *c == "GB").count(), 1);
        assert_eq!(&run(&config, "en")[..2], ["US", "GB"]);
    }

    #[test]
    fn exact_language_match_suppresses_auto_detect() {
        let config = OrderingConfig {
            first_by_language: [
                (locale("fr"), codes(&["FR", "CH", "BE"])),
                (locale("fr-CA"), codes(&["CA", "US"])),
            ]
            .into(),
            first_auto_detect: true,
            ..Default::default()
        };
        assert_eq!(&run(&config, "fr-CA")[..3], ["CA", "US", "AU"]);
        assert_eq!(&run(&config, "fr_BE")[..3], ["BE", "FR", "CH"]);
        assert_eq!(&run(&config, "fr-NZ")[..4], ["NZ", "FR", "CH", "BE"]);
    }

    #[test]
    fn from_layers_picks_the_producing_layer() {
        let context = CountriesOptions::new().with_first_sort(true);
        let field = CountriesOptions::new()
            .with_first_for_language(locale("fr"), codes(&["CA", "FR"]));
        let global = CountriesOptions::new()
            .with_first(codes(&["US"]))
            .with_first_for_language(locale("de"), codes(&["DE"]));

        let fr = OrderingConfig::from_layers(&[&context, &field, &global], &locale("fr"));
        assert_eq!(fr.first_for(&locale("fr")), codes(&["CA", "FR"]));
        assert!(fr.first_sort);

        let en = OrderingConfig::from_layers(&[&context, &field, &global], &locale("en"));
        assert_eq!(en.first_for(&locale("en")), codes(&["US"]));
    }

    #[test]
    fn from_layers_empty_first_counts_as_set() {
        let context = CountriesOptions::new().with_first(Vec::new());
        let global = CountriesOptions::new().with_first(codes(&["US"]));
        let config = OrderingConfig::from_layers(&[&context, &global], &locale("en"));
        assert!(config.first_for(&locale("en")).is_empty());
    }

    #[test]
    fn auto_detect_alone_yields_the_region() {
        let config = OrderingConfig { first_auto_detect: true, ..Default::default() };
        let list = run(&config, "en-AU");
        assert_eq!(list[0], "AU");
        assert_eq!(list[1], "BE");
    }

    #[test]
    fn names_are_translated_and_sorted_per_locale() {
        let catalog = Catalog::new().with_messages(
            &locale("de"),
            [("Switzerland", "Schweiz"), ("United States", "Vereinigte Staaten"), ("Belgium", "Belgien")],
        );
        let list = order(&table(), &locale("de"), &OrderingConfig::default(), &catalog, &FoldingCollator);
        let names: Vec<&str> = list.iter().map(Choice::label).collect();
        assert_eq!(
            names,
            vec![
                "Australia",
                "Belgien",
                "Canada",
                "France",
                "New Zealand",
                "Schweiz",
                "United Kingdom",
                "Vereinigte Staaten"
            ]
        );
    }

    #[test]
    fn empty_table_yields_empty_list() {
        let empty = EffectiveTable::new(BTreeMap::new()).unwrap();
        let config = OrderingConfig {
            first: codes(&["US"]),
            first_break: Some("---".into()),
            ..Default::default()
        };
        let list = order(&empty, &locale("en"), &config, &Untranslated, &FoldingCollator);
        assert!(list.is_empty());
    }
}
