//! # Country List Properties
//!
//! End-to-end checks of the resolution pipeline through the [`Countries`]
//! facade: ordering precedence, auto-detection, exclusion, restriction,
//! separators, metadata overrides, context nesting and caching.

use std::sync::Arc;

use country_core::{CountriesError, CountryCode, Locale};
use country_data::BaseTable;
use country_list::{countries_context, Countries, CountriesOptions, Settings};
use proptest::prelude::*;

fn locale(tag: &str) -> Locale {
    Locale::parse(tag).unwrap()
}

fn code(s: &str) -> CountryCode {
    CountryCode::new(s).unwrap()
}

fn with_settings(yaml: &str) -> Countries {
    Countries::with_settings(Settings::from_yaml_str(yaml).unwrap())
}

fn values(countries: &Countries, tag: &str) -> Vec<String> {
    countries
        .choices(&locale(tag))
        .unwrap()
        .iter()
        .map(|choice| choice.value().to_string())
        .collect()
}

fn first_segment(countries: &Countries, tag: &str) -> Vec<String> {
    let list = countries.choices(&locale(tag)).unwrap();
    list.iter()
        .take(list.first_len())
        .map(|choice| choice.value().to_string())
        .collect()
}

// ---- Idempotence ----

#[test]
fn second_request_is_served_from_cache() {
    let countries = with_settings("FIRST: [US, GB]\nFIRST_BREAK: '---'");
    let a = countries.choices(&locale("en")).unwrap();
    let b = countries.choices(&locale("en")).unwrap();
    assert_eq!(*a, *b);
    assert!(Arc::ptr_eq(&a, &b));
    let stats = countries.cache_stats();
    assert_eq!(stats.lists.builds, 1);
    assert_eq!(stats.lists.hits, 1);
    assert_eq!(stats.tables.builds, 1);
}

#[test]
fn different_locales_are_cached_separately() {
    let countries = Countries::new();
    countries.choices(&locale("en")).unwrap();
    countries.choices(&locale("fr")).unwrap();
    countries.choices(&locale("fr_FR.UTF-8")).unwrap();
    countries.choices(&locale("fr-FR")).unwrap();
    let stats = countries.cache_stats();
    assert_eq!(stats.lists.builds, 3);
    assert_eq!(stats.tables.builds, 1);
}

// ---- First-list precedence ----

#[test]
fn language_mapping_beats_plain_first() {
    let countries = with_settings(
        "FIRST: [US, GB]\nFIRST_BY_LANGUAGE:\n  fr: [FR, CH]\n",
    );
    let fr = values(&countries, "fr");
    assert_eq!(&fr[..3], ["FR", "CH", "AF"]);
    let en = values(&countries, "en");
    assert_eq!(&en[..3], ["US", "GB", "AF"]);
}

#[test]
fn regional_locale_uses_base_language_mapping() {
    let countries = with_settings("FIRST_BY_LANGUAGE:\n  fr: [FR, CH]\n");
    assert_eq!(first_segment(&countries, "fr-CA"), ["FR", "CH"]);
}

#[test]
fn exact_locale_mapping_skips_auto_detect() {
    let countries = with_settings(
        "FIRST_AUTO_DETECT: true\nFIRST_BY_LANGUAGE:\n  fr: [FR]\n  fr-CA: [CA, US]\n",
    );
    assert_eq!(first_segment(&countries, "fr-CA"), ["CA", "US"]);
    assert_eq!(first_segment(&countries, "fr-BE"), ["BE", "FR"]);
}

// ---- Auto-detect ----

#[test]
fn auto_detect_prepends_locale_country() {
    let countries = with_settings("FIRST_AUTO_DETECT: true\nFIRST: [US, GB]\n");
    assert_eq!(first_segment(&countries, "en-AU"), ["AU", "US", "GB"]);
    assert_eq!(first_segment(&countries, "en-GB"), ["GB", "US"]);
    assert_eq!(first_segment(&countries, "en"), ["US", "GB"]);
}

// ---- Table shaping ----

#[test]
fn excluded_code_disappears_from_table_and_list() {
    let countries = with_settings("OVERRIDE:\n  AU: null\n");
    assert!(!countries.is_valid("AU").unwrap());
    assert!(!values(&countries, "en").contains(&"AU".to_string()));
    assert_eq!(countries.name("AU", &locale("en")).unwrap(), None);
    assert!(country_data::load().unwrap().contains("AU"));
}

#[test]
fn only_with_unknown_code_fails() {
    let countries = with_settings("ONLY: [US, ZZ]\n");
    let err = countries.choices(&locale("en")).unwrap_err();
    assert!(
        matches!(err, CountriesError::UnknownCountry { ref code, option: "ONLY" } if code == "ZZ"),
        "unexpected error: {err}"
    );
}

#[test]
fn only_restricts_and_may_rename() {
    let countries = with_settings("ONLY: [NZ, [AU, Oz]]\n");
    let list = countries.choices(&locale("en")).unwrap();
    let pairs: Vec<(&str, &str)> = list.iter().map(|c| (c.value(), c.label())).collect();
    assert_eq!(pairs, [("NZ", "New Zealand"), ("AU", "Oz")]);
}

#[test]
fn overrides_can_add_custom_codes() {
    let countries = with_settings("OVERRIDE:\n  XK: Kosovo\n  EU: { name: European Union, alpha3: EUR }\n");
    assert!(countries.is_valid("XK").unwrap());
    assert_eq!(countries.alpha2("eur").unwrap(), Some(code("EU")));
    assert_eq!(countries.by_name("kosovo", &locale("en"), true).unwrap(), Some(code("XK")));
}

#[test]
fn descriptor_for_new_code_needs_a_name() {
    let countries = with_settings("OVERRIDE:\n  XK: { alpha3: XKX }\n");
    assert!(matches!(
        countries.table().unwrap_err(),
        CountriesError::Configuration(_)
    ));
}

#[test]
fn blank_names_never_reach_the_list() {
    for yaml in ["OVERRIDE:\n  NZ: ''\n", "ONLY: [NZ, [XK, '  ']]\n"] {
        let countries = with_settings(yaml);
        assert!(
            matches!(
                countries.choices(&locale("en")),
                Err(CountriesError::Configuration(_))
            ),
            "accepted {yaml:?}"
        );
    }
}

#[test]
fn region_only_keeps_countries_inside_the_region() {
    let countries = with_settings("REGION_ONLY: [53]\n");
    let codes: Vec<String> = values(&countries, "en");
    assert_eq!(codes, ["AU", "NZ", "NF"]);
}

// ---- Separator ----

#[test]
fn separator_is_neither_valid_nor_selectable() {
    let countries = with_settings("FIRST: [US]\nFIRST_BREAK: '------'\n");
    let list = countries.choices(&locale("en")).unwrap();
    let separator = list.get(1).unwrap();
    assert!(separator.is_separator());
    assert_eq!(separator.code(), None);
    assert_eq!(separator.value(), "");
    assert!(!countries.is_valid(separator.value()).unwrap());
    assert!(!countries.is_valid(separator.label()).unwrap());
    assert!(!list.selectable(separator.value()));
    assert!(list.selectable("US"));
}

#[test]
fn no_separator_without_first_countries() {
    let countries = with_settings("FIRST_BREAK: '------'\n");
    let list = countries.choices(&locale("en")).unwrap();
    assert!(list.iter().all(|choice| !choice.is_separator()));
}

// ---- Metadata overrides ----

#[test]
fn flag_override_keeps_the_name() {
    let plain = Countries::new();
    let countries = with_settings("OVERRIDE:\n  NZ: { flag_url: x }\n");
    let en = locale("en");
    assert_eq!(countries.name("NZ", &en).unwrap(), plain.name("NZ", &en).unwrap());
    assert_eq!(countries.flag_url("NZ").unwrap().as_deref(), Some("x"));
    assert_eq!(plain.flag_url("NZ").unwrap().as_deref(), Some("flags/nz.gif"));
    assert_eq!(countries.alpha3("NZ").unwrap().as_deref(), Some("NZL"));
}

// ---- Context stack ----

#[test]
fn context_frames_nest_and_restore() {
    let countries = Countries::new();
    let us = countries_context(CountriesOptions::new().with_first([code("US")]));
    assert_eq!(values(&countries, "en")[0], "US");
    {
        let _fr = countries_context(CountriesOptions::new().with_first([code("FR")]));
        assert_eq!(values(&countries, "en")[0], "FR");
    }
    assert_eq!(values(&countries, "en")[0], "US");
    drop(us);
    assert_eq!(values(&countries, "en")[0], "AF");
}

#[test]
fn context_first_overrides_language_mapping() {
    let countries = with_settings("FIRST_BY_LANGUAGE:\n  fr: [FR]\n");
    let _guard = countries_context(CountriesOptions::new().with_first([code("NZ")]));
    assert_eq!(first_segment(&countries, "fr"), ["NZ"]);
}

#[test]
fn context_language_mapping_beats_global_mapping() {
    let countries = with_settings("FIRST_AUTO_DETECT: true\nFIRST_BY_LANGUAGE:\n  fr: [FR]\n");
    let _guard = countries_context(
        CountriesOptions::new().with_first_for_language(locale("fr-CA"), [code("CA")]),
    );
    assert_eq!(first_segment(&countries, "fr-CA"), ["CA"]);
    assert_eq!(first_segment(&countries, "fr-BE"), ["BE", "FR"]);
}

#[test]
fn nested_context_combines_language_mapping_and_first() {
    let countries = Countries::new();
    let outer = countries_context(
        CountriesOptions::new().with_first_for_language(locale("fr"), [code("FR"), code("CH")]),
    );
    assert_eq!(first_segment(&countries, "fr-CA"), ["FR", "CH"]);
    assert!(first_segment(&countries, "en").is_empty());
    {
        let _inner = countries_context(CountriesOptions::new().with_first([code("NZ")]));
        assert_eq!(first_segment(&countries, "fr"), ["FR", "CH"]);
        assert_eq!(first_segment(&countries, "en"), ["NZ"]);
    }
    assert!(first_segment(&countries, "en").is_empty());
    drop(outer);
    assert!(first_segment(&countries, "fr").is_empty());
}

#[test]
fn empty_context_first_gives_alphabetical_list() {
    let countries = with_settings("FIRST: [US]\n");
    let _guard = countries_context(CountriesOptions::new().with_first(Vec::<CountryCode>::new()));
    assert_eq!(countries.choices(&locale("en")).unwrap().first_len(), 0);
}

#[test]
fn context_is_invisible_to_other_threads() {
    let countries = Countries::new();
    let _guard = countries_context(CountriesOptions::new().with_first([code("US")]));
    let remote = countries.clone();
    let first = std::thread::spawn(move || values(&remote, "en")[0].clone())
        .join()
        .unwrap();
    assert_eq!(first, "AF");
}

// ---- End to end ----

#[test]
fn three_country_table() {
    let base = BaseTable::from_yaml_str(
        r#"
countries:
  - { code: NZ, name: New Zealand }
  - { code: AU, name: Australia }
  - { code: US, name: United States }
"#,
        "three",
    )
    .unwrap();
    let countries = Countries::builder()
        .base_table(base)
        .settings(Settings::from_yaml_str("FIRST: [US]\n").unwrap())
        .build();
    let list = countries.choices(&locale("en")).unwrap();
    let pairs: Vec<(&str, &str)> = list.iter().map(|c| (c.value(), c.label())).collect();
    assert_eq!(
        pairs,
        [
            ("US", "United States"),
            ("AU", "Australia"),
            ("NZ", "New Zealand"),
        ]
    );
    assert_eq!(countries.region("NZ", None).unwrap(), None);
}

// ---- Properties ----

const POOL: &[&str] = &["US", "GB", "FR", "NZ", "AU", "ZZ", "DE", "CH", "CA", "NZL"];
const LOCALES: &[&str] = &["en", "en-AU", "fr", "fr-CA", "de-CH", "pt-BR"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn no_duplicate_codes_without_repeat(
        first in proptest::sample::subsequence(POOL, 0..POOL.len()),
        shuffle in any::<bool>(),
        first_sort in any::<bool>(),
        auto_detect in any::<bool>(),
        with_break in any::<bool>(),
        tag in proptest::sample::select(LOCALES),
    ) {
        let mut first: Vec<&str> = first;
        if shuffle {
            first.reverse();
        }
        let mut options = CountriesOptions::new()
            .with_first(first.iter().map(|c| code(c)))
            .with_first_sort(first_sort)
            .with_first_auto_detect(auto_detect);
        if with_break {
            options = options.with_first_break("---");
        }
        let countries = Countries::builder().options(options).build();
        let list = countries.choices(&locale(tag)).unwrap();
        let codes: Vec<&CountryCode> = list.codes().collect();
        let unique: std::collections::BTreeSet<&CountryCode> = codes.iter().copied().collect();
        prop_assert_eq!(codes.len(), unique.len());
        prop_assert_eq!(codes.len(), 249);
    }
}
