//! # Lookup Facade
//!
//! [`Countries`] ties the pieces together: it merges the option layers,
//! resolves and caches the effective table, orders and caches display lists
//! per locale, and answers code and name lookups against the table.
//!
//! ## Option layers
//!
//! Every request reads three layers, highest priority first:
//!
//! 1. the calling thread's context stack ([`crate::context::current`]);
//! 2. the per-field [`CountriesOptions`] given to the builder;
//! 3. the global [`Settings`].
//!
//! ## Caching
//!
//! Tables are cached by [`TableConfig::fingerprint`], lists by
//! `(locale tag, OrderingConfig::fingerprint)`. A `Countries` value is cheap
//! to clone and clones share their caches.

use std::sync::Arc;

use country_core::{
    Collator, CountriesError, CountriesResult, CountryCode, Fingerprint, FoldingCollator, Locale,
    Translator, Untranslated,
};
use country_data::{BaseTable, CountryRecord, RegionCode, RegionTable};
use serde::Serialize;

use crate::cache::{BuildCache, CacheStats};
use crate::context;
use crate::country::{self, Country};
use crate::extensions::ExtensionRegistry;
use crate::ordering::{order, OrderingConfig, ResolvedList};
use crate::resolver::{resolve, EffectiveTable, TableConfig};
use crate::settings::{CountriesOptions, Settings};

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum DataSource {
    /// The ISO table and UN M.49 tree compiled into `country-data`.
    Embedded,
    /// Caller-supplied tables.
    Custom {
        base: Arc<BaseTable>,
        regions: Option<Arc<RegionTable>>,
    },
}

impl DataSource {
    fn base(&self) -> CountriesResult<&BaseTable> {
        match self {
            Self::Embedded => Ok(country_data::load()?),
            Self::Custom { base, .. } => Ok(base),
        }
    }

    fn regions(&self) -> CountriesResult<Option<&RegionTable>> {
        match self {
            Self::Embedded => Ok(Some(country_data::load_regions()?)),
            Self::Custom { regions, .. } => Ok(regions.as_deref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures a [`Countries`] facade.
#[derive(Debug)]
pub struct CountriesBuilder {
    settings: Settings,
    options: CountriesOptions,
    base: Option<Arc<BaseTable>>,
    regions: Option<Arc<RegionTable>>,
    translator: Arc<dyn Translator>,
    collator: Arc<dyn Collator>,
    extensions: ExtensionRegistry,
}

impl Default for CountriesBuilder {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            options: CountriesOptions::default(),
            base: None,
            regions: None,
            translator: Arc::new(Untranslated),
            collator: Arc::new(FoldingCollator),
            extensions: ExtensionRegistry::new(),
        }
    }
}

impl CountriesBuilder {
    /// Global settings, the lowest option layer.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Per-field options, above settings and below the context stack.
    pub fn options(mut self, options: CountriesOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the embedded ISO table.
    pub fn base_table(mut self, base: BaseTable) -> Self {
        self.base = Some(Arc::new(base));
        self
    }

    /// Region tree for a custom base table. Ignored with the embedded one.
    pub fn regions(mut self, regions: RegionTable) -> Self {
        self.regions = Some(Arc::new(regions));
        self
    }

    pub fn translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Arc::new(translator);
        self
    }

    pub fn collator(mut self, collator: impl Collator + 'static) -> Self {
        self.collator = Arc::new(collator);
        self
    }

    /// Register a named extension, see [`ExtensionRegistry::register`].
    pub fn extension<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&CountryCode) -> Option<serde_json::Value> + Send + Sync + 'static,
    {
        self.extensions.register(name, f);
        self
    }

    pub fn build(self) -> Countries {
        let source = match self.base {
            Some(base) => DataSource::Custom {
                base,
                regions: self.regions,
            },
            None => DataSource::Embedded,
        };
        Countries {
            inner: Arc::new(Inner {
                settings: self.settings,
                options: self.options,
                source,
                translator: self.translator,
                collator: self.collator,
                extensions: self.extensions,
                tables: BuildCache::new(),
                lists: BuildCache::new(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Facade
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Inner {
    settings: Settings,
    options: CountriesOptions,
    source: DataSource,
    translator: Arc<dyn Translator>,
    collator: Arc<dyn Collator>,
    extensions: ExtensionRegistry,
    tables: BuildCache<Fingerprint, EffectiveTable>,
    lists: BuildCache<(String, Fingerprint), ResolvedList>,
}

/// Table and list cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountriesCacheStats {
    pub tables: CacheStats,
    pub lists: CacheStats,
}

/// Country-list resolution and lookups.
#[derive(Debug, Clone)]
pub struct Countries {
    inner: Arc<Inner>,
}

impl Default for Countries {
    fn default() -> Self {
        Self::new()
    }
}

impl Countries {
    /// Embedded data, default settings, no translations.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> CountriesBuilder {
        CountriesBuilder::default()
    }

    /// Embedded data with the given global settings.
    pub fn with_settings(settings: Settings) -> Self {
        Self::builder().settings(settings).build()
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn options(&self) -> &CountriesOptions {
        &self.inner.options
    }

    pub(crate) fn translator(&self) -> &dyn Translator {
        self.inner.translator.as_ref()
    }

    pub(crate) fn extensions(&self) -> &ExtensionRegistry {
        &self.inner.extensions
    }

    fn layers(&self) -> [CountriesOptions; 3] {
        [
            context::current(),
            self.inner.options.clone(),
            self.inner.settings.as_options(),
        ]
    }

    /// All option layers merged for the calling thread.
    pub fn effective_options(&self) -> CountriesOptions {
        let [context, options, settings] = self.layers();
        context.over(&options).over(&settings)
    }

    // ---- Tables and lists ----

    /// The effective table for the calling thread's options.
    ///
    /// # Errors
    ///
    /// Data integrity, override, `ONLY` and `REGION_ONLY` errors from
    /// [`resolve`].
    pub fn table(&self) -> CountriesResult<Arc<EffectiveTable>> {
        self.table_for(&self.effective_options())
    }

    fn table_for(&self, merged: &CountriesOptions) -> CountriesResult<Arc<EffectiveTable>> {
        let config = TableConfig::from_options(merged);
        let key = config.fingerprint()?;
        let source = &self.inner.source;
        self.inner.tables.get_or_build(&key, || {
            let base = source.base()?;
            let regions = if config.region_only.is_empty() {
                None
            } else {
                source.regions()?
            };
            let table = resolve(base, regions, &config)?;
            tracing::debug!(
                fingerprint = %key.short(),
                countries = table.len(),
                "resolved effective country table"
            );
            Ok(table)
        })
    }

    /// The ordered choices for `locale`.
    ///
    /// # Errors
    ///
    /// As [`Countries::table`].
    pub fn choices(&self, locale: &Locale) -> CountriesResult<Arc<ResolvedList>> {
        let [context, options, settings] = self.layers();
        let merged = context.over(&options).over(&settings);
        let table = self.table_for(&merged)?;
        let config = OrderingConfig::from_layers(&[&context, &options, &settings], locale);
        let key = (locale.tag(), config.fingerprint(&table)?);
        let inner = &self.inner;
        inner.lists.get_or_build(&key, || {
            let list = order(
                &table,
                locale,
                &config,
                inner.translator.as_ref(),
                inner.collator.as_ref(),
            );
            tracing::debug!(
                locale = %locale,
                fingerprint = %key.1.short(),
                choices = list.len(),
                "ordered country list"
            );
            Ok::<_, CountriesError>(list)
        })
    }

    /// Number of choices for `locale`, separator and repeats included.
    pub fn len(&self, locale: &Locale) -> CountriesResult<usize> {
        Ok(self.choices(locale)?.len())
    }

    /// Drop every cached table and list.
    pub fn clear_cache(&self) {
        self.inner.tables.clear();
        self.inner.lists.clear();
        tracing::debug!("cleared country caches");
    }

    pub fn cache_stats(&self) -> CountriesCacheStats {
        CountriesCacheStats {
            tables: self.inner.tables.stats(),
            lists: self.inner.lists.stats(),
        }
    }

    // ---- Lookups ----

    fn record(&self, code: &str) -> CountriesResult<Option<CountryRecord>> {
        Ok(self.table()?.find(code).cloned())
    }

    /// Display name of `code` in `locale`.
    pub fn name(&self, code: &str, locale: &Locale) -> CountriesResult<Option<String>> {
        Ok(self
            .record(code)?
            .map(|record| record.name().resolve(self.translator(), locale)))
    }

    /// Code for a country name.
    ///
    /// Names are tried in `locale` first, then as English keys, which
    /// includes the ISO name of common-named countries and historical
    /// names.
    pub fn by_name(
        &self,
        name: &str,
        locale: &Locale,
        case_insensitive: bool,
    ) -> CountriesResult<Option<CountryCode>> {
        let table = self.table()?;
        let normalize = |s: &str| {
            let s = s.trim();
            if case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let wanted = normalize(name);
        if wanted.is_empty() {
            return Ok(None);
        }
        let translator = self.translator();
        let localized = table.records().find(|record| {
            record
                .names()
                .any(|n| normalize(&n.resolve(translator, locale)) == wanted)
        });
        let found = localized.or_else(|| {
            table
                .records()
                .find(|record| record.names().any(|n| normalize(n.key()) == wanted))
        });
        Ok(found.map(|record| record.code().clone()))
    }

    /// Codes whose localized or English names contain `fragment`, ignoring
    /// case, sorted by localized name.
    pub fn search(&self, fragment: &str, locale: &Locale) -> CountriesResult<Vec<CountryCode>> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let table = self.table()?;
        let translator = self.translator();
        let mut hits: Vec<(String, CountryCode)> = table
            .records()
            .filter(|record| {
                record.names().any(|n| {
                    n.resolve(translator, locale).to_lowercase().contains(&needle)
                        || n.key().to_lowercase().contains(&needle)
                })
            })
            .map(|record| (record.name().resolve(translator, locale), record.code().clone()))
            .collect();
        let collator = self.inner.collator.as_ref();
        hits.sort_by(|a, b| collator.compare(&a.0, &b.0, locale).then_with(|| a.1.cmp(&b.1)));
        Ok(hits.into_iter().map(|(_, code)| code).collect())
    }

    /// Whether `code` is a key of the effective table, in any case.
    ///
    /// Alpha-3 and numeric codes are not valid values; see
    /// [`Countries::alpha2`] to normalize them first.
    pub fn is_valid(&self, code: &str) -> CountriesResult<bool> {
        let Ok(code) = CountryCode::new(code) else {
            return Ok(false);
        };
        Ok(self.table()?.contains(code.as_str()))
    }

    /// Normalize an alpha-2, alpha-3 or numeric code to its table key.
    pub fn alpha2(&self, code: &str) -> CountriesResult<Option<CountryCode>> {
        Ok(self.record(code)?.map(|record| record.code().clone()))
    }

    pub fn alpha3(&self, code: &str) -> CountriesResult<Option<String>> {
        Ok(self
            .record(code)?
            .and_then(|record| record.alpha3().map(str::to_string)))
    }

    pub fn numeric(&self, code: &str) -> CountriesResult<Option<u16>> {
        Ok(self.record(code)?.and_then(|record| record.numeric()))
    }

    /// Numeric code zero-padded to three digits (`"036"`).
    pub fn numeric_padded(&self, code: &str) -> CountriesResult<Option<String>> {
        Ok(self.record(code)?.and_then(|record| record.numeric_padded()))
    }

    pub fn ioc_code(&self, code: &str) -> CountriesResult<Option<String>> {
        Ok(self
            .record(code)?
            .and_then(|record| record.ioc_code().map(str::to_string)))
    }

    /// Flag image URL: the record's own URL, else the `FLAG_URL` template.
    /// An empty template disables flags.
    pub fn flag_url(&self, code: &str) -> CountriesResult<Option<String>> {
        Ok(self
            .record(code)?
            .and_then(|record| self.flag_url_for(&record)))
    }

    fn flag_url_for(&self, record: &CountryRecord) -> Option<String> {
        if let Some(url) = record.flag_url() {
            return Some(url.to_string());
        }
        let template = self.effective_options().flag_url?;
        if template.is_empty() {
            return None;
        }
        let code = record.code().as_str();
        Some(
            template
                .replace("{code_upper}", code)
                .replace("{code}", &code.to_ascii_lowercase()),
        )
    }

    pub fn unicode_flag(&self, code: &str) -> CountriesResult<Option<String>> {
        Ok(self
            .record(code)?
            .and_then(|record| country::unicode_flag(record.code().as_str())))
    }

    /// The [`Country`] value for any accepted code form.
    pub fn country(&self, code: &str) -> CountriesResult<Option<Country>> {
        Ok(self.record(code)?.map(|record| {
            let flag_url = self.flag_url_for(&record);
            Country::new(self.clone(), record, flag_url)
        }))
    }

    // ---- Regions ----

    fn region_table(&self) -> CountriesResult<Option<&RegionTable>> {
        self.inner.source.regions()
    }

    fn placed(&self, code: &str) -> CountriesResult<Option<(&RegionTable, RegionCode)>> {
        let Some(numeric) = self.numeric(code)? else {
            return Ok(None);
        };
        Ok(self.region_table()?.map(|regions| (regions, numeric)))
    }

    /// Innermost UN M.49 region containing `code`. With `upto`, the region
    /// directly below `upto` instead.
    pub fn region(&self, code: &str, upto: Option<RegionCode>) -> CountriesResult<Option<RegionCode>> {
        let parents = self.parent_regions(code, upto)?;
        Ok(match upto {
            None => parents.first().copied(),
            Some(_) => parents.last().copied(),
        })
    }

    /// Name of [`Countries::region`] in `locale`.
    pub fn region_name(
        &self,
        code: &str,
        locale: &Locale,
        upto: Option<RegionCode>,
    ) -> CountriesResult<Option<String>> {
        let Some(region) = self.region(code, upto)? else {
            return Ok(None);
        };
        Ok(self
            .region_table()?
            .and_then(|regions| regions.name(region))
            .map(|name| name.resolve(self.translator(), locale)))
    }

    /// Enclosing regions of `code`, nearest first, stopping below `upto`.
    pub fn parent_regions(
        &self,
        code: &str,
        upto: Option<RegionCode>,
    ) -> CountriesResult<Vec<RegionCode>> {
        Ok(self
            .placed(code)?
            .map(|(regions, numeric)| regions.parents(numeric, upto))
            .unwrap_or_default())
    }

    /// Whether `code` lies within `region`, groupings included.
    pub fn in_region(&self, code: &str, region: RegionCode) -> CountriesResult<bool> {
        Ok(self
            .placed(code)?
            .is_some_and(|(regions, numeric)| regions.is_subdivision_of(numeric, region)))
    }
}
