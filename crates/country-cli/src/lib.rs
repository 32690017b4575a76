//! # country-cli — Command-Line Front End
//!
//! Provides the `countries` binary over the `country-list` facade.
//!
//! ## Subcommands
//!
//! - `countries list` — ordered choices for a locale.
//! - `countries name` — display name of a code.
//! - `countries code` — code for a name.
//! - `countries valid` — exit status tells whether a code is valid.
//! - `countries info` — every attribute of a country as JSON.
//!
//! ```bash
//! countries --locale fr list --first FR,BE --first-break "---"
//! countries --settings countries.yaml name NZL
//! countries code "Swaziland"
//! ```

pub mod list;
pub mod lookup;

use std::path::PathBuf;

use anyhow::{Context, Result};
use country_core::{Catalog, Locale};
use country_list::{Countries, CountriesOptions, Settings};

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Settings document (YAML, or JSON by extension).
    pub settings: Option<PathBuf>,
    /// Translation catalog (YAML, locale → key → translation).
    pub translations: Option<PathBuf>,
    pub locale: Locale,
}

impl CliContext {
    /// Parse the `--locale` argument and collect the shared paths.
    pub fn new(
        locale: &str,
        settings: Option<PathBuf>,
        translations: Option<PathBuf>,
    ) -> Result<Self> {
        let locale = Locale::parse(locale).with_context(|| format!("invalid --locale '{locale}'"))?;
        Ok(Self {
            settings,
            translations,
            locale,
        })
    }

    /// Build the facade with `options` as the per-field layer.
    pub fn countries(&self, options: CountriesOptions) -> Result<Countries> {
        let settings = match &self.settings {
            Some(path) => Settings::from_path(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };
        let mut builder = Countries::builder().settings(settings).options(options);
        if let Some(path) = &self.translations {
            let catalog = Catalog::from_path(path)
                .with_context(|| format!("failed to load translations from {}", path.display()))?;
            tracing::debug!(locales = catalog.locale_count(), "loaded translation catalog");
            builder = builder.translator(catalog);
        }
        Ok(builder.build())
    }
}
