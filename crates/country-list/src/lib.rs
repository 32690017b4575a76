//! # country-list — Country List Resolution
//!
//! Produces localized, ordered country choice lists and answers lookups
//! against them.
//!
//! ## Pipeline
//!
//! ```text
//! BaseTable ──resolve──▶ EffectiveTable ──order(locale)──▶ ResolvedList
//!     ▲                        ▲                               ▲
//!  country-data          TableConfig                   OrderingConfig
//!                     (OVERRIDE, ONLY, …)          (FIRST, FIRST_BREAK, …)
//! ```
//!
//! Both configurations are read from three option layers: the thread's
//! context stack, per-field [`CountriesOptions`], and global [`Settings`].
//! Tables and lists are cached under canonical fingerprints of their
//! configuration, so repeated requests return the same `Arc`.
//!
//! ## Modules
//!
//! - **Settings** (`settings.rs`): the option namespace and its documents.
//! - **Overrides** (`overrides.rs`): `OVERRIDE` values and `ONLY` entries.
//! - **Resolver** (`resolver.rs`): base table to effective table.
//! - **Ordering** (`ordering.rs`): first list, separator, sorted remainder.
//! - **Context** (`context.rs`): thread-local scoped overrides.
//! - **Cache** (`cache.rs`): at-most-once builds per key.
//! - **Facade** (`countries.rs`): [`Countries`] and its builder.
//! - **Country** (`country.rs`): per-country value object.
//! - **Extensions** (`extensions.rs`): named per-country attribute functions.
//!
//! ## Example
//!
//! ```ignore
//! let countries = Countries::with_settings(Settings::from_path("countries.yaml")?);
//! let en = Locale::parse("en")?;
//! for choice in countries.choices(&en)?.iter() {
//!     println!("{} {}", choice.value(), choice.label());
//! }
//! ```

pub mod cache;
pub mod context;
pub mod countries;
pub mod country;
pub mod extensions;
pub mod ordering;
pub mod overrides;
pub mod resolver;
pub mod settings;

pub use cache::{BuildCache, CacheStats};
pub use context::{countries_context, with_context, ContextGuard};
pub use countries::{Countries, CountriesBuilder, CountriesCacheStats};
pub use country::{unicode_flag, Country, CountryInfo};
pub use extensions::{ExtensionFn, ExtensionRegistry};
pub use ordering::{order, Choice, OrderingConfig, ResolvedList};
pub use overrides::{OnlyEntry, OverrideDescriptor, OverrideValue};
pub use resolver::{resolve, EffectiveTable, TableConfig};
pub use settings::{CountriesOptions, Settings, DEFAULT_FLAG_URL};
