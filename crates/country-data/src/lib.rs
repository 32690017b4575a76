//! # country-data — Embedded Reference Data
//!
//! Ships the ISO 3166-1 country table and the UN M.49 region tree as YAML
//! documents compiled into the binary, and validates them once per process.
//!
//! - **Dataset** (`dataset.rs`): [`BaseTable`] of [`CountryRecord`]s with
//!   alpha-3 and numeric indexes, former names and common-name aliases.
//! - **Regions** (`regions.rs`): [`RegionTable`] with parent, ancestor and
//!   subdivision queries over M.49 numeric codes.
//!
//! ## Crate Policy
//!
//! - Depends only on `country-core` internally.
//! - Loaders never panic. A malformed document is a [`DataIntegrityError`]
//!   returned from every call, not only the first.
//!
//! [`DataIntegrityError`]: country_core::DataIntegrityError

pub mod dataset;
pub mod regions;

pub use dataset::{load, BaseTable, CountryRecord};
pub use regions::{load_regions, Region, RegionCode, RegionTable};
