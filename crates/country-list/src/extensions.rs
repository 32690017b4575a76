//! # Extension Registry
//!
//! Named `(code) -> value` functions that attach extra attributes to
//! [`Country`](crate::Country) values, for data this crate does not carry
//! (currencies, calling codes, …). Register them on the
//! [`CountriesBuilder`](crate::CountriesBuilder) before the facade is built;
//! the registry is immutable afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use country_core::CountryCode;
use serde_json::Value;

/// A registered extension function.
pub type ExtensionFn = Arc<dyn Fn(&CountryCode) -> Option<Value> + Send + Sync>;

/// Extension functions by name.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    extensions: BTreeMap<String, ExtensionFn>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&CountryCode) -> Option<Value> + Send + Sync + 'static,
    {
        self.extensions.insert(name.into(), Arc::new(f));
    }

    /// Evaluate extension `name` for `code`. `None` when the extension is
    /// not registered or has no value for the code.
    pub fn call(&self, name: &str, code: &CountryCode) -> Option<Value> {
        self.extensions.get(name).and_then(|f| f(code))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.extensions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("names", &self.extensions.keys().collect::<Vec<_>>())
            .finish()
    }
}
