//! Explicit provider registry.
//!
//! A `Providers` value is created by the host and threaded explicitly to the
//! code that needs shared services. The store registers itself under
//! [`STORE_KEY`] with `Store::install`; nothing is looked up ambiently.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Opaque registration token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProvideKey(&'static str);

impl ProvideKey {
    /// Create a token. Tokens with the same label are the same token.
    pub const fn new(label: &'static str) -> Self {
        Self(label)
    }

    pub fn label(&self) -> &'static str {
        self.0
    }
}

/// Token under which a store installs itself.
pub const STORE_KEY: ProvideKey = ProvideKey::new("modux.store");

/// Services registered by token.
#[derive(Clone, Default)]
pub struct Providers {
    entries: HashMap<ProvideKey, Arc<dyn Any + Send + Sync>>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `key`, replacing any earlier registration.
    pub fn provide<T: Any + Send + Sync>(&mut self, key: ProvideKey, value: T) {
        self.entries.insert(key, Arc::new(value));
    }

    /// Retrieve a clone of the value registered under `key`, if it has type `T`.
    pub fn inject<T: Any + Clone>(&self, key: ProvideKey) -> Option<T> {
        self.entries
            .get(&key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Whether anything is registered under `key`.
    pub fn contains(&self, key: ProvideKey) -> bool {
        self.entries.contains_key(&key)
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.entries.keys().map(ProvideKey::label))
            .finish()
    }
}
