//! Persistence gateway for the two stored collections.
//!
//! Loads never fail: a missing key or a payload that does not parse yields an
//! empty collection. Saves report success as a bool. Both log failures.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::KvStore;
use crate::error::StorageError;

/// The named collections kept in the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Exercises,
    History,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Collection::Exercises => "ptExercises",
            Collection::History => "ptHistory",
        }
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// JSON load/save over any [`KvStore`].
pub struct Gateway {
    store: Box<dyn KvStore + Send>,
}

impl Gateway {
    pub fn new(store: impl KvStore + Send + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Load a collection, or an empty one if absent or unreadable.
    pub fn load<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        let key = collection.key();
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!(key, error = %e, "failed to read collection");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Option<Vec<T>>>(&raw) {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                tracing::error!(key, error = %e, "stored collection is not valid JSON, starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize and store a collection. Returns whether the write landed.
    pub fn save<T: Serialize>(&self, collection: Collection, items: &[T]) -> bool {
        let key = collection.key();
        let json = match serde_json::to_string(items) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to serialize collection");
                return false;
            }
        };

        match self.store.set(key, &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to write collection");
                false
            }
        }
    }
}
