// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! The local cache of observed secrets.
//!
//! This is the only state shared across event handlers within the single
//! worker. It is written and read by that worker alone — no locking
//! is needed as long as the controller stays single-worker (escape
//! hatch: a multi-worker design would need per-key sharding and a guarded
//! cache, which this crate does not implement).

use crate::secret_codec::SecretMaterial;
use std::collections::BTreeMap;

/// A cached snapshot of a controller-managed secret: just enough to drive
/// idempotence checks and scheduler rotation passes
/// without round-tripping to the cluster API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretSnapshot {
    /// Namespace the secret lives in.
    pub namespace: String,
    /// Secret name (`Identity::secret_name()`).
    pub name: String,
    /// The material last written, used by the scheduler to re-evaluate
    /// rotation without a fresh `get`.
    pub material: SecretMaterial,
}

/// The local cache: `(namespace, name) -> secret-snapshot`.
#[derive(Default)]
pub struct SecretCache {
    entries: BTreeMap<(String, String), SecretSnapshot>,
}

impl SecretCache {
    /// Builds an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// True if a secret is cached for `(namespace, name)` — used as the
    /// idempotence check before issuing on identity-add.
    #[must_use]
    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.entries
            .contains_key(&(namespace.to_string(), name.to_string()))
    }

    /// Returns the cached snapshot for `(namespace, name)`, if any.
    #[must_use]
    pub fn get(&self, namespace: &str, name: &str) -> Option<&SecretSnapshot> {
        self.entries.get(&(namespace.to_string(), name.to_string()))
    }

    /// Inserts or replaces the cached snapshot after a successful
    /// create/update.
    pub fn put(&mut self, snapshot: SecretSnapshot) {
        self.entries
            .insert((snapshot.namespace.clone(), snapshot.name.clone()), snapshot);
    }

    /// Removes the cached snapshot after a successful delete.
    pub fn remove(&mut self, namespace: &str, name: &str) {
        self.entries
            .remove(&(namespace.to_string(), name.to_string()));
    }

    /// Iterates all cached snapshots, for the scheduler's periodic sweep.
    pub fn iter(&self) -> impl Iterator<Item = &SecretSnapshot> {
        self.entries.values()
    }

    /// Number of cached secrets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the cache holds no secrets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
