// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! A deterministic [`ClusterApi`] fake with an ordered call log, used to
//! assert on exactly which cluster-API calls a test triggers and in what
//! order.

use super::ClusterApi;
use crate::errors::ClusterApiError;
use crate::identity::Identity;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ResourceExt;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// One observed call, in the order it was made. The `Display`-like string
/// forms used in tests (`"get ns test-ns"`, `"create secret svid.test in
/// test-ns"`, ...) mirror the shorthand used in the tests' own comments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// `get` on a namespace.
    GetNamespace(String),
    /// `create` on a secret.
    CreateSecret { name: String, namespace: String },
    /// `update` (replace) on a secret.
    UpdateSecret { name: String, namespace: String },
    /// `delete` on a secret.
    DeleteSecret { name: String, namespace: String },
    /// `list` on identities (service accounts) in a namespace.
    ListIdentities(String),
    /// `get` on a single identity (service account).
    GetIdentity { name: String, namespace: String },
}

/// A fake cluster-API client. Namespaces, secrets and identities are
/// seeded directly into the in-memory maps before exercising the
/// controller; every call is appended to an ordered log retrievable via
/// [`FakeClusterApi::calls`].
pub struct FakeClusterApi {
    namespaces: Mutex<BTreeMap<String, BTreeMap<String, String>>>,
    secrets: Mutex<BTreeMap<(String, String), Secret>>,
    identities: Mutex<BTreeMap<String, Vec<Identity>>>,
    calls: Mutex<Vec<Call>>,
    fail_next_creates: Mutex<u32>,
}

impl FakeClusterApi {
    /// Builds an empty fake.
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespaces: Mutex::new(BTreeMap::new()),
            secrets: Mutex::new(BTreeMap::new()),
            identities: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_next_creates: Mutex::new(0),
        }
    }

    /// Seeds a namespace with the given labels.
    pub fn seed_namespace(&self, name: &str, labels: &[(&str, &str)]) {
        self.namespaces.lock().unwrap().insert(
            name.to_string(),
            labels
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
    }

    /// Seeds an identity into a namespace's identity list (for `list`/`get`).
    pub fn seed_identity(&self, identity: Identity) {
        self.identities
            .lock()
            .unwrap()
            .entry(identity.namespace.clone())
            .or_default()
            .push(identity);
    }

    /// Seeds a secret directly, bypassing `create_secret` (so it doesn't
    /// appear in the call log).
    pub fn seed_secret(&self, secret: Secret) {
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();
        self.secrets
            .lock()
            .unwrap()
            .insert((namespace, name), secret);
    }

    /// Makes the next `n` `create_secret` calls fail with a retryable error.
    pub fn fail_next_creates(&self, n: u32) {
        *self.fail_next_creates.lock().unwrap() = n;
    }

    /// Returns the secret stored for `(namespace, name)`, if any.
    #[must_use]
    pub fn get_secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Returns the ordered call log observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Clears the call log without touching seeded state — useful between
    /// phases of a single test.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Default for FakeClusterApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterApi for FakeClusterApi {
    async fn create_secret(&self, secret: &Secret) -> Result<(), ClusterApiError> {
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();
        self.calls.lock().unwrap().push(Call::CreateSecret {
            name: name.clone(),
            namespace: namespace.clone(),
        });

        {
            let mut remaining = self.fail_next_creates.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ClusterApiError::RequestFailed {
                    reason: "fake: forced create failure".to_string(),
                });
            }
        }

        let mut secrets = self.secrets.lock().unwrap();
        if secrets.contains_key(&(namespace.clone(), name.clone())) {
            return Err(ClusterApiError::AlreadyExists {
                kind: "Secret",
                name,
                namespace,
            });
        }
        secrets.insert((namespace, name), secret.clone());
        Ok(())
    }

    async fn update_secret(&self, secret: &Secret) -> Result<(), ClusterApiError> {
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();
        self.calls.lock().unwrap().push(Call::UpdateSecret {
            name: name.clone(),
            namespace: namespace.clone(),
        });
        self.secrets
            .lock()
            .unwrap()
            .insert((namespace, name), secret.clone());
        Ok(())
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), ClusterApiError> {
        self.calls.lock().unwrap().push(Call::DeleteSecret {
            name: name.to_string(),
            namespace: namespace.to_string(),
        });
        self.secrets
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), name.to_string()));
        Ok(())
    }

    async fn get_namespace(&self, name: &str) -> Result<BTreeMap<String, String>, ClusterApiError> {
        self.calls.lock().unwrap().push(Call::GetNamespace(name.to_string()));
        self.namespaces
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ClusterApiError::NotFound {
                kind: "Namespace",
                name: name.to_string(),
                namespace: String::new(),
            })
    }

    async fn list_identities(&self, namespace: &str) -> Result<Vec<Identity>, ClusterApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::ListIdentities(namespace.to_string()));
        Ok(self
            .identities
            .lock()
            .unwrap()
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_identity(&self, namespace: &str, name: &str) -> Result<Option<Identity>, ClusterApiError> {
        self.calls.lock().unwrap().push(Call::GetIdentity {
            name: name.to_string(),
            namespace: namespace.to_string(),
        });
        Ok(self
            .identities
            .lock()
            .unwrap()
            .get(namespace)
            .into_iter()
            .flatten()
            .find(|i| i.name == name)
            .cloned())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
