// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! The identity data type and the secret-name derivation it drives.

use crate::constants::SECRET_NAME_PREFIX;
use serde::{Deserialize, Serialize};

/// A service identity: `(name, namespace)`. Created and destroyed outside
/// the controller; immutable from our point of view.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// The identity's name, e.g. a `ServiceAccount` name.
    pub name: String,
    /// The namespace the identity lives in.
    pub namespace: String,
}

impl Identity {
    /// Builds an identity reference.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// The deterministic secret name for this identity: `"<prefix>.<name>"`.
    #[must_use]
    pub fn secret_name(&self) -> String {
        format!("{SECRET_NAME_PREFIX}.{}", self.name)
    }

    /// Recovers the identity name from a secret name produced by
    /// [`Identity::secret_name`], or `None` if it doesn't carry our prefix.
    #[must_use]
    pub fn name_from_secret_name(secret_name: &str) -> Option<&str> {
        secret_name
            .strip_prefix(SECRET_NAME_PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
            .filter(|name| !name.is_empty())
    }

    /// The SPIFFE-style URI subject used as the certificate's primary
    /// identity claim.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("spiffe://cluster.local/ns/{}/sa/{}", self.namespace, self.name)
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
