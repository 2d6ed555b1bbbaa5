// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Namespace policy.
//!
//! A pure decision table: given the default mode, the CA-storage namespace
//! name, and a namespace's labels, decide whether the namespace is managed.

use crate::constants::{LABEL_MANAGED, LABEL_OVERRIDE, OVERRIDE_DISABLE_VALUE};
use std::collections::BTreeMap;

/// Decides whether a namespace is managed.
///
/// The override label is a hard opt-out regardless of mode. When
/// `default_managed` is false, the `managed` label must equal
/// `ca_storage_namespace` exactly; any other value (including empty) means
/// unmanaged — a label present but not yet set to the right value should
/// not silently start issuing certificates into that namespace.
#[must_use]
pub fn is_managed(
    default_managed: bool,
    ca_storage_namespace: &str,
    labels: &BTreeMap<String, String>,
) -> bool {
    if labels.get(LABEL_OVERRIDE).map(String::as_str) == Some(OVERRIDE_DISABLE_VALUE) {
        return false;
    }

    if default_managed {
        return true;
    }

    labels.get(LABEL_MANAGED).map(String::as_str) == Some(ca_storage_namespace)
}

#[cfg(test)]
#[path = "namespace_policy_tests.rs"]
mod tests;
