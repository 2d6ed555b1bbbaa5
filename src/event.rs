// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! The event type fed into the single reconciler worker.
//!
//! The three watch streams — identity, namespace, secret — are mapped
//! into this enum at the point they're observed, outside the reconciler
//! itself; the reconciler only ever sees [`Event`] values off the queue,
//! never a raw watch stream.

use crate::identity::Identity;
use k8s_openapi::api::core::v1::Secret;
use std::collections::BTreeMap;

/// One unit of work dequeued by the reconciler's single worker.
#[derive(Clone, Debug)]
pub enum Event {
    /// A service identity was observed present. Covers both a genuine
    /// first sighting and any later re-apply of the same object — the
    /// handler's own idempotence check is what makes
    /// repeated delivery harmless.
    IdentityAdded(Identity),

    /// A service identity was observed deleted.
    IdentityDeleted(Identity),

    /// A namespace's labels were observed, on either creation or update.
    /// The reconciler diffs this against its own tracked managed-state to
    /// detect a `false -> true` transition and trigger back-fill.
    NamespaceObserved {
        /// Namespace name.
        name: String,
        /// Namespace labels at the time of observation.
        labels: BTreeMap<String, String>,
    },

    /// A secret was observed present, on either creation or update. Only
    /// `secret-updated` is handled; a secret we just created ourselves is
    /// simply evaluated as fresh and kept.
    SecretObserved(Secret),

    /// A secret was observed deleted. Only the last-known name, namespace
    /// and type are needed to dispatch.
    SecretDeleted {
        /// Namespace the secret lived in.
        namespace: String,
        /// Secret name.
        name: String,
        /// The secret's last-known `type`, checked against the
        /// controller's type-tag before any action is taken.
        type_tag: Option<String>,
    },
}
