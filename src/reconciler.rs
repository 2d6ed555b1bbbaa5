// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! The event reconciler.
//!
//! [`Reconciler`] is the single logical worker: it owns the local
//! secret cache and a small namespace managed-state side-table, and is the
//! only thing that drives the namespace policy, the issuance engine, and
//! the rotation evaluator. Routing one [`Event`] at a time through
//! [`Reconciler::dispatch`] is what keeps `(namespace, name)` processing
//! ordered without any per-key locking.

use crate::ca::CertificateAuthority;
use crate::cache::SecretCache;
use crate::cluster_api::ClusterApi;
use crate::config::ControllerConfig;
use crate::constants::SECRET_TYPE_TAG;
use crate::errors::{ConfigError, ControllerError};
use crate::event::Event;
use crate::identity::Identity;
use crate::rotation::{self, RotateReason, Verdict};
use crate::secret_codec::{self};
use crate::{issuance, metrics};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Owns the reconciliation state for one controller instance.
///
/// Not `Clone`: there is exactly one reconciler per controller, driven from
/// one task. A future multi-worker implementation would need per-key
/// sharding and a guarded cache — this type does not provide that.
pub struct Reconciler {
    config: ControllerConfig,
    ca: Arc<dyn CertificateAuthority>,
    cluster: Arc<dyn ClusterApi>,
    cache: SecretCache,
    /// Last-observed managed state per namespace, used only to detect the
    /// `false -> true` transition that triggers back-fill. This is not the
    /// namespace object itself — just enough to avoid re-deriving "was it
    /// managed before" from nothing. Identities and namespaces are looked
    /// up via the cluster API, not cross-referenced in memory; this is a
    /// derived boolean, not a cached copy of either.
    namespace_managed: BTreeMap<String, bool>,
}

impl Reconciler {
    /// Builds a reconciler with an empty cache and no namespace history.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `config` fails [`ControllerConfig::validate`]
    /// — construction fails rather than letting an invalid configuration
    /// (e.g. a `grace_period_ratio` outside `[0, 1]`) run silently.
    pub fn new(
        config: ControllerConfig,
        ca: Arc<dyn CertificateAuthority>,
        cluster: Arc<dyn ClusterApi>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ca,
            cluster,
            cache: SecretCache::new(),
            namespace_managed: BTreeMap::new(),
        })
    }

    /// Read-only access to the secret cache, used by the scheduler
    /// to drive periodic rotation passes over everything this reconciler
    /// has issued so far.
    #[must_use]
    pub fn cache(&self) -> &SecretCache {
        &self.cache
    }

    /// The configuration this reconciler was built with.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The CA adapter this reconciler was built with, shared with the
    /// scheduler so it can read the current root without going through a
    /// full event.
    #[must_use]
    pub fn ca(&self) -> &Arc<dyn CertificateAuthority> {
        &self.ca
    }

    /// The cluster-API client this reconciler was built with.
    #[must_use]
    pub fn cluster(&self) -> &Arc<dyn ClusterApi> {
        &self.cluster
    }

    /// Mutable access to the secret cache, used by the scheduler to apply
    /// rotation outcomes.
    pub fn cache_mut(&mut self) -> &mut SecretCache {
        &mut self.cache
    }

    /// Dispatches one event to its handler, recording the
    /// reconcile-duration histogram under a handler-specific label
    /// and logging (never panicking on) any runtime error.
    pub async fn dispatch(&mut self, event: Event) {
        let handler_name = handler_label(&event);
        let start = std::time::Instant::now();

        let result = match event {
            Event::IdentityAdded(identity) => self.handle_identity_added(&identity).await,
            Event::IdentityDeleted(identity) => self.handle_identity_deleted(&identity).await,
            Event::NamespaceObserved { name, labels } => {
                self.handle_namespace_observed(&name, &labels).await
            }
            Event::SecretObserved(secret) => self.handle_secret_observed(&secret).await,
            Event::SecretDeleted {
                namespace,
                name,
                type_tag,
            } => {
                self.handle_secret_deleted(&namespace, &name, type_tag.as_deref())
                    .await
            }
        };

        metrics::record_handler_duration(handler_name, start.elapsed());
        if let Err(err) = result {
            tracing::error!(handler = handler_name, error = %err, "event handler failed");
        }
    }

    /// Handles an identity-added event by delegating to [`issuance::upsert`],
    /// which itself no-ops on an unmanaged namespace or an already-cached
    /// secret.
    async fn handle_identity_added(&mut self, identity: &Identity) -> Result<(), ControllerError> {
        issuance::upsert(
            identity,
            &self.config,
            self.ca.as_ref(),
            self.cluster.as_ref(),
            &mut self.cache,
        )
        .await
    }

    /// Handles an identity-deleted event by unconditionally deleting its
    /// secret.
    async fn handle_identity_deleted(
        &mut self,
        identity: &Identity,
    ) -> Result<(), ControllerError> {
        issuance::delete(identity, self.cluster.as_ref(), &mut self.cache).await
    }

    /// Handles a secret-deleted event: ignores foreign secrets; for ours,
    /// recovers the identity from the secret name and re-creates it if the
    /// identity still exists, else does nothing (orphan).
    async fn handle_secret_deleted(
        &mut self,
        namespace: &str,
        name: &str,
        type_tag: Option<&str>,
    ) -> Result<(), ControllerError> {
        if !secret_codec::is_ours_type(type_tag) {
            return Ok(());
        }

        let Some(identity_name) = Identity::name_from_secret_name(name) else {
            return Ok(());
        };

        match self.cluster.get_identity(namespace, identity_name).await? {
            Some(identity) => {
                issuance::upsert(
                    &identity,
                    &self.config,
                    self.ca.as_ref(),
                    self.cluster.as_ref(),
                    &mut self.cache,
                )
                .await
            }
            None => Ok(()),
        }
    }

    /// `secret-updated(old, new)`: foreign secrets are ignored; among
    /// ours, the rotation evaluator decides `keep` or `rotate`, where an
    /// unparseable payload counts as `rotate` too — a malformed secret
    /// payload is simply overwritten with fresh material.
    async fn handle_secret_observed(
        &mut self,
        secret: &k8s_openapi::api::core::v1::Secret,
    ) -> Result<(), ControllerError> {
        if !secret_codec::is_ours(secret) {
            return Ok(());
        }

        let Some(name) = secret.metadata.name.clone() else {
            return Ok(());
        };
        let namespace = secret.metadata.namespace.clone().unwrap_or_default();
        let Some(identity_name) = Identity::name_from_secret_name(&name) else {
            return Ok(());
        };
        let identity = Identity::new(identity_name, namespace);

        // Resolve namespace context before re-signing, mirroring Upsert's
        // first step -- every identity-keyed write resolves N first.
        let _labels = self.cluster.get_namespace(&identity.namespace).await?;

        let reason = match secret_codec::parse(secret) {
            Ok(material) => {
                let bundle = self.ca.get_key_cert_bundle().await?;
                let min_grace = chrono::Duration::from_std(self.config.min_grace_period)
                    .unwrap_or(chrono::Duration::zero());
                match rotation::evaluate(
                    &material.cert_chain_pem,
                    &material.root_cert_pem,
                    &bundle.root_cert_pem,
                    chrono::Utc::now(),
                    self.config.grace_period_ratio,
                    min_grace,
                ) {
                    Verdict::Keep => return Ok(()),
                    Verdict::Rotate(reason) => reason,
                }
            }
            Err(_) => RotateReason::Malformed,
        };

        issuance::rotate(
            &identity,
            reason,
            &self.config,
            self.ca.as_ref(),
            self.cluster.as_ref(),
            &mut self.cache,
        )
        .await
    }

    /// `namespace-updated(old, new)`: on a `false -> true` transition,
    /// lists every identity in the namespace and back-fills a secret for
    /// each. Other transitions — including `true -> false` — intentionally
    /// produce no work here: this avoids destructive label-flip handling.
    async fn handle_namespace_observed(
        &mut self,
        name: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<(), ControllerError> {
        let now_managed = crate::namespace_policy::is_managed(
            self.config.default_managed,
            &self.config.ca_storage_namespace,
            labels,
        );
        let was_managed = self
            .namespace_managed
            .insert(name.to_string(), now_managed)
            .unwrap_or(false);

        if was_managed || !now_managed {
            return Ok(());
        }

        let identities = self.cluster.list_identities(name).await?;
        for identity in identities {
            if let Err(err) = issuance::upsert_known_managed(
                &identity,
                &self.config,
                self.ca.as_ref(),
                self.cluster.as_ref(),
                &mut self.cache,
            )
            .await
            {
                tracing::warn!(
                    identity = %identity.name,
                    namespace = %identity.namespace,
                    error = %err,
                    "back-fill issuance failed"
                );
            }
        }
        Ok(())
    }
}

fn handler_label(event: &Event) -> &'static str {
    match event {
        Event::IdentityAdded(_) => "identity_added",
        Event::IdentityDeleted(_) => "identity_deleted",
        Event::NamespaceObserved { .. } => "namespace_observed",
        Event::SecretObserved(_) => "secret_observed",
        Event::SecretDeleted { .. } => "secret_deleted",
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
