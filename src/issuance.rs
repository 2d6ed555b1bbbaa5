// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! The issuance engine.
//!
//! `upsert` resolves the namespace, checks idempotence, signs, encodes,
//! writes with bounded retry, and caches the result. A retry loop stops
//! early, without spending its remaining budget, the moment
//! [`ControllerError::is_transient`] says the failure won't clear on its
//! own (e.g. a malformed-config or already-exists error).
//! `delete` unconditionally removes the secret. No exponential backoff is
//! used between attempts — correctness doesn't require it, and the tests
//! assert on exact attempt counts, which a sleeping retry loop would only
//! slow down.

use crate::ca::{CertOptions, CertificateAuthority};
use crate::cache::{SecretCache, SecretSnapshot};
use crate::cluster_api::ClusterApi;
use crate::config::ControllerConfig;
use crate::constants::{DEFAULT_KEY_SIZE_BITS, ISSUANCE_RETRY_LIMIT};
use crate::errors::ControllerError;
use crate::identity::Identity;
use crate::namespace_policy;
use crate::secret_codec::{self, SecretMaterial};
use crate::{metrics, rotation};

/// Creates a secret for `identity` if its namespace is managed and no
/// secret is cached yet, retrying the sign+build+create sequence up to
/// [`ISSUANCE_RETRY_LIMIT`] times.
///
/// Returns `Ok(())` both when a secret is created and when the operation
/// is a no-op (unmanaged namespace, or a cached secret already exists) —
/// callers that need to distinguish those cases should inspect the cache
/// themselves before calling.
pub async fn upsert(
    identity: &Identity,
    config: &ControllerConfig,
    ca: &dyn CertificateAuthority,
    cluster: &dyn ClusterApi,
    cache: &mut SecretCache,
) -> Result<(), ControllerError> {
    let labels = cluster.get_namespace(&identity.namespace).await?;
    if !namespace_policy::is_managed(
        config.default_managed,
        &config.ca_storage_namespace,
        &labels,
    ) {
        metrics::record_skipped_unmanaged(&identity.namespace);
        return Ok(());
    }

    upsert_known_managed(identity, config, ca, cluster, cache).await
}

/// Same as [`upsert`] but skips the namespace `get`/managed check: used by
/// the namespace back-fill path (`false -> true` transition), which
/// already knows the namespace is managed from the labels carried on the
/// `namespace-updated` event itself, so re-fetching them would be a
/// redundant cluster-API call — back-fill should list identities then
/// create, with no extra `get ns` per identity back-filled.
pub async fn upsert_known_managed(
    identity: &Identity,
    config: &ControllerConfig,
    ca: &dyn CertificateAuthority,
    cluster: &dyn ClusterApi,
    cache: &mut SecretCache,
) -> Result<(), ControllerError> {
    let secret_name = identity.secret_name();
    if cache.contains(&identity.namespace, &secret_name) {
        return Ok(());
    }

    let san_names = config
        .well_known_sans
        .get(&identity.name)
        .cloned()
        .unwrap_or_default();
    let options = CertOptions::new(identity.uri(), config.ttl, DEFAULT_KEY_SIZE_BITS)
        .with_san_dns_names(san_names);

    let mut last_err = None;
    for attempt in 1..=ISSUANCE_RETRY_LIMIT {
        match try_issue(identity, &secret_name, &options, ca, cluster).await {
            Ok(material) => {
                cache.put(SecretSnapshot {
                    namespace: identity.namespace.clone(),
                    name: secret_name,
                    material,
                });
                metrics::record_issuance_success(&identity.namespace);
                return Ok(());
            }
            Err(err) => {
                metrics::record_issuance_failure(&identity.namespace);
                tracing::warn!(
                    identity = %identity.name,
                    namespace = %identity.namespace,
                    attempt,
                    error = %err,
                    "issuance attempt failed"
                );
                let transient = err.is_transient();
                last_err = Some(err);
                if !transient {
                    break;
                }
            }
        }
    }

    metrics::record_retry_exhausted("upsert");
    Err(last_err.expect("loop runs at least once"))
}

async fn try_issue(
    identity: &Identity,
    secret_name: &str,
    options: &CertOptions,
    ca: &dyn CertificateAuthority,
    cluster: &dyn ClusterApi,
) -> Result<SecretMaterial, ControllerError> {
    let signed = ca.sign(options).await?;
    let bundle = ca.get_key_cert_bundle().await?;
    let material = SecretMaterial {
        cert_chain_pem: signed.cert_pem + &bundle.intermediate_chain_pem,
        key_pem: signed.key_pem,
        root_cert_pem: bundle.root_cert_pem,
    };
    let secret = secret_codec::build(secret_name, &identity.namespace, &material);
    cluster.create_secret(&secret).await?;
    Ok(material)
}

/// Unconditionally deletes the secret for `identity`; not-found is not
/// an error.
pub async fn delete(
    identity: &Identity,
    cluster: &dyn ClusterApi,
    cache: &mut SecretCache,
) -> Result<(), ControllerError> {
    let secret_name = identity.secret_name();
    cluster.delete_secret(&identity.namespace, &secret_name).await?;
    cache.remove(&identity.namespace, &secret_name);
    Ok(())
}

/// Re-signs and updates the secret for `identity` after the rotation
/// evaluator returned a verdict other than `Keep`, driven by
/// [`crate::reconciler`]'s `secret-updated` handler.
pub async fn rotate(
    identity: &Identity,
    reason: rotation::RotateReason,
    config: &ControllerConfig,
    ca: &dyn CertificateAuthority,
    cluster: &dyn ClusterApi,
    cache: &mut SecretCache,
) -> Result<(), ControllerError> {
    let secret_name = identity.secret_name();
    let san_names = config
        .well_known_sans
        .get(&identity.name)
        .cloned()
        .unwrap_or_default();
    let options = CertOptions::new(identity.uri(), config.ttl, DEFAULT_KEY_SIZE_BITS)
        .with_san_dns_names(san_names);

    let mut last_err = None;
    for attempt in 1..=ISSUANCE_RETRY_LIMIT {
        let outcome: Result<SecretMaterial, ControllerError> = async {
            let signed = ca.sign(&options).await?;
            let bundle = ca.get_key_cert_bundle().await?;
            let material = SecretMaterial {
                cert_chain_pem: signed.cert_pem + &bundle.intermediate_chain_pem,
                key_pem: signed.key_pem,
                root_cert_pem: bundle.root_cert_pem,
            };
            let secret = secret_codec::build(&secret_name, &identity.namespace, &material);
            cluster.update_secret(&secret).await?;
            Ok(material)
        }
        .await;

        match outcome {
            Ok(material) => {
                cache.put(SecretSnapshot {
                    namespace: identity.namespace.clone(),
                    name: secret_name,
                    material,
                });
                let reason_label = match reason {
                    rotation::RotateReason::Malformed => "malformed",
                    rotation::RotateReason::Expiring => "expiring",
                    rotation::RotateReason::RootDrift => "root_drift",
                };
                metrics::record_rotation(&identity.namespace, reason_label);
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(
                    identity = %identity.name,
                    namespace = %identity.namespace,
                    attempt,
                    error = %err,
                    "rotation attempt failed"
                );
                let transient = err.is_transient();
                last_err = Some(err);
                if !transient {
                    break;
                }
            }
        }
    }

    metrics::record_retry_exhausted("rotate");
    Err(last_err.expect("loop runs at least once"))
}

#[cfg(test)]
#[path = "issuance_tests.rs"]
mod tests;
