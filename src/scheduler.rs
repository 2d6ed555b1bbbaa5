// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! The scheduler.
//!
//! A timer-driven alternate entry into rotation and issuance: on each
//! tick, every secret currently held in the reconciler's cache is
//! re-evaluated by the rotation evaluator and rotated if due. This is what
//! catches a secret whose owning identity produces no further event
//! before the secret's own grace period runs out.

use crate::errors::ControllerError;
use crate::identity::Identity;
use crate::reconciler::Reconciler;
use crate::rotation::{self, Verdict};
use crate::{issuance, metrics};

/// Runs one scheduler pass: evaluates every cached secret and
/// drives rotation for any that are due. Runtime errors from an individual
/// rotation are logged and do not abort the pass — a later tick or event
/// will retry; the controller never panics on runtime errors.
pub async fn run_pass(reconciler: &mut Reconciler) {
    let start = std::time::Instant::now();

    let bundle = match reconciler.ca().get_key_cert_bundle().await {
        Ok(bundle) => bundle,
        Err(err) => {
            tracing::warn!(error = %err, "scheduler: failed to read CA bundle, skipping pass");
            return;
        }
    };

    let min_grace = chrono::Duration::from_std(reconciler.config().min_grace_period)
        .unwrap_or(chrono::Duration::zero());
    let ratio = reconciler.config().grace_period_ratio;

    let due: Vec<(Identity, rotation::RotateReason)> = reconciler
        .cache()
        .iter()
        .filter_map(|snapshot| {
            let identity_name = Identity::name_from_secret_name(&snapshot.name)?;
            let identity = Identity::new(identity_name, snapshot.namespace.clone());
            match rotation::evaluate(
                &snapshot.material.cert_chain_pem,
                &snapshot.material.root_cert_pem,
                &bundle.root_cert_pem,
                chrono::Utc::now(),
                ratio,
                min_grace,
            ) {
                Verdict::Keep => None,
                Verdict::Rotate(reason) => Some((identity, reason)),
            }
        })
        .collect();

    for (identity, reason) in due {
        if let Err(err) = rotate_one(reconciler, &identity, reason).await {
            tracing::warn!(
                identity = %identity.name,
                namespace = %identity.namespace,
                error = %err,
                "scheduler: rotation attempt failed"
            );
        }
    }

    metrics::record_handler_duration("scheduler_pass", start.elapsed());
}

async fn rotate_one(
    reconciler: &mut Reconciler,
    identity: &Identity,
    reason: rotation::RotateReason,
) -> Result<(), ControllerError> {
    let config = reconciler.config().clone();
    let ca = reconciler.ca().clone();
    let cluster = reconciler.cluster().clone();
    issuance::rotate(
        identity,
        reason,
        &config,
        ca.as_ref(),
        cluster.as_ref(),
        reconciler.cache_mut(),
    )
    .await
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
