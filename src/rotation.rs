// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! The rotation evaluator.
//!
//! Given a parsed secret's cert chain and the current time, decides
//! `keep` or `rotate`. Time is injectable (`now: DateTime<Utc>`) so tests
//! never depend on the wall clock.

use chrono::{DateTime, Utc};
use x509_parser::prelude::*;

/// The verdict the evaluator reaches for one secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The secret is within its grace window and its root matches; no
    /// action needed.
    Keep,
    /// The secret must be re-issued, tagged with why.
    Rotate(RotateReason),
}

/// Why the evaluator chose to rotate, used for metrics labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotateReason {
    /// The certificate could not be parsed or fails basic well-formedness.
    Malformed,
    /// Remaining TTL has fallen to or below the absolute grace period.
    Expiring,
    /// The secret's recorded root no longer matches the CA's current root.
    RootDrift,
}

/// Evaluates whether `cert_chain_pem`'s leaf certificate needs rotation.
///
/// `ratio` and `min_grace` define the absolute grace period:
/// `graceAbs = max(ratio * total_ttl, min_grace)`. Rotation is also forced
/// if the cert is unparseable, or if `secret_root_pem != current_root_pem`.
/// Exact equality (`remaining == graceAbs`) resolves to rotate.
#[must_use]
pub fn evaluate(
    cert_chain_pem: &str,
    secret_root_pem: &str,
    current_root_pem: &str,
    now: DateTime<Utc>,
    ratio: f64,
    min_grace: chrono::Duration,
) -> Verdict {
    if secret_root_pem != current_root_pem {
        return Verdict::Rotate(RotateReason::RootDrift);
    }

    let Some((not_before, not_after)) = leaf_validity(cert_chain_pem) else {
        return Verdict::Rotate(RotateReason::Malformed);
    };

    if not_after < not_before {
        return Verdict::Rotate(RotateReason::Malformed);
    }

    let total = not_after - not_before;
    let remaining = not_after - now;
    let grace_abs = std::cmp::max(
        chrono::Duration::milliseconds((total.num_milliseconds() as f64 * ratio).round() as i64),
        min_grace,
    );

    if remaining <= grace_abs {
        Verdict::Rotate(RotateReason::Expiring)
    } else {
        Verdict::Keep
    }
}

/// Extracts `(notBefore, notAfter)` from the leaf (first) PEM certificate
/// in `cert_chain_pem`, or `None` if it's not parseable X.509.
fn leaf_validity(cert_chain_pem: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (_, pem) = parse_x509_pem(cert_chain_pem.as_bytes()).ok()?;
    let (_, cert) = X509Certificate::from_der(&pem.contents).ok()?;
    let validity = cert.validity();
    let not_before = DateTime::from_timestamp(validity.not_before.timestamp(), 0)?;
    let not_after = DateTime::from_timestamp(validity.not_after.timestamp(), 0)?;
    Some((not_before, not_after))
}

#[cfg(test)]
#[path = "rotation_tests.rs"]
mod tests;
