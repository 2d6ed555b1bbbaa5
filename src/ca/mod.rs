// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! The CA adapter.
//!
//! Contract: given identity-shaped request parameters and a TTL, produce a
//! signed leaf certificate and key, and expose the CA's current root on
//! demand. The real CA is treated as an external collaborator; this module
//! defines the seam ([`CertificateAuthority`]) plus a concrete, buildable
//! default implementation ([`RcgenCertificateAuthority`]) and a
//! deterministic [`fake::FakeCertificateAuthority`] for tests.

pub mod fake;
pub mod rcgen_ca;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

/// Options controlling a single certificate issuance.
#[derive(Clone, Debug)]
pub struct CertOptions {
    /// Requested validity period.
    pub ttl: Duration,
    /// Requested RSA/EC key size, in bits; implementations may ignore this
    /// if they only support one key type.
    pub key_size: u32,
    /// Subject identity URI, e.g. `spiffe://cluster.local/ns/foo/sa/bar`.
    pub subject_uri: String,
    /// Additional SAN DNS names, e.g. from the well-known
    /// service-account-to-DNS-name map.
    pub san_dns_names: Vec<String>,
}

impl CertOptions {
    /// Builds options for `subject_uri` with the given TTL and no extra
    /// SAN entries.
    #[must_use]
    pub fn new(subject_uri: impl Into<String>, ttl: Duration, key_size: u32) -> Self {
        Self {
            ttl,
            key_size,
            subject_uri: subject_uri.into(),
            san_dns_names: Vec::new(),
        }
    }

    /// Adds extra SAN DNS names looked up from a well-known
    /// service-account map, returning `self` for chaining.
    #[must_use]
    pub fn with_san_dns_names(mut self, names: Vec<String>) -> Self {
        self.san_dns_names = names;
        self
    }
}

/// A freshly signed leaf certificate and its private key, PEM-encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedCert {
    /// Leaf certificate, PEM-encoded (no intermediates).
    pub cert_pem: String,
    /// Private key, PEM-encoded.
    pub key_pem: String,
}

/// The CA's current key material. Read-only to the controller — the CA
/// adapter owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyCertBundle {
    /// Root certificate, PEM-encoded.
    pub root_cert_pem: String,
    /// Intermediate chain, PEM-encoded and concatenated, leaf-to-root
    /// order; empty for a single-tier CA.
    pub intermediate_chain_pem: String,
}

/// The CA adapter's capability set: sign a leaf certificate and report
/// the CA's current root. Errors are opaque to callers — the
/// issuance engine treats every [`SigningError`](crate::errors::SigningError)
/// as retryable unless it's [`SigningError::NotInitialized`].
#[async_trait]
pub trait CertificateAuthority: Send + Sync {
    /// Signs a new leaf certificate for the given options.
    async fn sign(&self, options: &CertOptions) -> Result<SignedCert, crate::errors::SigningError>;

    /// Returns the CA's current root and intermediate chain.
    async fn get_key_cert_bundle(&self) -> Result<KeyCertBundle, crate::errors::SigningError>;
}

/// A well-known service-account name to extra DNS SAN names map, threaded
/// through from constructor input into [`CertOptions`].
pub type WellKnownSanMap = BTreeMap<String, Vec<String>>;
