// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! A minimal in-process, single-tier self-signed CA built on `rcgen`.
//!
//! This is the default concrete [`CertificateAuthority`]: a real CA's key
//! material and signing algorithm are out of scope, but a buildable crate
//! needs *a* working implementation to exercise the rest of the controller
//! end-to-end.

use super::{CertOptions, CertificateAuthority, KeyCertBundle, SignedCert};
use crate::errors::SigningError;
use async_trait::async_trait;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose,
    IsCa, KeyPair, KeyUsagePurpose, SanType,
};
use std::sync::RwLock;
use std::time::Duration;
use time::OffsetDateTime;

/// Configuration for [`RcgenCertificateAuthority::new`].
#[derive(Clone, Debug)]
pub struct RootConfig {
    /// Common name on the self-signed root.
    pub common_name: String,
    /// Organization name on the self-signed root and on leaf certs.
    pub organization: String,
    /// Validity period of the root, in days.
    pub validity_days: i64,
}

struct Root {
    cert: rcgen::Certificate,
    key_pair: KeyPair,
}

/// A self-signed root generated once at construction; every `sign()` call
/// issues a leaf certificate under that root.
pub struct RcgenCertificateAuthority {
    root: RwLock<Option<Root>>,
    config: RootConfig,
}

impl RcgenCertificateAuthority {
    /// Creates the adapter without generating a root yet; call
    /// [`RcgenCertificateAuthority::init`] before first use.
    #[must_use]
    pub fn new(config: RootConfig) -> Self {
        Self {
            root: RwLock::new(None),
            config,
        }
    }

    /// Generates the self-signed root. Idempotent only on first call —
    /// calling it again replaces the root (root rotation is out of scope
    /// here, so callers should invoke this exactly once per process).
    pub fn init(&self) -> Result<(), SigningError> {
        let mut params = CertificateParams::new(Vec::<String>::new()).map_err(|e| {
            SigningError::GenerationFailed {
                reason: format!("root params: {e}"),
            }
        })?;

        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, &self.config.common_name);
        dn.push(DnType::OrganizationName, &self.config.organization);
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
        ];

        let now = OffsetDateTime::now_utc();
        params.not_before = now;
        params.not_after = now + time::Duration::days(self.config.validity_days);

        let key_pair = KeyPair::generate().map_err(|e| SigningError::GenerationFailed {
            reason: format!("root key: {e}"),
        })?;
        let cert = params
            .self_signed(&key_pair)
            .map_err(|e| SigningError::GenerationFailed {
                reason: format!("root self-sign: {e}"),
            })?;

        *self.root.write().expect("root lock poisoned") = Some(Root { cert, key_pair });
        Ok(())
    }
}

#[async_trait]
impl CertificateAuthority for RcgenCertificateAuthority {
    async fn sign(&self, options: &CertOptions) -> Result<SignedCert, SigningError> {
        let guard = self.root.read().expect("root lock poisoned");
        let root = guard.as_ref().ok_or(SigningError::NotInitialized)?;

        let mut params = CertificateParams::new(options.san_dns_names.clone()).map_err(|e| {
            SigningError::GenerationFailed {
                reason: format!("leaf params: {e}"),
            }
        })?;

        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, &options.subject_uri);
        dn.push(DnType::OrganizationName, &self.config.organization);
        params.distinguished_name = dn;
        params.is_ca = IsCa::NoCa;
        params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyEncipherment,
        ];
        params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
        ];
        params
            .subject_alt_names
            .push(SanType::URI(options.subject_uri.clone().try_into().map_err(|e| {
                SigningError::GenerationFailed {
                    reason: format!("invalid subject URI: {e}"),
                }
            })?));

        let now = OffsetDateTime::now_utc();
        params.not_before = now;
        params.not_after = now
            + time::Duration::try_from(options.ttl).map_err(|e| SigningError::GenerationFailed {
                reason: format!("ttl out of range: {e}"),
            })?;

        let leaf_key = KeyPair::generate().map_err(|e| SigningError::GenerationFailed {
            reason: format!("leaf key: {e}"),
        })?;
        let cert = params
            .signed_by(&leaf_key, &root.cert, &root.key_pair)
            .map_err(|e| SigningError::GenerationFailed {
                reason: format!("leaf sign: {e}"),
            })?;

        Ok(SignedCert {
            cert_pem: cert.pem(),
            key_pem: leaf_key.serialize_pem(),
        })
    }

    async fn get_key_cert_bundle(&self) -> Result<KeyCertBundle, SigningError> {
        let guard = self.root.read().expect("root lock poisoned");
        let root = guard.as_ref().ok_or(SigningError::NotInitialized)?;
        Ok(KeyCertBundle {
            root_cert_pem: root.cert.pem(),
            intermediate_chain_pem: String::new(),
        })
    }
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            common_name: "svidctl root CA".to_string(),
            organization: crate::constants::DEFAULT_CA_ORGANIZATION.to_string(),
            validity_days: crate::constants::DEFAULT_ROOT_VALIDITY_DAYS,
        }
    }
}

#[cfg(test)]
#[path = "rcgen_ca_tests.rs"]
mod tests;
