// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! A deterministic [`CertificateAuthority`] fake for unit tests.

use super::{CertOptions, CertificateAuthority, KeyCertBundle, SignedCert};
use crate::errors::SigningError;
use async_trait::async_trait;
use std::sync::Mutex;

/// A fake CA that returns canned, easily-asserted-on PEM strings instead of
/// performing real cryptography. The root PEM can be swapped mid-test to
/// simulate root rotation for the rotation-evaluator's drift detection.
pub struct FakeCertificateAuthority {
    root_cert_pem: Mutex<String>,
    intermediate_chain_pem: Mutex<String>,
    sign_count: Mutex<u64>,
    fail_signs: Mutex<u32>,
}

impl FakeCertificateAuthority {
    /// Builds a fake CA whose root is the literal string `"root-v1"` and
    /// carries no intermediates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root_cert_pem: Mutex::new("root-v1".to_string()),
            intermediate_chain_pem: Mutex::new(String::new()),
            sign_count: Mutex::new(0),
            fail_signs: Mutex::new(0),
        }
    }

    /// Replaces the fake's root, simulating root drift/rotation.
    pub fn set_root(&self, root: impl Into<String>) {
        *self.root_cert_pem.lock().unwrap() = root.into();
    }

    /// Sets the intermediate chain returned alongside the root, simulating
    /// a multi-tier CA.
    pub fn set_intermediate_chain(&self, chain: impl Into<String>) {
        *self.intermediate_chain_pem.lock().unwrap() = chain.into();
    }

    /// Makes the next `n` calls to [`CertificateAuthority::sign`] fail with
    /// a retryable [`SigningError::GenerationFailed`].
    pub fn fail_next_signs(&self, n: u32) {
        *self.fail_signs.lock().unwrap() = n;
    }

    /// Total number of successful `sign()` calls observed.
    #[must_use]
    pub fn sign_count(&self) -> u64 {
        *self.sign_count.lock().unwrap()
    }
}

impl Default for FakeCertificateAuthority {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CertificateAuthority for FakeCertificateAuthority {
    async fn sign(&self, options: &CertOptions) -> Result<SignedCert, SigningError> {
        {
            let mut remaining = self.fail_signs.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SigningError::GenerationFailed {
                    reason: "fake: forced failure".to_string(),
                });
            }
        }
        *self.sign_count.lock().unwrap() += 1;
        Ok(SignedCert {
            cert_pem: format!("leaf-cert-for:{}", options.subject_uri),
            key_pem: format!("leaf-key-for:{}", options.subject_uri),
        })
    }

    async fn get_key_cert_bundle(&self) -> Result<KeyCertBundle, SigningError> {
        Ok(KeyCertBundle {
            root_cert_pem: self.root_cert_pem.lock().unwrap().clone(),
            intermediate_chain_pem: self.intermediate_chain_pem.lock().unwrap().clone(),
        })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
