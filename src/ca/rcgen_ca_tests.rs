// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Unit tests for rcgen_ca.rs

#[cfg(test)]
mod tests {
    use super::super::*;

    fn options() -> CertOptions {
        CertOptions::new(
            "spiffe://cluster.local/ns/test-ns/sa/test",
            Duration::from_secs(3600),
            2048,
        )
    }

    #[tokio::test]
    async fn sign_before_init_is_not_initialized() {
        let ca = RcgenCertificateAuthority::new(RootConfig::default());
        let err = ca.sign(&options()).await.unwrap_err();
        assert!(matches!(err, SigningError::NotInitialized));
    }

    #[tokio::test]
    async fn sign_after_init_returns_pem_material() {
        let ca = RcgenCertificateAuthority::new(RootConfig::default());
        ca.init().expect("init should succeed");
        let signed = ca.sign(&options()).await.expect("sign should succeed");
        assert!(signed.cert_pem.starts_with("-----BEGIN CERTIFICATE-----"));
        assert!(signed.key_pem.contains("PRIVATE KEY"));
    }

    #[tokio::test]
    async fn bundle_exposes_root_pem() {
        let ca = RcgenCertificateAuthority::new(RootConfig::default());
        ca.init().expect("init should succeed");
        let bundle = ca.get_key_cert_bundle().await.expect("bundle");
        assert!(bundle.root_cert_pem.starts_with("-----BEGIN CERTIFICATE-----"));
        assert!(bundle.intermediate_chain_pem.is_empty());
    }
}
