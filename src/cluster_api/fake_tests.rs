// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Unit tests for fake.rs

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::secret_codec;

    fn material() -> secret_codec::SecretMaterial {
        secret_codec::SecretMaterial {
            cert_chain_pem: "leaf".into(),
            key_pem: "key".into(),
            root_cert_pem: "root".into(),
        }
    }

    #[tokio::test]
    async fn create_then_create_again_returns_already_exists() {
        let api = FakeClusterApi::new();
        let secret = secret_codec::build("svid.test", "test-ns", &material());
        api.create_secret(&secret).await.unwrap();
        let err = api.create_secret(&secret).await.unwrap_err();
        assert!(matches!(err, ClusterApiError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn fail_next_creates_forces_n_failures_then_succeeds() {
        let api = FakeClusterApi::new();
        api.fail_next_creates(2);
        let secret = secret_codec::build("svid.test", "test-ns", &material());
        assert!(api.create_secret(&secret).await.is_err());
        assert!(api.create_secret(&secret).await.is_err());
        assert!(api.create_secret(&secret).await.is_ok());
        assert_eq!(api.calls().len(), 3);
    }

    #[tokio::test]
    async fn get_namespace_records_call_and_returns_seeded_labels() {
        let api = FakeClusterApi::new();
        api.seed_namespace("test-ns", &[("svidctl.io/managed", "citadel")]);
        let labels = api.get_namespace("test-ns").await.unwrap();
        assert_eq!(labels.get("svidctl.io/managed").map(String::as_str), Some("citadel"));
        assert_eq!(api.calls(), vec![Call::GetNamespace("test-ns".to_string())]);
    }

    #[tokio::test]
    async fn delete_secret_is_idempotent_on_missing() {
        let api = FakeClusterApi::new();
        assert!(api.delete_secret("test-ns", "svid.missing").await.is_ok());
    }
}
