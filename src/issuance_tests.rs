// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Unit tests for issuance.rs

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::ca::fake::FakeCertificateAuthority;
    use crate::cluster_api::fake::{Call, FakeClusterApi};
    use std::time::Duration;

    fn config() -> ControllerConfig {
        ControllerConfig {
            default_managed: false,
            ttl: Duration::from_secs(3600),
            grace_period_ratio: 0.5,
            min_grace_period: Duration::from_secs(600),
            watched_namespaces: vec![],
            well_known_sans: Default::default(),
            ca_storage_namespace: "citadel".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_skips_unmanaged_namespace() {
        let cluster = FakeClusterApi::new();
        cluster.seed_namespace("test-ns", &[]);
        let ca = FakeCertificateAuthority::new();
        let mut cache = SecretCache::new();
        let identity = Identity::new("test", "test-ns");

        upsert(&identity, &config(), &ca, &cluster, &mut cache)
            .await
            .unwrap();

        assert_eq!(cluster.calls(), vec![Call::GetNamespace("test-ns".to_string())]);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn upsert_is_idempotent_when_cached() {
        let cluster = FakeClusterApi::new();
        cluster.seed_namespace("test-ns", &[("svidctl.io/managed", "citadel")]);
        let ca = FakeCertificateAuthority::new();
        let mut cache = SecretCache::new();
        let identity = Identity::new("test", "test-ns");

        upsert(&identity, &config(), &ca, &cluster, &mut cache).await.unwrap();
        cluster.clear_calls();
        upsert(&identity, &config(), &ca, &cluster, &mut cache).await.unwrap();

        assert_eq!(cluster.calls(), vec![Call::GetNamespace("test-ns".to_string())]);
    }

    #[tokio::test]
    async fn upsert_known_managed_skips_namespace_get() {
        let cluster = FakeClusterApi::new();
        let ca = FakeCertificateAuthority::new();
        let mut cache = SecretCache::new();
        let identity = Identity::new("test", "test-ns");

        upsert_known_managed(&identity, &config(), &ca, &cluster, &mut cache)
            .await
            .unwrap();

        let calls = cluster.calls();
        assert!(!calls.iter().any(|c| matches!(c, Call::GetNamespace(_))));
        assert_eq!(
            calls,
            vec![Call::CreateSecret {
                name: "svid.test".to_string(),
                namespace: "test-ns".to_string(),
            }]
        );
        assert!(cache.contains("test-ns", "svid.test"));
    }

    #[tokio::test]
    async fn upsert_retries_up_to_limit_then_succeeds() {
        let cluster = FakeClusterApi::new();
        cluster.seed_namespace("test-ns", &[("svidctl.io/managed", "citadel")]);
        cluster.fail_next_creates(2);
        let ca = FakeCertificateAuthority::new();
        let mut cache = SecretCache::new();
        let identity = Identity::new("test", "test-ns");

        upsert(&identity, &config(), &ca, &cluster, &mut cache).await.unwrap();

        let creates = cluster
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::CreateSecret { .. }))
            .count();
        assert_eq!(creates, 3);
        assert!(cache.contains("test-ns", "svid.test"));
    }

    #[tokio::test]
    async fn upsert_exhausts_retry_budget_and_leaves_no_secret() {
        let cluster = FakeClusterApi::new();
        cluster.seed_namespace("test-ns", &[("svidctl.io/managed", "citadel")]);
        cluster.fail_next_creates(5);
        let ca = FakeCertificateAuthority::new();
        let mut cache = SecretCache::new();
        let identity = Identity::new("test", "test-ns");

        let result = upsert(&identity, &config(), &ca, &cluster, &mut cache).await;

        assert!(result.is_err());
        let creates = cluster
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::CreateSecret { .. }))
            .count();
        assert_eq!(creates, 3);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn upsert_stops_retrying_on_non_transient_error() {
        let cluster = FakeClusterApi::new();
        cluster.seed_namespace("test-ns", &[("svidctl.io/managed", "citadel")]);
        let ca = FakeCertificateAuthority::new();
        let mut cache = SecretCache::new();
        let identity = Identity::new("test", "test-ns");

        // Seed the secret directly so `create_secret` returns the
        // non-transient `AlreadyExists`, which must not be retried.
        cluster.seed_secret(secret_codec::build(
            "svid.test",
            "test-ns",
            &SecretMaterial {
                cert_chain_pem: "leaf".into(),
                key_pem: "key".into(),
                root_cert_pem: "root".into(),
            },
        ));

        let result = upsert(&identity, &config(), &ca, &cluster, &mut cache).await;

        assert!(result.is_err());
        let creates = cluster
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::CreateSecret { .. }))
            .count();
        assert_eq!(creates, 1);
    }

    #[tokio::test]
    async fn upsert_concatenates_intermediate_chain_with_leaf() {
        let cluster = FakeClusterApi::new();
        cluster.seed_namespace("test-ns", &[("svidctl.io/managed", "citadel")]);
        let ca = FakeCertificateAuthority::new();
        ca.set_intermediate_chain("intermediate-pem");
        let mut cache = SecretCache::new();
        let identity = Identity::new("test", "test-ns");

        upsert(&identity, &config(), &ca, &cluster, &mut cache).await.unwrap();

        let snapshot = cache.get("test-ns", "svid.test").expect("secret cached");
        assert!(snapshot.material.cert_chain_pem.starts_with("leaf-cert-for:"));
        assert!(snapshot.material.cert_chain_pem.ends_with("intermediate-pem"));
    }

    #[tokio::test]
    async fn delete_removes_from_cache_and_is_idempotent() {
        let cluster = FakeClusterApi::new();
        let mut cache = SecretCache::new();
        cache.put(SecretSnapshot {
            namespace: "deleted-ns".to_string(),
            name: "svid.deleted".to_string(),
            material: SecretMaterial {
                cert_chain_pem: "leaf".into(),
                key_pem: "key".into(),
                root_cert_pem: "root".into(),
            },
        });
        let identity = Identity::new("deleted", "deleted-ns");

        delete(&identity, &cluster, &mut cache).await.unwrap();

        assert!(cache.is_empty());
        assert_eq!(
            cluster.calls(),
            vec![Call::DeleteSecret {
                name: "svid.deleted".to_string(),
                namespace: "deleted-ns".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn rotate_retries_up_to_limit_then_succeeds() {
        let cluster = FakeClusterApi::new();
        let ca = FakeCertificateAuthority::new();
        let mut cache = SecretCache::new();
        let identity = Identity::new("test", "test-ns");

        // `update_secret` never fails in the fake, so exercise
        // retry-then-succeed through a transient sign failure instead.
        ca.fail_next_signs(2);

        rotate(
            &identity,
            rotation::RotateReason::Expiring,
            &config(),
            &ca,
            &cluster,
            &mut cache,
        )
        .await
        .unwrap();

        assert_eq!(ca.sign_count(), 1);
        assert!(cache.contains("test-ns", "svid.test"));
    }

    #[tokio::test]
    async fn rotate_concatenates_intermediate_chain_with_leaf() {
        let cluster = FakeClusterApi::new();
        let ca = FakeCertificateAuthority::new();
        ca.set_intermediate_chain("intermediate-pem");
        let mut cache = SecretCache::new();
        let identity = Identity::new("test", "test-ns");

        rotate(
            &identity,
            rotation::RotateReason::Expiring,
            &config(),
            &ca,
            &cluster,
            &mut cache,
        )
        .await
        .unwrap();

        let snapshot = cache.get("test-ns", "svid.test").expect("secret cached");
        assert!(snapshot.material.cert_chain_pem.ends_with("intermediate-pem"));
    }
}
