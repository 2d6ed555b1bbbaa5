// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Unit tests for scheduler.rs

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::ca::fake::FakeCertificateAuthority;
    use crate::ca::CertificateAuthority;
    use crate::cache::SecretSnapshot;
    use crate::cluster_api::fake::{Call, FakeClusterApi};
    use crate::cluster_api::ClusterApi;
    use crate::config::ControllerConfig;
    use crate::secret_codec::SecretMaterial;
    use std::sync::Arc;
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
    async fn pass_rotates_root_drifted_secrets_and_leaves_fresh_ones() {
        let cluster = Arc::new(FakeClusterApi::new());
        let ca = Arc::new(FakeCertificateAuthority::new());
        ca.set_root("root-v2");

        let mut reconciler = Reconciler::new(
            config(),
            ca.clone() as Arc<dyn CertificateAuthority>,
            cluster.clone() as Arc<dyn ClusterApi>,
        )
        .expect("config should validate");
        reconciler.cache_mut().put(SecretSnapshot {
            namespace: "test-ns".to_string(),
            name: "svid.drifted".to_string(),
            material: SecretMaterial {
                cert_chain_pem: "leaf".to_string(),
                key_pem: "key".to_string(),
                root_cert_pem: "root-v1".to_string(),
            },
        });

        run_pass(&mut reconciler).await;

        assert!(cluster
            .calls()
            .iter()
            .any(|c| matches!(c, Call::UpdateSecret { name, .. } if name == "svid.drifted")));
    }
}
