// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! The cluster-API client seam.
//!
//! `ClusterApi` is the only way the rest of the controller touches the
//! cluster: CRUD on secrets, get on namespaces, list on identities. A
//! `KubeClusterApi` backs it with real `kube::Api` calls; `fake::FakeClusterApi`
//! records an ordered call log so tests can assert on exactly which calls
//! were made and in what order.

pub mod fake;

use crate::errors::ClusterApiError;
use crate::identity::Identity;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret, ServiceAccount};
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client, ResourceExt};
use std::collections::BTreeMap;

/// The cluster-API client capability set: namespaced CRUD on secrets, get
/// on namespaces, list on identities.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Creates `secret` in the cluster.
    async fn create_secret(&self, secret: &Secret) -> Result<(), ClusterApiError>;

    /// Updates an existing secret (full replace of `data`/`type`).
    async fn update_secret(&self, secret: &Secret) -> Result<(), ClusterApiError>;

    /// Deletes the secret `name` in `namespace`. Not-found is not an error.
    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), ClusterApiError>;

    /// Fetches a namespace's labels, for policy resolution.
    async fn get_namespace(&self, name: &str) -> Result<BTreeMap<String, String>, ClusterApiError>;

    /// Lists all identities (service accounts) in `namespace`, for
    /// back-fill.
    async fn list_identities(&self, namespace: &str) -> Result<Vec<Identity>, ClusterApiError>;

    /// Fetches a single identity, used by the `secret-deleted` handler to
    /// check whether the owning identity still exists.
    async fn get_identity(&self, namespace: &str, name: &str) -> Result<Option<Identity>, ClusterApiError>;
}

/// The real [`ClusterApi`], backed by `kube::Api`.
pub struct KubeClusterApi {
    client: Client,
}

impl KubeClusterApi {
    /// Builds a client from an existing `kube::Client`.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }

    fn service_accounts(&self, namespace: &str) -> Api<ServiceAccount> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn create_secret(&self, secret: &Secret) -> Result<(), ClusterApiError> {
        let namespace = secret.namespace().unwrap_or_default();
        self.secrets(&namespace)
            .create(&PostParams::default(), secret)
            .await
            .map(|_| ())
            .map_err(ClusterApiError::from)
    }

    async fn update_secret(&self, secret: &Secret) -> Result<(), ClusterApiError> {
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();
        self.secrets(&namespace)
            .replace(&name, &PostParams::default(), secret)
            .await
            .map(|_| ())
            .map_err(ClusterApiError::from)
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), ClusterApiError> {
        match self
            .secrets(namespace)
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Ok(()),
            Err(e) => Err(ClusterApiError::from(e)),
        }
    }

    async fn get_namespace(&self, name: &str) -> Result<BTreeMap<String, String>, ClusterApiError> {
        let ns = self
            .namespaces()
            .get(name)
            .await
            .map_err(ClusterApiError::from)?;
        Ok(ns.labels().clone())
    }

    async fn list_identities(&self, namespace: &str) -> Result<Vec<Identity>, ClusterApiError> {
        let list = self
            .service_accounts(namespace)
            .list(&kube::api::ListParams::default())
            .await
            .map_err(ClusterApiError::from)?;
        Ok(list
            .into_iter()
            .map(|sa| Identity::new(sa.name_any(), namespace.to_string()))
            .collect())
    }

    async fn get_identity(&self, namespace: &str, name: &str) -> Result<Option<Identity>, ClusterApiError> {
        match self.service_accounts(namespace).get(name).await {
            Ok(sa) => Ok(Some(Identity::new(sa.name_any(), namespace.to_string()))),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Ok(None),
            Err(e) => Err(ClusterApiError::from(e)),
        }
    }
}
