// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! # svidctl - workload-identity secret controller
//!
//! `svidctl` is a per-cluster control-plane component that, for every
//! eligible service identity in a cluster, maintains a corresponding X.509
//! key/cert `Secret` signed by an internal certificate authority, and keeps
//! that secret fresh before expiry.
//!
//! ## Overview
//!
//! The controller watches three cluster event streams — identity
//! (`ServiceAccount`) creation/deletion, namespace label changes, and
//! secret deletion — and issues `create`/`update`/`delete` calls against
//! the cluster's secret store to converge on the desired state described
//! below.
//!
//! ## Modules
//!
//! - [`ca`] - the certificate-authority adapter seam, plus a self-signed
//!   `rcgen`-backed default implementation
//! - [`secret_codec`] - bidirectional mapping between identity material
//!   and the `Secret` payload
//! - [`namespace_policy`] - the pure managed/unmanaged decision table
//! - [`issuance`] - builds and writes certificates with bounded retry
//! - [`rotation`] - decides `keep` vs `rotate` for an existing secret
//! - [`reconciler`] - routes identity/namespace/secret events to the
//!   right handler and owns the local secret cache
//! - [`scheduler`] - the timer-driven rotation sweep
//! - [`cluster_api`] - the cluster-API client seam (`kube`-backed and fake
//!   implementations)
//! - [`config`] - constructor inputs and environment loading
//! - [`errors`] - the error taxonomy and transience classification
//! - [`metrics`] - Prometheus counters and histograms
//!
//! ## Example
//!
//! ```rust,no_run
//! use svidctl::config::ControllerConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ControllerConfig::from_env()?;
//! # Ok(())
//! # }
//! ```

pub mod ca;
pub mod cache;
pub mod cluster_api;
pub mod config;
pub mod constants;
pub mod errors;
pub mod event;
pub mod identity;
pub mod issuance;
pub mod metrics;
pub mod namespace_policy;
pub mod reconciler;
pub mod rotation;
pub mod scheduler;
pub mod secret_codec;
