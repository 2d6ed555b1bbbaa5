// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Global constants for the controller.
//!
//! Constants are organized by category for easy maintenance, mirroring the
//! layout of the rest of the crate's modules.

// ============================================================================
// Secret contract constants
// ============================================================================

/// Stable prefix used to derive a secret's name from its owning identity:
/// `"<SECRET_NAME_PREFIX>.<identity.name>"`.
pub const SECRET_NAME_PREFIX: &str = "svid";

/// Type-tag distinguishing controller-managed secrets from unrelated ones.
pub const SECRET_TYPE_TAG: &str = "svidctl.io/workload-certificate";

/// Secret data key holding the CA root certificate, PEM-encoded.
pub const SECRET_KEY_ROOT_CERT: &str = "root-cert.pem";

/// Secret data key holding the leaf certificate followed by any
/// intermediates, PEM-encoded and concatenated.
pub const SECRET_KEY_CERT_CHAIN: &str = "cert-chain.pem";

/// Secret data key holding the PEM-encoded private key.
pub const SECRET_KEY_PRIVATE_KEY: &str = "key.pem";

// ============================================================================
// Namespace label constants
// ============================================================================

/// Namespace label selecting managed mode when `defaultManaged` is false;
/// its value must equal the CA-storage namespace name.
pub const LABEL_MANAGED: &str = "svidctl.io/managed";

/// Namespace label that, when set to `"false"`, forces the namespace
/// unmanaged regardless of `defaultManaged` or `LABEL_MANAGED`.
pub const LABEL_OVERRIDE: &str = "svidctl.io/override";

/// The literal value of `LABEL_OVERRIDE` that forces unmanaged.
pub const OVERRIDE_DISABLE_VALUE: &str = "false";

// ============================================================================
// Issuance engine constants
// ============================================================================

/// Maximum number of cluster-API attempts per handler invocation (R=3).
pub const ISSUANCE_RETRY_LIMIT: u32 = 3;

/// Default requested key size, in bits, for issued certificates.
pub const DEFAULT_KEY_SIZE_BITS: u32 = 2048;

// ============================================================================
// Controller error-handling constants
// ============================================================================

/// Requeue delay after a transient error surfaces from the event loop.
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

// ============================================================================
// Leader election constants
// ============================================================================

/// Default leader election lease duration.
pub const DEFAULT_LEASE_DURATION_SECS: u64 = 15;

/// Default leader election renew deadline.
pub const DEFAULT_LEASE_RENEW_DEADLINE_SECS: u64 = 10;

/// Default leader election retry period.
pub const DEFAULT_LEASE_RETRY_PERIOD_SECS: u64 = 2;

// ============================================================================
// Runtime constants
// ============================================================================

/// Number of worker threads for the Tokio runtime.
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Capacity of the bounded event queue feeding the single worker.
pub const EVENT_QUEUE_CAPACITY: usize = 1024;

// ============================================================================
// CA constants
// ============================================================================

/// Default organization name on issued certificates when none is configured.
pub const DEFAULT_CA_ORGANIZATION: &str = "svidctl";

/// Default validity period for the in-process self-signed root, in days.
pub const DEFAULT_ROOT_VALIDITY_DAYS: i64 = 3650;

// ============================================================================
// Metrics server constants
// ============================================================================

/// Port for the Prometheus metrics HTTP server.
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for the Prometheus metrics endpoint.
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for the metrics HTTP server.
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
