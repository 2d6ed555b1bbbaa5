// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Error taxonomy for the controller.
//!
//! Errors are grouped by the component that raises them and composed into
//! one [`ControllerError`] for callers that don't care which component
//! failed. [`ControllerError::is_transient`] is the single source of truth
//! the issuance engine consults when deciding whether a failure counts
//! against the retry budget.

use thiserror::Error;

/// Errors raised validating or building a [`crate::config::ControllerConfig`].
///
/// Configuration errors are fatal at construction time, never at runtime.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// `gracePeriodRatio` was outside `[0, 1]`.
    #[error("gracePeriodRatio must be in [0, 1], got {value}")]
    RatioOutOfRange {
        /// The offending value.
        value: f64,
    },

    /// A required constructor input was missing or empty.
    #[error("missing required configuration: {field}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvValue {
        /// The environment variable name.
        var: &'static str,
        /// Why parsing failed.
        reason: String,
    },
}

/// Errors raised by the cluster-API client.
#[derive(Error, Debug, Clone)]
pub enum ClusterApiError {
    /// The requested object does not exist.
    #[error("{kind} '{name}' not found in namespace '{namespace}'")]
    NotFound {
        /// Kubernetes kind, e.g. "Secret".
        kind: &'static str,
        /// Object name.
        name: String,
        /// Object namespace.
        namespace: String,
    },

    /// The object already exists (e.g. a racing create).
    #[error("{kind} '{name}' already exists in namespace '{namespace}'")]
    AlreadyExists {
        /// Kubernetes kind, e.g. "Secret".
        kind: &'static str,
        /// Object name.
        name: String,
        /// Object namespace.
        namespace: String,
    },

    /// A transient failure talking to the cluster API (timeouts, 5xx, conflicts).
    #[error("cluster API call failed: {reason}")]
    RequestFailed {
        /// Underlying failure description.
        reason: String,
    },
}

/// Errors raised by the CA adapter.
#[derive(Error, Debug, Clone)]
pub enum SigningError {
    /// The CA has not produced a usable root yet.
    #[error("certificate authority is not initialized")]
    NotInitialized,

    /// Key or certificate generation failed.
    #[error("certificate generation failed: {reason}")]
    GenerationFailed {
        /// Underlying failure description.
        reason: String,
    },
}

/// Errors raised by the secret codec.
#[derive(Error, Debug, Clone)]
pub enum CodecError {
    /// A required secret data key was absent.
    #[error("secret is missing required key '{key}'")]
    MissingKey {
        /// The missing key name.
        key: &'static str,
    },

    /// A secret data value was not valid UTF-8/PEM.
    #[error("secret key '{key}' contained invalid data: {reason}")]
    InvalidValue {
        /// The offending key name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The secret's type-tag did not match ours; callers must ignore it,
    /// not treat it as an error — this variant exists so the codec can
    /// report the mismatch to a caller that wants to log it.
    #[error("secret type '{found}' does not match expected tag '{expected}'")]
    ForeignSecret {
        /// The type-tag actually present.
        found: String,
        /// The type-tag we expected.
        expected: &'static str,
    },
}

/// Composite error type returned by the controller's public operations.
#[derive(Error, Debug, Clone)]
pub enum ControllerError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Cluster-API error.
    #[error(transparent)]
    ClusterApi(#[from] ClusterApiError),

    /// CA signing error.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Secret codec error.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Catch-all for failures that don't fit another category.
    #[error("controller error: {0}")]
    Generic(String),
}

impl ControllerError {
    /// Returns true if the issuance engine should count this failure
    /// against its retry budget and try again.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ClusterApi(ClusterApiError::RequestFailed { .. }) => true,
            Self::Signing(SigningError::GenerationFailed { .. }) => true,
            Self::ClusterApi(
                ClusterApiError::NotFound { .. } | ClusterApiError::AlreadyExists { .. },
            ) => false,
            Self::Signing(SigningError::NotInitialized) => false,
            Self::Codec(_) => false,
            Self::Config(_) => false,
            Self::Generic(_) => true,
        }
    }

    /// Returns a stable, short reason code suitable for log fields or
    /// metric labels.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Config(ConfigError::RatioOutOfRange { .. }) => "RatioOutOfRange",
            Self::Config(ConfigError::MissingField { .. }) => "MissingField",
            Self::Config(ConfigError::InvalidEnvValue { .. }) => "InvalidEnvValue",
            Self::ClusterApi(ClusterApiError::NotFound { .. }) => "NotFound",
            Self::ClusterApi(ClusterApiError::AlreadyExists { .. }) => "AlreadyExists",
            Self::ClusterApi(ClusterApiError::RequestFailed { .. }) => "RequestFailed",
            Self::Signing(SigningError::NotInitialized) => "CaNotInitialized",
            Self::Signing(SigningError::GenerationFailed { .. }) => "GenerationFailed",
            Self::Codec(CodecError::MissingKey { .. }) => "CodecMissingKey",
            Self::Codec(CodecError::InvalidValue { .. }) => "CodecInvalidValue",
            Self::Codec(CodecError::ForeignSecret { .. }) => "ForeignSecret",
            Self::Generic(_) => "Generic",
        }
    }
}

impl From<anyhow::Error> for ControllerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Generic(err.to_string())
    }
}

impl From<kube::Error> for ClusterApiError {
    fn from(err: kube::Error) -> Self {
        if let kube::Error::Api(ref resp) = err {
            if resp.code == 404 {
                return Self::NotFound {
                    kind: "resource",
                    name: String::new(),
                    namespace: String::new(),
                };
            }
            if resp.code == 409 {
                return Self::AlreadyExists {
                    kind: "resource",
                    name: String::new(),
                    namespace: String::new(),
                };
            }
        }
        Self::RequestFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
