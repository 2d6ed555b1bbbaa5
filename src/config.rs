// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Controller configuration.
//!
//! [`ControllerConfig`] bundles every constructor input the controller
//! needs; [`ControllerConfig::validate`] enforces the one invariant that
//! must be fatal at construction time rather than at runtime —
//! `gracePeriodRatio` in `[0, 1]`. [`ControllerConfig::from_env`] loads it
//! from `SVIDCTL_*` environment variables.

use crate::ca::WellKnownSanMap;
use crate::errors::ConfigError;
use std::time::Duration;

/// All constructor inputs required to build a controller instance.
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Default managed mode for namespaces with no `managed` label.
    pub default_managed: bool,
    /// Requested certificate validity, passed through as `CertOptions.ttl`.
    pub ttl: Duration,
    /// Grace-period ratio of total TTL; must be in `[0, 1]`.
    pub grace_period_ratio: f64,
    /// Minimum grace period floor, regardless of ratio.
    pub min_grace_period: Duration,
    /// Namespaces to watch; empty means cluster-wide.
    pub watched_namespaces: Vec<String>,
    /// Well-known service-account name to extra SAN DNS names map.
    pub well_known_sans: WellKnownSanMap,
    /// The CA-storage namespace name, used by the namespace policy.
    pub ca_storage_namespace: String,
}

impl ControllerConfig {
    /// Validates the configuration, returning a [`ConfigError`] if
    /// `grace_period_ratio` is outside `[0, 1]` or `ca_storage_namespace`
    /// is empty. Construction must fail here, never at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.grace_period_ratio) {
            return Err(ConfigError::RatioOutOfRange {
                value: self.grace_period_ratio,
            });
        }
        if self.ca_storage_namespace.is_empty() {
            return Err(ConfigError::MissingField {
                field: "ca_storage_namespace",
            });
        }
        Ok(())
    }

    /// Loads configuration from environment variables, falling back to
    /// reasonable defaults — defaults here exist only to keep local/dev
    /// runs simple; production deployments should set every `SVIDCTL_*`
    /// variable explicitly.
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_managed = parse_env_bool("SVIDCTL_DEFAULT_MANAGED", false)?;

        let ttl_secs = parse_env_u64("SVIDCTL_TTL_SECONDS", 3600)?;
        let grace_period_ratio = parse_env_f64("SVIDCTL_GRACE_PERIOD_RATIO", 0.5)?;
        let min_grace_secs = parse_env_u64("SVIDCTL_MIN_GRACE_SECONDS", 600)?;

        let watched_namespaces = std::env::var("SVIDCTL_WATCHED_NAMESPACES")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let ca_storage_namespace = std::env::var("SVIDCTL_CA_STORAGE_NAMESPACE")
            .unwrap_or_else(|_| "svidctl-system".to_string());

        let config = Self {
            default_managed,
            ttl: Duration::from_secs(ttl_secs),
            grace_period_ratio,
            min_grace_period: Duration::from_secs(min_grace_secs),
            watched_namespaces,
            well_known_sans: WellKnownSanMap::new(),
            ca_storage_namespace,
        };
        config.validate()?;
        Ok(config)
    }

    /// The scheduler tick interval implied by this configuration: at most
    /// half of `min_grace_period`, to guarantee rotation before expiry.
    #[must_use]
    pub fn scheduler_interval(&self) -> Duration {
        self.min_grace_period / 2
    }
}

fn parse_env_bool(var: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidEnvValue {
            var,
            reason: format!("'{value}' is not a valid bool"),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidEnvValue {
            var,
            reason: format!("'{value}' is not a valid u64"),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_f64(var: &'static str, default: f64) -> Result<f64, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidEnvValue {
            var,
            reason: format!("'{value}' is not a valid f64"),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
