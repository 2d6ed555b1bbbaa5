// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Unit tests for errors.rs

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn request_failed_is_transient() {
        let err = ControllerError::ClusterApi(ClusterApiError::RequestFailed {
            reason: "timeout".into(),
        });
        assert!(err.is_transient());
    }

    #[test]
    fn not_found_is_not_transient() {
        let err = ControllerError::ClusterApi(ClusterApiError::NotFound {
            kind: "Secret",
            name: "svid.test".into(),
            namespace: "test-ns".into(),
        });
        assert!(!err.is_transient());
    }

    #[test]
    fn config_errors_are_never_transient() {
        let err = ControllerError::Config(ConfigError::RatioOutOfRange { value: 1.4 });
        assert!(!err.is_transient());
        assert_eq!(err.status_reason(), "RatioOutOfRange");
    }

    #[test]
    fn foreign_secret_is_not_transient() {
        let err = ControllerError::Codec(CodecError::ForeignSecret {
            found: "Opaque".into(),
            expected: "svidctl.io/workload-certificate",
        });
        assert!(!err.is_transient());
    }
}
