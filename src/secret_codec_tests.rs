// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Unit tests for secret_codec.rs

#[cfg(test)]
mod tests {
    use super::super::*;

    fn material() -> SecretMaterial {
        SecretMaterial {
            cert_chain_pem: "leaf-pem".to_string(),
            key_pem: "key-pem".to_string(),
            root_cert_pem: "root-pem".to_string(),
        }
    }

    #[test]
    fn build_then_parse_round_trips() {
        let secret = build("svid.test", "test-ns", &material());
        let parsed = parse(&secret).expect("parse should succeed");
        assert_eq!(parsed, material());
    }

    #[test]
    fn build_sets_fixed_type_tag_and_keys() {
        let secret = build("svid.test", "test-ns", &material());
        assert_eq!(secret.type_.as_deref(), Some(SECRET_TYPE_TAG));
        let data = secret.data.expect("data should be set");
        assert!(data.contains_key(SECRET_KEY_ROOT_CERT));
        assert!(data.contains_key(SECRET_KEY_CERT_CHAIN));
        assert!(data.contains_key(SECRET_KEY_PRIVATE_KEY));
    }

    #[test]
    fn parse_rejects_foreign_type_tag() {
        let mut secret = build("svid.test", "test-ns", &material());
        secret.type_ = Some("Opaque".to_string());
        let err = parse(&secret).unwrap_err();
        assert!(matches!(err, CodecError::ForeignSecret { .. }));
    }

    #[test]
    fn parse_rejects_missing_key() {
        let mut secret = build("svid.test", "test-ns", &material());
        secret.data.as_mut().unwrap().remove(SECRET_KEY_PRIVATE_KEY);
        let err = parse(&secret).unwrap_err();
        assert!(matches!(err, CodecError::MissingKey { key } if key == SECRET_KEY_PRIVATE_KEY));
    }

    #[test]
    fn is_ours_checks_type_tag() {
        let secret = build("svid.test", "test-ns", &material());
        assert!(is_ours(&secret));
        let mut foreign = secret.clone();
        foreign.type_ = Some("Opaque".to_string());
        assert!(!is_ours(&foreign));
    }

    #[test]
    fn is_ours_type_checks_bare_tag() {
        assert!(is_ours_type(Some(SECRET_TYPE_TAG)));
        assert!(!is_ours_type(Some("Opaque")));
        assert!(!is_ours_type(None));
    }
}
