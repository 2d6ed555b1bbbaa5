// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! The secret codec.
//!
//! Bidirectional mapping between `(identity, namespace, material)` and the
//! opaque Kubernetes `Secret` payload. Key names and the type-tag are part
//! of the external contract and must never change across versions.

use crate::constants::{
    SECRET_KEY_CERT_CHAIN, SECRET_KEY_PRIVATE_KEY, SECRET_KEY_ROOT_CERT, SECRET_TYPE_TAG,
};
use crate::errors::CodecError;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;

/// The decoded material carried by a controller-managed secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretMaterial {
    /// Leaf certificate followed by any intermediates, PEM-encoded.
    pub cert_chain_pem: String,
    /// Private key, PEM-encoded.
    pub key_pem: String,
    /// CA root certificate, PEM-encoded.
    pub root_cert_pem: String,
}

/// Builds a controller-managed `Secret` object for `secret_name` in
/// `namespace`, carrying `material`. Does not set `resourceVersion` or
/// `uid` — those are assigned by the cluster API on create.
#[must_use]
pub fn build(secret_name: &str, namespace: &str, material: &SecretMaterial) -> Secret {
    let mut data = BTreeMap::new();
    data.insert(
        SECRET_KEY_ROOT_CERT.to_string(),
        ByteString(material.root_cert_pem.clone().into_bytes()),
    );
    data.insert(
        SECRET_KEY_CERT_CHAIN.to_string(),
        ByteString(material.cert_chain_pem.clone().into_bytes()),
    );
    data.insert(
        SECRET_KEY_PRIVATE_KEY.to_string(),
        ByteString(material.key_pem.clone().into_bytes()),
    );

    Secret {
        metadata: ObjectMeta {
            name: Some(secret_name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        type_: Some(SECRET_TYPE_TAG.to_string()),
        data: Some(data),
        ..Default::default()
    }
}

/// Parses a `Secret` into [`SecretMaterial`].
///
/// # Errors
/// Returns [`CodecError::ForeignSecret`] if the secret's type does not
/// match [`SECRET_TYPE_TAG`] — callers must treat this as "ignore", not a
/// failure — and [`CodecError::MissingKey`] /
/// [`CodecError::InvalidValue`] if a required key is absent or not valid
/// UTF-8.
pub fn parse(secret: &Secret) -> Result<SecretMaterial, CodecError> {
    let type_tag = secret.type_.as_deref().unwrap_or_default();
    if type_tag != SECRET_TYPE_TAG {
        return Err(CodecError::ForeignSecret {
            found: type_tag.to_string(),
            expected: SECRET_TYPE_TAG,
        });
    }

    let data = secret.data.as_ref().ok_or(CodecError::MissingKey {
        key: SECRET_KEY_ROOT_CERT,
    })?;

    Ok(SecretMaterial {
        root_cert_pem: read_key(data, SECRET_KEY_ROOT_CERT)?,
        cert_chain_pem: read_key(data, SECRET_KEY_CERT_CHAIN)?,
        key_pem: read_key(data, SECRET_KEY_PRIVATE_KEY)?,
    })
}

/// True if `secret` carries our type-tag; the reconciler must ignore
/// secret events whose type does not match.
#[must_use]
pub fn is_ours(secret: &Secret) -> bool {
    secret.type_.as_deref() == Some(SECRET_TYPE_TAG)
}

/// Same check as [`is_ours`], against a bare type string — used for
/// `secret-deleted` events where only the last-known type is available,
/// not a full `Secret`.
#[must_use]
pub fn is_ours_type(type_tag: Option<&str>) -> bool {
    type_tag == Some(SECRET_TYPE_TAG)
}

fn read_key(data: &BTreeMap<String, ByteString>, key: &'static str) -> Result<String, CodecError> {
    let value = data.get(key).ok_or(CodecError::MissingKey { key })?;
    String::from_utf8(value.0.clone()).map_err(|e| CodecError::InvalidValue {
        key,
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "secret_codec_tests.rs"]
mod tests;
