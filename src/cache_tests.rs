// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Unit tests for cache.rs

#[cfg(test)]
mod tests {
    use super::super::*;

    fn snapshot(namespace: &str, name: &str) -> SecretSnapshot {
        SecretSnapshot {
            namespace: namespace.to_string(),
            name: name.to_string(),
            material: SecretMaterial {
                cert_chain_pem: "leaf".into(),
                key_pem: "key".into(),
                root_cert_pem: "root".into(),
            },
        }
    }

    #[test]
    fn put_then_contains() {
        let mut cache = SecretCache::new();
        assert!(!cache.contains("ns", "svid.a"));
        cache.put(snapshot("ns", "svid.a"));
        assert!(cache.contains("ns", "svid.a"));
    }

    #[test]
    fn remove_clears_entry() {
        let mut cache = SecretCache::new();
        cache.put(snapshot("ns", "svid.a"));
        cache.remove("ns", "svid.a");
        assert!(!cache.contains("ns", "svid.a"));
    }

    #[test]
    fn iter_covers_all_entries() {
        let mut cache = SecretCache::new();
        cache.put(snapshot("ns", "svid.a"));
        cache.put(snapshot("ns", "svid.b"));
        assert_eq!(cache.iter().count(), 2);
        assert_eq!(cache.len(), 2);
    }
}
