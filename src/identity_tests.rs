// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Unit tests for identity.rs

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn secret_name_uses_fixed_prefix() {
        let id = Identity::new("test", "test-ns");
        assert_eq!(id.secret_name(), "svid.test");
    }

    #[test]
    fn name_from_secret_name_round_trips() {
        let id = Identity::new("my-identity", "ns");
        let recovered = Identity::name_from_secret_name(&id.secret_name());
        assert_eq!(recovered, Some("my-identity"));
    }

    #[test]
    fn name_from_secret_name_rejects_foreign_names() {
        assert_eq!(Identity::name_from_secret_name("other-prefix.test"), None);
        assert_eq!(Identity::name_from_secret_name("svid."), None);
        assert_eq!(Identity::name_from_secret_name("svid"), None);
    }
}
