// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Unit tests for namespace_policy.rs

#[cfg(test)]
mod tests {
    use super::super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn override_wins_over_default_managed() {
        let l = labels(&[(LABEL_OVERRIDE, "false")]);
        assert!(!is_managed(true, "citadel", &l));
    }

    #[test]
    fn override_wins_over_matching_managed_label() {
        let l = labels(&[(LABEL_MANAGED, "citadel"), (LABEL_OVERRIDE, "false")]);
        assert!(!is_managed(false, "citadel", &l));
    }

    #[test]
    fn default_managed_true_with_no_labels_is_managed() {
        assert!(is_managed(true, "citadel", &BTreeMap::new()));
    }

    #[test]
    fn default_managed_false_with_matching_label_is_managed() {
        let l = labels(&[(LABEL_MANAGED, "citadel")]);
        assert!(is_managed(false, "citadel", &l));
    }

    #[test]
    fn default_managed_false_with_empty_label_is_unmanaged() {
        let l = labels(&[(LABEL_MANAGED, "")]);
        assert!(!is_managed(false, "citadel", &l));
    }

    #[test]
    fn default_managed_false_with_non_matching_label_is_unmanaged() {
        let l = labels(&[(LABEL_MANAGED, "some-other-namespace")]);
        assert!(!is_managed(false, "citadel", &l));
    }

    #[test]
    fn default_managed_false_with_absent_label_is_unmanaged() {
        assert!(!is_managed(false, "citadel", &BTreeMap::new()));
    }

    #[test]
    fn override_value_other_than_false_does_not_opt_out() {
        let l = labels(&[(LABEL_OVERRIDE, "true")]);
        assert!(is_managed(true, "citadel", &l));
    }
}
