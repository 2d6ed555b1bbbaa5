// Copyright (c) 2026 svidctl authors
// SPDX-License-Identifier: MIT

//! Unit tests for rotation.rs

#[cfg(test)]
mod tests {
    use super::super::*;
    use rcgen::{CertificateParams, DistinguishedName, DnType, IsCa, KeyPair};

    fn self_signed_cert(not_before: OffsetDateTimeShim, not_after: OffsetDateTimeShim) -> String {
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "test");
        params.distinguished_name = dn;
        params.is_ca = IsCa::NoCa;
        params.not_before = not_before.0;
        params.not_after = not_after.0;
        let key = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key).unwrap();
        cert.pem()
    }

    struct OffsetDateTimeShim(time::OffsetDateTime);

    fn from_chrono(dt: DateTime<Utc>) -> OffsetDateTimeShim {
        OffsetDateTimeShim(time::OffsetDateTime::from_unix_timestamp(dt.timestamp()).unwrap())
    }

    const ROOT_A: &str = "root-a";
    const ROOT_B: &str = "root-b";

    #[test]
    fn malformed_cert_forces_rotation() {
        let verdict = evaluate(
            "not a cert",
            ROOT_A,
            ROOT_A,
            Utc::now(),
            0.5,
            chrono::Duration::minutes(10),
        );
        assert_eq!(verdict, Verdict::Rotate(RotateReason::Malformed));
    }

    #[test]
    fn root_drift_forces_rotation_even_if_fresh() {
        let now = Utc::now();
        let cert = self_signed_cert(
            from_chrono(now - chrono::Duration::minutes(1)),
            from_chrono(now + chrono::Duration::hours(1)),
        );
        let verdict = evaluate(
            &cert,
            ROOT_A,
            ROOT_B,
            now,
            0.5,
            chrono::Duration::minutes(10),
        );
        assert_eq!(verdict, Verdict::Rotate(RotateReason::RootDrift));
    }

    #[test]
    fn fresh_cert_within_grace_is_kept() {
        let now = Utc::now();
        let cert = self_signed_cert(
            from_chrono(now - chrono::Duration::minutes(1)),
            from_chrono(now + chrono::Duration::hours(1)),
        );
        let verdict = evaluate(
            &cert,
            ROOT_A,
            ROOT_A,
            now,
            0.5,
            chrono::Duration::minutes(10),
        );
        assert_eq!(verdict, Verdict::Keep);
    }

    #[test]
    fn expired_cert_is_rotated() {
        let now = Utc::now();
        let cert = self_signed_cert(
            from_chrono(now - chrono::Duration::hours(2)),
            from_chrono(now - chrono::Duration::seconds(1)),
        );
        let verdict = evaluate(
            &cert,
            ROOT_A,
            ROOT_A,
            now,
            0.5,
            chrono::Duration::minutes(10),
        );
        assert_eq!(verdict, Verdict::Rotate(RotateReason::Expiring));
    }

    #[test]
    fn ratio_of_one_always_forces_rotation() {
        let now = Utc::now();
        let cert = self_signed_cert(
            from_chrono(now - chrono::Duration::minutes(1)),
            from_chrono(now + chrono::Duration::hours(1)),
        );
        let verdict = evaluate(&cert, ROOT_A, ROOT_A, now, 1.0, chrono::Duration::minutes(1));
        assert_eq!(verdict, Verdict::Rotate(RotateReason::Expiring));
    }
}
