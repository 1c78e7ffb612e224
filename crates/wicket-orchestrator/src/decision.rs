use chrono::Utc;

use wicket_ledger::DecisionRecord;
use wicket_types::{AccessAttempt, SubjectId, VerificationResult};

/// The decision rule. Pure and total:
///
/// 1. No credential presented: deny (verification is never consulted).
/// 2. Otherwise: grant iff the credential matched and verification matched.
pub fn decide(credential_present: bool, credential_matched: bool, verification_matched: bool) -> bool {
    if !credential_present {
        return false;
    }
    credential_matched && verification_matched
}

/// Assemble the decision record for an attempt.
///
/// `verification` is `None` exactly when the credential was absent and the
/// verification stages were short-circuited. The inbound event's credential
/// flag means "presented and matched by the upstream reader", so it serves
/// as both `credential_present` and `credential_matched`.
pub fn record_for(attempt: &AccessAttempt, verification: Option<&VerificationResult>) -> DecisionRecord {
    let credential = attempt.credential_present;
    let (subject, verification_matched) = match verification {
        Some(result) => (result.subject.clone(), result.matched),
        None => (SubjectId::NoCredential, false),
    };

    DecisionRecord {
        subject,
        device: attempt.device.clone(),
        credential_matched: credential,
        verification_matched,
        access_granted: decide(credential, credential, verification_matched),
        decided_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use wicket_types::DeviceId;

    use super::*;

    #[test]
    fn absent_credential_always_denies() {
        assert!(!decide(false, false, false));
        assert!(!decide(false, true, true));
    }

    #[test]
    fn grant_requires_both_matches() {
        assert!(decide(true, true, true));
        assert!(!decide(true, true, false));
        assert!(!decide(true, false, true));
        assert!(!decide(true, false, false));
    }

    #[test]
    fn no_credential_record_carries_sentinel() {
        let attempt = AccessAttempt::new(DeviceId::new("door-1").unwrap(), false, None);
        let record = record_for(&attempt, None);
        assert_eq!(record.subject, SubjectId::NoCredential);
        assert!(!record.credential_matched);
        assert!(!record.verification_matched);
        assert!(!record.access_granted);
    }

    #[test]
    fn matched_verification_grants() {
        let attempt = AccessAttempt::new(DeviceId::new("door-1").unwrap(), true, None);
        let verification = VerificationResult::match_found("S7", 92.0);
        let record = record_for(&attempt, Some(&verification));
        assert_eq!(record.subject, SubjectId::known("S7"));
        assert!(record.access_granted);
    }

    #[test]
    fn failed_verification_denies_but_stays_auditable() {
        let attempt = AccessAttempt::new(DeviceId::new("door-1").unwrap(), true, None);
        for verification in [
            VerificationResult::no_match(10.0),
            VerificationResult::artifact_timeout(),
            VerificationResult::verifier_error(),
        ] {
            let record = record_for(&attempt, Some(&verification));
            assert!(!record.access_granted);
            assert!(record.credential_matched);
            assert_eq!(record.subject, verification.subject);
        }
    }

    proptest! {
        #[test]
        fn decide_truth_table(present in any::<bool>(), matched in any::<bool>(), verified in any::<bool>()) {
            let granted = decide(present, matched, verified);
            prop_assert_eq!(granted, present && matched && verified);
            // A grant is impossible without a verified match.
            if granted {
                prop_assert!(verified);
            }
        }
    }
}
