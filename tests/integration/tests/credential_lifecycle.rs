//! Integration test: issuer → holder → verifier across crates.

use chrono::{Duration, Utc};
use serde_json::json;

use digiwallet_credentials::{
    CredentialError, CredentialFilter, ErrorClass, RequireClaims, RevealFields, TrustedIssuers,
    VerificationStage,
};
use digiwallet_crypto::CanonicalBytes;
use digiwallet_identity::{DidDocument, VerifiableCredential, VerifiablePresentation};
use digiwallet_integration_tests::Deployment;
use digiwallet_storage::StoreExt;

// =========================================================================
// Round trips through the store
// =========================================================================

#[test]
fn test_documents_round_trip_through_store() {
    let d = Deployment::in_memory();
    let vc = d.issue_degree(Some(365));
    let vp = d
        .wallet
        .build_presentation(&[vc.id.clone()], &RevealFields::new(), "rt-1")
        .unwrap();

    let doc: DidDocument = d.store.load(d.issuer_did.uri()).unwrap();
    assert_eq!(doc, d.issuer.resolve_identifier(d.issuer_did.uri()).unwrap());

    let loaded_vc: VerifiableCredential = d.store.load(&vc.id).unwrap();
    assert_eq!(loaded_vc, vc);

    let loaded_vp: VerifiablePresentation = d.store.load(&vp.id).unwrap();
    assert_eq!(loaded_vp, vp);
}

#[test]
fn test_full_flow_verifies() {
    let d = Deployment::in_memory();
    let vc = d.issue_degree(Some(30));
    assert!(d.wallet.verify_credential(&vc).unwrap());

    let vp = d
        .wallet
        .build_presentation(&[vc.id.clone()], &RevealFields::new(), "session-42")
        .unwrap();
    assert_eq!(vp.id, "vp:session-42");
    assert_eq!(&vp.holder, d.holder());

    let report = d
        .verifier()
        .with_policy(TrustedIssuers::new([d.issuer_did.to_string()]))
        .verify_presentation(&vp)
        .expect("presentation should verify");
    assert!(report.valid());
    assert_eq!(report.checks.len(), 4);
}

// =========================================================================
// Canonicalization and tampering
// =========================================================================

#[test]
fn test_canonical_form_ignores_field_order() {
    let a = json!({"issuer": "did:example:a", "type": ["VerifiableCredential"], "id": "vc:1"});
    let b = json!({"id": "vc:1", "type": ["VerifiableCredential"], "issuer": "did:example:a"});
    assert_eq!(
        CanonicalBytes::new(&a).unwrap().as_bytes(),
        CanonicalBytes::new(&b).unwrap().as_bytes()
    );
}

#[test]
fn test_issued_credential_survives_reordering() {
    let d = Deployment::in_memory();
    let vc = d.issue_degree(None);
    // Reparsing through a Value reorders nothing semantically but rebuilds every map.
    let reparsed: VerifiableCredential =
        serde_json::from_value(serde_json::to_value(&vc).unwrap()).unwrap();
    assert!(d.wallet.verify_credential(&reparsed).unwrap());
}

#[test]
fn test_tampered_claim_fails_verification() {
    let d = Deployment::in_memory();
    let vc = d.issue_degree(None);

    let mut tampered = vc.clone();
    tampered
        .credential_subject
        .insert("degree".into(), "PhD Computer Science".into());
    assert!(!d.wallet.verify_credential(&tampered).unwrap());

    let mut retyped = vc.clone();
    retyped.types.push("AdminCredential".into());
    assert!(!d.wallet.verify_credential(&retyped).unwrap());

    let mut injected = vc;
    injected
        .credential_subject
        .insert("role".into(), "admin".into());
    assert!(!d.wallet.verify_credential(&injected).unwrap());
}

// =========================================================================
// Selective disclosure
// =========================================================================

#[test]
fn test_selective_disclosure_reveals_only_requested_claims() {
    let d = Deployment::in_memory();
    let vc = d.issue_degree(None);
    let mut reveal = RevealFields::new();
    reveal.insert(vc.id.clone(), vec!["name".into()]);

    let vp = d
        .wallet
        .build_presentation(&[vc.id.clone()], &reveal, "sd-1")
        .unwrap();
    let shown = &vp.verifiable_credential[0];
    let mut keys: Vec<&str> = shown.credential_subject.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["id", "name"]);
    assert!(!shown.claim_salts.contains_key("degree"));

    // The stored original is untouched.
    let original = d.wallet.get_credential(&vc.id).unwrap();
    assert_eq!(original, vc);

    d.verifier()
        .with_policy(RequireClaims(vec!["name".into()]))
        .verify_presentation(&vp)
        .expect("disclosed presentation should verify");

    let err = d
        .verifier()
        .with_policy(RequireClaims(vec!["degree".into()]))
        .verify_presentation(&vp)
        .unwrap_err();
    assert_eq!(err.verification_stage(), Some((VerificationStage::Policy, None)));
}

// =========================================================================
// Pipeline ordering and failures
// =========================================================================

#[test]
fn test_pipeline_reports_first_failing_credential() {
    let d = Deployment::in_memory();
    let now = Utc::now();
    let valid = d.issue_degree_at(Some(30), now);
    let expired = d.issue_degree_at(Some(1), now - Duration::days(5));
    let vp = d
        .wallet
        .build_presentation(
            &[valid.id.clone(), expired.id.clone()],
            &RevealFields::new(),
            "sc-1",
        )
        .unwrap();

    let err = d.verifier().verify_presentation_at(&vp, now).unwrap_err();
    // Holder authentication passed; the failure is credential 1, not 0.
    assert_eq!(
        err.verification_stage(),
        Some((VerificationStage::Credential, Some(1)))
    );
    assert!(matches!(err.root(), CredentialError::ExpiredCredential { .. }));
    assert_eq!(err.class(), ErrorClass::Validation);
}

#[test]
fn test_empty_inputs_rejected() {
    let d = Deployment::in_memory();
    let vc = d.issue_degree(None);

    let err = d
        .wallet
        .build_presentation(&[], &RevealFields::new(), "nonce")
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);

    let err = d
        .wallet
        .build_presentation(&[vc.id], &RevealFields::new(), "")
        .unwrap_err();
    assert!(matches!(err, CredentialError::Validation(_)));
}

// =========================================================================
// Listing filters
// =========================================================================

#[test]
fn test_active_and_expired_filters_partition() {
    let d = Deployment::in_memory();
    let now = Utc::now();
    let issued = now - Duration::days(10);
    d.issue_degree_at(None, issued);
    d.issue_degree_at(Some(3), issued);
    d.issue_degree_at(Some(7), issued);
    d.issue_degree_at(Some(60), issued);

    let active = CredentialFilter {
        active_only: true,
        ..Default::default()
    };
    let expired = CredentialFilter {
        expired_only: true,
        ..Default::default()
    };
    let active = d.wallet.list_credentials_at(&active, now).unwrap();
    let expired = d.wallet.list_credentials_at(&expired, now).unwrap();

    assert_eq!(active.len(), 2);
    assert_eq!(expired.len(), 2);
    assert!(expired.iter().all(|vc| vc.expiration_date.is_some()));
    assert!(active
        .iter()
        .all(|vc| vc.expiration_date.map_or(true, |exp| exp > now)));
}

#[test]
fn test_expiration_boundary() {
    let d = Deployment::in_memory();
    let vc = d.issue_degree(Some(1));
    let exp = vc.expiration_date.unwrap();

    assert!(!vc.is_active_at(exp));
    assert!(vc.is_expired_at(exp + Duration::microseconds(1)));
    assert!(vc.is_active_at(exp - Duration::seconds(1)));
}
