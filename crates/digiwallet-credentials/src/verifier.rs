use chrono::{DateTime, Utc};
use std::sync::Arc;

use digiwallet_core::{Did, ProofPurpose};
use digiwallet_identity::{
    verify_credential_proof, CryptoProvider, Proof, VerifiableCredential,
    VerifiablePresentation,
};

use crate::error::{CredentialError, VerificationStage};
use crate::policy::PresentationPolicy;
use crate::status::{AcceptingStatusChecker, StatusChecker};

/// An individual verification check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCheck {
    /// Name of the check.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Optional detail message.
    pub detail: Option<String>,
}

impl VerificationCheck {
    fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: None,
        }
    }
}

/// Outcome of a successful presentation verification.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub presentation_id: String,
    pub holder: Did,
    /// Checks run, in pipeline order.
    pub checks: Vec<VerificationCheck>,
}

impl VerificationReport {
    pub fn valid(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

/// Runs the four-stage presentation verification pipeline.
///
/// 1. structure: the presentation carries a proof and at least one credential
/// 2. holder authentication: the holder's proof verifies
/// 3. credentials, in order: issuer proof, claim digests, expiry, status
/// 4. policies, in registration order
///
/// The first failure ends the run and is returned wrapped with its stage and,
/// for stage 3, the credential index.
pub struct VerifierEngine {
    provider: Arc<dyn CryptoProvider>,
    status: Arc<dyn StatusChecker>,
    policies: Vec<Box<dyn PresentationPolicy>>,
}

impl VerifierEngine {
    pub fn new(provider: Arc<dyn CryptoProvider>) -> Self {
        Self {
            provider,
            status: Arc::new(AcceptingStatusChecker),
            policies: Vec::new(),
        }
    }

    pub fn with_status_checker(mut self, status: Arc<dyn StatusChecker>) -> Self {
        self.status = status;
        self
    }

    pub fn with_policy(mut self, policy: impl PresentationPolicy + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    pub fn add_policy(&mut self, policy: Box<dyn PresentationPolicy>) {
        self.policies.push(policy);
    }

    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }

    pub fn verify_presentation(
        &self,
        vp: &VerifiablePresentation,
    ) -> Result<VerificationReport, CredentialError> {
        self.verify_presentation_at(vp, Utc::now())
    }

    /// [`verify_presentation`](Self::verify_presentation) with an explicit clock.
    pub fn verify_presentation_at(
        &self,
        vp: &VerifiablePresentation,
        now: DateTime<Utc>,
    ) -> Result<VerificationReport, CredentialError> {
        let mut checks = Vec::new();

        let proof = check_structure(vp)
            .map_err(|e| e.at_stage(VerificationStage::Structure, None))?;
        checks.push(VerificationCheck::passed("structure"));
        tracing::debug!(presentation_id = %vp.id, stage = ?VerificationStage::Structure, "stage passed");

        self.check_holder(vp, proof)
            .map_err(|e| e.at_stage(VerificationStage::HolderAuthentication, None))?;
        checks.push(VerificationCheck::passed("holder_signature"));
        tracing::debug!(presentation_id = %vp.id, stage = ?VerificationStage::HolderAuthentication, "stage passed");

        for (index, vc) in vp.verifiable_credential.iter().enumerate() {
            self.check_credential(index, vc, now)
                .map_err(|e| e.at_stage(VerificationStage::Credential, Some(index)))?;
            checks.push(VerificationCheck::passed(format!("credential[{}]", index)));
            tracing::debug!(
                presentation_id = %vp.id,
                stage = ?VerificationStage::Credential,
                index,
                credential_id = %vc.id,
                "credential passed"
            );
        }

        for policy in &self.policies {
            policy.evaluate(vp).map_err(|reason| {
                CredentialError::PolicyRejected {
                    policy: policy.name().to_string(),
                    reason,
                }
                .at_stage(VerificationStage::Policy, None)
            })?;
            checks.push(VerificationCheck::passed(format!("policy:{}", policy.name())));
        }

        tracing::info!(
            presentation_id = %vp.id,
            holder = %vp.holder,
            credentials = vp.verifiable_credential.len(),
            policies = self.policies.len(),
            "presentation verified"
        );
        Ok(VerificationReport {
            presentation_id: vp.id.clone(),
            holder: vp.holder.clone(),
            checks,
        })
    }

    fn check_holder(
        &self,
        vp: &VerifiablePresentation,
        proof: &Proof,
    ) -> Result<(), CredentialError> {
        check_signer(proof, ProofPurpose::Authentication, &vp.holder, "holder")?;
        let payload = vp
            .signing_document()
            .map_err(|e| CredentialError::MalformedPresentation(e.to_string()))?;
        match self.provider.verify_signature(proof, &payload) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CredentialError::InvalidSignature(format!(
                "holder proof on {} does not verify",
                vp.id
            ))),
            Err(e) => Err(CredentialError::InvalidSignature(format!(
                "holder proof on {} cannot be checked: {}",
                vp.id, e
            ))),
        }
    }

    fn check_credential(
        &self,
        index: usize,
        vc: &VerifiableCredential,
        now: DateTime<Utc>,
    ) -> Result<(), CredentialError> {
        let Some(proof) = &vc.proof else {
            return Err(CredentialError::MalformedCredential {
                index,
                reason: format!("credential {} has no proof", vc.id),
            });
        };
        check_signer(proof, ProofPurpose::AssertionMethod, &vc.issuer, "issuer")?;

        match verify_credential_proof(self.provider.as_ref(), vc) {
            Ok(true) => {}
            Ok(false) => {
                return Err(CredentialError::InvalidSignature(format!(
                    "issuer proof on {} does not verify",
                    vc.id
                )))
            }
            Err(e) => {
                return Err(CredentialError::InvalidSignature(format!(
                    "issuer proof on {} cannot be checked: {}",
                    vc.id, e
                )))
            }
        }

        if let Some(expired_at) = vc.expiration_date {
            if now > expired_at {
                return Err(CredentialError::ExpiredCredential {
                    id: vc.id.clone(),
                    expired_at,
                });
            }
        }

        self.status.check(vc)
    }
}

fn check_structure(vp: &VerifiablePresentation) -> Result<&Proof, CredentialError> {
    let Some(proof) = &vp.proof else {
        return Err(CredentialError::MalformedPresentation(format!(
            "presentation {} has no proof",
            vp.id
        )));
    };
    if vp.verifiable_credential.is_empty() {
        return Err(CredentialError::MalformedPresentation(format!(
            "presentation {} contains no credentials",
            vp.id
        )));
    }
    Ok(proof)
}

/// The proof must be made for `purpose` by a method controlled by `signer`.
fn check_signer(
    proof: &Proof,
    purpose: ProofPurpose,
    signer: &Did,
    role: &str,
) -> Result<(), CredentialError> {
    if proof.proof_purpose != purpose {
        return Err(CredentialError::InvalidSignature(format!(
            "{} proof has purpose {}, expected {}",
            role, proof.proof_purpose, purpose
        )));
    }
    let controller = Did::controller_of(&proof.verification_method);
    if controller != signer.uri() {
        return Err(CredentialError::InvalidSignature(format!(
            "verification method {} does not belong to {} {}",
            proof.verification_method, role, signer
        )));
    }
    Ok(())
}
