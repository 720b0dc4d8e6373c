use serde::{Deserialize, Serialize};
use time::Date;

use crate::provider::ProviderId;
use crate::{GatewayError, Result};

/// Normalized claim-intimation request, provider-agnostic.
///
/// The per-provider request builders translate this into whatever wire
/// payload the provider expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimIntimationRequest {
    pub provider_id: ProviderId,
    pub policy_number: String,
    pub member_uhid: String,
    pub patient_name: String,
    pub relation_to_proposer: String,
    pub diagnosis: String,
    pub admission_date: Date,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discharge_date: Option<Date>,
    pub hospital: ClaimHospital,
    pub claim_amount: f64,
    pub contact: ClaimContact,
}

/// Hospital details attached to a claim intimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimHospital {
    pub name: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Contact details of the intimating member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimContact {
    pub mobile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ClaimIntimationRequest {
    /// Caller-side completeness check, performed before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.policy_number.trim().is_empty() {
            return Err(GatewayError::validation("policy number is required"));
        }
        if self.member_uhid.trim().is_empty() {
            return Err(GatewayError::validation("member UHID is required"));
        }
        if self.patient_name.trim().is_empty() {
            return Err(GatewayError::validation("patient name is required"));
        }
        if self.hospital.name.trim().is_empty() {
            return Err(GatewayError::validation("hospital name is required"));
        }
        if self.claim_amount <= 0.0 {
            return Err(GatewayError::validation("claim amount must be positive"));
        }
        if self.contact.mobile.trim().is_empty() {
            return Err(GatewayError::validation("contact mobile is required"));
        }
        Ok(())
    }
}

/// Outcome of a claim intimation.
///
/// Invariant: `success == true` iff `reference_number` is present and
/// non-empty. The two constructors are the only way to build a result, so
/// the invariant cannot be violated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimIntimationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    /// Truncated raw provider response, for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response_excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ClaimIntimationResult {
    /// A successful intimation with the provider's tracking reference.
    ///
    /// An empty reference is treated as a failed normalization, keeping
    /// the success/reference invariant intact.
    pub fn accepted(reference_number: impl Into<String>) -> Self {
        let reference = reference_number.into();
        if reference.trim().is_empty() {
            return Self::failed("provider returned an empty reference number");
        }
        Self {
            success: true,
            reference_number: Some(reference),
            raw_response_excerpt: None,
            error_message: None,
        }
    }

    /// A failed intimation with a human-readable message.
    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            reference_number: None,
            raw_response_excerpt: None,
            error_message: Some(error_message.into()),
        }
    }

    /// Attach a truncated raw-response excerpt for diagnostics.
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.raw_response_excerpt = Some(excerpt.into());
        self
    }
}
