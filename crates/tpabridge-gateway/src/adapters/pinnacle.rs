//! Pinnacle Care TPA (provider 9).
//!
//! Flat JSON behind a static partner-token header. The only success
//! marker is a non-empty top-level `referenceNo` (claims) or `ecardLink`
//! (e-cards); there is no refusal marker at all, so every non-success is
//! indeterminate and retried.

use serde_json::{Value, json};

use tpabridge_config::ProviderProfile;
use tpabridge_core::{
    ClaimIntimationRequest, ECardRequest, EcardDocument, GatewayError, ProviderId, Result,
};

use crate::credentials::Credential;
use crate::wire::{WireRequest, WireResponse};

use super::{ClaimOutcome, EcardOutcome, Outcome, ProviderAdapter, fmt_date};

pub struct PinnacleAdapter;

impl PinnacleAdapter {
    fn keyed(request: WireRequest, credential: &Credential) -> Result<WireRequest> {
        match credential {
            Credential::Header { name, value } => {
                Ok(request.with_header(name.as_str(), value.as_str()))
            }
            _ => Err(GatewayError::internal(
                "Pinnacle requires a static header credential",
            )),
        }
    }
}

impl ProviderAdapter for PinnacleAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId(9)
    }

    fn supports_claims(&self) -> bool {
        true
    }

    fn supports_ecard(&self) -> bool {
        true
    }

    fn build_claim(
        &self,
        profile: &ProviderProfile,
        credential: &Credential,
        request: &ClaimIntimationRequest,
    ) -> Result<WireRequest> {
        let url = profile.endpoints.claim_intimation.clone().ok_or_else(|| {
            GatewayError::internal("Pinnacle claim intimation endpoint not configured")
        })?;

        let payload = json!({
            "policyNumber": request.policy_number,
            "uhid": request.member_uhid,
            "patientName": request.patient_name,
            "relation": request.relation_to_proposer,
            "ailment": request.diagnosis,
            "admissionOn": fmt_date(request.admission_date),
            "dischargeOn": request.discharge_date.map(fmt_date),
            "hospitalName": request.hospital.name,
            "hospitalCity": request.hospital.city,
            "hospitalState": request.hospital.state,
            "pin": request.hospital.pincode,
            "claimedAmount": request.claim_amount,
            "contactNumber": request.contact.mobile,
            "contactEmail": request.contact.email,
        });

        Self::keyed(WireRequest::post(url).with_json(payload), credential)
    }

    fn parse_claim(&self, response: &WireResponse) -> ClaimOutcome {
        let envelope = match serde_json::from_str::<Value>(&response.text()) {
            Ok(value) => value,
            Err(e) => return Outcome::Indeterminate(format!("response is not JSON: {e}")),
        };

        match envelope.get("referenceNo").and_then(Value::as_str) {
            Some(reference) if !reference.trim().is_empty() => {
                Outcome::Success(reference.trim().to_string())
            }
            _ => Outcome::Indeterminate("no referenceNo in response".into()),
        }
    }

    fn build_ecard(
        &self,
        profile: &ProviderProfile,
        credential: &Credential,
        request: &ECardRequest,
    ) -> Result<WireRequest> {
        let url = profile
            .endpoints
            .ecard
            .clone()
            .ok_or_else(|| GatewayError::internal("Pinnacle e-card endpoint not configured"))?;

        let payload = json!({
            "policyNumber": request.policy_number,
            "memberCode": request.member_code,
            "dob": request.dob.map(fmt_date),
        });
        Self::keyed(WireRequest::post(url).with_json(payload), credential)
    }

    fn parse_ecard(&self, response: &WireResponse) -> EcardOutcome {
        let envelope = match serde_json::from_str::<Value>(&response.text()) {
            Ok(value) => value,
            Err(e) => return Outcome::Indeterminate(format!("response is not JSON: {e}")),
        };

        match envelope.get("ecardLink").and_then(Value::as_str) {
            Some(link) if !link.trim().is_empty() => {
                Outcome::Success(EcardDocument::url(link.trim()))
            }
            _ => Outcome::Indeterminate("no ecardLink in response".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{claim_request, json_response};
    use super::*;

    fn profile() -> ProviderProfile {
        let mut profile = ProviderProfile::new(9u16, "Pinnacle Care TPA");
        profile.endpoints.claim_intimation =
            Some("https://services-uat.pinnaclecare.example.com/intimation".into());
        profile.endpoints.ecard = Some("https://services-uat.pinnaclecare.example.com/ecard".into());
        profile
    }

    fn header() -> Credential {
        Credential::Header {
            name: "X-Partner-Token".into(),
            value: "partner-1".into(),
        }
    }

    #[test]
    fn test_claim_reference_presence_decides() {
        let outcome = PinnacleAdapter
            .parse_claim(&json_response(r#"{"referenceNo": "PN-7701"}"#));
        assert_eq!(outcome, Outcome::Success("PN-7701".into()));

        let outcome = PinnacleAdapter.parse_claim(&json_response(r#"{"referenceNo": ""}"#));
        assert!(matches!(outcome, Outcome::Indeterminate(_)));

        let outcome = PinnacleAdapter.parse_claim(&json_response(r#"{}"#));
        assert!(matches!(outcome, Outcome::Indeterminate(_)));
    }

    #[test]
    fn test_claim_carries_partner_token() {
        let request = PinnacleAdapter
            .build_claim(&profile(), &header(), &claim_request(9))
            .unwrap();
        assert!(
            request
                .headers
                .iter()
                .any(|(name, value)| name == "X-Partner-Token" && value == "partner-1")
        );
    }
}
