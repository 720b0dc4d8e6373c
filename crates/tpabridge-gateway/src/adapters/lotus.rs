//! Lotus Mediclaim (provider 8).
//!
//! JSON API behind an OAuth2 password grant whose tokens carry no declared
//! expiry, so each call runs on a freshly issued token. Success is
//! `result == "1"`; refusals are `result == "0"` with a `reason`.

use serde_json::{Value, json};

use tpabridge_config::ProviderProfile;
use tpabridge_core::{
    ClaimIntimationRequest, ECardRequest, EcardDocument, GatewayError, ProviderId, Result,
};

use crate::credentials::Credential;
use crate::wire::{WireRequest, WireResponse};

use super::{ClaimOutcome, EcardOutcome, Outcome, ProviderAdapter, fmt_date};

pub struct LotusAdapter;

impl LotusAdapter {
    fn bearer(credential: &Credential) -> Result<&str> {
        match credential {
            Credential::Bearer(token) => Ok(token),
            _ => Err(GatewayError::internal("Lotus requires a bearer credential")),
        }
    }

    fn reason(envelope: &Value) -> String {
        envelope
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("request rejected by provider")
            .to_string()
    }
}

impl ProviderAdapter for LotusAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId(8)
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
            GatewayError::internal("Lotus claim intimation endpoint not configured")
        })?;
        let token = Self::bearer(credential)?;

        let payload = json!({
            "policyNo": request.policy_number,
            "uhid": request.member_uhid,
            "patient": request.patient_name,
            "relation": request.relation_to_proposer,
            "diagnosis": request.diagnosis,
            "admissionDate": fmt_date(request.admission_date),
            "dischargeDate": request.discharge_date.map(fmt_date),
            "hospital": request.hospital.name,
            "city": request.hospital.city,
            "state": request.hospital.state,
            "pincode": request.hospital.pincode,
            "amount": request.claim_amount,
            "mobile": request.contact.mobile,
            "email": request.contact.email,
        });

        Ok(WireRequest::post(url)
            .with_header("Authorization", format!("Bearer {token}"))
            .with_json(payload))
    }

    fn parse_claim(&self, response: &WireResponse) -> ClaimOutcome {
        let envelope = match serde_json::from_str::<Value>(&response.text()) {
            Ok(value) => value,
            Err(e) => return Outcome::Indeterminate(format!("response is not JSON: {e}")),
        };

        match envelope.get("result").and_then(Value::as_str) {
            Some("1") => match envelope.get("claimRef").and_then(Value::as_str) {
                Some(reference) if !reference.trim().is_empty() => {
                    Outcome::Success(reference.trim().to_string())
                }
                _ => Outcome::Indeterminate("result 1 without a claimRef".into()),
            },
            Some("0") => Outcome::Rejected(Self::reason(&envelope)),
            other => Outcome::Indeterminate(format!("unrecognized result {other:?}")),
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
            .ok_or_else(|| GatewayError::internal("Lotus e-card endpoint not configured"))?;
        let token = Self::bearer(credential)?;

        let payload = json!({
            "policyNo": request.policy_number,
            "memberCode": request.member_code,
            "periodFrom": request.policy_start_date.map(fmt_date),
            "periodTo": request.policy_end_date.map(fmt_date),
        });

        Ok(WireRequest::post(url)
            .with_header("Authorization", format!("Bearer {token}"))
            .with_json(payload))
    }

    fn parse_ecard(&self, response: &WireResponse) -> EcardOutcome {
        let envelope = match serde_json::from_str::<Value>(&response.text()) {
            Ok(value) => value,
            Err(e) => return Outcome::Indeterminate(format!("response is not JSON: {e}")),
        };

        match envelope.get("result").and_then(Value::as_str) {
            Some("1") => match envelope.get("cardData").and_then(Value::as_str) {
                Some(data) if !data.trim().is_empty() => {
                    Outcome::Success(EcardDocument::base64_pdf(data.trim()))
                }
                _ => Outcome::Indeterminate("result 1 without cardData".into()),
            },
            Some("0") => Outcome::Rejected(Self::reason(&envelope)),
            other => Outcome::Indeterminate(format!("unrecognized result {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{claim_request, json_response};
    use super::*;
    use tpabridge_core::DocumentKind;

    fn profile() -> ProviderProfile {
        let mut profile = ProviderProfile::new(8u16, "Lotus Mediclaim");
        profile.endpoints.claim_intimation =
            Some("https://uat.lotusmediclaim.example.com/v2/claims".into());
        profile.endpoints.ecard = Some("https://uat.lotusmediclaim.example.com/v2/ecard".into());
        profile
    }

    #[test]
    fn test_claim_result_markers() {
        let outcome = LotusAdapter
            .parse_claim(&json_response(r#"{"result": "1", "claimRef": "LT-550"}"#));
        assert_eq!(outcome, Outcome::Success("LT-550".into()));

        let outcome = LotusAdapter.parse_claim(&json_response(
            r#"{"result": "0", "reason": "duplicate intimation"}"#,
        ));
        assert_eq!(outcome, Outcome::Rejected("duplicate intimation".into()));

        let outcome = LotusAdapter.parse_claim(&json_response(r#"{"result": "2"}"#));
        assert!(matches!(outcome, Outcome::Indeterminate(_)));
    }

    #[test]
    fn test_claim_builds_bearer_request() {
        let request = LotusAdapter
            .build_claim(
                &profile(),
                &Credential::Bearer("single-use".into()),
                &claim_request(8),
            )
            .unwrap();
        assert!(
            request
                .headers
                .iter()
                .any(|(name, value)| name == "Authorization" && value == "Bearer single-use")
        );
    }

    #[test]
    fn test_ecard_card_data() {
        let outcome = LotusAdapter.parse_ecard(&json_response(
            r#"{"result": "1", "cardData": "JVBERi0xLjcK"}"#,
        ));
        match outcome {
            Outcome::Success(doc) => {
                assert_eq!(doc.kind, DocumentKind::Base64Pdf);
                assert_eq!(doc.value, "JVBERi0xLjcK");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }
}
