//! Medserve Health TPA (provider 1).
//!
//! JSON API behind an OAuth2 password grant. Success is signalled by a
//! top-level `status` of `"Success"`; the claim reference lives in
//! `claimIntimationNumber` and the e-card in `eCardUrl`.

use serde_json::{Value, json};

use tpabridge_config::ProviderProfile;
use tpabridge_core::{
    ClaimIntimationRequest, ECardRequest, EcardDocument, GatewayError, ProviderId, Result,
};

use crate::credentials::Credential;
use crate::wire::{WireRequest, WireResponse};

use super::{ClaimOutcome, EcardOutcome, Outcome, ProviderAdapter, fmt_date};

pub struct MedserveAdapter;

impl MedserveAdapter {
    fn bearer(credential: &Credential) -> Result<&str> {
        match credential {
            Credential::Bearer(token) => Ok(token),
            _ => Err(GatewayError::internal(
                "Medserve requires a bearer credential",
            )),
        }
    }

    fn parse_envelope(response: &WireResponse) -> std::result::Result<Value, ClaimOutcome> {
        serde_json::from_str::<Value>(&response.text())
            .map_err(|e| Outcome::Indeterminate(format!("response is not JSON: {e}")))
    }
}

impl ProviderAdapter for MedserveAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId(1)
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
            GatewayError::internal("Medserve claim intimation endpoint not configured")
        })?;
        let token = Self::bearer(credential)?;

        let payload = json!({
            "policyNumber": request.policy_number,
            "uhid": request.member_uhid,
            "patientName": request.patient_name,
            "relation": request.relation_to_proposer,
            "diagnosis": request.diagnosis,
            "dateOfAdmission": fmt_date(request.admission_date),
            "dateOfDischarge": request.discharge_date.map(fmt_date),
            "hospitalName": request.hospital.name,
            "hospitalCity": request.hospital.city,
            "hospitalState": request.hospital.state,
            "hospitalPincode": request.hospital.pincode,
            "estimatedAmount": request.claim_amount,
            "mobileNo": request.contact.mobile,
            "emailId": request.contact.email,
        });

        Ok(WireRequest::post(url)
            .with_header("Authorization", format!("Bearer {token}"))
            .with_json(payload))
    }

    fn parse_claim(&self, response: &WireResponse) -> ClaimOutcome {
        let envelope = match Self::parse_envelope(response) {
            Ok(value) => value,
            Err(outcome) => return outcome,
        };

        match envelope.get("status").and_then(Value::as_str) {
            Some("Success") => match envelope
                .get("claimIntimationNumber")
                .and_then(Value::as_str)
            {
                Some(reference) if !reference.trim().is_empty() => {
                    Outcome::Success(reference.trim().to_string())
                }
                _ => Outcome::Indeterminate(
                    "success status without a claim intimation number".into(),
                ),
            },
            Some("Failure") => Outcome::Rejected(
                envelope
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("request rejected by provider")
                    .to_string(),
            ),
            other => Outcome::Indeterminate(format!("unrecognized status {other:?}")),
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
            .ok_or_else(|| GatewayError::internal("Medserve e-card endpoint not configured"))?;
        let token = Self::bearer(credential)?;

        let payload = json!({
            "policyNumber": request.policy_number,
            "memberCode": request.member_code,
            "dob": request.dob.map(fmt_date),
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

        match envelope.get("status").and_then(Value::as_str) {
            Some("Success") => match envelope.get("eCardUrl").and_then(Value::as_str) {
                Some(url) if !url.trim().is_empty() => {
                    Outcome::Success(EcardDocument::url(url.trim()))
                }
                _ => Outcome::Indeterminate("success status without an e-card URL".into()),
            },
            Some("Failure") => Outcome::Rejected(
                envelope
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("e-card request rejected by provider")
                    .to_string(),
            ),
            other => Outcome::Indeterminate(format!("unrecognized status {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{claim_request, ecard_request, json_response};
    use super::*;
    use tpabridge_core::DocumentKind;

    fn profile() -> ProviderProfile {
        let mut profile = ProviderProfile::new(1u16, "Medserve Health TPA");
        profile.endpoints.claim_intimation =
            Some("https://uat.medserve.example.com/api/claim/intimate".into());
        profile.endpoints.ecard = Some("https://uat.medserve.example.com/api/member/ecard".into());
        profile
    }

    #[test]
    fn test_claim_payload_shape() {
        let request = MedserveAdapter
            .build_claim(
                &profile(),
                &Credential::Bearer("tok".into()),
                &claim_request(1),
            )
            .unwrap();

        assert!(
            request
                .headers
                .iter()
                .any(|(name, value)| name == "Authorization" && value == "Bearer tok")
        );
        let crate::wire::WireBody::Json(payload) = &request.body else {
            panic!("expected JSON body");
        };
        assert_eq!(payload["policyNumber"], "H1605551");
        assert_eq!(payload["dateOfAdmission"], "2024-03-11");
        assert_eq!(payload["dateOfDischarge"], "2024-03-14");
        assert_eq!(payload["hospitalPincode"], "560001");
    }

    #[test]
    fn test_claim_requires_bearer() {
        let err = MedserveAdapter
            .build_claim(&profile(), &Credential::None, &claim_request(1))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Internal(_)));
    }

    #[test]
    fn test_claim_success_extracts_reference() {
        let outcome = MedserveAdapter.parse_claim(&json_response(
            r#"{"status": "Success", "claimIntimationNumber": " MS-2024-77 "}"#,
        ));
        assert_eq!(outcome, Outcome::Success("MS-2024-77".into()));
    }

    #[test]
    fn test_claim_failure_is_rejected() {
        let outcome = MedserveAdapter.parse_claim(&json_response(
            r#"{"status": "Failure", "message": "policy not found"}"#,
        ));
        assert_eq!(outcome, Outcome::Rejected("policy not found".into()));
    }

    #[test]
    fn test_claim_odd_status_is_indeterminate() {
        let outcome =
            MedserveAdapter.parse_claim(&json_response(r#"{"status": "Queued"}"#));
        assert!(matches!(outcome, Outcome::Indeterminate(_)));

        let outcome = MedserveAdapter.parse_claim(&json_response("<html>gateway error</html>"));
        assert!(matches!(outcome, Outcome::Indeterminate(_)));
    }

    #[test]
    fn test_claim_success_without_reference_is_indeterminate() {
        let outcome = MedserveAdapter.parse_claim(&json_response(
            r#"{"status": "Success", "claimIntimationNumber": ""}"#,
        ));
        assert!(matches!(outcome, Outcome::Indeterminate(_)));
    }

    #[test]
    fn test_ecard_url_resolution() {
        let request = MedserveAdapter
            .build_ecard(
                &profile(),
                &Credential::Bearer("tok".into()),
                &ecard_request(1),
            )
            .unwrap();
        let crate::wire::WireBody::Json(payload) = &request.body else {
            panic!("expected JSON body");
        };
        assert_eq!(payload["memberCode"], "E001");

        let outcome = MedserveAdapter.parse_ecard(&json_response(
            r#"{"status": "Success", "eCardUrl": "https://cards.medserve.example.com/d/abc"}"#,
        ));
        match outcome {
            Outcome::Success(doc) => {
                assert_eq!(doc.kind, DocumentKind::Url);
                assert_eq!(doc.value, "https://cards.medserve.example.com/d/abc");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }
}
