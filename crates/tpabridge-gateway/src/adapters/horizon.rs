//! Horizon General Insurance (provider 5).
//!
//! Unauthenticated JSON API whose responses are protected by the `)]}'`
//! guard prefix. Horizon's envelope does not distinguish business
//! refusals from transport faults, so every non-success stays
//! indeterminate and is retried.

use serde_json::{Value, json};

use tpabridge_config::ProviderProfile;
use tpabridge_core::{
    ClaimIntimationRequest, ECardRequest, EcardDocument, GatewayError, ProviderId, Result,
};

use crate::credentials::Credential;
use crate::document::strip_guard_prefix;
use crate::wire::{WireRequest, WireResponse};

use super::{ClaimOutcome, EcardOutcome, Outcome, ProviderAdapter, fmt_date};

pub struct HorizonAdapter;

impl HorizonAdapter {
    fn envelope(response: &WireResponse) -> std::result::Result<Value, String> {
        let body = response.text();
        serde_json::from_str::<Value>(strip_guard_prefix(&body))
            .map_err(|e| format!("response is not JSON: {e}"))
    }
}

impl ProviderAdapter for HorizonAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId(5)
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
        _credential: &Credential,
        request: &ClaimIntimationRequest,
    ) -> Result<WireRequest> {
        let url = profile.endpoints.claim_intimation.clone().ok_or_else(|| {
            GatewayError::internal("Horizon claim intimation endpoint not configured")
        })?;

        let payload = json!({
            "policy": request.policy_number,
            "uhid": request.member_uhid,
            "patient": {
                "name": request.patient_name,
                "relation": request.relation_to_proposer,
            },
            "diagnosis": request.diagnosis,
            "admission": fmt_date(request.admission_date),
            "discharge": request.discharge_date.map(fmt_date),
            "hospital": {
                "name": request.hospital.name,
                "city": request.hospital.city,
                "state": request.hospital.state,
                "pincode": request.hospital.pincode,
            },
            "amount": request.claim_amount,
            "mobile": request.contact.mobile,
            "email": request.contact.email,
        });

        Ok(WireRequest::post(url).with_json(payload))
    }

    fn parse_claim(&self, response: &WireResponse) -> ClaimOutcome {
        let envelope = match Self::envelope(response) {
            Ok(value) => value,
            Err(message) => return Outcome::Indeterminate(message),
        };

        match envelope
            .pointer("/intimation/reference")
            .and_then(Value::as_str)
        {
            Some(reference) if !reference.trim().is_empty() => {
                Outcome::Success(reference.trim().to_string())
            }
            // Horizon gives no usable refusal marker; keep retrying.
            _ => Outcome::Indeterminate("no intimation reference in response".into()),
        }
    }

    fn build_ecard(
        &self,
        profile: &ProviderProfile,
        _credential: &Credential,
        request: &ECardRequest,
    ) -> Result<WireRequest> {
        let url = profile
            .endpoints
            .ecard
            .clone()
            .ok_or_else(|| GatewayError::internal("Horizon e-card endpoint not configured"))?;

        let payload = json!({
            "policy": request.policy_number,
            "member": request.member_code,
        });
        Ok(WireRequest::post(url).with_json(payload))
    }

    fn parse_ecard(&self, response: &WireResponse) -> EcardOutcome {
        let envelope = match Self::envelope(response) {
            Ok(value) => value,
            Err(message) => return Outcome::Indeterminate(message),
        };

        match envelope.get("ecardUrl").and_then(Value::as_str) {
            Some(url) if !url.trim().is_empty() => {
                Outcome::Success(EcardDocument::url(url.trim()))
            }
            _ => Outcome::Indeterminate("no e-card URL in response".into()),
        }
    }
}
