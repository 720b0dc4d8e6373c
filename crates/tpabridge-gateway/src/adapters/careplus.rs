//! CarePlus Assist (provider 2).
//!
//! JSON API authenticated by a static shared-secret header. Success is
//! signalled by the presence of a nested key: `data.intimationRef` for
//! claims, `data.ecard` (a base64 PDF) for e-cards. Refusals arrive as an
//! `error.description` object.

use serde_json::{Value, json};

use tpabridge_config::ProviderProfile;
use tpabridge_core::{
    ClaimIntimationRequest, ECardRequest, EcardDocument, GatewayError, ProviderId, Result,
};

use crate::credentials::Credential;
use crate::wire::{WireRequest, WireResponse};

use super::{ClaimOutcome, EcardOutcome, Outcome, ProviderAdapter, fmt_date};

pub struct CareplusAdapter;

impl CareplusAdapter {
    fn keyed(request: WireRequest, credential: &Credential) -> Result<WireRequest> {
        match credential {
            Credential::Header { name, value } => {
                Ok(request.with_header(name.as_str(), value.as_str()))
            }
            _ => Err(GatewayError::internal(
                "CarePlus requires a static header credential",
            )),
        }
    }

    fn rejection(envelope: &Value) -> Option<String> {
        envelope
            .pointer("/error/description")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

impl ProviderAdapter for CareplusAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId(2)
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
            GatewayError::internal("CarePlus claim intimation endpoint not configured")
        })?;

        let payload = json!({
            "policy_no": request.policy_number,
            "member_id": request.member_uhid,
            "patient": request.patient_name,
            "relation": request.relation_to_proposer,
            "diagnosis": request.diagnosis,
            "doa": fmt_date(request.admission_date),
            "dod": request.discharge_date.map(fmt_date),
            "hospital": {
                "name": request.hospital.name,
                "city": request.hospital.city,
                "state": request.hospital.state,
                "pincode": request.hospital.pincode,
            },
            "claim_amount": request.claim_amount,
            "mobile": request.contact.mobile,
            "email": request.contact.email,
        });

        Self::keyed(WireRequest::post(url).with_json(payload), credential)
    }

    fn parse_claim(&self, response: &WireResponse) -> ClaimOutcome {
        let envelope = match serde_json::from_str::<Value>(&response.text()) {
            Ok(value) => value,
            Err(e) => return Outcome::Indeterminate(format!("response is not JSON: {e}")),
        };

        if let Some(reference) = envelope
            .pointer("/data/intimationRef")
            .and_then(Value::as_str)
            && !reference.trim().is_empty()
        {
            return Outcome::Success(reference.trim().to_string());
        }
        if let Some(description) = Self::rejection(&envelope) {
            return Outcome::Rejected(description);
        }
        Outcome::Indeterminate("no intimation reference in response".into())
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
            .ok_or_else(|| GatewayError::internal("CarePlus e-card endpoint not configured"))?;

        let payload = json!({
            "policy_no": request.policy_number,
            "member_id": request.member_code,
            "uhid": request.uhid,
        });

        Self::keyed(WireRequest::post(url).with_json(payload), credential)
    }

    fn parse_ecard(&self, response: &WireResponse) -> EcardOutcome {
        let envelope = match serde_json::from_str::<Value>(&response.text()) {
            Ok(value) => value,
            Err(e) => return Outcome::Indeterminate(format!("response is not JSON: {e}")),
        };

        if let Some(card) = envelope.pointer("/data/ecard").and_then(Value::as_str)
            && !card.trim().is_empty()
        {
            return Outcome::Success(EcardDocument::base64_pdf(card.trim()));
        }
        if let Some(description) = Self::rejection(&envelope) {
            return Outcome::Rejected(description);
        }
        Outcome::Indeterminate("no e-card data in response".into())
    }
}
