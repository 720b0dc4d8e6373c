//! Sentinel TPA (provider 3).
//!
//! Form-urlencoded requests carrying an HMAC signature header. Responses
//! are JSON with an `IsSuccess` boolean; e-cards come back as raw PDF
//! bytes. Sentinel's network-hospital list is only reachable through its
//! search API, never as a table feed.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;

use tpabridge_config::ProviderProfile;
use tpabridge_core::{
    ClaimIntimationRequest, ECardRequest, EcardDocument, GatewayError, HospitalQuery,
    HospitalRecord, ProviderId, Result,
};

use crate::credentials::Credential;
use crate::document::looks_like_pdf;
use crate::wire::{WireRequest, WireResponse};

use super::{ClaimOutcome, EcardOutcome, HospitalOutcome, Outcome, ProviderAdapter, fmt_date};

/// Header carrying the request signature.
const SIGNATURE_HEADER: &str = "X-Auth-Signature";

pub struct SentinelAdapter;

impl SentinelAdapter {
    fn signed(request: WireRequest, credential: &Credential) -> Result<WireRequest> {
        match credential {
            Credential::Signature(signature) => {
                Ok(request.with_header(SIGNATURE_HEADER, signature.as_str()))
            }
            _ => Err(GatewayError::internal(
                "Sentinel requires an HMAC signature credential",
            )),
        }
    }

    fn envelope(response: &WireResponse) -> std::result::Result<Value, String> {
        serde_json::from_str::<Value>(&response.text())
            .map_err(|e| format!("response is not JSON: {e}"))
    }

    fn error_message(envelope: &Value) -> String {
        envelope
            .get("ErrorMsg")
            .and_then(Value::as_str)
            .unwrap_or("request rejected by provider")
            .to_string()
    }
}

impl ProviderAdapter for SentinelAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId(3)
    }

    fn supports_claims(&self) -> bool {
        true
    }

    fn supports_ecard(&self) -> bool {
        true
    }

    fn supports_hospital_search(&self) -> bool {
        true
    }

    fn build_claim(
        &self,
        profile: &ProviderProfile,
        credential: &Credential,
        request: &ClaimIntimationRequest,
    ) -> Result<WireRequest> {
        let url = profile.endpoints.claim_intimation.clone().ok_or_else(|| {
            GatewayError::internal("Sentinel claim intimation endpoint not configured")
        })?;

        let mut pairs = vec![
            ("PolicyNo".to_string(), request.policy_number.clone()),
            ("UHID".to_string(), request.member_uhid.clone()),
            ("PatientName".to_string(), request.patient_name.clone()),
            ("Relation".to_string(), request.relation_to_proposer.clone()),
            ("Diagnosis".to_string(), request.diagnosis.clone()),
            ("DOA".to_string(), fmt_date(request.admission_date)),
            ("HospitalName".to_string(), request.hospital.name.clone()),
            ("HospitalCity".to_string(), request.hospital.city.clone()),
            ("HospitalState".to_string(), request.hospital.state.clone()),
            ("HospitalPin".to_string(), request.hospital.pincode.clone()),
            ("ClaimAmount".to_string(), request.claim_amount.to_string()),
            ("MobileNo".to_string(), request.contact.mobile.clone()),
        ];
        if let Some(discharge) = request.discharge_date {
            pairs.push(("DOD".to_string(), fmt_date(discharge)));
        }
        if let Some(email) = &request.contact.email {
            pairs.push(("EmailId".to_string(), email.clone()));
        }

        Self::signed(WireRequest::post(url).with_form(pairs), credential)
    }

    fn parse_claim(&self, response: &WireResponse) -> ClaimOutcome {
        let envelope = match Self::envelope(response) {
            Ok(value) => value,
            Err(message) => return Outcome::Indeterminate(message),
        };

        match envelope.get("IsSuccess").and_then(Value::as_bool) {
            Some(true) => match envelope.get("RefNo").and_then(Value::as_str) {
                Some(reference) if !reference.trim().is_empty() => {
                    Outcome::Success(reference.trim().to_string())
                }
                _ => Outcome::Indeterminate("IsSuccess without a RefNo".into()),
            },
            Some(false) => Outcome::Rejected(Self::error_message(&envelope)),
            None => Outcome::Indeterminate("no IsSuccess marker in response".into()),
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
            .ok_or_else(|| GatewayError::internal("Sentinel e-card endpoint not configured"))?;

        let pairs = vec![
            ("PolicyNo".to_string(), request.policy_number.clone()),
            ("MemberCode".to_string(), request.member_code.clone()),
        ];
        Self::signed(WireRequest::post(url).with_form(pairs), credential)
    }

    /// Sentinel streams the PDF itself on success and a JSON envelope on
    /// failure, so the body's magic marker decides the path.
    fn parse_ecard(&self, response: &WireResponse) -> EcardOutcome {
        if looks_like_pdf(&response.body) {
            return Outcome::Success(EcardDocument::base64_pdf(BASE64.encode(&response.body)));
        }
        match Self::envelope(response) {
            Ok(envelope) if envelope.get("IsSuccess").and_then(Value::as_bool) == Some(false) => {
                Outcome::Rejected(Self::error_message(&envelope))
            }
            Ok(_) => Outcome::Indeterminate("response is neither a PDF nor an error envelope".into()),
            Err(message) => Outcome::Indeterminate(message),
        }
    }

    fn build_hospital_search(
        &self,
        profile: &ProviderProfile,
        credential: &Credential,
        query: &HospitalQuery,
    ) -> Result<WireRequest> {
        let url = profile.endpoints.hospital_search.clone().ok_or_else(|| {
            GatewayError::internal("Sentinel hospital search endpoint not configured")
        })?;
        // Dispatch enforces pincode presence before building.
        let pincode = query
            .pincode
            .clone()
            .ok_or_else(|| GatewayError::validation("Sentinel hospital search needs a pincode"))?;

        let pairs = vec![
            ("PolicyNo".to_string(), query.policy_id.clone()),
            ("PinCode".to_string(), pincode),
        ];
        Self::signed(WireRequest::post(url).with_form(pairs), credential)
    }

    fn parse_hospital_search(&self, response: &WireResponse) -> HospitalOutcome {
        let envelope = match Self::envelope(response) {
            Ok(value) => value,
            Err(message) => return Outcome::Indeterminate(message),
        };

        match envelope.get("IsSuccess").and_then(Value::as_bool) {
            Some(true) => {
                let hospitals = envelope
                    .get("Hospitals")
                    .and_then(Value::as_array)
                    .map(|rows| rows.iter().map(hospital_from_row).collect::<Vec<_>>())
                    .unwrap_or_default();
                Outcome::Success(hospitals)
            }
            Some(false) => Outcome::Rejected(Self::error_message(&envelope)),
            None => Outcome::Indeterminate("no IsSuccess marker in response".into()),
        }
    }
}

fn field(row: &Value, key: &str) -> Option<String> {
    row.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn hospital_from_row(row: &Value) -> HospitalRecord {
    HospitalRecord {
        name: field(row, "HospitalName"),
        address_line1: field(row, "Address1"),
        address_line2: field(row, "Address2"),
        city: field(row, "City"),
        state: field(row, "State"),
        pincode: field(row, "PinCode"),
        phone: field(row, "Phone"),
        email: None,
    }
}
