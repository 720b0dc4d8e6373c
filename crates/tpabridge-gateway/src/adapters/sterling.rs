//! Sterling Health Admin (provider 11).
//!
//! E-card only. An unauthenticated GET whose response body is the
//! download URL itself as plain text, not wrapped in any envelope.

use tpabridge_config::ProviderProfile;
use tpabridge_core::{ECardRequest, EcardDocument, GatewayError, ProviderId, Result};

use crate::credentials::Credential;
use crate::wire::{WireRequest, WireResponse};

use super::{EcardOutcome, Outcome, ProviderAdapter};

pub struct SterlingAdapter;

impl ProviderAdapter for SterlingAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId(11)
    }

    fn supports_ecard(&self) -> bool {
        true
    }

    fn build_ecard(
        &self,
        profile: &ProviderProfile,
        _credential: &Credential,
        request: &ECardRequest,
    ) -> Result<WireRequest> {
        let base = profile
            .endpoints
            .ecard
            .clone()
            .ok_or_else(|| GatewayError::internal("Sterling e-card endpoint not configured"))?;
        let url = format!(
            "{base}?policy={}&member={}",
            request.policy_number, request.member_code
        );
        Ok(WireRequest::get(url))
    }

    fn parse_ecard(&self, response: &WireResponse) -> EcardOutcome {
        let body = response.text();
        let trimmed = body.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Outcome::Success(EcardDocument::url(trimmed))
        } else {
            Outcome::Indeterminate("response body is not a download URL".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::ecard_request;
    use super::*;
    use tpabridge_core::DocumentKind;

    fn profile() -> ProviderProfile {
        let mut profile = ProviderProfile::new(11u16, "Sterling Health Admin");
        profile.endpoints.ecard =
            Some("https://uat.sterlinghealth.example.com/members/ecard".into());
        profile
    }

    #[test]
    fn test_ecard_request_is_query_string_get() {
        let request = SterlingAdapter
            .build_ecard(&profile(), &Credential::None, &ecard_request(11))
            .unwrap();
        assert_eq!(
            request.url,
            "https://uat.sterlinghealth.example.com/members/ecard?policy=H1605551&member=E001"
        );
    }

    #[test]
    fn test_plain_url_body_accepted() {
        let response = WireResponse::new(
            200,
            Some("text/plain".into()),
            b"https://cards.sterlinghealth.example.com/s/42\n".to_vec(),
        );
        let outcome = SterlingAdapter.parse_ecard(&response);
        match outcome {
            Outcome::Success(doc) => {
                assert_eq!(doc.kind, DocumentKind::Url);
                assert_eq!(doc.value, "https://cards.sterlinghealth.example.com/s/42");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_non_url_body_is_indeterminate() {
        let response =
            WireResponse::new(200, Some("text/plain".into()), b"card unavailable".to_vec());
        assert!(matches!(
            SterlingAdapter.parse_ecard(&response),
            Outcome::Indeterminate(_)
        ));
    }

    #[test]
    fn test_claims_are_not_supported() {
        assert!(!SterlingAdapter.supports_claims());
    }
}
