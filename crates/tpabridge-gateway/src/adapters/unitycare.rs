//! UnityCare Administrators (provider 4).
//!
//! Fixed-shape XML envelopes authenticated by an encrypted session token.
//! Success is `<Status>OK</Status>`; the claim reference arrives in
//! `<IntimationNo>` and the e-card link in `<ECardLink>`. Refusals carry
//! `<Status>ERROR</Status>` with a `<Reason>`.

use tpabridge_config::ProviderProfile;
use tpabridge_core::{
    ClaimIntimationRequest, ECardRequest, EcardDocument, GatewayError, ProviderId, Result,
};

use crate::credentials::Credential;
use crate::document::{xml_escape, xml_tag};
use crate::wire::{WireRequest, WireResponse};

use super::{ClaimOutcome, EcardOutcome, Outcome, ProviderAdapter, fmt_date};

pub struct UnitycareAdapter;

struct SessionFields<'a> {
    session_id: &'a str,
    token: &'a str,
}

impl UnitycareAdapter {
    fn session(credential: &Credential) -> Result<SessionFields<'_>> {
        match credential {
            Credential::Session { session_id, token } => Ok(SessionFields { session_id, token }),
            _ => Err(GatewayError::internal(
                "UnityCare requires an encrypted session credential",
            )),
        }
    }

    fn classify(response: &WireResponse, payload_tag: &str) -> Outcome<String> {
        let body = response.text();
        match xml_tag(&body, "Status").as_deref() {
            Some("OK") => match xml_tag(&body, payload_tag) {
                Some(value) if !value.is_empty() => Outcome::Success(value),
                _ => Outcome::Indeterminate(format!("OK status without <{payload_tag}>")),
            },
            Some("ERROR") => Outcome::Rejected(
                xml_tag(&body, "Reason")
                    .unwrap_or_else(|| "request rejected by provider".to_string()),
            ),
            Some(other) => Outcome::Indeterminate(format!("unrecognized status '{other}'")),
            None => Outcome::Indeterminate("no <Status> in response".into()),
        }
    }
}

impl ProviderAdapter for UnitycareAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId(4)
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
            GatewayError::internal("UnityCare claim intimation endpoint not configured")
        })?;
        let session = Self::session(credential)?;

        let discharge = request
            .discharge_date
            .map(fmt_date)
            .unwrap_or_default();
        let email = request.contact.email.as_deref().unwrap_or_default();

        let envelope = format!(
            "<ClaimIntimation>\
             <SessionId>{}</SessionId>\
             <SessionToken>{}</SessionToken>\
             <PolicyNumber>{}</PolicyNumber>\
             <Uhid>{}</Uhid>\
             <PatientName>{}</PatientName>\
             <Relation>{}</Relation>\
             <Diagnosis>{}</Diagnosis>\
             <AdmissionDate>{}</AdmissionDate>\
             <DischargeDate>{}</DischargeDate>\
             <HospitalName>{}</HospitalName>\
             <HospitalCity>{}</HospitalCity>\
             <HospitalState>{}</HospitalState>\
             <HospitalPincode>{}</HospitalPincode>\
             <ClaimAmount>{}</ClaimAmount>\
             <Mobile>{}</Mobile>\
             <Email>{}</Email>\
             </ClaimIntimation>",
            xml_escape(session.session_id),
            xml_escape(session.token),
            xml_escape(&request.policy_number),
            xml_escape(&request.member_uhid),
            xml_escape(&request.patient_name),
            xml_escape(&request.relation_to_proposer),
            xml_escape(&request.diagnosis),
            fmt_date(request.admission_date),
            discharge,
            xml_escape(&request.hospital.name),
            xml_escape(&request.hospital.city),
            xml_escape(&request.hospital.state),
            xml_escape(&request.hospital.pincode),
            request.claim_amount,
            xml_escape(&request.contact.mobile),
            xml_escape(email),
        );

        Ok(WireRequest::post(url).with_xml(envelope))
    }

    fn parse_claim(&self, response: &WireResponse) -> ClaimOutcome {
        Self::classify(response, "IntimationNo")
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
            .ok_or_else(|| GatewayError::internal("UnityCare e-card endpoint not configured"))?;
        let session = Self::session(credential)?;

        let envelope = format!(
            "<ECardRequest>\
             <SessionId>{}</SessionId>\
             <SessionToken>{}</SessionToken>\
             <PolicyNumber>{}</PolicyNumber>\
             <MemberCode>{}</MemberCode>\
             </ECardRequest>",
            xml_escape(session.session_id),
            xml_escape(session.token),
            xml_escape(&request.policy_number),
            xml_escape(&request.member_code),
        );

        Ok(WireRequest::post(url).with_xml(envelope))
    }

    fn parse_ecard(&self, response: &WireResponse) -> EcardOutcome {
        match Self::classify(response, "ECardLink") {
            Outcome::Success(link) => Outcome::Success(EcardDocument::url(link)),
            Outcome::Rejected(message) => Outcome::Rejected(message),
            Outcome::Indeterminate(message) => Outcome::Indeterminate(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{claim_request, ecard_request};
    use super::*;
    use crate::wire::WireBody;
    use tpabridge_core::DocumentKind;

    fn profile() -> ProviderProfile {
        let mut profile = ProviderProfile::new(4u16, "UnityCare Administrators");
        profile.endpoints.claim_intimation =
            Some("https://uatws.unitycare.example.com/ClaimIntimation".into());
        profile.endpoints.ecard = Some("https://uatws.unitycare.example.com/ECard".into());
        profile
    }

    fn session() -> Credential {
        Credential::Session {
            session_id: "S-81".into(),
            token: "enc-token".into(),
        }
    }

    fn xml_response(body: &str) -> WireResponse {
        WireResponse::new(200, Some("text/xml".into()), body.as_bytes().to_vec())
    }

    #[test]
    fn test_claim_envelope_embeds_session_and_fields() {
        let request = UnitycareAdapter
            .build_claim(&profile(), &session(), &claim_request(4))
            .unwrap();
        let WireBody::Xml(envelope) = &request.body else {
            panic!("expected XML body");
        };
        assert!(envelope.contains("<SessionId>S-81</SessionId>"));
        assert!(envelope.contains("<SessionToken>enc-token</SessionToken>"));
        assert!(envelope.contains("<PolicyNumber>H1605551</PolicyNumber>"));
        assert!(envelope.contains("<AdmissionDate>2024-03-11</AdmissionDate>"));
    }

    #[test]
    fn test_claim_envelope_escapes_values() {
        let mut claim = claim_request(4);
        claim.hospital.name = "Fortis & Manipal <wing A>".into();
        let request = UnitycareAdapter
            .build_claim(&profile(), &session(), &claim)
            .unwrap();
        let WireBody::Xml(envelope) = &request.body else {
            panic!("expected XML body");
        };
        assert!(envelope.contains("Fortis &amp; Manipal &lt;wing A&gt;"));
    }

    #[test]
    fn test_claim_requires_session_credential() {
        let err = UnitycareAdapter
            .build_claim(&profile(), &Credential::None, &claim_request(4))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Internal(_)));
    }

    #[test]
    fn test_claim_status_classification() {
        let outcome = UnitycareAdapter.parse_claim(&xml_response(
            "<Response><Status>OK</Status><IntimationNo>UC-2024-55</IntimationNo></Response>",
        ));
        assert_eq!(outcome, Outcome::Success("UC-2024-55".into()));

        let outcome = UnitycareAdapter.parse_claim(&xml_response(
            "<Response><Status>ERROR</Status><Reason>policy lapsed</Reason></Response>",
        ));
        assert_eq!(outcome, Outcome::Rejected("policy lapsed".into()));

        let outcome = UnitycareAdapter
            .parse_claim(&xml_response("<Response><Status>WAIT</Status></Response>"));
        assert!(matches!(outcome, Outcome::Indeterminate(_)));

        let outcome = UnitycareAdapter.parse_claim(&xml_response("not xml at all"));
        assert!(matches!(outcome, Outcome::Indeterminate(_)));
    }

    #[test]
    fn test_ecard_link_extraction() {
        let request = UnitycareAdapter
            .build_ecard(&profile(), &session(), &ecard_request(4))
            .unwrap();
        let WireBody::Xml(envelope) = &request.body else {
            panic!("expected XML body");
        };
        assert!(envelope.contains("<MemberCode>E001</MemberCode>"));

        let outcome = UnitycareAdapter.parse_ecard(&xml_response(
            "<Response><Status>OK</Status><ECardLink>https://cards.unitycare.example.com/u/9</ECardLink></Response>",
        ));
        match outcome {
            Outcome::Success(doc) => {
                assert_eq!(doc.kind, DocumentKind::Url);
                assert_eq!(doc.value, "https://cards.unitycare.example.com/u/9");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }
}
