use serde::{Deserialize, Serialize};
use time::Date;

use crate::provider::ProviderId;
use crate::{GatewayError, Result};

/// Normalized e-card retrieval request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ECardRequest {
    pub provider_id: ProviderId,
    pub policy_number: String,
    pub member_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uhid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_start_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_end_date: Option<Date>,
}

impl ECardRequest {
    pub fn validate(&self) -> Result<()> {
        if self.policy_number.trim().is_empty() {
            return Err(GatewayError::validation("policy number is required"));
        }
        if self.member_code.trim().is_empty() {
            return Err(GatewayError::validation("member code is required"));
        }
        Ok(())
    }
}

/// How the e-card document was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A URL the member can download the card from.
    Url,
    /// A PDF embedded in the response, base64-encoded.
    Base64Pdf,
    /// A pre-provisioned file path, resolved without any live integration.
    StaticPath,
}

/// The resolved e-card document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcardDocument {
    pub kind: DocumentKind,
    pub value: String,
}

impl EcardDocument {
    pub fn url(value: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Url,
            value: value.into(),
        }
    }

    pub fn base64_pdf(value: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Base64Pdf,
            value: value.into(),
        }
    }

    pub fn static_path(value: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::StaticPath,
            value: value.into(),
        }
    }
}

/// Outcome of an e-card fetch.
///
/// Invariant: `success == true` iff `document` is present with a non-empty
/// value, enforced by the constructors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ECardResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<EcardDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ECardResult {
    /// A successfully resolved document. An empty document value is
    /// downgraded to a failure, keeping the invariant intact.
    pub fn resolved(document: EcardDocument) -> Self {
        if document.value.trim().is_empty() {
            return Self::unavailable("provider returned an empty document reference");
        }
        Self {
            success: true,
            document: Some(document),
            error_message: None,
        }
    }

    /// No resolution path produced a document.
    pub fn unavailable(error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            document: None,
            error_message: Some(error_message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_url_document() {
        let result = ECardResult::resolved(EcardDocument::url("https://cards.example.com/e1"));
        assert!(result.success);
        let doc = result.document.unwrap();
        assert_eq!(doc.kind, DocumentKind::Url);
        assert_eq!(doc.value, "https://cards.example.com/e1");
    }

    #[test]
    fn test_empty_document_value_downgrades() {
        let result = ECardResult::resolved(EcardDocument::base64_pdf(""));
        assert!(!result.success);
        assert!(result.document.is_none());
        assert!(result.error_message.is_some());
    }

    #[test]
    fn test_static_path_document() {
        let doc = EcardDocument::static_path("/srv/ecards/H1605551/E001.PDF");
        assert_eq!(doc.kind, DocumentKind::StaticPath);
        let result = ECardResult::resolved(doc);
        assert!(result.success);
    }

    #[test]
    fn test_document_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&DocumentKind::Base64Pdf).unwrap(),
            "\"base64_pdf\""
        );
        assert_eq!(
            serde_json::to_string(&DocumentKind::StaticPath).unwrap(),
            "\"static_path\""
        );
        assert_eq!(serde_json::to_string(&DocumentKind::Url).unwrap(), "\"url\"");
    }

    #[test]
    fn test_request_validation() {
        let req = ECardRequest {
            provider_id: ProviderId(2),
            policy_number: "P100".into(),
            member_code: "".into(),
            dob: None,
            uhid: None,
            policy_start_date: None,
            policy_end_date: None,
        };
        assert!(matches!(req.validate(), Err(GatewayError::Validation(_))));
    }
}
