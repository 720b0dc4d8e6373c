use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;
use crate::{GatewayError, Result};

/// Network-hospital search query.
///
/// Either a pincode (matched by substring against the provider's data) or a
/// state/city pair (matched by equality) must be supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalQuery {
    pub provider_id: ProviderId,
    pub policy_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl HospitalQuery {
    pub fn by_pincode(
        provider_id: ProviderId,
        policy_id: impl Into<String>,
        pincode: impl Into<String>,
    ) -> Self {
        Self {
            provider_id,
            policy_id: policy_id.into(),
            pincode: Some(pincode.into()),
            state: None,
            city: None,
        }
    }

    pub fn by_location(
        provider_id: ProviderId,
        policy_id: impl Into<String>,
        state: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            provider_id,
            policy_id: policy_id.into(),
            pincode: None,
            state: Some(state.into()),
            city: Some(city.into()),
        }
    }

    /// A query must carry at least one usable filter.
    pub fn validate(&self) -> Result<()> {
        let has_pincode = self.pincode.as_deref().is_some_and(|p| !p.trim().is_empty());
        let has_location = self.state.as_deref().is_some_and(|s| !s.trim().is_empty())
            && self.city.as_deref().is_some_and(|c| !c.trim().is_empty());
        if !has_pincode && !has_location {
            return Err(GatewayError::validation(
                "hospital search needs a pincode or a state and city",
            ));
        }
        Ok(())
    }
}

/// Canonical hospital record.
///
/// Every field is populated from the provider's mapped column or left
/// absent; a column missing from a provider's table never produces an
/// error, and never bleeds into a different field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Search-option facets for driving a hospital-search UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SearchFacets {
    /// Distinct states and their cities from the provider's data.
    StateCity { states: Vec<StateFacet> },
    /// The provider resolves hospitals externally; only pincode search is
    /// available.
    PincodeOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateFacet {
    pub state: String,
    pub cities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pincode_query_is_valid() {
        let q = HospitalQuery::by_pincode(ProviderId(5), "POL1", "560001");
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_location_query_is_valid() {
        let q = HospitalQuery::by_location(ProviderId(5), "POL1", "Karnataka", "Bengaluru");
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_filterless_query_rejected() {
        let q = HospitalQuery {
            provider_id: ProviderId(5),
            policy_id: "POL1".into(),
            pincode: None,
            state: Some("Karnataka".into()),
            city: None,
        };
        assert!(matches!(q.validate(), Err(GatewayError::Validation(_))));

        let q = HospitalQuery {
            provider_id: ProviderId(5),
            policy_id: "POL1".into(),
            pincode: Some("  ".into()),
            state: None,
            city: None,
        };
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_record_serializes_only_present_fields() {
        let record = HospitalRecord {
            name: Some("City Care Hospital".into()),
            pincode: Some("560001".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "City Care Hospital");
        assert_eq!(json["pincode"], "560001");
        assert!(json.get("phone").is_none());
        assert!(json.get("addressLine1").is_none());
    }

    #[test]
    fn test_facets_tagged_representation() {
        let facets = SearchFacets::StateCity {
            states: vec![StateFacet {
                state: "Karnataka".into(),
                cities: vec!["Bengaluru".into(), "Mysuru".into()],
            }],
        };
        let json = serde_json::to_value(&facets).unwrap();
        assert_eq!(json["mode"], "state_city");

        let json = serde_json::to_value(SearchFacets::PincodeOnly).unwrap();
        assert_eq!(json["mode"], "pincode_only");
    }
}
