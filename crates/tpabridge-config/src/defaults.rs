//! Built-in provider roster.
//!
//! Thirteen profiles with placeholder endpoints and credentials, matching
//! the UAT shape of each integration. Deployments override hostnames and
//! secrets via the registry TOML or `TPABRIDGE__...` environment variables.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use tpabridge_core::{AuthScheme, RetryPolicy};

use crate::profile::{Endpoints, HospitalTableMapping, ProviderProfile};

fn columns(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(field, column)| (field.to_string(), column.to_string()))
        .collect()
}

/// Placeholder 32-byte AES key for the encrypted-session scheme.
fn placeholder_session_key() -> String {
    BASE64.encode(b"0123456789abcdef0123456789abcdef")
}

/// The thirteen supported providers.
pub fn default_profiles() -> Vec<ProviderProfile> {
    let mut profiles = Vec::with_capacity(13);

    // 1: OAuth2 password grant, JSON claim + e-card URL.
    let mut medserve =
        ProviderProfile::new(1u16, "Medserve Health TPA").with_auth(AuthScheme::Oauth2Password);
    medserve.endpoints = Endpoints {
        claim_intimation: Some("https://uat.medserve.example.com/api/claim/intimate".into()),
        ecard: Some("https://uat.medserve.example.com/api/member/ecard".into()),
        token: Some("https://uat.medserve.example.com/oauth/token".into()),
        hospital_search: None,
    };
    medserve.credentials.username = Some("tpabridge_svc".into());
    medserve.credentials.password = Some("change-me".into());
    medserve.retry = RetryPolicy::with_max_attempts(3);
    medserve.hospital_table = Some(HospitalTableMapping {
        table: "medserve_hospitals".into(),
        policy_column: Some("PolicyNos".into()),
        columns: columns(&[
            ("hospital_name", "HospitalName"),
            ("address_line_1", "Address1"),
            ("address_line_2", "Address2"),
            ("city", "City"),
            ("state", "State"),
            ("pincode", "PinCode"),
            ("phone", "ContactNo"),
        ]),
    });
    profiles.push(medserve);

    // 2: static header key, nested-JSON envelope, base64 e-card.
    let mut careplus =
        ProviderProfile::new(2u16, "CarePlus Assist").with_auth(AuthScheme::StaticHeader);
    careplus.endpoints = Endpoints {
        claim_intimation: Some("https://uatportal.careplus.example.com/claims/intimation".into()),
        ecard: Some("https://uatportal.careplus.example.com/member/ecard".into()),
        token: None,
        hospital_search: None,
    };
    careplus.credentials.header_name = Some("X-Api-Key".into());
    careplus.credentials.header_value = Some("change-me".into());
    careplus.retry = RetryPolicy::with_max_attempts(5);
    careplus.hospital_table = Some(HospitalTableMapping {
        table: "careplus_network".into(),
        policy_column: None,
        columns: columns(&[
            ("hospital_name", "hosp_name"),
            ("address_line_1", "addr1"),
            ("city", "city_name"),
            ("state", "state_name"),
            ("pincode", "pin"),
            ("email", "email_id"),
        ]),
    });
    profiles.push(careplus);

    // 3: HMAC-signed requests, form-urlencoded, raw-PDF e-card. Hospital
    // list only reachable via its search API, so no table mapping.
    let mut sentinel =
        ProviderProfile::new(3u16, "Sentinel TPA").with_auth(AuthScheme::HmacSigned);
    sentinel.endpoints = Endpoints {
        claim_intimation: Some("https://api-uat.sentineltpa.example.com/IntimateClaim".into()),
        ecard: Some("https://api-uat.sentineltpa.example.com/ECard".into()),
        token: None,
        hospital_search: Some("https://api-uat.sentineltpa.example.com/HospitalSearch".into()),
    };
    sentinel.credentials.hmac_secret = Some("change-me".into());
    sentinel.retry = RetryPolicy::with_max_attempts(3);
    profiles.push(sentinel);

    // 4: encrypted session token, XML envelopes.
    let mut unitycare = ProviderProfile::new(4u16, "UnityCare Administrators")
        .with_auth(AuthScheme::EncryptedSession);
    unitycare.endpoints = Endpoints {
        claim_intimation: Some("https://uatws.unitycare.example.com/ClaimIntimation".into()),
        ecard: Some("https://uatws.unitycare.example.com/ECard".into()),
        token: Some("https://uatws.unitycare.example.com/GenerateToken".into()),
        hospital_search: None,
    };
    unitycare.credentials.session_key = Some(placeholder_session_key());
    unitycare.retry = RetryPolicy::with_max_attempts(10);
    unitycare.hospital_table = Some(HospitalTableMapping {
        table: "unitycare_hospital_master".into(),
        policy_column: None,
        columns: columns(&[
            ("hospital_name", "HOSPITAL"),
            ("address_line_1", "ADDRESS"),
            ("city", "CITY"),
            ("state", "STATE"),
            ("pincode", "PINCODE"),
            ("phone", "PHONE"),
        ]),
    });
    profiles.push(unitycare);

    // 5: no auth, JSON behind a guard prefix.
    let mut horizon = ProviderProfile::new(5u16, "Horizon General Insurance");
    horizon.endpoints = Endpoints {
        claim_intimation: Some("https://digital.horizongi.example.com/claims/intimate".into()),
        ecard: Some("https://digital.horizongi.example.com/member/ecard".into()),
        token: None,
        hospital_search: None,
    };
    horizon.retry = RetryPolicy::with_max_attempts(3);
    horizon.hospital_table = Some(HospitalTableMapping {
        table: "horizon_ppn".into(),
        policy_column: None,
        columns: columns(&[
            ("hospital_name", "Name"),
            ("address_line_1", "address"),
            ("city", "city"),
            ("state", "state"),
            ("pincode", "pincode"),
        ]),
    });
    profiles.push(horizon);

    // 6, 7, 12: no live e-card integration; pre-provisioned files.
    let mut apex =
        ProviderProfile::new(6u16, "Apex Benefit Services").with_auth(AuthScheme::StaticHeader);
    apex.credentials.header_name = Some("Authorization-Key".into());
    apex.credentials.header_value = Some("change-me".into());
    apex.ecard_static_dir = Some("/srv/tpabridge/ecards/apex".into());
    apex.hospital_table = Some(HospitalTableMapping {
        table: "apex_hospitals".into(),
        policy_column: None,
        columns: columns(&[
            ("hospital_name", "provider_name"),
            ("address_line_1", "street_address"),
            ("city", "city"),
            ("state", "state"),
            ("pincode", "zip"),
            ("phone", "phone_no"),
        ]),
    });
    profiles.push(apex);

    let mut trident = ProviderProfile::new(7u16, "Trident Health Services");
    trident.ecard_static_dir = Some("/srv/tpabridge/ecards/trident".into());
    trident.hospital_table = Some(HospitalTableMapping {
        table: "trident_network_list".into(),
        policy_column: None,
        columns: columns(&[
            ("hospital_name", "HospName"),
            ("address_line_1", "HospAddress"),
            ("city", "HospCity"),
            ("state", "HospState"),
            ("pincode", "HospPin"),
        ]),
    });
    profiles.push(trident);

    // 8: OAuth2 password grant whose token response carries no expiry.
    let mut lotus =
        ProviderProfile::new(8u16, "Lotus Mediclaim").with_auth(AuthScheme::Oauth2Password);
    lotus.endpoints = Endpoints {
        claim_intimation: Some("https://uat.lotusmediclaim.example.com/v2/claims".into()),
        ecard: Some("https://uat.lotusmediclaim.example.com/v2/ecard".into()),
        token: Some("https://uat.lotusmediclaim.example.com/v2/token".into()),
        hospital_search: None,
    };
    lotus.credentials.username = Some("tpabridge".into());
    lotus.credentials.password = Some("change-me".into());
    lotus.retry = RetryPolicy::with_max_attempts(4);
    lotus.hospital_table = Some(HospitalTableMapping {
        table: "lotus_hospitals".into(),
        policy_column: None,
        columns: columns(&[
            ("hospital_name", "hospital"),
            ("address_line_1", "address_1"),
            ("address_line_2", "address_2"),
            ("city", "city"),
            ("state", "state"),
            ("pincode", "pincode"),
            ("phone", "contact"),
        ]),
    });
    profiles.push(lotus);

    // 9: static header, flat JSON.
    let mut pinnacle =
        ProviderProfile::new(9u16, "Pinnacle Care TPA").with_auth(AuthScheme::StaticHeader);
    pinnacle.endpoints = Endpoints {
        claim_intimation: Some("https://services-uat.pinnaclecare.example.com/intimation".into()),
        ecard: Some("https://services-uat.pinnaclecare.example.com/ecard".into()),
        token: None,
        hospital_search: None,
    };
    pinnacle.credentials.header_name = Some("X-Partner-Token".into());
    pinnacle.credentials.header_value = Some("change-me".into());
    pinnacle.retry = RetryPolicy::with_max_attempts(3);
    pinnacle.hospital_table = Some(HospitalTableMapping {
        table: "pinnacle_providers".into(),
        policy_column: None,
        columns: columns(&[
            ("hospital_name", "ProviderName"),
            ("address_line_1", "AddressLine"),
            ("city", "City"),
            ("state", "State"),
            ("pincode", "Pin"),
            ("phone", "Phone"),
            ("email", "Email"),
        ]),
    });
    profiles.push(pinnacle);

    // 10, 11, 13: hospital directory only (11 also serves an e-card URL).
    let mut everwell = ProviderProfile::new(10u16, "Everwell Assurance");
    everwell.hospital_table = Some(HospitalTableMapping {
        table: "everwell_hospital_list".into(),
        policy_column: None,
        columns: columns(&[
            ("hospital_name", "name"),
            ("address_line_1", "address"),
            ("city", "city"),
            ("state", "state"),
            ("pincode", "pin_code"),
        ]),
    });
    profiles.push(everwell);

    let mut sterling = ProviderProfile::new(11u16, "Sterling Health Admin");
    sterling.endpoints.ecard =
        Some("https://uat.sterlinghealth.example.com/members/ecard".into());
    sterling.hospital_table = Some(HospitalTableMapping {
        table: "sterling_network".into(),
        policy_column: None,
        columns: columns(&[
            ("hospital_name", "HospitalName"),
            ("address_line_1", "Address"),
            ("city", "City"),
            ("state", "State"),
            ("pincode", "Pincode"),
            ("phone", "Telephone"),
        ]),
    });
    profiles.push(sterling);

    let mut oriental =
        ProviderProfile::new(12u16, "Oriental Wellness TPA").with_auth(AuthScheme::StaticHeader);
    oriental.credentials.header_name = Some("X-Client-Secret".into());
    oriental.credentials.header_value = Some("change-me".into());
    oriental.ecard_static_dir = Some("/srv/tpabridge/ecards/oriental".into());
    oriental.hospital_table = Some(HospitalTableMapping {
        table: "oriental_wellness_hospitals".into(),
        policy_column: None,
        columns: columns(&[
            ("hospital_name", "hospitalname"),
            ("address_line_1", "addressline1"),
            ("address_line_2", "addressline2"),
            ("city", "cityname"),
            ("state", "statename"),
            ("pincode", "pincode"),
        ]),
    });
    profiles.push(oriental);

    let mut securemed = ProviderProfile::new(13u16, "Securemed TPA");
    securemed.hospital_table = Some(HospitalTableMapping {
        table: "securemed_network".into(),
        policy_column: None,
        columns: columns(&[
            ("hospital_name", "HOSP_NAME"),
            ("address_line_1", "HOSP_ADDR"),
            ("city", "HOSP_CITY"),
            ("state", "HOSP_STATE"),
            ("pincode", "HOSP_PIN"),
            ("phone", "HOSP_TEL"),
        ]),
    });
    profiles.push(securemed);

    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpabridge_core::ProviderId;

    #[test]
    fn test_roster_size_and_validity() {
        let profiles = default_profiles();
        assert_eq!(profiles.len(), 13);
        for profile in &profiles {
            profile.validate().unwrap_or_else(|e| panic!("{e}"));
        }
    }

    #[test]
    fn test_roster_ids_are_unique_and_dense() {
        let mut ids: Vec<u16> = default_profiles().iter().map(|p| p.id.0).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=13).collect::<Vec<u16>>());
    }

    #[test]
    fn test_sentinel_has_no_hospital_table() {
        let profiles = default_profiles();
        let sentinel = profiles.iter().find(|p| p.id == ProviderId(3)).unwrap();
        assert!(sentinel.hospital_table.is_none());
        assert!(sentinel.endpoints.hospital_search.is_some());
    }

    #[test]
    fn test_static_path_providers_have_directories() {
        let profiles = default_profiles();
        for id in [6u16, 7, 12] {
            let profile = profiles.iter().find(|p| p.id == ProviderId(id)).unwrap();
            assert!(
                profile.ecard_static_dir.is_some(),
                "provider {id} should resolve e-cards from disk"
            );
        }
    }

    #[test]
    fn test_retry_budgets_within_allowed_range() {
        for profile in default_profiles() {
            assert!((1..=10).contains(&profile.retry.max_attempts));
        }
    }
}
