//! Per-provider protocol adapters.
//!
//! Each integrated provider gets one strategy object holding its request
//! builder and response normalizer. The builders translate the normalized
//! internal request into that provider's wire payload; the normalizers
//! inspect the provider's success marker and extract the payload of
//! interest. Both are pure functions of provider + payload.
//!
//! [`AdapterSet`] is the closed lookup the dispatch engine consults,
//! populated once at startup.

pub mod careplus;
pub mod horizon;
pub mod lotus;
pub mod medserve;
pub mod pinnacle;
pub mod sentinel;
pub mod sterling;
pub mod unitycare;

use std::collections::HashMap;
use std::sync::Arc;

use time::Date;
use time::macros::format_description;

use tpabridge_config::ProviderProfile;
use tpabridge_core::{
    ClaimIntimationRequest, ECardRequest, EcardDocument, GatewayError, HospitalQuery,
    HospitalRecord, ProviderId, Result,
};

use crate::credentials::Credential;
use crate::wire::{WireRequest, WireResponse};

pub use careplus::CareplusAdapter;
pub use horizon::HorizonAdapter;
pub use lotus::LotusAdapter;
pub use medserve::MedserveAdapter;
pub use pinnacle::PinnacleAdapter;
pub use sentinel::SentinelAdapter;
pub use sterling::SterlingAdapter;
pub use unitycare::UnitycareAdapter;

/// Classified result of normalizing one provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The provider's success marker matched; payload extracted.
    Success(T),
    /// A well-formed business refusal. Final; repeating the call cannot
    /// change the answer.
    Rejected(String),
    /// Non-success without a clear refusal, or a shape that matched no
    /// known normalization path. Retried within the provider's budget.
    Indeterminate(String),
}

pub type ClaimOutcome = Outcome<String>;
pub type EcardOutcome = Outcome<EcardDocument>;
pub type HospitalOutcome = Outcome<Vec<HospitalRecord>>;

/// One provider's wire protocol.
///
/// Operations default to unsupported; adapters override the pairs they
/// actually implement. The dispatch engine checks the `supports_*` flags
/// before doing any work, so an unsupported operation never costs a
/// credential fetch or a network call.
pub trait ProviderAdapter: Send + Sync {
    fn provider_id(&self) -> ProviderId;

    fn supports_claims(&self) -> bool {
        false
    }

    fn supports_ecard(&self) -> bool {
        false
    }

    fn supports_hospital_search(&self) -> bool {
        false
    }

    fn build_claim(
        &self,
        _profile: &ProviderProfile,
        _credential: &Credential,
        _request: &ClaimIntimationRequest,
    ) -> Result<WireRequest> {
        Err(GatewayError::UnsupportedOperation {
            provider: self.provider_id(),
            operation: "claim intimation",
        })
    }

    fn parse_claim(&self, _response: &WireResponse) -> ClaimOutcome {
        Outcome::Indeterminate("claim intimation is not implemented for this provider".into())
    }

    fn build_ecard(
        &self,
        _profile: &ProviderProfile,
        _credential: &Credential,
        _request: &ECardRequest,
    ) -> Result<WireRequest> {
        Err(GatewayError::UnsupportedOperation {
            provider: self.provider_id(),
            operation: "e-card fetch",
        })
    }

    fn parse_ecard(&self, _response: &WireResponse) -> EcardOutcome {
        Outcome::Indeterminate("e-card fetch is not implemented for this provider".into())
    }

    fn build_hospital_search(
        &self,
        _profile: &ProviderProfile,
        _credential: &Credential,
        _query: &HospitalQuery,
    ) -> Result<WireRequest> {
        Err(GatewayError::UnsupportedOperation {
            provider: self.provider_id(),
            operation: "hospital search",
        })
    }

    fn parse_hospital_search(&self, _response: &WireResponse) -> HospitalOutcome {
        Outcome::Indeterminate("hospital search is not implemented for this provider".into())
    }
}

/// The closed map of live integrations, keyed by provider id.
pub struct AdapterSet {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl AdapterSet {
    /// All built-in adapters.
    pub fn builtin() -> Self {
        let list: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(MedserveAdapter),
            Arc::new(CareplusAdapter),
            Arc::new(SentinelAdapter),
            Arc::new(UnitycareAdapter),
            Arc::new(HorizonAdapter),
            Arc::new(LotusAdapter),
            Arc::new(PinnacleAdapter),
            Arc::new(SterlingAdapter),
        ];
        let mut adapters = HashMap::with_capacity(list.len());
        for adapter in list {
            adapters.insert(adapter.provider_id(), adapter);
        }
        Self { adapters }
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Dates on the wire are ISO `YYYY-MM-DD` across all current providers.
pub(crate) fn fmt_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}
