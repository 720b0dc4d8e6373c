//! The dispatch engine.
//!
//! The only component callers interact with directly. Every operation
//! follows the same cycle: resolve the provider profile, obtain
//! credentials if the scheme needs them, build the provider-specific
//! payload, send with a bounded timeout, normalize the response, and
//! retry the full cycle on retryable failures up to the provider's
//! budget.
//!
//! All failures are converted at this boundary into `success = false`
//! results with a human-readable message; no raw transport error crosses
//! into caller code.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error, info, trace, warn};

use tpabridge_config::{GatewaySettings, ProviderProfile, ProviderRegistry};
use tpabridge_core::{
    ClaimIntimationRequest, ClaimIntimationResult, ECardRequest, ECardResult, EcardDocument,
    GatewayError, HospitalQuery, HospitalRecord, ProviderId, Result, SearchFacets,
};

use crate::adapters::{AdapterSet, Outcome, ProviderAdapter};
use crate::credentials::CredentialManager;
use crate::document::static_ecard_path;
use crate::hospitals::{HospitalDirectory, HospitalSource, MemoryHospitalSource};
use crate::wire::{WireBody, WireMethod, WireRequest, WireResponse};

/// One failed attempt: the classified error plus the truncated response
/// body, when one was received.
struct AttemptFailure {
    error: GatewayError,
    excerpt: Option<String>,
}

impl From<GatewayError> for AttemptFailure {
    fn from(error: GatewayError) -> Self {
        Self {
            error,
            excerpt: None,
        }
    }
}

/// The TPA integration gateway.
pub struct TpaGateway {
    registry: Arc<ProviderRegistry>,
    adapters: AdapterSet,
    credentials: CredentialManager,
    http: reqwest::Client,
    hospitals: HospitalDirectory,
}

impl TpaGateway {
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// practice).
    pub fn new(registry: ProviderRegistry, settings: GatewaySettings) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()
            .expect("Failed to create HTTP client");
        Self {
            registry: Arc::new(registry),
            adapters: AdapterSet::builtin(),
            credentials: CredentialManager::new(&settings.user_agent),
            http,
            hospitals: HospitalDirectory::new(Arc::new(MemoryHospitalSource::new())),
        }
    }

    /// Attach the row source backing table-based hospital search.
    pub fn with_hospital_source(mut self, source: Arc<dyn HospitalSource>) -> Self {
        self.hospitals = HospitalDirectory::new(source);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Intimate a claim with the member's TPA/insurer.
    pub async fn intimate_claim(&self, request: &ClaimIntimationRequest) -> ClaimIntimationResult {
        let provider_id = request.provider_id;
        let Some(profile) = self.registry.lookup(provider_id) else {
            let err = GatewayError::ConfigurationMissing(provider_id);
            warn!(provider_id = %provider_id, "{err}");
            return ClaimIntimationResult::failed(err.to_string());
        };
        let adapter = match self.adapter_for(provider_id, Operation::Claim) {
            Ok(adapter) => adapter,
            Err(err) => return ClaimIntimationResult::failed(err.to_string()),
        };
        if let Err(err) = request.validate() {
            return ClaimIntimationResult::failed(err.to_string());
        }

        let max_attempts = profile.retry.max_attempts;
        let mut last_failure: Option<AttemptFailure> = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::time::sleep(profile.retry.delay()).await;
            }
            match self.claim_attempt(profile, adapter.as_ref(), request).await {
                Ok((reference, excerpt)) => {
                    info!(
                        provider_id = %provider_id,
                        attempt,
                        reference = %reference,
                        "claim intimated"
                    );
                    return ClaimIntimationResult::accepted(reference).with_excerpt(excerpt);
                }
                Err(failure) => {
                    warn!(
                        provider_id = %provider_id,
                        attempt,
                        max_attempts,
                        category = %failure.error.category(),
                        error = %failure.error,
                        "claim intimation attempt failed"
                    );
                    if !failure.error.is_retryable() {
                        let mut result = ClaimIntimationResult::failed(failure.error.to_string());
                        if let Some(excerpt) = failure.excerpt {
                            result = result.with_excerpt(excerpt);
                        }
                        return result;
                    }
                    last_failure = Some(failure);
                }
            }
        }

        error!(
            provider_id = %provider_id,
            attempts = max_attempts,
            "claim intimation retries exhausted"
        );
        let mut result = ClaimIntimationResult::failed("could not reach provider");
        if let Some(failure) = last_failure {
            result = result.with_excerpt(
                failure
                    .excerpt
                    .unwrap_or_else(|| failure.error.to_string()),
            );
        }
        result
    }

    /// Fetch a member's e-card document.
    pub async fn fetch_ecard(&self, request: &ECardRequest) -> ECardResult {
        let provider_id = request.provider_id;
        let Some(profile) = self.registry.lookup(provider_id) else {
            let err = GatewayError::ConfigurationMissing(provider_id);
            warn!(provider_id = %provider_id, "{err}");
            return ECardResult::unavailable(err.to_string());
        };
        if let Err(err) = request.validate() {
            return ECardResult::unavailable(err.to_string());
        }

        // Providers without a live integration resolve to a
        // pre-provisioned file, with no credential or network work.
        if let Some(dir) = &profile.ecard_static_dir {
            let path = static_ecard_path(dir, &request.policy_number, &request.member_code);
            info!(provider_id = %provider_id, "e-card resolved from static path");
            return ECardResult::resolved(EcardDocument::static_path(path));
        }

        let adapter = match self.adapter_for(provider_id, Operation::Ecard) {
            Ok(adapter) => adapter,
            Err(err) => return ECardResult::unavailable(err.to_string()),
        };

        let max_attempts = profile.retry.max_attempts;
        let mut last_failure: Option<AttemptFailure> = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::time::sleep(profile.retry.delay()).await;
            }
            match self.ecard_attempt(profile, adapter.as_ref(), request).await {
                Ok(document) => {
                    info!(
                        provider_id = %provider_id,
                        attempt,
                        kind = ?document.kind,
                        "e-card resolved"
                    );
                    return ECardResult::resolved(document);
                }
                Err(failure) => {
                    warn!(
                        provider_id = %provider_id,
                        attempt,
                        max_attempts,
                        category = %failure.error.category(),
                        error = %failure.error,
                        "e-card attempt failed"
                    );
                    if !failure.error.is_retryable() {
                        return ECardResult::unavailable(failure.error.to_string());
                    }
                    last_failure = Some(failure);
                }
            }
        }

        error!(
            provider_id = %provider_id,
            attempts = max_attempts,
            "e-card retries exhausted"
        );
        let detail = last_failure
            .map(|failure| failure.error.to_string())
            .unwrap_or_else(|| "no resolution path succeeded".to_string());
        ECardResult::unavailable(
            GatewayError::DocumentNotAvailable(detail).to_string(),
        )
    }

    /// Search a provider's network hospitals.
    ///
    /// Table-backed providers are answered from their mapped table;
    /// the externally-resolved provider goes through its search API and
    /// requires a pincode.
    pub async fn search_hospitals(&self, query: &HospitalQuery) -> Result<Vec<HospitalRecord>> {
        let provider_id = query.provider_id;
        let profile = self
            .registry
            .lookup(provider_id)
            .ok_or(GatewayError::ConfigurationMissing(provider_id))?;

        if profile.hospital_table.is_some() {
            return self.hospitals.search(profile, query).await;
        }

        // No backing table: a pincode is mandatory for the external API.
        let has_pincode = query
            .pincode
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());
        if !has_pincode {
            return Err(GatewayError::validation(
                "a pincode is required to search this provider's network",
            ));
        }

        let adapter = self.adapter_for(provider_id, Operation::HospitalSearch)?;
        let max_attempts = profile.retry.max_attempts;
        let mut last_error = GatewayError::network(provider_id, "no attempt made");

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::time::sleep(profile.retry.delay()).await;
            }
            match self
                .hospital_attempt(profile, adapter.as_ref(), query)
                .await
            {
                Ok(records) => {
                    debug!(
                        provider_id = %provider_id,
                        attempt,
                        matches = records.len(),
                        "hospital search answered by provider API"
                    );
                    return Ok(records);
                }
                Err(failure) => {
                    warn!(
                        provider_id = %provider_id,
                        attempt,
                        max_attempts,
                        error = %failure.error,
                        "hospital search attempt failed"
                    );
                    if !failure.error.is_retryable() {
                        return Err(failure.error);
                    }
                    last_error = failure.error;
                }
            }
        }
        Err(last_error)
    }

    /// Search-option facets for a provider: distinct states and cities
    /// for table-backed providers, a pincode-only descriptor for the
    /// externally-resolved one.
    pub async fn list_search_facets(
        &self,
        provider_id: ProviderId,
        policy_id: &str,
    ) -> Result<SearchFacets> {
        let profile = self
            .registry
            .lookup(provider_id)
            .ok_or(GatewayError::ConfigurationMissing(provider_id))?;

        match &profile.hospital_table {
            Some(_) => self.hospitals.facets(profile, policy_id).await,
            None => Ok(SearchFacets::PincodeOnly),
        }
    }

    fn adapter_for(
        &self,
        provider_id: ProviderId,
        operation: Operation,
    ) -> Result<Arc<dyn ProviderAdapter>> {
        let unsupported = || {
            let err = GatewayError::UnsupportedOperation {
                provider: provider_id,
                operation: operation.label(),
            };
            warn!(provider_id = %provider_id, "{err}");
            err
        };
        let Some(adapter) = self.adapters.get(provider_id) else {
            return Err(unsupported());
        };
        let supported = match operation {
            Operation::Claim => adapter.supports_claims(),
            Operation::Ecard => adapter.supports_ecard(),
            Operation::HospitalSearch => adapter.supports_hospital_search(),
        };
        if !supported {
            return Err(unsupported());
        }
        Ok(adapter)
    }

    async fn claim_attempt(
        &self,
        profile: &ProviderProfile,
        adapter: &dyn ProviderAdapter,
        request: &ClaimIntimationRequest,
    ) -> std::result::Result<(String, String), AttemptFailure> {
        let target = profile.endpoints.claim_intimation.as_deref();
        let credential = self.credentials.obtain(profile, target).await?;
        let wire = adapter.build_claim(profile, &credential, request)?;
        let response = self.send(profile, wire).await?;
        let excerpt = response.excerpt();
        match adapter.parse_claim(&response) {
            Outcome::Success(reference) => Ok((reference, excerpt)),
            Outcome::Rejected(message) => Err(AttemptFailure {
                error: GatewayError::rejected(profile.id, message),
                excerpt: Some(excerpt),
            }),
            Outcome::Indeterminate(message) => Err(AttemptFailure {
                error: GatewayError::unexpected(profile.id, message),
                excerpt: Some(excerpt),
            }),
        }
    }

    async fn ecard_attempt(
        &self,
        profile: &ProviderProfile,
        adapter: &dyn ProviderAdapter,
        request: &ECardRequest,
    ) -> std::result::Result<EcardDocument, AttemptFailure> {
        let target = profile.endpoints.ecard.as_deref();
        let credential = self.credentials.obtain(profile, target).await?;
        let wire = adapter.build_ecard(profile, &credential, request)?;
        let response = self.send(profile, wire).await?;
        let excerpt = response.excerpt();
        match adapter.parse_ecard(&response) {
            Outcome::Success(document) => Ok(document),
            Outcome::Rejected(message) => Err(AttemptFailure {
                error: GatewayError::rejected(profile.id, message),
                excerpt: Some(excerpt),
            }),
            Outcome::Indeterminate(message) => Err(AttemptFailure {
                error: GatewayError::unexpected(profile.id, message),
                excerpt: Some(excerpt),
            }),
        }
    }

    async fn hospital_attempt(
        &self,
        profile: &ProviderProfile,
        adapter: &dyn ProviderAdapter,
        query: &HospitalQuery,
    ) -> std::result::Result<Vec<HospitalRecord>, AttemptFailure> {
        let target = profile.endpoints.hospital_search.as_deref();
        let credential = self.credentials.obtain(profile, target).await?;
        let wire = adapter.build_hospital_search(profile, &credential, query)?;
        let response = self.send(profile, wire).await?;
        let excerpt = response.excerpt();
        match adapter.parse_hospital_search(&response) {
            Outcome::Success(records) => Ok(records),
            Outcome::Rejected(message) => Err(AttemptFailure {
                error: GatewayError::rejected(profile.id, message),
                excerpt: Some(excerpt),
            }),
            Outcome::Indeterminate(message) => Err(AttemptFailure {
                error: GatewayError::unexpected(profile.id, message),
                excerpt: Some(excerpt),
            }),
        }
    }

    /// Send one wire request with the profile's bounded timeout.
    async fn send(&self, profile: &ProviderProfile, wire: WireRequest) -> Result<WireResponse> {
        debug!(provider_id = %profile.id, url = %wire.url, "sending provider request");

        let method = match wire.method {
            WireMethod::Get => reqwest::Method::GET,
            WireMethod::Post => reqwest::Method::POST,
        };
        let mut builder = self
            .http
            .request(method, wire.url.as_str())
            .timeout(profile.request_timeout());
        for (name, value) in &wire.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match wire.body {
            WireBody::Empty => builder,
            WireBody::Json(payload) => builder.json(&payload),
            WireBody::Form(pairs) => builder.form(&pairs),
            WireBody::Xml(envelope) => builder
                .header(CONTENT_TYPE, "text/xml; charset=utf-8")
                .body(envelope),
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::network(profile.id, "request timed out")
            } else {
                GatewayError::network(profile.id, e.to_string())
            }
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::network(profile.id, e.to_string()))?
            .to_vec();

        if status.is_server_error() {
            warn!(
                provider_id = %profile.id,
                status = status.as_u16(),
                "provider returned a server error"
            );
            return Err(GatewayError::network(
                profile.id,
                format!("provider returned HTTP {status}"),
            ));
        }

        let response = WireResponse::new(status.as_u16(), content_type, body);
        trace!(
            provider_id = %profile.id,
            status = response.status,
            body = %response.excerpt(),
            "provider response received"
        );
        Ok(response)
    }
}

#[derive(Clone, Copy)]
enum Operation {
    Claim,
    Ecard,
    HospitalSearch,
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Self::Claim => "claim intimation",
            Self::Ecard => "e-card fetch",
            Self::HospitalSearch => "hospital search",
        }
    }
}
