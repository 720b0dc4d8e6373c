//! OAuth2 password-grant token acquisition.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use tpabridge_config::ProviderProfile;
use tpabridge_core::{GatewayError, Result};

use crate::wire::excerpt;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// POST the password grant to the provider's token endpoint.
///
/// Returns the bearer token and its declared lifetime. Providers that
/// declare no lifetime get `None`; the caller must treat such a token as
/// valid for a single call and not cache it.
pub(crate) async fn fetch_password_grant_token(
    http: &Client,
    profile: &ProviderProfile,
) -> Result<(String, Option<Duration>)> {
    let endpoint = profile
        .endpoints
        .token
        .as_deref()
        .ok_or_else(|| GatewayError::internal("oauth2_password auth without token endpoint"))?;
    let username = profile
        .credentials
        .username
        .as_deref()
        .ok_or_else(|| GatewayError::internal("oauth2_password auth without username"))?;
    let password = profile
        .credentials
        .password
        .as_deref()
        .ok_or_else(|| GatewayError::internal("oauth2_password auth without password"))?;

    let response = http
        .post(endpoint)
        .timeout(profile.request_timeout())
        .form(&[
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
        ])
        .send()
        .await
        .map_err(|e| {
            warn!(provider_id = %profile.id, "token endpoint unreachable: {e}");
            GatewayError::authentication(profile.id, format!("token endpoint unreachable: {e}"))
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::authentication(profile.id, e.to_string()))?;

    if !status.is_success() {
        warn!(
            provider_id = %profile.id,
            status = status.as_u16(),
            body = %excerpt(&body, 120),
            "token request rejected"
        );
        return Err(GatewayError::authentication(
            profile.id,
            format!("token endpoint returned HTTP {status}"),
        ));
    }

    let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        GatewayError::authentication(profile.id, format!("unparseable token response: {e}"))
    })?;

    if token.access_token.is_empty() {
        return Err(GatewayError::authentication(
            profile.id,
            "token endpoint returned an empty access token",
        ));
    }

    debug!(
        provider_id = %profile.id,
        expires_in = ?token.expires_in,
        "bearer token issued"
    );
    Ok((
        token.access_token,
        token.expires_in.map(Duration::from_secs),
    ))
}
