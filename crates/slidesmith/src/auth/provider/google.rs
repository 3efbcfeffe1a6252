//! Google OAuth2 Provider
//!
//! PKCE Authorization Code flow for installed (desktop) applications.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use rand::RngCore;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{error, info};

use super::{OAuthProvider, OAuthTokens};
use crate::auth::ClientSecrets;
use crate::common::create_http_client;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Google OAuth2 provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleProvider;

impl GoogleProvider {
    pub fn new() -> Self {
        Self
    }
}

impl OAuthProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn authorize_url(
        &self,
        client: &ClientSecrets,
        scopes: &[String],
        state: &str,
        code_challenge: &str,
        redirect_uri: &str,
    ) -> String {
        let scope = scopes.join(" ");
        let query = [
            ("client_id", client.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("state", state),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            // Offline access plus forced consent always yields a refresh token.
            ("access_type", "offline"),
            ("prompt", "consent"),
        ]
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

        format!("{}?{}", client.auth_uri, query)
    }

    async fn exchange_code(
        &self,
        client: &ClientSecrets,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<OAuthTokens, String> {
        info!("Exchanging authorization code at {}", client.token_uri);
        request_tokens(
            &client.token_uri,
            &[
                ("grant_type", "authorization_code"),
                ("client_id", client.client_id.as_str()),
                ("client_secret", client.client_secret.as_str()),
                ("code", code),
                ("code_verifier", code_verifier),
                ("redirect_uri", redirect_uri),
            ],
        )
        .await
    }

    async fn refresh_token(
        &self,
        token_uri: &str,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<OAuthTokens, String> {
        info!("Refreshing access token at {}", token_uri);
        request_tokens(
            token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
            ],
        )
        .await
    }
}

// ── Token endpoint ──────────────────────────────────────────────────────────

/// Body of a token endpoint reply, success or failure.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    /// Space separated.
    scope: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_tokens(self) -> Result<OAuthTokens, String> {
        if let Some(error) = self.error {
            let description = self.error_description.unwrap_or_default();
            return Err(format!("{}: {}", error, description));
        }

        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or("Token response has no access_token")?;

        Ok(OAuthTokens {
            access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now()
                + Duration::seconds(self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS)),
            scopes: self
                .scope
                .map(|s| s.split_whitespace().map(String::from).collect())
                .unwrap_or_default(),
        })
    }
}

/// POST a grant to the token endpoint. Secrets travel in the form body only.
async fn request_tokens(token_uri: &str, form: &[(&str, &str)]) -> Result<OAuthTokens, String> {
    let client = create_http_client().map_err(|e| e.to_string())?;

    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| format!("Token request failed: {}", e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| format!("Failed to read token response: {}", e))?;

    if !status.is_success() {
        error!("Token endpoint returned HTTP {}", status);
    }
    parse_token_response(&body).map_err(|e| {
        if status.is_success() {
            e
        } else {
            format!("HTTP {}: {}", status.as_u16(), e)
        }
    })
}

pub(crate) fn parse_token_response(body: &str) -> Result<OAuthTokens, String> {
    serde_json::from_str::<TokenResponse>(body)
        .map_err(|e| format!("Invalid token response: {}", e))?
        .into_tokens()
}

// ── PKCE ────────────────────────────────────────────────────────────────────

/// 32 random bytes, base64url without padding (43 characters).
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 challenge for `verifier`.
pub fn generate_code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
