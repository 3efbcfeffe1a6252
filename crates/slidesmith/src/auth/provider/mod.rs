//! OAuth Provider Abstraction
//!
//! Authorization URL construction, code exchange and refresh. Client
//! credentials are passed in per call because they live in the secrets file
//! and in the persisted token, not in the provider.

pub mod google;

use chrono::{DateTime, Utc};

use super::ClientSecrets;

/// Tokens returned from an OAuth token exchange or refresh.
#[derive(Debug, Clone)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    /// Granted scopes; empty when the endpoint did not report them.
    pub scopes: Vec<String>,
}

/// OAuth provider trait.
#[allow(async_fn_in_trait)]
pub trait OAuthProvider {
    /// Provider name (e.g. "google")
    fn name(&self) -> &str;

    /// Build the authorization URL for the PKCE flow.
    fn authorize_url(
        &self,
        client: &ClientSecrets,
        scopes: &[String],
        state: &str,
        code_challenge: &str,
        redirect_uri: &str,
    ) -> String;

    /// Exchange an authorization code for tokens.
    async fn exchange_code(
        &self,
        client: &ClientSecrets,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<OAuthTokens, String>;

    /// Refresh an access token using a refresh token.
    async fn refresh_token(
        &self,
        token_uri: &str,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<OAuthTokens, String>;
}
