//! Credential/Session Manager
//!
//! Loads the persisted OAuth token, refreshes it when it has expired, and
//! falls back to the interactive browser flow when there is nothing usable
//! on disk. Every newly obtained or refreshed token is written back.

pub mod flow;
pub mod provider;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use self::flow::BrowserOpener;
use self::provider::google::GoogleProvider;
use self::provider::{OAuthProvider, OAuthTokens};
use self::store::TokenStore;
use crate::common::{AppResult, Error};
use crate::config::HandlerConfig;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens closer than this to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

// ── Credential ──────────────────────────────────────────────────────────────

/// Persisted OAuth credential, in the `authorized_user` JSON layout.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    #[serde(rename = "token", alias = "access_token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    #[zeroize(skip)]
    pub token_uri: String,
    #[serde(default)]
    #[zeroize(skip)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    #[zeroize(skip)]
    pub scopes: Vec<String>,
    /// `None` means the token does not expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub expiry: Option<DateTime<Utc>>,
}

// Custom Debug implementation that redacts sensitive fields
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl Credential {
    fn from_tokens(tokens: OAuthTokens, client: &ClientSecrets, requested: &[String]) -> Self {
        let scopes = if tokens.scopes.is_empty() {
            requested.to_vec()
        } else {
            tokens.scopes
        };
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_uri: client.token_uri.clone(),
            client_id: client.client_id.clone(),
            client_secret: client.client_secret.clone(),
            scopes,
            expiry: Some(tokens.expires_at),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expiry.is_some_and(|exp| {
            exp.signed_duration_since(Utc::now()).num_seconds() < EXPIRY_MARGIN_SECS
        })
    }

    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Whether every requested scope was granted. An unrecorded scope list
    /// is taken to cover the request.
    pub fn covers(&self, requested: &[String]) -> bool {
        self.scopes.is_empty() || requested.iter().all(|s| self.scopes.contains(s))
    }

    fn apply_refresh(&mut self, tokens: OAuthTokens) {
        self.access_token = tokens.access_token;
        if let Some(rt) = tokens.refresh_token {
            self.refresh_token = Some(rt);
        }
        self.expiry = Some(tokens.expires_at);
    }
}

// ── Client secrets ──────────────────────────────────────────────────────────

/// OAuth client registration, as downloaded from the Cloud Console.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ClientSecrets {
    #[zeroize(skip)]
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    #[zeroize(skip)]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    #[zeroize(skip)]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl fmt::Debug for ClientSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ClientSecrets {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
        }
    }

    /// Read a client-secrets file (`installed` or `web` section).
    pub fn load(path: &Path) -> AppResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            Error::authentication(format!("Failed to read client secrets {:?}: {}", path, e))
        })?;
        let file: ClientSecretsFile = serde_json::from_str(&data).map_err(|e| {
            Error::authentication(format!("Failed to parse client secrets {:?}: {}", path, e))
        })?;
        file.installed.or(file.web).ok_or_else(|| {
            Error::authentication(format!(
                "Client secrets {:?} has no \"installed\" or \"web\" section",
                path
            ))
        })
    }
}

// ── Credential manager ──────────────────────────────────────────────────────

pub struct CredentialManager<P = GoogleProvider> {
    provider: P,
    store: TokenStore,
    secrets_path: PathBuf,
    scopes: Vec<String>,
    flow_timeout: Duration,
    browser: BrowserOpener,
}

impl CredentialManager<GoogleProvider> {
    pub fn from_config(config: &HandlerConfig) -> Self {
        Self::new(
            GoogleProvider::new(),
            &config.token_path,
            &config.secrets_path,
            config.scopes.clone(),
        )
        .with_flow_timeout(Duration::from_secs(config.auth_timeout_secs))
    }
}

impl<P: OAuthProvider> CredentialManager<P> {
    pub fn new(
        provider: P,
        token_path: impl Into<PathBuf>,
        secrets_path: impl Into<PathBuf>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            provider,
            store: TokenStore::new(token_path),
            secrets_path: secrets_path.into(),
            scopes,
            flow_timeout: Duration::from_secs(300),
            browser: flow::system_browser(),
        }
    }

    pub fn with_flow_timeout(mut self, flow_timeout: Duration) -> Self {
        self.flow_timeout = flow_timeout;
        self
    }

    pub fn with_browser(mut self, browser: BrowserOpener) -> Self {
        self.browser = browser;
        self
    }

    /// Produce a usable credential, persisting it if it changed.
    pub async fn acquire(&self) -> AppResult<Credential> {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(
                    "Ignoring unreadable token artifact {:?}: {}",
                    self.store.path(),
                    e
                );
                None
            }
        };

        if let Some(mut credential) = stored {
            if !credential.covers(&self.scopes) {
                info!("Stored token does not cover the requested scopes, re-authorizing");
            } else if credential.is_valid() {
                debug!("Using stored token from {:?}", self.store.path());
                return Ok(credential);
            } else if credential.can_refresh() {
                match self.refresh(&mut credential).await {
                    Ok(()) => {
                        self.store.save(&credential)?;
                        return Ok(credential);
                    }
                    Err(e) => warn!("Token refresh failed, re-authorizing: {}", e),
                }
            } else {
                info!("Stored token expired and cannot be refreshed");
            }
        }

        let credential = self.authorize().await?;
        self.store.save(&credential)?;
        Ok(credential)
    }

    async fn refresh(&self, credential: &mut Credential) -> Result<(), String> {
        let refresh_token = credential.refresh_token.clone().unwrap_or_default();
        let tokens = self
            .provider
            .refresh_token(
                &credential.token_uri,
                &credential.client_id,
                &credential.client_secret,
                &refresh_token,
            )
            .await?;
        credential.apply_refresh(tokens);
        info!("Refreshed {} access token", self.provider.name());
        Ok(())
    }

    async fn authorize(&self) -> AppResult<Credential> {
        let client = ClientSecrets::load(&self.secrets_path)?;

        info!("Starting {} authorization flow", self.provider.name());
        let tokens = flow::run_local_server(
            &self.provider,
            &client,
            &self.scopes,
            self.flow_timeout,
            &*self.browser,
        )
        .await
        .map_err(Error::Authentication)?;

        info!("Authorization complete");
        Ok(Credential::from_tokens(tokens, &client, &self.scopes))
    }
}
