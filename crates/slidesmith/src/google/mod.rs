//! Google API Client Module
//!
//! Authenticated access to the Slides, Drive and Sheets REST APIs. The
//! handler only sees the service traits below; the `*Api` types are the
//! production implementations.

pub mod client;
pub mod common;
pub mod drive;
pub mod sheets;
pub mod slides;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::GoogleClient;
pub use drive::DriveApi;
pub use sheets::SheetsApi;
pub use slides::{Edit, Presentation, SlidesApi, Slide};

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::auth::Credential;
use crate::common::{AppResult, Error, RemoteApiError};

/// Implements the standard constructors for an API wrapper holding a
/// `GoogleClient` and a base URL.
macro_rules! google_api_wrapper {
    ($name:ident, $base:expr) => {
        impl $name {
            /// Create a new API client with an OAuth access token
            pub fn new(access_token: String) -> Result<Self, crate::common::Error> {
                Self::with_base_url(access_token, $base)
            }

            /// Create a client against a different API root
            pub fn with_base_url(
                access_token: String,
                base_url: impl Into<String>,
            ) -> Result<Self, crate::common::Error> {
                let client = crate::google::client::GoogleClient::new(access_token)?;
                Ok(Self {
                    client,
                    base_url: base_url.into().trim_end_matches('/').to_string(),
                })
            }
        }
    };
}

pub(crate) use google_api_wrapper;

// ── Service traits ──────────────────────────────────────────────────────────

/// Presentation document surface.
#[async_trait]
pub trait PresentationService: Send + Sync {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation, RemoteApiError>;

    /// Apply `edits` as one atomic `batchUpdate` call.
    async fn batch_update(&self, presentation_id: &str, edits: &[Edit]) -> Result<Value, RemoteApiError>;
}

/// File storage surface.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Returns the id of the new file.
    async fn copy_file(
        &self,
        file_id: &str,
        name: &str,
        parents: &[String],
    ) -> Result<String, RemoteApiError>;

    async fn delete_file(&self, file_id: &str) -> Result<(), RemoteApiError>;
}

/// Spreadsheet surface.
#[async_trait]
pub trait SpreadsheetService: Send + Sync {
    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, RemoteApiError>;
}

/// The three service handles, bound to one credential.
pub struct Services {
    pub slides: Box<dyn PresentationService>,
    pub drive: Box<dyn StorageService>,
    pub sheets: Box<dyn SpreadsheetService>,
}

impl Services {
    /// Build the production handles from a credential.
    ///
    /// Refuses an expired credential; refresh it first.
    pub fn connect(credential: &Credential) -> AppResult<Self> {
        if !credential.is_valid() {
            return Err(Error::authentication(
                "Refusing to build service handles from an expired credential",
            ));
        }

        let token = credential.access_token.clone();
        let services = Self {
            slides: Box::new(SlidesApi::new(token.clone())?),
            drive: Box::new(DriveApi::new(token.clone())?),
            sheets: Box::new(SheetsApi::new(token)?),
        };

        info!("Google service handles ready (slides v1, drive v3, sheets v4)");
        Ok(services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn credential(access_token: &str, expires_in: Duration) -> Credential {
        Credential {
            access_token: access_token.to_string(),
            refresh_token: Some("1//refresh".to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec![],
            expiry: Some(Utc::now() + expires_in),
        }
    }

    #[test]
    fn test_connect_refuses_expired_credential() {
        let expired = credential("ya29.old", Duration::minutes(-5));
        assert!(matches!(
            Services::connect(&expired),
            Err(Error::Authentication(_))
        ));

        // Inside the expiry margin counts as expired too.
        let expiring = credential("ya29.old", Duration::seconds(10));
        assert!(matches!(
            Services::connect(&expiring),
            Err(Error::Authentication(_))
        ));
    }

    #[test]
    fn test_connect_refuses_empty_token() {
        let blank = credential("", Duration::hours(1));
        assert!(matches!(
            Services::connect(&blank),
            Err(Error::Authentication(_))
        ));
    }

    #[test]
    fn test_connect_accepts_valid_credential() {
        let valid = credential("ya29.fresh", Duration::hours(1));
        assert!(Services::connect(&valid).is_ok());
    }
}
