//! Google API Authenticated HTTP Client
//!
//! Injects the OAuth bearer token and maps Google's REST error envelope
//! onto [`RemoteApiError`].

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::common::{create_http_client, Error, RemoteApiError};

/// Google API HTTP client with OAuth token injection
pub struct GoogleClient {
    client: Client,
    access_token: String,
}

impl GoogleClient {
    /// Create a new Google API client with an OAuth access token
    pub fn new(access_token: String) -> Result<Self, Error> {
        Ok(Self {
            client: create_http_client()?,
            access_token,
        })
    }

    /// Make an authenticated GET request
    pub async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Value, RemoteApiError> {
        let builder = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.access_token);

        self.execute_request(builder).await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post(
        &self,
        url: &str,
        query: &[(&str, String)],
        body: &Value,
    ) -> Result<Value, RemoteApiError> {
        let builder = self
            .client
            .post(url)
            .query(query)
            .bearer_auth(&self.access_token)
            .json(body);

        self.execute_request(builder).await
    }

    /// Make an authenticated DELETE request
    pub async fn delete(&self, url: &str, query: &[(&str, String)]) -> Result<Value, RemoteApiError> {
        let builder = self
            .client
            .delete(url)
            .query(query)
            .bearer_auth(&self.access_token);

        self.execute_request(builder).await
    }

    async fn execute_request(&self, builder: RequestBuilder) -> Result<Value, RemoteApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| RemoteApiError::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate limited by Google API");
        }

        let body = response.text().await.map_err(|e| {
            RemoteApiError::new(
                Some(status.as_u16()),
                format!("Failed to read response body: {}", e),
            )
        })?;

        // Empty successful responses (e.g. DELETE)
        if status.is_success() && body.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }

        let parsed: Result<Value, _> = serde_json::from_str(&body);

        if !status.is_success() {
            let err = match parsed {
                Ok(value) => extract_error(&value, status),
                Err(_) => RemoteApiError::new(Some(status.as_u16()), body),
            };
            error!("{}", err);
            return Err(err);
        }

        parsed.map_err(|e| {
            RemoteApiError::new(
                Some(status.as_u16()),
                format!("Failed to parse JSON response: {}", e),
            )
        })
    }
}

/// Build an error from Google's `{"error": {"code", "message"}}` envelope,
/// falling back to the HTTP status.
pub(crate) fn extract_error(response: &Value, status: StatusCode) -> RemoteApiError {
    if let Some(error_obj) = response.get("error") {
        if let Some(message) = error_obj.get("message").and_then(|v| v.as_str()) {
            let code = error_obj
                .get("code")
                .and_then(|v| v.as_u64())
                .and_then(|c| u16::try_from(c).ok())
                .unwrap_or(status.as_u16());
            return RemoteApiError::new(Some(code), message);
        }
        // OAuth endpoints use a flat string error
        if let Some(kind) = error_obj.as_str() {
            let desc = response
                .get("error_description")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error");
            return RemoteApiError::new(Some(status.as_u16()), format!("{}: {}", kind, desc));
        }
    }

    RemoteApiError::new(Some(status.as_u16()), format!("HTTP {} error", status))
}
