//! Common Utilities
//!
//! Shared error types, HTTP client construction and path resolution.

pub mod error;
pub mod http;
pub mod paths;
pub mod result;

pub use error::{Error, RemoteApiError};
pub use http::{create_http_client, create_http_client_with_timeout};
pub use paths::{default_config_path, slidesmith_dir};
pub use result::AppResult;
