//! slidesmith
//!
//! Copies Google Slides templates, fills them with text and images, and
//! reads spreadsheet ranges, while keeping Slides writes under the
//! per-minute request quota.

pub mod auth;
pub mod common;
pub mod config;
pub mod google;
pub mod handler;
pub mod limiter;

pub use auth::{Credential, CredentialManager};
pub use common::{AppResult, Error, RemoteApiError};
pub use config::HandlerConfig;
pub use google::{Edit, Presentation, Slide};
pub use handler::{GoogleApiHandler, SlidesLookup};
pub use limiter::{FixedWindowLimiter, RateLimiter};
