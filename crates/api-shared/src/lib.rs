//! # API Shared
//!
//! Shared utilities and definitions for the HMS APIs.
//!
//! Contains:
//! - The JSON response envelope and pagination metadata
//! - Role and identity types plus the bearer-token resolution table
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and `hms-core` for common functionality.

pub mod auth;
pub mod envelope;
pub mod health;

pub use auth::{Identity, Role, TokenSet};
pub use envelope::{ApiEnvelope, PageMeta};
pub use health::HealthService;
