//! The JSON response envelope shared by every HMS endpoint.
//!
//! Every response body has the shape
//! `{isSuccess, message, data?, error?, pagination?}` so that clients can
//! handle success and failure uniformly.

use serde::Serialize;
use utoipa::ToSchema;

/// Pagination metadata attached to paginated list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    pub has_more_pages: bool,
}

impl PageMeta {
    /// Builds pagination metadata from a page request and a total row count.
    ///
    /// `last_page` is always at least 1, even for an empty result set.
    pub fn new(current_page: u32, per_page: u32, total: u64) -> Self {
        let last_page = if total == 0 {
            1
        } else {
            total.div_ceil(u64::from(per_page.max(1))) as u32
        };
        Self {
            current_page,
            per_page,
            total,
            last_page,
            has_more_pages: current_page < last_page,
        }
    }
}

/// The uniform response envelope.
///
/// `data` and `error` are mutually exclusive in practice: success responses
/// carry `data` (and optionally `pagination`), failures carry `error`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiEnvelope<T> {
    #[serde(rename = "isSuccess")]
    pub is_success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
}

impl<T> ApiEnvelope<T> {
    /// A success envelope with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            is_success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            pagination: None,
        }
    }

    /// A success envelope with a payload and pagination metadata.
    pub fn ok_paginated(message: impl Into<String>, data: T, pagination: PageMeta) -> Self {
        Self {
            is_success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            pagination: Some(pagination),
        }
    }

    /// A success envelope with no payload (archive, restore, and similar).
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            message: message.into(),
            data: None,
            error: None,
            pagination: None,
        }
    }

    /// A failure envelope. `error` carries client-safe detail only.
    pub fn err(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            is_success: false,
            message: message.into(),
            data: None,
            error,
            pagination: None,
        }
    }
}
