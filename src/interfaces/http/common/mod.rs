//! Response envelopes and extractors shared by all HTTP modules

mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::shared::PaginatedResult;

/// Trim a string field while deserializing, so field validators see the
/// value the services will store.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// Success envelope: `{"success": true, "data": {...}, "message": "..."}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable outcome, shown by the client as-is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Error envelope. `message` repeats `error` for clients that read the
/// same field on success and failure. `needsVerification` and `email` are
/// only present when login was refused because the address is not
/// confirmed yet.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    /// Stable machine-readable error code
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_verification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            message: error.clone(),
            error,
            code: code.into(),
            needs_verification: None,
            email: None,
        }
    }
}

/// Page of items with metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T, U> From<PaginatedResult<U>> for PaginatedResponse<T>
where
    T: From<U>,
{
    fn from(result: PaginatedResult<U>) -> Self {
        Self {
            items: result.items.into_iter().map(T::from).collect(),
            total: result.total,
            page: result.page,
            page_size: result.limit,
            total_pages: result.total_pages,
        }
    }
}
