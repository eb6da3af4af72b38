//! Response envelope for the JSON API.

use serde::{Deserialize, Serialize};

/// JSON body shared by every `/api/wordpress` endpoint:
/// `{ "success": bool, "data"?, "total"?, "error"?, "message"? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the request produced `data`.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Item count for list payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    /// Short, user-facing failure summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Underlying failure detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            error: None,
            message: None,
        }
    }

    /// Attach a list total.
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }
}

impl ApiEnvelope<()> {
    /// Failed response with a summary and optional detail.
    pub fn failure(error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            total: None,
            error: Some(error.into()),
            message,
        }
    }
}
