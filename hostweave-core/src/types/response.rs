//! Frontend-facing response types

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Refresh timestamps returned on a successful remote refresh.
///
/// Frontends merge this straight back into the edit form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshData {
    /// Human-readable timestamp (`YYYY-MM-DD HH:MM:SS`)
    pub last_refresh: String,
    /// Epoch milliseconds
    pub last_refresh_ms: i64,
}

/// Response envelope for frontends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Response data (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable error message (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Stable error code (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a success response
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            code: None,
        }
    }

    /// Create a failure response from a core error
    #[must_use]
    pub fn failure(err: &CoreError) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(err.to_string()),
            code: Some(err.code().to_string()),
        }
    }
}

impl<T: Serialize> From<crate::error::CoreResult<T>> for ApiResponse<T> {
    fn from(result: crate::error::CoreResult<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(ref err) => Self::failure(err),
        }
    }
}
