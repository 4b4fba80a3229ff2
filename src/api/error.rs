//! API failure classification
//!
//! The provider reports failures as a JSON body of the form
//! `{"error": {"errors": [{"reason": "..."}], ...}}`. Only the first reason
//! is consulted.

use serde::Deserialize;
use thiserror::Error;

/// Reasons the provider uses when the daily quota is spent
const QUOTA_REASONS: &[&str] = &["dailyLimitExceeded", "quotaExceeded"];

/// Reason the provider uses for videos with comments turned off
const COMMENTS_DISABLED_REASON: &str = "commentsDisabled";

/// Classified failure of a single API call
#[derive(Debug, Error)]
pub enum ApiError {
    /// Daily quota exhausted; recoverable by waiting
    #[error("Quota exhausted ({reason})")]
    RateLimited { reason: String },

    /// The video has comments turned off
    #[error("Comments are disabled for this video")]
    CommentsDisabled,

    /// Anything else: transport failures, bad requests, unparseable bodies
    #[error("Request to {endpoint} failed: {message}")]
    Unknown { endpoint: String, message: String },

    /// The harvest was cancelled while waiting for quota to reset
    #[error("Cancelled while waiting for quota to reset")]
    Cancelled,
}

impl ApiError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns true for failures the harvester never skips past
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// Extracts `error.errors[0].reason` from a provider error body
pub fn error_reason(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()?
        .error
        .errors
        .into_iter()
        .next()?
        .reason
}

/// Classifies a failed response into an [`ApiError`]
///
/// # Arguments
///
/// * `endpoint` - Endpoint the request was sent to (for the error message)
/// * `status` - HTTP status code of the response
/// * `body` - Raw response body
pub fn classify_error(endpoint: &str, status: u16, body: &str) -> ApiError {
    match error_reason(body) {
        Some(reason) if QUOTA_REASONS.contains(&reason.as_str()) => {
            ApiError::RateLimited { reason }
        }
        Some(reason) if reason == COMMENTS_DISABLED_REASON => ApiError::CommentsDisabled,
        Some(reason) => ApiError::Unknown {
            endpoint: endpoint.to_string(),
            message: format!("HTTP {}: {}", status, reason),
        },
        None => ApiError::Unknown {
            endpoint: endpoint.to_string(),
            message: format!("HTTP {}: unparseable error body", status),
        },
    }
}
