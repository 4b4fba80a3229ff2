//! API access layer
//!
//! This module contains everything that touches the wire:
//! - Request descriptors for the listing endpoints
//! - The [`RequestExecutor`] seam the harvest engine talks to
//! - Classification of provider error bodies
//! - A reqwest-backed executor for the real service

mod error;
mod http;
mod request;

pub use error::{classify_error, error_reason, ApiError};
pub use http::{build_http_client, HttpExecutor};
pub use request::{Endpoint, RequestDescriptor, PAGE_TOKEN_PARAM, PART_PARAM};

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// One resource object from a listing response, left undecoded
pub type RawItem = serde_json::Value;

/// One decoded page of a listing response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPage {
    #[serde(default)]
    pub items: Vec<RawItem>,

    /// Cursor for the following page; absent on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl RawPage {
    /// Returns the continuation cursor, treating an empty token as absent
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Issues a single API call
///
/// Implementations perform exactly one attempt; retry policy lives in
/// [`crate::harvest::RetryingExecutor`].
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawPage, ApiError>;
}

#[async_trait]
impl<T: RequestExecutor + ?Sized> RequestExecutor for Arc<T> {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawPage, ApiError> {
        (**self).execute(request).await
    }
}
