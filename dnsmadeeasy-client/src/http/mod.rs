//! Layered HTTP transport.
//!
//! A request travels `ErrorLayer -> RateLimitLayer -> SigningLayer -> executor`.
//! Each layer is itself an [`HttpExecutor`], so layers compose by wrapping.

mod errors;
mod executor;
mod rate_limit;
mod signing;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

pub use errors::ErrorLayer;
pub use executor::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, ReqwestExecutor};
pub use rate_limit::{
    REQUEST_LIMIT_HEADER, REQUESTS_REMAINING_HEADER, RateLimitLayer, RequestLimits,
};
pub use signing::{API_KEY_HEADER, HMAC_HEADER, REQUEST_DATE_HEADER, SigningLayer};

/// An outgoing API request. Cloned for every retry.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// JSON body text.
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

/// A fully-read API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
    /// The `x-dnsme-requestdate` value the request was signed with.
    pub signed_request_date: Option<String>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            signed_request_date: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Sends one request and returns the complete response.
///
/// Implementations must stop waiting and return
/// [`ClientError::Cancelled`](crate::ClientError::Cancelled) once `cancel`
/// fires.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: ApiRequest, cancel: &CancellationToken)
    -> Result<ApiResponse>;
}

#[async_trait]
impl<T: HttpExecutor + ?Sized> HttpExecutor for Arc<T> {
    async fn execute(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        (**self).execute(request, cancel).await
    }
}

#[async_trait]
impl<T: HttpExecutor + ?Sized> HttpExecutor for &T {
    async fn execute(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        (**self).execute(request, cancel).await
    }
}
