//! HMAC-SHA1 request signing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::HeaderValue;
use sha1::Sha1;
use tokio_util::sync::CancellationToken;

use super::{ApiRequest, ApiResponse, HttpExecutor};
use crate::error::{ClientError, Result};
use crate::utils::datetime::format_http_date;
use crate::utils::log_sanitizer::redact_key;

type HmacSha1 = Hmac<Sha1>;

pub const API_KEY_HEADER: &str = "x-dnsme-apikey";
pub const REQUEST_DATE_HEADER: &str = "x-dnsme-requestdate";
pub const HMAC_HEADER: &str = "x-dnsme-hmac";

/// Adds the API key, the request date and its HMAC to every request.
///
/// The keyed MAC is built once; each request signs with its own clone, so
/// concurrent requests never share hasher state.
pub struct SigningLayer<E> {
    inner: E,
    api_key: HeaderValue,
    mac: HmacSha1,
    clock: fn() -> DateTime<Utc>,
}

impl<E> SigningLayer<E> {
    pub fn new(inner: E, api_key: &str, secret_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ClientError::invalid_argument(
                "api_key",
                "API key must be specified",
            ));
        }
        if secret_key.trim().is_empty() {
            return Err(ClientError::invalid_argument(
                "secret_key",
                "Secret key must be specified",
            ));
        }

        let mut api_key_value = HeaderValue::from_str(api_key).map_err(|_| {
            ClientError::invalid_argument("api_key", "API key is not a valid header value")
        })?;
        api_key_value.set_sensitive(true);

        let mac = HmacSha1::new_from_slice(secret_key.as_bytes())
            .map_err(|e| ClientError::invalid_argument("secret_key", e.to_string()))?;

        log::debug!(
            "[dnsmadeeasy] Signing requests with API key {}",
            redact_key(api_key)
        );

        Ok(Self {
            inner,
            api_key: api_key_value,
            mac,
            clock: Utc::now,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Lowercase hex HMAC-SHA1 of `date`.
    pub fn signature(&self, date: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(date.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[async_trait]
impl<E: HttpExecutor> HttpExecutor for SigningLayer<E> {
    async fn execute(
        &self,
        mut request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        let date = format_http_date((self.clock)());
        let date_value =
            HeaderValue::from_str(&date).map_err(|e| ClientError::SerializationError {
                detail: format!("Invalid request date header: {e}"),
            })?;
        let hmac_value = HeaderValue::from_str(&self.signature(&date)).map_err(|e| {
            ClientError::SerializationError {
                detail: format!("Invalid signature header: {e}"),
            }
        })?;

        request.headers.insert(API_KEY_HEADER, self.api_key.clone());
        request.headers.insert(REQUEST_DATE_HEADER, date_value);
        request.headers.insert(HMAC_HEADER, hmac_value);

        let mut response = self.inner.execute(request, cancel).await?;
        response.signed_request_date = Some(date);
        Ok(response)
    }
}
