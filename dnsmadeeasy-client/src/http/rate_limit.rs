//! Rate-limit bookkeeping and retry.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::{ApiRequest, ApiResponse, HttpExecutor};
use crate::error::{ClientError, Result};
use crate::retry::DecorrelatedJitter;

pub const REQUEST_LIMIT_HEADER: &str = "x-dnsme-requestlimit";
pub const REQUESTS_REMAINING_HEADER: &str = "x-dnsme-requestsremaining";

/// Rate-limit counters reported by the most recent response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLimits {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
}

/// Retries requests the API rejected for exceeding the rate limit.
///
/// DNSMadeEasy signals an exhausted budget with `400 Bad Request` and
/// `x-dnsme-requestsRemaining: 0`; any other outcome is returned unchanged.
/// The counters are last-write-wins across concurrent requests.
pub struct RateLimitLayer<E> {
    inner: E,
    jitter: DecorrelatedJitter,
    limits: RwLock<RequestLimits>,
}

impl<E> RateLimitLayer<E> {
    pub fn new(inner: E, jitter: DecorrelatedJitter) -> Self {
        Self {
            inner,
            jitter,
            limits: RwLock::default(),
        }
    }

    pub fn limits(&self) -> RequestLimits {
        *self.limits.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, limits: RequestLimits) {
        *self.limits.write().unwrap_or_else(PoisonError::into_inner) = limits;
    }
}

fn numeric_header(response: &ApiResponse, name: &str) -> Option<u32> {
    let raw = response.header(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("[dnsmadeeasy] Ignoring malformed {name} header: {raw}");
            None
        }
    }
}

fn is_rate_limited(response: &ApiResponse, limits: RequestLimits) -> bool {
    response.status == StatusCode::BAD_REQUEST && !limits.remaining.is_some_and(|r| r > 0)
}

#[async_trait]
impl<E: HttpExecutor> HttpExecutor for RateLimitLayer<E> {
    async fn execute(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        for (attempt, delay) in self.jitter.delays().enumerate() {
            if !delay.is_zero() {
                log::warn!(
                    "[dnsmadeeasy] Rate limited (attempt {}/{}), retrying in {:.1}s",
                    attempt,
                    self.jitter.retry_count(),
                    delay.as_secs_f32()
                );
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(ClientError::Cancelled),
                    () = tokio::time::sleep(delay) => {}
                }
            }

            if cancel.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            let response = self.inner.execute(request.clone(), cancel).await?;
            let limits = RequestLimits {
                limit: numeric_header(&response, REQUEST_LIMIT_HEADER),
                remaining: numeric_header(&response, REQUESTS_REMAINING_HEADER),
            };
            self.store(limits);

            if !is_rate_limited(&response, limits) {
                return Ok(response);
            }
        }

        let retries = self.jitter.retry_count();
        let detail = if retries > 0 {
            format!("Rate limit has been exceeded, despite {retries} retries.")
        } else {
            "Rate limit has been exceeded.".to_string()
        };
        log::warn!("[dnsmadeeasy] {detail}");
        Err(ClientError::RateLimited { retries, detail })
    }
}
