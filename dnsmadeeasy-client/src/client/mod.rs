//! DNSMadeEasy API client.

mod domains;
mod http;
mod records;

use std::sync::Arc;
use std::time::Duration;

use crate::cache::DomainCache;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{
    ErrorLayer, HttpExecutor, RateLimitLayer, ReqwestExecutor, RequestLimits, SigningLayer,
};
use crate::retry::DecorrelatedJitter;

type Pipeline = ErrorLayer<RateLimitLayer<SigningLayer<Arc<dyn HttpExecutor>>>>;

struct Inner {
    base_url: String,
    pipeline: Pipeline,
    cache: DomainCache,
}

/// Client for the DNSMadeEasy V2.0 REST API.
///
/// Cloning is cheap; clones share the connection pool, the rate-limit
/// counters and the domain name cache.
#[derive(Clone)]
pub struct DnsMadeEasyClient {
    inner: Arc<Inner>,
}

impl DnsMadeEasyClient {
    pub fn builder(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> DnsMadeEasyClientBuilder {
        DnsMadeEasyClientBuilder::new(ClientConfig::new(api_key, secret_key))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        DnsMadeEasyClientBuilder::new(config.clone()).build()
    }

    /// Request limit reported by the most recent response, if any.
    pub fn request_limit(&self) -> Option<u32> {
        self.request_limits().limit
    }

    /// Requests left in the current window, as of the most recent response.
    pub fn requests_remaining(&self) -> Option<u32> {
        self.request_limits().remaining
    }

    pub fn request_limits(&self) -> RequestLimits {
        self.inner.pipeline.inner().limits()
    }

    /// Names of the domains this client has seen, keyed by id.
    pub fn domain_cache(&self) -> &DomainCache {
        &self.inner.cache
    }
}

impl std::fmt::Debug for DnsMadeEasyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsMadeEasyClient")
            .field("base_url", &self.inner.base_url)
            .field("limits", &self.request_limits())
            .field("cached_domains", &self.inner.cache.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`DnsMadeEasyClient`].
pub struct DnsMadeEasyClientBuilder {
    config: ClientConfig,
    median_first_retry_delay: Duration,
    base_url: Option<String>,
    executor: Option<Arc<dyn HttpExecutor>>,
}

impl DnsMadeEasyClientBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            median_first_retry_delay: Duration::from_secs(config.median_first_retry_delay_secs),
            config,
            base_url: None,
            executor: None,
        }
    }

    /// Use the sandbox environment.
    #[must_use]
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    #[must_use]
    pub fn retry_on_rate_limit(mut self, retry: bool) -> Self {
        self.config.retry_on_rate_limit = retry;
        self
    }

    #[must_use]
    pub fn median_first_retry_delay(mut self, delay: Duration) -> Self {
        self.median_first_retry_delay = delay;
        self
    }

    #[must_use]
    pub fn retry_count(mut self, count: u32) -> Self {
        self.config.retry_count = count;
        self
    }

    /// Total time allowed for one HTTP exchange.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs();
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout_secs = timeout.as_secs();
        self
    }

    /// Overrides the API root, e.g. to point at a proxy. Must end with `/`.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sends requests through `executor` instead of a reqwest client.
    #[must_use]
    pub fn executor(mut self, executor: Arc<dyn HttpExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn build(self) -> Result<DnsMadeEasyClient> {
        let jitter = if self.config.retry_on_rate_limit {
            DecorrelatedJitter::new(self.median_first_retry_delay, self.config.retry_count)?
        } else {
            DecorrelatedJitter::disabled()
        };

        let executor: Arc<dyn HttpExecutor> = match self.executor {
            Some(executor) => executor,
            None => Arc::new(ReqwestExecutor::new(
                self.config.connect_timeout(),
                self.config.timeout(),
            )?),
        };

        let signing = SigningLayer::new(executor, &self.config.api_key, &self.config.secret_key)?;
        let pipeline = ErrorLayer::new(RateLimitLayer::new(signing, jitter));

        let base_url = self
            .base_url
            .unwrap_or_else(|| self.config.base_url().to_string());

        log::debug!(
            "[dnsmadeeasy] Client ready for {base_url} ({} retries)",
            jitter.retry_count()
        );

        Ok(DnsMadeEasyClient {
            inner: Arc::new(Inner {
                base_url,
                pipeline,
                cache: DomainCache::new(),
            }),
        })
    }
}
