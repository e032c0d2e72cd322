//! # dnsmadeeasy-client
//!
//! An async, strongly typed client for the
//! [DNSMadeEasy](https://dnsmadeeasy.com/) V2.0 REST API.
//!
//! ## Features
//!
//! - Validated [`DomainName`] values with a label algebra
//!   (`is_subdomain_of`, `with_subdomain`, `without_parent`, ...).
//! - HMAC-SHA1 request signing.
//! - Automatic retries with decorrelated jitter when the API rate limit is hit.
//! - Server errors classified into [`ClientError`] variants.
//! - Paged listings exposed as lazy streams, fetching up to
//!   [`PAGE_CONCURRENCY`] pages at once.
//! - A shared `DomainId -> DomainName` cache used to turn the relative
//!   record names the API returns into absolute ones.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls. Recommended for cross-compilation and Android targets.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dnsmadeeasy_client::{CancellationToken, DnsMadeEasyClient, DomainName};
//! use futures::TryStreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DnsMadeEasyClient::builder("api-key", "secret-key")
//!         .sandbox(true)
//!         .build()?;
//!     let cancel = CancellationToken::new();
//!
//!     let domain = client
//!         .get_domain_by_name(&DomainName::parse("example.com")?, &cancel)
//!         .await?;
//!
//!     let mut records = client.list_records(domain.id, &cancel);
//!     while let Some(record) = records.try_next().await? {
//!         println!("{} {}", record.name, record.record_type());
//!     }
//!
//!     println!("{:?} requests left", client.requests_remaining());
//!     Ok(())
//! }
//! ```
//!
//! ## Batching Record Changes
//!
//! ```rust,no_run
//! # use dnsmadeeasy_client::*;
//! # async fn example(client: DnsMadeEasyClient, domain: DomainId) -> Result<()> {
//! let cancel = CancellationToken::new();
//! let batch = client
//!     .create_record_batch(domain, &cancel)
//!     .await?
//!     .create_txt_record(
//!         &DomainName::parse("_verify.example.com")?,
//!         "token",
//!         TimeToLive::from_secs(300),
//!         GtdLocation::Default,
//!     )?;
//! client.put_records(&batch, &cancel).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, ClientError>`](ClientError). Only rate
//! limiting is retried; [`ClientError::is_expected`] tells routine failures
//! (bad input, missing resources, server-reported errors) apart from broken
//! invariants.

mod batch;
mod cache;
mod client;
mod config;
mod domain;
mod domains;
mod error;
mod http;
mod ids;
mod pagination;
mod records;
mod retry;
mod types;
mod utils;

#[cfg(test)]
mod test_utils;

// Re-export error types
pub use error::{ClientError, Result};

pub use client::{DnsMadeEasyClient, DnsMadeEasyClientBuilder};
pub use config::{ClientConfig, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};

pub use domain::{
    DomainName, DomainNameError, Labels, MAX_LABEL_LENGTH, MAX_LENGTH, Parents, ThisAndParents,
};

pub use batch::{ARecordOptions, RecordBatch, RecordUpdate};
pub use cache::{DomainCache, DomainSource};
pub use domains::{Domain, DomainSummary, DomainUpdate};
pub use ids::{
    DnsRecordId, DomainId, FolderId, MxLevel, Port, Priority, SoaId, TemplateId, TimeToLive,
    TransferAclId, VanityId, Weight,
};
pub use pagination::PAGE_CONCURRENCY;
pub use records::{ANameTarget, DnsRecord, RecordData, RecordTarget};
pub use types::{GtdLocation, NameServer, RecordSource, RecordType, RedirectType};

// Transport layers, for callers that assemble their own pipeline
pub use http::{
    API_KEY_HEADER, ApiRequest, ApiResponse, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, ErrorLayer, HMAC_HEADER, HttpExecutor, REQUEST_DATE_HEADER,
    REQUEST_LIMIT_HEADER, REQUESTS_REMAINING_HEADER, RateLimitLayer, RequestLimits,
    ReqwestExecutor, SigningLayer,
};
pub use retry::{DecorrelatedJitter, Delays, MAX_RETRY_COUNT};

pub use tokio_util::sync::CancellationToken;

// Re-export utils module
pub use utils::datetime;
