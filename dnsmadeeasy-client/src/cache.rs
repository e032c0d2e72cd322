//! `DomainId` to `DomainName` cache.
//!
//! Record payloads only carry the owning domain's id and a relative name, so
//! turning them into absolute names needs the domain name. The cache is filled
//! as a side effect of every domain listing or lookup and refreshed with a
//! full listing on a miss.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::DomainName;
use crate::domains::DomainSummary;
use crate::error::{ClientError, Result};
use crate::ids::DomainId;

/// Something that can list every domain visible to the account.
#[async_trait]
pub trait DomainSource: Send + Sync {
    /// Lists all domains. Implementations may update the cache while doing so.
    async fn all_domains(&self, cancel: &CancellationToken) -> Result<Vec<DomainSummary>>;
}

#[derive(Debug, Default)]
pub struct DomainCache {
    names: DashMap<DomainId, DomainName>,
    refresh: Mutex<()>,
}

impl DomainCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: DomainId) -> Option<DomainName> {
        self.names.get(&id).map(|entry| entry.value().clone())
    }

    pub fn set(&self, id: DomainId, name: DomainName) {
        self.names.insert(id, name);
    }

    pub fn remove(&self, id: DomainId) {
        self.names.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the cached name, refreshing the whole cache from `source` on a
    /// miss.
    ///
    /// Concurrent misses share one refresh. An id that is still unknown after
    /// the refresh is a [`ClientError::Consistency`] failure.
    pub async fn ensure_and_get(
        &self,
        id: DomainId,
        source: &dyn DomainSource,
        cancel: &CancellationToken,
    ) -> Result<DomainName> {
        if let Some(name) = self.get(id) {
            return Ok(name);
        }

        let _guard = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ClientError::Cancelled),
            guard = self.refresh.lock() => guard,
        };

        // Another caller may have refreshed while we waited.
        if let Some(name) = self.get(id) {
            return Ok(name);
        }

        log::debug!("[dnsmadeeasy] Domain {id} not cached, refreshing domain list");
        for summary in source.all_domains(cancel).await? {
            self.set(summary.id, summary.name);
        }

        self.get(id).ok_or_else(|| {
            log::error!("[dnsmadeeasy] Domain {id} missing after refresh");
            ClientError::Consistency {
                detail: "DNSMadeEasy returned a DomainId that does not correspond to a domain that the API exposes".to_string(),
            }
        })
    }
}
