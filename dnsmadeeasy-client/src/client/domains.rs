//! Managed domain endpoints.

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::cache::DomainSource;
use crate::domain::DomainName;
use crate::domains::{BulkDomainUpdate, Domain, DomainSummary, DomainUpdate};
use crate::error::{ClientError, Result};
use crate::ids::DomainId;

use super::DnsMadeEasyClient;

const DOMAINS_PATH: &str = "dns/managed";

impl DnsMadeEasyClient {
    /// Streams every managed domain. Each one is recorded in the domain cache.
    pub fn list_domains(&self, cancel: &CancellationToken) -> BoxStream<'static, Result<DomainSummary>> {
        let client = self.clone();
        self.paged::<DomainSummary>(DOMAINS_PATH, cancel)
            .inspect_ok(move |domain| client.inner.cache.set(domain.id, domain.name.clone()))
            .boxed()
    }

    pub async fn get_domain(&self, id: DomainId, cancel: &CancellationToken) -> Result<Domain> {
        let domain: Domain = self
            .get_single(&format!("{DOMAINS_PATH}/{id}"), cancel)
            .await?;
        self.inner.cache.set(domain.id, domain.name.clone());
        Ok(domain)
    }

    pub async fn get_domain_by_name(
        &self,
        name: &DomainName,
        cancel: &CancellationToken,
    ) -> Result<Domain> {
        let path = format!(
            "{DOMAINS_PATH}/name?domainname={}",
            urlencoding::encode(name.as_str())
        );
        let domain: Domain = self.get_single(&path, cancel).await?;
        self.inner.cache.set(domain.id, domain.name.clone());
        Ok(domain)
    }

    /// Creates a domain, then applies `settings` to it if any are set.
    ///
    /// `settings.name` must be unset.
    pub async fn create_domain(
        &self,
        name: &DomainName,
        settings: &DomainUpdate,
        cancel: &CancellationToken,
    ) -> Result<DomainId> {
        settings.reject_rename()?;

        let created: Domain = self
            .post_json(DOMAINS_PATH, &json!({ "name": name }), cancel)
            .await?;
        log::info!("[dnsmadeeasy] Created domain {} ({})", created.name, created.id);
        self.inner.cache.set(created.id, created.name.clone());

        if !settings.is_empty() {
            self.update_domain(created.id, settings, cancel).await?;
        }
        Ok(created.id)
    }

    /// Creates several domains at once and returns their ids in input order.
    pub async fn create_domains(
        &self,
        names: &[DomainName],
        settings: &DomainUpdate,
        cancel: &CancellationToken,
    ) -> Result<Vec<DomainId>> {
        settings.reject_rename()?;
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<DomainId> = self
            .post_json(DOMAINS_PATH, &json!({ "names": names }), cancel)
            .await?;
        if ids.len() != names.len() {
            return Err(ClientError::Consistency {
                detail: format!(
                    "Requested {} domains but DNSMadeEasy returned {} ids",
                    names.len(),
                    ids.len()
                ),
            });
        }
        for (id, name) in ids.iter().zip(names) {
            self.inner.cache.set(*id, name.clone());
        }

        if !settings.is_empty() {
            self.update_domains(&ids, settings, cancel).await?;
        }
        Ok(ids)
    }

    /// Applies `update` to one domain. This is the only way to rename.
    pub async fn update_domain(
        &self,
        id: DomainId,
        update: &DomainUpdate,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.put(&format!("{DOMAINS_PATH}/{id}"), update, cancel)
            .await?;
        if let Some(name) = &update.name {
            self.inner.cache.set(id, name.clone());
        }
        Ok(())
    }

    pub async fn update_domains(
        &self,
        ids: &[DomainId],
        update: &DomainUpdate,
        cancel: &CancellationToken,
    ) -> Result<()> {
        update.reject_rename()?;
        if ids.is_empty() {
            return Ok(());
        }
        let body = BulkDomainUpdate {
            ids: Some(ids),
            names: None,
            update,
        };
        self.put(DOMAINS_PATH, &body, cancel).await
    }

    pub async fn update_domains_by_name(
        &self,
        names: &[DomainName],
        update: &DomainUpdate,
        cancel: &CancellationToken,
    ) -> Result<()> {
        update.reject_rename()?;
        if names.is_empty() {
            return Ok(());
        }
        let body = BulkDomainUpdate {
            ids: None,
            names: Some(names),
            update,
        };
        self.put(DOMAINS_PATH, &body, cancel).await
    }

    pub async fn delete_domain(&self, id: DomainId, cancel: &CancellationToken) -> Result<()> {
        self.delete(&format!("{DOMAINS_PATH}/{id}"), cancel).await?;
        self.inner.cache.remove(id);
        Ok(())
    }

    pub async fn delete_domains(&self, ids: &[DomainId], cancel: &CancellationToken) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.delete_with_body(DOMAINS_PATH, ids, cancel).await?;
        for id in ids {
            self.inner.cache.remove(*id);
        }
        Ok(())
    }

    /// The name of domain `id`, refreshing the cache from the listing on a miss.
    pub async fn domain_name(&self, id: DomainId, cancel: &CancellationToken) -> Result<DomainName> {
        self.inner.cache.ensure_and_get(id, self, cancel).await
    }
}

#[async_trait]
impl DomainSource for DnsMadeEasyClient {
    async fn all_domains(&self, cancel: &CancellationToken) -> Result<Vec<DomainSummary>> {
        self.list_domains(cancel).try_collect().await
    }
}
