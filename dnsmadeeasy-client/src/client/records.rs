//! Record endpoints.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use crate::batch::{self, ARecordOptions, RecordBatch};
use crate::domain::DomainName;
use crate::error::{ClientError, Result};
use crate::ids::{DnsRecordId, DomainId, TimeToLive};
use crate::pagination;
use crate::records::DnsRecord;
use crate::types::{GtdLocation, RecordType};

use super::DnsMadeEasyClient;

fn records_path(domain: DomainId) -> String {
    format!("dns/managed/{domain}/records")
}

impl DnsMadeEasyClient {
    /// Streams every record of `domain`, with absolute names.
    pub fn list_records(
        &self,
        domain: DomainId,
        cancel: &CancellationToken,
    ) -> BoxStream<'static, Result<DnsRecord>> {
        self.query_records(domain, None, None, cancel)
    }

    /// Streams the records of `domain` owned by `name`.
    pub fn list_records_named(
        &self,
        domain: DomainId,
        name: &DomainName,
        cancel: &CancellationToken,
    ) -> BoxStream<'static, Result<DnsRecord>> {
        self.query_records(domain, Some(name.clone()), None, cancel)
    }

    /// Streams the records of `domain` of one type.
    ///
    /// A record of another type in the response fails the stream with
    /// [`ClientError::ParseError`].
    pub fn list_records_of_type(
        &self,
        domain: DomainId,
        record_type: RecordType,
        cancel: &CancellationToken,
    ) -> BoxStream<'static, Result<DnsRecord>> {
        self.query_records(domain, None, Some(record_type), cancel)
    }

    pub fn list_records_named_of_type(
        &self,
        domain: DomainId,
        name: &DomainName,
        record_type: RecordType,
        cancel: &CancellationToken,
    ) -> BoxStream<'static, Result<DnsRecord>> {
        self.query_records(domain, Some(name.clone()), Some(record_type), cancel)
    }

    fn query_records(
        &self,
        domain: DomainId,
        name: Option<DomainName>,
        record_type: Option<RecordType>,
        cancel: &CancellationToken,
    ) -> BoxStream<'static, Result<DnsRecord>> {
        let client = self.clone();
        let query_cancel = cancel.clone();
        let raw = stream::once(async move {
            let mut query = Vec::new();
            if let Some(name) = name {
                let parent = client.domain_name(domain, &query_cancel).await?;
                let relative = name.without_parent(&parent)?;
                query.push(format!("recordName={}", urlencoding::encode(&relative)));
            }
            if let Some(record_type) = record_type {
                query.push(format!("type={record_type}"));
            }

            let mut path = records_path(domain);
            if !query.is_empty() {
                path.push('?');
                path.push_str(&query.join("&"));
            }
            Ok::<_, ClientError>(client.paged::<DnsRecord>(&path, &query_cancel))
        })
        .try_flatten();

        let client = self.clone();
        let item_cancel = cancel.clone();
        let records = raw
            .and_then(move |record| {
                let client = client.clone();
                let cancel = item_cancel.clone();
                async move {
                    if record_type.is_some_and(|expected| record.record_type() != expected) {
                        log::error!(
                            "[dnsmadeeasy] Asked for {record_type:?} records, got {}",
                            record.record_type()
                        );
                        return Err(ClientError::ParseError {
                            detail: "DNSMadeEasy returned records of the wrong type".to_string(),
                        });
                    }
                    let parent = client.domain_name(record.parent_domain_id, &cancel).await?;
                    Ok(record.reconcile(&parent)?)
                }
            })
            .boxed();

        pagination::guard(records, cancel.clone())
    }

    pub async fn delete_record(&self, record: &DnsRecord, cancel: &CancellationToken) -> Result<()> {
        self.delete(
            &format!("{}/{}", records_path(record.parent_domain_id), record.id),
            cancel,
        )
        .await
    }

    /// Deletes `records` with one request per owning domain.
    pub async fn delete_records(
        &self,
        records: &[DnsRecord],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut groups: BTreeMap<DomainId, Vec<DnsRecordId>> = BTreeMap::new();
        for record in records {
            groups
                .entry(record.parent_domain_id)
                .or_default()
                .push(record.id);
        }

        for (domain, ids) in groups {
            let query = ids
                .iter()
                .map(|id| format!("ids={id}"))
                .collect::<Vec<_>>()
                .join("&");
            self.delete(&format!("{}?{query}", records_path(domain)), cancel)
                .await?;
        }
        Ok(())
    }

    /// Creates an `A` record. `name` must lie strictly below the domain.
    pub async fn create_a_record(
        &self,
        domain: DomainId,
        name: &DomainName,
        address: Ipv4Addr,
        ttl: TimeToLive,
        options: &ARecordOptions,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let parent = self.domain_name(domain, cancel).await?;
        let body = batch::a_record_body(&parent, name, address, ttl, options)?;
        self.post(&records_path(domain), &body, cancel).await
    }

    /// Creates a `CNAME` record. Targets inside the domain are stored
    /// relative to it.
    pub async fn create_cname_record(
        &self,
        domain: DomainId,
        name: &DomainName,
        target: &DomainName,
        ttl: TimeToLive,
        gtd_location: GtdLocation,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let parent = self.domain_name(domain, cancel).await?;
        let body = batch::cname_record_body(&parent, name, target, ttl, gtd_location)?;
        self.post(&records_path(domain), &body, cancel).await
    }

    pub async fn create_txt_record(
        &self,
        domain: DomainId,
        name: &DomainName,
        value: &str,
        ttl: TimeToLive,
        gtd_location: GtdLocation,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let parent = self.domain_name(domain, cancel).await?;
        let body = batch::txt_record_body(&parent, name, value, ttl, gtd_location)?;
        self.post(&records_path(domain), &body, cancel).await
    }

    /// An empty batch for `domain`, to be filled and sent with
    /// [`put_records`](Self::put_records).
    pub async fn create_record_batch(
        &self,
        domain: DomainId,
        cancel: &CancellationToken,
    ) -> Result<RecordBatch> {
        let name = self.domain_name(domain, cancel).await?;
        Ok(RecordBatch::new(domain, name))
    }

    /// Sends the creates and updates of `batch` concurrently.
    pub async fn put_records(&self, batch: &RecordBatch, cancel: &CancellationToken) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let path = records_path(batch.domain_id());

        let creates = async {
            if batch.creates().is_empty() {
                return Ok(());
            }
            self.post(&format!("{path}/createMulti"), batch.creates(), cancel)
                .await
        };
        let updates = async {
            if batch.updates().is_empty() {
                return Ok(());
            }
            self.put(&format!("{path}/updateMulti"), batch.updates(), cancel)
                .await
        };

        futures::try_join!(creates, updates)?;
        log::info!(
            "[dnsmadeeasy] Sent {} new and {} changed record(s) for {}",
            batch.creates().len(),
            batch.updates().len(),
            batch.domain_name()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::Method;
    use serde_json::{Value, json};

    use super::*;
    use crate::client::tests::client_with;
    use crate::records::RecordData;
    use crate::test_utils::{MockExecutor, json_ok, page_body};

    fn name(text: &str) -> DomainName {
        DomainName::parse(text).unwrap()
    }

    fn record(id: u64, record_type: &str, owner: &str, value: &str) -> Value {
        json!({
            "id": id,
            "type": record_type,
            "name": owner,
            "value": value,
            "source": 1,
            "sourceId": 7,
            "ttl": 300
        })
    }

    fn cached_client(mock: Arc<MockExecutor>) -> DnsMadeEasyClient {
        let client = client_with(mock);
        client.domain_cache().set(DomainId(7), name("example.com"));
        client
    }

    fn body(request: &crate::http::ApiRequest) -> Value {
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn listed_records_are_absolute() {
        let mock = Arc::new(MockExecutor::always(json_ok(
            &page_body(1, 1, &json!([record(1, "CNAME", "www", "web"), record(2, "A", "", "192.0.2.1")])),
            100,
        )));
        let client = cached_client(mock.clone());

        let records: Vec<DnsRecord> = client
            .list_records(DomainId(7), &CancellationToken::new())
            .try_collect()
            .await
            .unwrap();

        assert_eq!(records[0].name, name("www.example.com"));
        let RecordData::CName { target } = &records[0].data else {
            panic!("not a CNAME")
        };
        assert_eq!(target.name(), &name("web.example.com"));
        assert_eq!(records[1].name, name("example.com"));
        assert_eq!(
            mock.requests().await[0].url,
            "https://api.test/V2.0/dns/managed/7/records"
        );
    }

    #[tokio::test]
    async fn unknown_parent_refreshes_the_domain_list() {
        let domains = page_body(
            1,
            1,
            &json!([{"id": 7, "name": "example.com", "updated": 0, "created": 0}]),
        );
        let records = page_body(1, 1, &json!([record(1, "TXT", "txt", "hello")]));
        let mock = Arc::new(MockExecutor::new(move |request| {
            if request.url.ends_with("/records") {
                Ok(json_ok(&records, 100))
            } else {
                Ok(json_ok(&domains, 100))
            }
        }));
        let client = client_with(mock.clone());

        let listed: Vec<DnsRecord> = client
            .list_records(DomainId(7), &CancellationToken::new())
            .try_collect()
            .await
            .unwrap();

        assert_eq!(listed[0].name, name("txt.example.com"));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn named_and_typed_queries() {
        let mock = Arc::new(MockExecutor::always(json_ok(
            &page_body(1, 1, &json!([record(3, "A", "api", "192.0.2.3")])),
            100,
        )));
        let client = cached_client(mock.clone());

        let records: Vec<DnsRecord> = client
            .list_records_named_of_type(
                DomainId(7),
                &name("api.example.com"),
                RecordType::A,
                &CancellationToken::new(),
            )
            .try_collect()
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            mock.requests().await[0].url,
            "https://api.test/V2.0/dns/managed/7/records?recordName=api&type=A"
        );
    }

    #[tokio::test]
    async fn wrong_type_in_typed_listing_fails() {
        let mock = Arc::new(MockExecutor::always(json_ok(
            &page_body(1, 1, &json!([record(3, "TXT", "x", "v"), record(4, "A", "y", "192.0.2.4")])),
            100,
        )));
        let client = cached_client(mock);

        let results: Vec<Result<DnsRecord>> = client
            .list_records_of_type(DomainId(7), RecordType::A, &CancellationToken::new())
            .collect()
            .await;

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(ClientError::ParseError { .. })));
    }

    #[tokio::test]
    async fn name_outside_the_domain_is_rejected() {
        let mock = Arc::new(MockExecutor::always(json_ok("", 100)));
        let client = cached_client(mock.clone());

        let results: Vec<Result<DnsRecord>> = client
            .list_records_named(DomainId(7), &name("other.org"), &CancellationToken::new())
            .collect()
            .await;

        assert!(matches!(results[..], [Err(ClientError::InvalidArgument { .. })]));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn deletes_are_grouped_by_domain() {
        let mock = Arc::new(MockExecutor::always(json_ok("", 100)));
        let client = client_with(mock.clone());
        let mut second: Value = record(12, "A", "b", "192.0.2.2");
        second["sourceId"] = json!(8);
        let records: Vec<DnsRecord> = [
            record(10, "A", "a", "192.0.2.1"),
            second,
            record(11, "A", "c", "192.0.2.3"),
        ]
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap())
        .collect();

        client
            .delete_records(&records, &CancellationToken::new())
            .await
            .unwrap();

        let urls: Vec<String> = mock.requests().await.into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://api.test/V2.0/dns/managed/7/records?ids=10&ids=11",
                "https://api.test/V2.0/dns/managed/8/records?ids=12",
            ]
        );
    }

    #[tokio::test]
    async fn delete_single_record() {
        let mock = Arc::new(MockExecutor::always(json_ok("", 100)));
        let client = client_with(mock.clone());
        let record: DnsRecord = serde_json::from_value(record(10, "A", "a", "192.0.2.1")).unwrap();

        client
            .delete_record(&record, &CancellationToken::new())
            .await
            .unwrap();

        let request = &mock.requests().await[0];
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.url, "https://api.test/V2.0/dns/managed/7/records/10");
    }

    #[tokio::test]
    async fn cname_targets_in_zone_are_relative() {
        let mock = Arc::new(MockExecutor::always(json_ok("", 100)));
        let client = cached_client(mock.clone());
        let cancel = CancellationToken::new();

        client
            .create_cname_record(
                DomainId(7),
                &name("www.example.com"),
                &name("web.example.com"),
                TimeToLive(300),
                GtdLocation::Default,
                &cancel,
            )
            .await
            .unwrap();
        client
            .create_cname_record(
                DomainId(7),
                &name("cdn.example.com"),
                &name("edge.example.net"),
                TimeToLive(300),
                GtdLocation::Default,
                &cancel,
            )
            .await
            .unwrap();

        let requests = mock.requests().await;
        assert_eq!(requests[0].url, "https://api.test/V2.0/dns/managed/7/records");
        assert_eq!(
            body(&requests[0]),
            json!({"type": "CNAME", "name": "www", "value": "web", "ttl": 300, "gtdLocation": "DEFAULT"})
        );
        assert_eq!(body(&requests[1])["value"], "edge.example.net.");
    }

    #[tokio::test]
    async fn a_record_carries_dynamic_dns_flags() {
        let mock = Arc::new(MockExecutor::always(json_ok("", 100)));
        let client = cached_client(mock.clone());
        let options = ARecordOptions {
            dynamic_dns_password: Some("pw".into()),
            ..ARecordOptions::default()
        };

        client
            .create_a_record(
                DomainId(7),
                &name("home.example.com"),
                Ipv4Addr::new(192, 0, 2, 9),
                TimeToLive(60),
                &options,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let sent = body(&mock.requests().await[0]);
        assert_eq!(sent["dynamicDns"], true);
        assert_eq!(sent["password"], "pw");
        assert_eq!(sent["value"], "192.0.2.9");
    }

    #[tokio::test]
    async fn record_outside_the_domain_is_not_sent() {
        let mock = Arc::new(MockExecutor::always(json_ok("", 100)));
        let client = cached_client(mock.clone());

        let result = client
            .create_txt_record(
                DomainId(7),
                &name("example.com"),
                "hello",
                TimeToLive(60),
                GtdLocation::Default,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(ClientError::InvalidArgument { .. })));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn batch_sends_creates_and_updates() {
        let mock = Arc::new(MockExecutor::always(json_ok("", 100)));
        let client = cached_client(mock.clone());
        let cancel = CancellationToken::new();

        let batch = client
            .create_record_batch(DomainId(7), &cancel)
            .await
            .unwrap()
            .create_txt_record(&name("a.example.com"), "one", TimeToLive(60), GtdLocation::Default)
            .unwrap();
        let existing: DnsRecord = serde_json::from_value::<DnsRecord>(record(5, "TXT", "b", "old"))
            .unwrap()
            .reconcile(&name("example.com"))
            .unwrap();
        let batch = batch
            .update_txt_record(
                &existing,
                &crate::batch::RecordUpdate {
                    value: Some("new".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        client.put_records(&batch, &cancel).await.unwrap();

        let mut requests = mock.requests().await;
        requests.sort_by_key(|r| r.url.clone());
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::POST);
        assert!(requests[0].url.ends_with("/dns/managed/7/records/createMulti"));
        assert_eq!(requests[1].method, Method::PUT);
        assert!(requests[1].url.ends_with("/dns/managed/7/records/updateMulti"));
        assert_eq!(body(&requests[1])[0]["id"], 5);
    }

    #[tokio::test]
    async fn empty_batch_sends_nothing() {
        let mock = Arc::new(MockExecutor::always(json_ok("", 100)));
        let client = cached_client(mock.clone());
        let cancel = CancellationToken::new();

        let batch = client.create_record_batch(DomainId(7), &cancel).await.unwrap();
        client.put_records(&batch, &cancel).await.unwrap();

        assert_eq!(mock.call_count(), 0);
    }
}
