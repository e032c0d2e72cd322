//! Record creation bodies and multi-record batches.

use std::net::Ipv4Addr;

use serde::Serialize;

use crate::domain::DomainName;
use crate::error::{ClientError, Result};
use crate::ids::{DnsRecordId, DomainId, TimeToLive};
use crate::records::{DnsRecord, RecordData};
use crate::types::{GtdLocation, RecordType};

/// Options for new `A` records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ARecordOptions {
    /// Enables dynamic DNS with this password.
    pub dynamic_dns_password: Option<String>,
    pub gtd_location: GtdLocation,
    pub monitor: bool,
    pub failover: bool,
}

/// Changes to an existing record. Unset fields keep the record's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate<V> {
    pub name: Option<DomainName>,
    pub value: Option<V>,
    pub ttl: Option<TimeToLive>,
    pub gtd_location: Option<GtdLocation>,
}

impl<V> Default for RecordUpdate<V> {
    fn default() -> Self {
        Self {
            name: None,
            value: None,
            ttl: None,
            gtd_location: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct AFlags {
    dynamic_dns: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    monitor: bool,
    failover: bool,
}

/// JSON body of a record create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<DnsRecordId>,
    #[serde(rename = "type")]
    record_type: RecordType,
    name: String,
    value: String,
    ttl: TimeToLive,
    #[serde(skip_serializing_if = "Option::is_none")]
    gtd_location: Option<GtdLocation>,
    #[serde(flatten)]
    a_flags: Option<AFlags>,
}

/// `name` relative to `parent`, which must strictly contain it.
pub(crate) fn relative_name(name: &DomainName, parent: &DomainName) -> Result<String> {
    if !name.is_subdomain_of(parent) {
        return Err(ClientError::invalid_argument(
            "name",
            format!("The specified domain `{name}` is not a subdomain of the parent `{parent}`"),
        ));
    }
    Ok(name.without_parent(parent)?)
}

/// In-zone targets are sent relative, everything else rooted.
fn target_value(target: &DomainName, parent: &DomainName) -> Result<String> {
    if target.is_subdomain_of(parent) {
        Ok(target.without_parent(parent)?)
    } else {
        Ok(format!("{}.", target.as_str().trim_end_matches('.')))
    }
}

fn txt_value(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ClientError::invalid_argument(
            "value",
            "TXT record value cannot be empty",
        ));
    }
    Ok(())
}

pub(crate) fn a_record_body(
    parent: &DomainName,
    name: &DomainName,
    address: Ipv4Addr,
    ttl: TimeToLive,
    options: &ARecordOptions,
) -> Result<RecordBody> {
    Ok(RecordBody {
        id: None,
        record_type: RecordType::A,
        name: relative_name(name, parent)?,
        value: address.to_string(),
        ttl,
        gtd_location: Some(options.gtd_location),
        a_flags: Some(AFlags {
            dynamic_dns: options.dynamic_dns_password.is_some(),
            password: options.dynamic_dns_password.clone(),
            monitor: options.monitor,
            failover: options.failover,
        }),
    })
}

pub(crate) fn cname_record_body(
    parent: &DomainName,
    name: &DomainName,
    target: &DomainName,
    ttl: TimeToLive,
    gtd_location: GtdLocation,
) -> Result<RecordBody> {
    Ok(RecordBody {
        id: None,
        record_type: RecordType::CName,
        name: relative_name(name, parent)?,
        value: target_value(target, parent)?,
        ttl,
        gtd_location: Some(gtd_location),
        a_flags: None,
    })
}

pub(crate) fn txt_record_body(
    parent: &DomainName,
    name: &DomainName,
    value: &str,
    ttl: TimeToLive,
    gtd_location: GtdLocation,
) -> Result<RecordBody> {
    txt_value(value)?;
    Ok(RecordBody {
        id: None,
        record_type: RecordType::Txt,
        name: relative_name(name, parent)?,
        value: value.to_string(),
        ttl,
        gtd_location: Some(gtd_location),
        a_flags: None,
    })
}

/// Record creates and updates for one domain, sent together by
/// `DnsMadeEasyClient::put_records`.
///
/// Every method validates its input and returns a new batch; the original is
/// left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBatch {
    domain_id: DomainId,
    domain_name: DomainName,
    creates: Vec<RecordBody>,
    updates: Vec<RecordBody>,
}

impl RecordBatch {
    pub(crate) fn new(domain_id: DomainId, domain_name: DomainName) -> Self {
        Self {
            domain_id,
            domain_name,
            creates: Vec::new(),
            updates: Vec::new(),
        }
    }

    pub fn domain_id(&self) -> DomainId {
        self.domain_id
    }

    pub fn domain_name(&self) -> &DomainName {
        &self.domain_name
    }

    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty()
    }

    pub(crate) fn creates(&self) -> &[RecordBody] {
        &self.creates
    }

    pub(crate) fn updates(&self) -> &[RecordBody] {
        &self.updates
    }

    fn with_create(&self, body: RecordBody) -> Self {
        let mut next = self.clone();
        next.creates.push(body);
        next
    }

    fn with_update(&self, body: RecordBody) -> Self {
        let mut next = self.clone();
        next.updates.push(body);
        next
    }

    pub fn create_a_record(
        &self,
        name: &DomainName,
        address: Ipv4Addr,
        ttl: TimeToLive,
        options: &ARecordOptions,
    ) -> Result<Self> {
        let body = a_record_body(&self.domain_name, name, address, ttl, options)?;
        Ok(self.with_create(body))
    }

    pub fn create_cname_record(
        &self,
        name: &DomainName,
        target: &DomainName,
        ttl: TimeToLive,
        gtd_location: GtdLocation,
    ) -> Result<Self> {
        let body = cname_record_body(&self.domain_name, name, target, ttl, gtd_location)?;
        Ok(self.with_create(body))
    }

    pub fn create_txt_record(
        &self,
        name: &DomainName,
        value: &str,
        ttl: TimeToLive,
        gtd_location: GtdLocation,
    ) -> Result<Self> {
        let body = txt_record_body(&self.domain_name, name, value, ttl, gtd_location)?;
        Ok(self.with_create(body))
    }

    fn wrong_type(record: &DnsRecord, expected: RecordType) -> ClientError {
        ClientError::invalid_argument(
            "record",
            format!("expected a {expected} record, got {}", record.record_type()),
        )
    }

    fn check_domain(&self, record: &DnsRecord) -> Result<()> {
        if record.parent_domain_id != self.domain_id {
            return Err(ClientError::invalid_argument(
                "record",
                format!(
                    "The specified {} record does not belong to this domain",
                    record.record_type()
                ),
            ));
        }
        Ok(())
    }

    fn updated_name<V>(&self, record: &DnsRecord, update: &RecordUpdate<V>) -> Result<String> {
        relative_name(update.name.as_ref().unwrap_or(&record.name), &self.domain_name)
    }

    pub fn update_a_record(
        &self,
        record: &DnsRecord,
        update: &RecordUpdate<Ipv4Addr>,
    ) -> Result<Self> {
        let RecordData::A {
            address,
            dynamic_dns,
            dynamic_dns_password,
            monitor,
            failover,
            ..
        } = &record.data
        else {
            return Err(Self::wrong_type(record, RecordType::A));
        };
        self.check_domain(record)?;

        let body = RecordBody {
            id: Some(record.id),
            record_type: RecordType::A,
            name: self.updated_name(record, update)?,
            value: update.value.unwrap_or(*address).to_string(),
            ttl: update.ttl.unwrap_or(record.ttl),
            gtd_location: update.gtd_location.or(record.gtd_location),
            a_flags: Some(AFlags {
                dynamic_dns: *dynamic_dns,
                password: dynamic_dns_password.clone(),
                monitor: *monitor,
                failover: *failover,
            }),
        };
        Ok(self.with_update(body))
    }

    pub fn update_cname_record(
        &self,
        record: &DnsRecord,
        update: &RecordUpdate<DomainName>,
    ) -> Result<Self> {
        let RecordData::CName { target } = &record.data else {
            return Err(Self::wrong_type(record, RecordType::CName));
        };
        self.check_domain(record)?;

        let body = RecordBody {
            id: Some(record.id),
            record_type: RecordType::CName,
            name: self.updated_name(record, update)?,
            value: target_value(update.value.as_ref().unwrap_or(target.name()), &self.domain_name)?,
            ttl: update.ttl.unwrap_or(record.ttl),
            gtd_location: update.gtd_location.or(record.gtd_location),
            a_flags: None,
        };
        Ok(self.with_update(body))
    }

    pub fn update_txt_record(
        &self,
        record: &DnsRecord,
        update: &RecordUpdate<String>,
    ) -> Result<Self> {
        let RecordData::Txt { value } = &record.data else {
            return Err(Self::wrong_type(record, RecordType::Txt));
        };
        self.check_domain(record)?;
        let value = update.value.as_ref().unwrap_or(value);
        txt_value(value)?;

        let body = RecordBody {
            id: Some(record.id),
            record_type: RecordType::Txt,
            name: self.updated_name(record, update)?,
            value: value.clone(),
            ttl: update.ttl.unwrap_or(record.ttl),
            gtd_location: update.gtd_location.or(record.gtd_location),
            a_flags: None,
        };
        Ok(self.with_update(body))
    }
}
