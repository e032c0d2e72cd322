//! DNS records.
//!
//! The API reports record names relative to the owning domain and targets
//! either relative (`mail`) or rooted (`mail.example.net.`). Records are
//! decoded as-is and then [reconciled](DnsRecord::reconcile) against the
//! owning domain's name, after which every name and target is absolute.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use reqwest::Url;
use serde::Deserialize;

use crate::domain::{DomainName, DomainNameError};
use crate::ids::{DnsRecordId, DomainId, MxLevel, Port, Priority, TimeToLive, Weight};
use crate::types::{GtdLocation, RecordSource, RecordType, RedirectType};

/// A host name a record points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordTarget {
    name: DomainName,
    rooted: bool,
}

impl RecordTarget {
    /// Parses a wire value, remembering whether it ended with a dot.
    pub fn parse(value: &str) -> Result<Self, DomainNameError> {
        Ok(Self {
            name: DomainName::parse(value)?,
            rooted: value.ends_with('.'),
        })
    }

    /// An absolute target.
    pub fn absolute(name: DomainName) -> Self {
        Self { name, rooted: true }
    }

    pub fn name(&self) -> &DomainName {
        &self.name
    }

    /// Whether the target is absolute rather than relative to the record's
    /// domain.
    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    fn resolve(self, parent: &DomainName) -> Result<Self, DomainNameError> {
        if self.rooted {
            return Ok(self);
        }
        Ok(Self::absolute(parent.with_subdomain_name(&self.name)?))
    }
}

/// What an `ANAME` record points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ANameTarget {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Domain(RecordTarget),
}

/// Type-specific record payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordData {
    A {
        address: Ipv4Addr,
        dynamic_dns: bool,
        dynamic_dns_password: Option<String>,
        monitor: bool,
        failover: bool,
        /// The monitored address is currently failing.
        failed: bool,
    },
    Aaaa {
        address: Ipv6Addr,
    },
    AName {
        target: ANameTarget,
    },
    CName {
        target: RecordTarget,
    },
    HttpRedirection {
        url: Url,
        description: String,
        keywords: String,
        title: String,
        redirect_type: RedirectType,
        hard_link: bool,
    },
    Mx {
        level: MxLevel,
        target: RecordTarget,
    },
    Ns {
        name_server: RecordTarget,
    },
    Ptr {
        target: RecordTarget,
    },
    Srv {
        /// First label of the record name, e.g. `_sip`.
        service: String,
        /// Second label of the record name, e.g. `_tcp`.
        protocol: String,
        priority: Priority,
        weight: Weight,
        port: Port,
        target: RecordTarget,
    },
    Txt {
        value: String,
    },
    Spf {
        value: String,
    },
}

impl RecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::A { .. } => RecordType::A,
            Self::Aaaa { .. } => RecordType::Aaaa,
            Self::AName { .. } => RecordType::AName,
            Self::CName { .. } => RecordType::CName,
            Self::HttpRedirection { .. } => RecordType::HttpRedirection,
            Self::Mx { .. } => RecordType::Mx,
            Self::Ns { .. } => RecordType::Ns,
            Self::Ptr { .. } => RecordType::Ptr,
            Self::Srv { .. } => RecordType::Srv,
            Self::Txt { .. } => RecordType::Txt,
            Self::Spf { .. } => RecordType::Spf,
        }
    }

    fn resolve_targets(self, parent: &DomainName) -> Result<Self, DomainNameError> {
        Ok(match self {
            Self::AName {
                target: ANameTarget::Domain(target),
            } => Self::AName {
                target: ANameTarget::Domain(target.resolve(parent)?),
            },
            Self::CName { target } => Self::CName {
                target: target.resolve(parent)?,
            },
            Self::Mx { level, target } => Self::Mx {
                level,
                target: target.resolve(parent)?,
            },
            Self::Ns { name_server } => Self::Ns {
                name_server: name_server.resolve(parent)?,
            },
            Self::Ptr { target } => Self::Ptr {
                target: target.resolve(parent)?,
            },
            Self::Srv {
                service,
                protocol,
                priority,
                weight,
                port,
                target,
            } => Self::Srv {
                service,
                protocol,
                priority,
                weight,
                port,
                target: target.resolve(parent)?,
            },
            other => other,
        })
    }
}

/// A DNS record of a managed domain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct DnsRecord {
    pub id: DnsRecordId,
    /// Owner name. Absolute once reconciled.
    pub name: DomainName,
    pub source: RecordSource,
    pub parent_domain_id: DomainId,
    pub ttl: TimeToLive,
    pub gtd_location: Option<GtdLocation>,
    pub data: RecordData,
}

impl DnsRecord {
    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    /// Rebuilds the record under its owning domain `parent`: the owner name
    /// becomes `parent.with_subdomain(name)` and relative targets are made
    /// absolute.
    pub fn reconcile(self, parent: &DomainName) -> Result<Self, DomainNameError> {
        Ok(Self {
            name: parent.with_subdomain_name(&self.name)?,
            data: self.data.resolve_targets(parent)?,
            ..self
        })
    }
}

/// Record as sent by the API: one flat object for every type.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    id: DnsRecordId,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    record_type: Option<String>,
    #[serde(default)]
    value: String,
    #[serde(default)]
    source: RecordSource,
    source_id: DomainId,
    ttl: TimeToLive,
    #[serde(default)]
    gtd_location: Option<GtdLocation>,

    #[serde(default)]
    dynamic_dns: bool,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    monitor: bool,
    #[serde(default)]
    failover: bool,
    #[serde(default)]
    failed: bool,

    #[serde(default)]
    mx_level: Option<MxLevel>,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    weight: Option<Weight>,
    #[serde(default)]
    port: Option<Port>,

    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    keywords: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    redirect_type: Option<RedirectType>,
    #[serde(default)]
    hard_link: bool,
}

fn missing(record_type: RecordType, field: &str) -> String {
    format!("{record_type} record is missing `{field}`")
}

/// Removes one pair of surrounding double quotes.
fn unquote(value: String) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].to_string()
    } else {
        value
    }
}

fn target(value: &str) -> Result<RecordTarget, String> {
    RecordTarget::parse(value).map_err(|e| e.to_string())
}

fn address<T: std::str::FromStr>(record_type: RecordType, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid address for {record_type} record: `{value}`"))
}

fn aname_target(value: &str) -> Result<ANameTarget, String> {
    // Dotted quads are valid domain names too, so addresses are tried first.
    match value.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => Ok(ANameTarget::Ipv4(v4)),
        Ok(IpAddr::V6(v6)) => Ok(ANameTarget::Ipv6(v6)),
        Err(_) => RecordTarget::parse(value).map(ANameTarget::Domain).map_err(|_| {
            format!(
                "Unrecognised value for an ANAME record: `{value}`. Expecting a domain name, IPv4 or IPv6 address."
            )
        }),
    }
}

impl TryFrom<RawRecord> for DnsRecord {
    type Error = String;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let name = DomainName::parse(&raw.name).map_err(|e| e.to_string())?;
        let type_name = raw.record_type.ok_or_else(|| {
            "Could not parse a DNS record because it is missing or has a non-string value for `type`"
                .to_string()
        })?;
        let record_type: RecordType = type_name.parse().map_err(|e: crate::error::ClientError| e.to_string())?;

        let data = match record_type {
            RecordType::A => RecordData::A {
                address: address(record_type, &raw.value)?,
                dynamic_dns: raw.dynamic_dns,
                dynamic_dns_password: raw.password,
                monitor: raw.monitor,
                failover: raw.failover,
                failed: raw.failed,
            },
            RecordType::Aaaa => RecordData::Aaaa {
                address: address(record_type, &raw.value)?,
            },
            RecordType::AName => RecordData::AName {
                target: aname_target(&raw.value)?,
            },
            RecordType::CName => RecordData::CName {
                target: target(&raw.value)?,
            },
            RecordType::HttpRedirection => RecordData::HttpRedirection {
                url: Url::parse(&raw.value)
                    .map_err(|e| format!("Invalid redirect URL `{}`: {e}", raw.value))?,
                description: raw.description.unwrap_or_default(),
                keywords: raw.keywords.unwrap_or_default(),
                title: raw.title.unwrap_or_default(),
                redirect_type: raw.redirect_type.unwrap_or_default(),
                hard_link: raw.hard_link,
            },
            RecordType::Mx => RecordData::Mx {
                level: raw.mx_level.ok_or_else(|| missing(record_type, "mxLevel"))?,
                target: target(&raw.value)?,
            },
            RecordType::Ns => RecordData::Ns {
                name_server: target(&raw.value)?,
            },
            RecordType::Ptr => RecordData::Ptr {
                target: target(&raw.value)?,
            },
            RecordType::Srv => {
                let mut labels = name.labels();
                let (Some(service), Some(protocol)) = (labels.next(), labels.next()) else {
                    return Err(format!(
                        "SRV record name `{name}` must start with service and protocol labels"
                    ));
                };
                RecordData::Srv {
                    service: service.to_string(),
                    protocol: protocol.to_string(),
                    priority: raw.priority.ok_or_else(|| missing(record_type, "priority"))?,
                    weight: raw.weight.ok_or_else(|| missing(record_type, "weight"))?,
                    port: raw.port.ok_or_else(|| missing(record_type, "port"))?,
                    target: target(&raw.value)?,
                }
            }
            RecordType::Txt => RecordData::Txt {
                value: unquote(raw.value),
            },
            RecordType::Spf => RecordData::Spf {
                value: unquote(raw.value),
            },
        };

        Ok(Self {
            id: raw.id,
            name,
            source: raw.source,
            parent_domain_id: raw.source_id,
            ttl: raw.ttl,
            gtd_location: raw.gtd_location,
            data,
        })
    }
}
