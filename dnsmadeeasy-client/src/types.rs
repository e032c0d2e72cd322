use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::DomainName;
use crate::error::ClientError;

// ============ Record type ============

/// Record type discriminator, as it appears in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    #[serde(rename = "AAAA")]
    Aaaa,
    /// Apex alias resolved by the provider.
    #[serde(rename = "ANAME")]
    AName,
    /// Canonical name (alias) record.
    #[serde(rename = "CNAME")]
    CName,
    /// HTTP redirection served by the provider.
    #[serde(rename = "HTTPRED")]
    HttpRedirection,
    /// Mail exchange record.
    #[serde(rename = "MX")]
    Mx,
    /// Name server record.
    #[serde(rename = "NS")]
    Ns,
    /// Reverse pointer record.
    #[serde(rename = "PTR")]
    Ptr,
    /// Service locator record.
    #[serde(rename = "SRV")]
    Srv,
    /// Text record.
    #[serde(rename = "TXT")]
    Txt,
    /// Sender policy record.
    #[serde(rename = "SPF")]
    Spf,
}

impl RecordType {
    pub const ALL: [Self; 11] = [
        Self::A,
        Self::Aaaa,
        Self::AName,
        Self::CName,
        Self::HttpRedirection,
        Self::Mx,
        Self::Ns,
        Self::Ptr,
        Self::Srv,
        Self::Txt,
        Self::Spf,
    ];

    /// The wire discriminator, e.g. `"CNAME"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::AName => "ANAME",
            Self::CName => "CNAME",
            Self::HttpRedirection => "HTTPRED",
            Self::Mx => "MX",
            Self::Ns => "NS",
            Self::Ptr => "PTR",
            Self::Srv => "SRV",
            Self::Txt => "TXT",
            Self::Spf => "SPF",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ClientError::ParseError {
                detail: format!("Unrecognised record type `{s}`"),
            })
    }
}

// ============ Record source ============

/// Whether a record was instantiated from a template or belongs to the domain.
///
/// On the wire this is an integer: `0` for template records, `1` for
/// domain-specific ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RecordSource {
    FromTemplate,
    #[default]
    DomainSpecific,
}

impl RecordSource {
    pub fn to_wire(self) -> u8 {
        match self {
            Self::FromTemplate => 0,
            Self::DomainSpecific => 1,
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FromTemplate => "From Template",
            Self::DomainSpecific => "Domain Specific",
        })
    }
}

impl Serialize for RecordSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for RecordSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match i64::deserialize(deserializer)? {
            0 => Ok(Self::FromTemplate),
            1 => Ok(Self::DomainSpecific),
            other => Err(serde::de::Error::custom(format!(
                "Unknown value for record source: {other}"
            ))),
        }
    }
}

// ============ Global Traffic Director ============

/// Global Traffic Director region a record is served from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GtdLocation {
    #[default]
    Default,
    UsEast,
    UsWest,
    Europe,
}

// ============ HTTP redirection ============

/// How an `HTTPRED` record redirects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedirectType {
    /// The target is shown inside a frame under the original URL.
    #[default]
    #[serde(rename = "Hidden Frame Masked")]
    HiddenFrameMasked,
    #[serde(rename = "Standard - 302")]
    Standard302,
    #[serde(rename = "Standard - 301")]
    Standard301,
}

// ============ Name servers ============

/// A name server assigned to a domain.
///
/// Two name servers are equal when their host names are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameServer {
    pub fqdn: DomainName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<Ipv6Addr>,
}

impl PartialEq for NameServer {
    fn eq(&self, other: &Self) -> bool {
        self.fqdn == other.fqdn
    }
}

impl Eq for NameServer {}
