//! Managed domain payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainName;
use crate::error::{ClientError, Result};
use crate::ids::{DomainId, FolderId, SoaId, TemplateId, TransferAclId, VanityId};
use crate::types::NameServer;

/// A domain as it appears in the domain listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSummary {
    pub name: DomainName,
    pub id: DomainId,
    #[serde(rename = "gtdEnabled", default)]
    pub global_traffic_director_enabled: bool,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    #[serde(rename = "updated", with = "crate::utils::datetime::millis")]
    pub last_updated: DateTime<Utc>,
    #[serde(rename = "created", with = "crate::utils::datetime::millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub process_multi: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub active_third_parties: Vec<String>,
    #[serde(default)]
    pub pending_action_id: i64,
}

#[cfg(test)]
impl DomainSummary {
    pub(crate) fn new(id: DomainId, name: DomainName) -> Self {
        Self {
            name,
            id,
            global_traffic_director_enabled: false,
            folder_id: None,
            last_updated: DateTime::UNIX_EPOCH,
            created_at: DateTime::UNIX_EPOCH,
            process_multi: false,
            active_third_parties: Vec::new(),
            pending_action_id: 0,
        }
    }
}

/// Full details of a single domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub name: DomainName,
    pub id: DomainId,
    #[serde(default)]
    pub name_servers: Vec<NameServer>,
    #[serde(rename = "gtdEnabled", default)]
    pub global_traffic_director_enabled: bool,
    #[serde(default)]
    pub soa_id: Option<SoaId>,
    #[serde(default)]
    pub template_id: Option<TemplateId>,
    #[serde(default)]
    pub vanity_id: Option<VanityId>,
    #[serde(default)]
    pub transfer_acl_id: Option<TransferAclId>,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    #[serde(rename = "updated", with = "crate::utils::datetime::millis")]
    pub last_updated: DateTime<Utc>,
    #[serde(rename = "created", with = "crate::utils::datetime::millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub axfr_server: Vec<DomainName>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub delegate_name_servers: Vec<DomainName>,
    #[serde(default)]
    pub process_multi: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub active_third_parties: Vec<String>,
    #[serde(default)]
    pub pending_action_id: i64,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Changes to apply to one or more domains.
///
/// Unset fields are left unchanged. For the nullable settings,
/// `Some(None)` clears the value on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<DomainName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gtd_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_id: Option<Option<SoaId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Option<TemplateId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vanity_id: Option<Option<VanityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_acl_id: Option<Option<TransferAclId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<FolderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axfr_server: Option<Option<Vec<DomainName>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate_name_servers: Option<Option<Vec<DomainName>>>,
}

impl DomainUpdate {
    /// True when no setting other than the name is touched.
    pub fn has_no_settings(&self) -> bool {
        *self
            == Self {
                name: self.name.clone(),
                ..Self::default()
            }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Bulk operations and creation cannot rename.
    pub(crate) fn reject_rename(&self) -> Result<()> {
        if self.name.is_some() {
            return Err(ClientError::invalid_argument(
                "update.name",
                "a domain can only be renamed on its own",
            ));
        }
        Ok(())
    }
}

/// Body of the bulk update endpoint: the settings plus the target selection.
#[derive(Serialize)]
pub(crate) struct BulkDomainUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<&'a [DomainId]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<&'a [DomainName]>,
    #[serde(flatten)]
    pub update: &'a DomainUpdate,
}
