// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Traffic classifier records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::status::Status;

/// Traffic match criteria of a classifier. Every field is optional and unset fields
/// do not take part in the match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclMatchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethertype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_ip_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<u8>,
}

impl AclMatchCriteria {
    /// Tell if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == AclMatchCriteria::default()
    }
}

/// A request to create a classifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierCreateRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub chain: Uuid,
    #[serde(default)]
    pub acl_match_criteria: AclMatchCriteria,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infra_driver: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// A persisted classifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classifier {
    pub id: Uuid,
    pub name: String, /* unique */
    #[serde(default)]
    pub description: Option<String>,
    pub chain: Uuid, /* target chain */
    pub acl_match_criteria: AclMatchCriteria,
    pub attributes: BTreeMap<String, String>,
    pub infra_driver: String,
    pub status: Status,
    pub instance_id: Option<String>,
}

impl Classifier {
    /// Build a new record in `PENDING_CREATE` from a create request.
    #[must_use]
    pub fn from_request(request: ClassifierCreateRequest, default_driver: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
            chain: request.chain,
            acl_match_criteria: request.acl_match_criteria,
            attributes: request.attributes,
            infra_driver: request
                .infra_driver
                .unwrap_or_else(|| default_driver.to_owned()),
            status: Status::PendingCreate,
            instance_id: None,
        }
    }
}
