// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Service function chain records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use uuid::Uuid;

use crate::status::Status;

/// Reference to a VNF, as known by the VNF manager.
pub type VnfRef = String;

/// A request to create a chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainCreateRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub chain: Vec<VnfRef>,
    #[serde(default)]
    pub symmetrical: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infra_driver: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// Kind of a remote resource created on the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    ServiceFunction,
    ServiceFunctionForwarder,
    ServiceFunctionChain,
    ServiceFunctionPath,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::ServiceFunction => write!(f, "service-function"),
            ResourceKind::ServiceFunctionForwarder => write!(f, "service-function-forwarder"),
            ResourceKind::ServiceFunctionChain => write!(f, "service-function-chain"),
            ResourceKind::ServiceFunctionPath => write!(f, "service-function-path"),
        }
    }
}

/// A remote resource left in place by a creation sequence that failed half-way.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrphanedResource {
    pub kind: ResourceKind,
    pub name: String,
}

impl OrphanedResource {
    #[must_use]
    pub fn new(kind: ResourceKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_owned(),
        }
    }
}

impl Display for OrphanedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// A persisted service function chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub chain: Vec<VnfRef>,             /* order defines the forwarding sequence */
    pub symmetrical: bool,              /* a reverse path is rendered as well */
    pub attributes: BTreeMap<String, String>,
    pub infra_driver: String,
    pub status: Status,
    pub instance_id: Option<String>,    /* rendered service path; set only when ACTIVE */
    #[serde(default)]
    pub orphans: Vec<OrphanedResource>, /* left behind by a failed creation */
}

impl Chain {
    /// Build a new record in `PENDING_CREATE` from a create request.
    #[must_use]
    pub fn from_request(request: ChainCreateRequest, default_driver: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
            chain: request.chain,
            symmetrical: request.symmetrical,
            attributes: request.attributes,
            infra_driver: request
                .infra_driver
                .unwrap_or_else(|| default_driver.to_owned()),
            status: Status::PendingCreate,
            instance_id: None,
            orphans: vec![],
        }
    }

    /// Tell if this chain has been rendered on the controller.
    #[must_use]
    pub fn is_realized(&self) -> bool {
        self.status == Status::Active && self.instance_id.is_some()
    }

    /// Name of the reverse rendered path of a symmetric chain.
    #[must_use]
    pub fn reverse_instance_id(instance_id: &str) -> String {
        format!("{instance_id}-Reverse")
    }
}
