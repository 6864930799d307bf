// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Access control lists with a NetVirt SFC redirect action

use serde::{Deserialize, Serialize};

/// Body of a `PUT` to `access-lists/acl/<name>`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListsBody {
    pub acl: Vec<AccessList>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessList {
    #[serde(rename = "acl-name")]
    pub name: String,
    #[serde(rename = "access-list-entries")]
    pub entries: AccessListEntries,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListEntries {
    pub ace: Vec<AccessListEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListEntry {
    #[serde(rename = "rule-name")]
    pub rule_name: String,
    pub matches: AceMatches,
    pub actions: AceActions,
}

/// Match fields of a rule. Unset fields are left out of the document altogether.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AceMatches {
    #[serde(rename = "source-mac-address", default, skip_serializing_if = "Option::is_none")]
    pub source_mac_address: Option<String>,
    #[serde(rename = "destination-mac-address", default, skip_serializing_if = "Option::is_none")]
    pub destination_mac_address: Option<String>,
    #[serde(rename = "ether-type", default, skip_serializing_if = "Option::is_none")]
    pub ether_type: Option<String>,
    #[serde(rename = "source-ipv4-network", default, skip_serializing_if = "Option::is_none")]
    pub source_ipv4_network: Option<String>,
    #[serde(rename = "destination-ipv4-network", default, skip_serializing_if = "Option::is_none")]
    pub destination_ipv4_network: Option<String>,
    #[serde(rename = "source-port-range", default, skip_serializing_if = "Option::is_none")]
    pub source_port_range: Option<PortRange>,
    #[serde(rename = "destination-port-range", default, skip_serializing_if = "Option::is_none")]
    pub destination_port_range: Option<PortRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    #[serde(rename = "lower-port")]
    pub lower_port: u16,
    #[serde(rename = "upper-port")]
    pub upper_port: u16,
}

impl PortRange {
    /// A range matching exactly one port.
    #[must_use]
    pub fn single(port: u16) -> Self {
        Self {
            lower_port: port,
            upper_port: port,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AceActions {
    #[serde(rename = "netvirt-sfc-acl:rsp-name")]
    pub rsp_name: String,
}
