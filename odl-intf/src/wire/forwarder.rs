// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Service function forwarders (OVS flavour)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A service function forwarder. Forwarders are shared by every chain crossing the
/// switch they represent, so they are always merged, never blindly overwritten.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceFunctionForwarder {
    pub name: String,
    #[serde(rename = "ip-mgmt-address", default, skip_serializing_if = "Option::is_none")]
    pub ip_mgmt_address: Option<String>,
    #[serde(
        rename = "service-function-forwarder-ovs:ovs-bridge",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ovs_bridge: Option<OvsBridge>,
    #[serde(rename = "sff-data-plane-locator", default, skip_serializing_if = "Vec::is_empty")]
    pub data_plane_locators: Vec<SffDataPlaneLocator>,
    #[serde(rename = "service-function-dictionary", default)]
    pub dictionary: Vec<SffDictionaryEntry>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OvsBridge {
    #[serde(rename = "bridge-name")]
    pub bridge_name: String,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SffDataPlaneLocator {
    pub name: String,
    #[serde(rename = "data-plane-locator")]
    pub data_plane_locator: DataPlaneLocator,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPlaneLocator {
    pub transport: String,
    #[serde(deserialize_with = "super::port::deserialize")]
    pub port: u16,
    pub ip: String,
}

/// A service function bound to a forwarder. Entries are identified by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SffDictionaryEntry {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub sf_type: Option<String>,
    #[serde(rename = "sff-sf-data-plane-locator", default, skip_serializing_if = "Option::is_none")]
    pub sff_sf_data_plane_locator: Option<SffSfDataPlaneLocator>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SffSfDataPlaneLocator {
    #[serde(
        rename = "service-function-forwarder-ovs:ovs-bridge",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ovs_bridge: Option<OvsBridge>,
    pub transport: String,
    #[serde(deserialize_with = "super::port::deserialize")]
    pub port: u16,
    pub ip: String,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Body of `GET restconf/config/service-function-forwarder:service-function-forwarders/`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceFunctionForwardersDocument {
    #[serde(rename = "service-function-forwarders", default)]
    pub service_function_forwarders: ServiceFunctionForwarders,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceFunctionForwarders {
    #[serde(rename = "service-function-forwarder", default)]
    pub service_function_forwarder: Vec<ServiceFunctionForwarder>,
}

/// Body of a `PUT` to `service-function-forwarder/<name>`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceFunctionForwardersBody {
    #[serde(rename = "service-function-forwarder")]
    pub service_function_forwarder: Vec<ServiceFunctionForwarder>,
}

impl OvsBridge {
    #[must_use]
    pub fn new(bridge_name: &str) -> Self {
        Self {
            bridge_name: bridge_name.to_owned(),
            other: Map::new(),
        }
    }
}

impl ServiceFunctionForwarder {
    /// Tell if this forwarder is reachable at `ip`, either as its management address
    /// or as the address of one of its data-plane locators.
    #[must_use]
    pub fn has_ip(&self, ip: &str) -> bool {
        self.ip_mgmt_address.as_deref() == Some(ip)
            || self
                .data_plane_locators
                .iter()
                .any(|loc| loc.data_plane_locator.ip == ip)
    }

    /// Name of the bridge this forwarder is bound to, if it declares one.
    #[must_use]
    pub fn bridge_name(&self) -> Option<&str> {
        self.ovs_bridge.as_ref().map(|br| br.bridge_name.as_str())
    }

    /// Look up a dictionary entry by service function name.
    #[must_use]
    pub fn entry(&self, sf_name: &str) -> Option<&SffDictionaryEntry> {
        self.dictionary.iter().find(|e| e.name == sf_name)
    }
}
