// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Service functions

use serde::{Deserialize, Serialize};

/// A service function: the controller-side view of one VNF.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFunction {
    pub name: String,
    #[serde(rename = "ip-mgmt-address")]
    pub ip_mgmt_address: String,
    #[serde(rename = "type")]
    pub sf_type: String,
    #[serde(rename = "nsh-aware", default)]
    pub nsh_aware: bool,
    #[serde(rename = "sf-data-plane-locator", default)]
    pub data_plane_locators: Vec<SfDataPlaneLocator>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SfDataPlaneLocator {
    pub name: String,
    pub ip: String,
    #[serde(deserialize_with = "super::port::deserialize")]
    pub port: u16,
    pub transport: String,
    #[serde(rename = "service-function-forwarder")]
    pub service_function_forwarder: String,
}

/// Body of a `PUT` to `service-function/<name>`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFunctionsBody {
    #[serde(rename = "service-function")]
    pub service_function: Vec<ServiceFunction>,
}

impl ServiceFunction {
    /// The forwarder the first data-plane locator is attached to.
    #[must_use]
    pub fn forwarder(&self) -> Option<&str> {
        self.data_plane_locators
            .first()
            .map(|loc| loc.service_function_forwarder.as_str())
    }
}
