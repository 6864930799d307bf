// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Restconf documents exchanged with the controller.
//!
//! Field names follow the yang models (`kebab-case`, with module prefixes where the
//! controller uses augmentations). Documents read back from the controller keep the
//! members we do not model in `other` maps, so that writing them back loses nothing.

mod acl;
mod chain;
mod forwarder;
mod function;
mod rendered;
mod topology;

pub use acl::{AccessList, AccessListEntries, AccessListEntry, AccessListsBody, AceActions, AceMatches, PortRange};
pub use chain::{
    ServiceFunctionChain, ServiceFunctionChainsBody, ServiceFunctionPath, ServiceFunctionPathsBody,
    SfcServiceFunction,
};
pub use forwarder::{
    DataPlaneLocator, OvsBridge, ServiceFunctionForwarder, ServiceFunctionForwarders,
    ServiceFunctionForwardersBody, ServiceFunctionForwardersDocument, SffDataPlaneLocator,
    SffDictionaryEntry, SffSfDataPlaneLocator,
};
pub use function::{ServiceFunction, ServiceFunctionsBody, SfDataPlaneLocator};
pub use rendered::{
    CreateRenderedPathInput, CreateRenderedPathOutput, DeleteRenderedPathInput,
    DeleteRenderedPathOutput, RpcInput, RpcOutput,
};
pub use topology::{
    ConnectionInfo, ExternalId, NetworkTopology, NetworkTopologyDocument, Node, TerminationPoint,
    Topology,
};

/// Transport of all the data-plane locators we configure.
pub const VXLAN_GPE: &str = "service-locator:vxlan-gpe";

/// Data-plane locator port of service functions and forwarders.
pub const DEFAULT_LOCATOR_PORT: u16 = 6633;

/// Prefix of service function type identities.
pub const SF_TYPE_PREFIX: &str = "service-function-type:";

/// Qualify a bare service type (`firewall`) into a service function type identity.
#[must_use]
pub fn service_function_type(service_type: &str) -> String {
    if service_type.starts_with(SF_TYPE_PREFIX) {
        service_type.to_owned()
    } else {
        format!("{SF_TYPE_PREFIX}{service_type}")
    }
}

/// Ports are numbers in the yang model, but older clients wrote them as strings.
pub(crate) mod port {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u16),
        String(String),
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}
