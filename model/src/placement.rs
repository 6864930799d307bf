// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Placement of VNFs, as learnt from the VNF manager and the port lookup service

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::chain::VnfRef;

/// Where a VNF lives. Only valid for the duration of a single chain build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VnfPlacement {
    pub vnf: VnfRef,
    pub name: String,             /* display name, used as the service function name */
    pub management_ip: Ipv4Addr,  /* also used as data-plane locator address */
    pub service_type: String,     /* e.g. firewall, dpi */
    pub port_id: String,          /* virtual network port of the VNF */
}

/// Placements of the VNFs of a chain, keyed by VNF reference.
pub type VnfPlacements = BTreeMap<VnfRef, VnfPlacement>;

/// Find the first IPv4 address embedded in a VNF management URL.
///
/// Management URLs come in several shapes (`http://10.0.0.5:8080/`, `{"vdu1": "10.0.0.5"}`, ..)
/// so the string is split on anything that cannot be part of a dotted quad and every
/// fragment is tried in turn.
#[must_use]
pub fn extract_management_ip(mgmt_url: &str) -> Option<Ipv4Addr> {
    mgmt_url
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter(|fragment| !fragment.is_empty())
        .find_map(|fragment| fragment.parse::<Ipv4Addr>().ok())
}
