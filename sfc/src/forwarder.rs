// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Merging newly placed service functions into forwarder definitions

use std::collections::BTreeMap;

use model::VnfRef;
use odl_intf::wire::{
    DEFAULT_LOCATOR_PORT, DataPlaneLocator, OvsBridge, ServiceFunction, ServiceFunctionForwarder,
    SffDataPlaneLocator, SffDictionaryEntry, SffSfDataPlaneLocator, VXLAN_GPE,
};
use serde_json::Map;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

use crate::topology::{BridgeId, BridgeMapping};

fn fresh_forwarder(mapping: &BridgeMapping) -> ServiceFunctionForwarder {
    ServiceFunctionForwarder {
        name: mapping.forwarder_name.clone(),
        ip_mgmt_address: Some(mapping.management_ip.clone()),
        ovs_bridge: Some(OvsBridge::new(&mapping.bridge_name)),
        data_plane_locators: vec![SffDataPlaneLocator {
            name: mapping.forwarder_name.clone(),
            data_plane_locator: DataPlaneLocator {
                transport: VXLAN_GPE.to_owned(),
                port: DEFAULT_LOCATOR_PORT,
                ip: mapping.management_ip.clone(),
            },
            other: Map::new(),
        }],
        dictionary: vec![],
        other: Map::new(),
    }
}

/// Dictionary entry binding `sf` to the bridge of `mapping`.
fn dictionary_entry(mapping: &BridgeMapping, sf: &ServiceFunction) -> SffDictionaryEntry {
    let (ip, port) = sf
        .data_plane_locators
        .first()
        .map_or((sf.ip_mgmt_address.clone(), DEFAULT_LOCATOR_PORT), |loc| {
            (loc.ip.clone(), loc.port)
        });
    SffDictionaryEntry {
        name: sf.name.clone(),
        sf_type: Some(sf.sf_type.clone()),
        sff_sf_data_plane_locator: Some(SffSfDataPlaneLocator {
            ovs_bridge: Some(OvsBridge::new(&mapping.bridge_name)),
            transport: VXLAN_GPE.to_owned(),
            port,
            ip,
            other: Map::new(),
        }),
        other: Map::new(),
    }
}

/// Replace the entry of the same name in place, or append.
fn upsert(dictionary: &mut Vec<SffDictionaryEntry>, entry: SffDictionaryEntry) {
    match dictionary.iter_mut().find(|e| e.name == entry.name) {
        Some(current) => {
            trace!("Replacing dictionary entry {}", entry.name);
            *current = entry;
        }
        None => {
            trace!("Adding dictionary entry {}", entry.name);
            dictionary.push(entry);
        }
    }
}

/// Compute the forwarder definitions to write for a set of bridge mappings.
///
/// A bridge whose forwarder already exists gets that forwarder back with a dictionary
/// entry per newly bound service function, replacing an entry of the same name if
/// there is one. All the other entries, and everything else about the forwarder,
/// are left as they were. A bridge without a forwarder gets a fresh one.
///
/// The result follows the order of bridge ids.
#[must_use]
pub fn merge(
    bridges: &BTreeMap<BridgeId, BridgeMapping>,
    service_functions: &BTreeMap<VnfRef, ServiceFunction>,
    existing: &[ServiceFunctionForwarder],
) -> Vec<ServiceFunctionForwarder> {
    bridges
        .values()
        .map(|mapping| {
            let mut sff = match existing.iter().find(|sff| sff.name == mapping.forwarder_name) {
                Some(current) => {
                    debug!(
                        "Merging into forwarder {} ({} entries)",
                        current.name,
                        current.dictionary.len()
                    );
                    current.clone()
                }
                None => {
                    debug!("New forwarder {}", mapping.forwarder_name);
                    fresh_forwarder(mapping)
                }
            };
            if sff.ovs_bridge.is_none() {
                sff.ovs_bridge = Some(OvsBridge::new(&mapping.bridge_name));
            }
            for vnf in &mapping.vnfs {
                match service_functions.get(vnf) {
                    Some(sf) => upsert(&mut sff.dictionary, dictionary_entry(mapping, sf)),
                    None => warn!("No service function for vnf {vnf}"),
                }
            }
            sff
        })
        .collect()
}
