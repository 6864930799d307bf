// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Translation of chains and classifiers into controller documents

use std::collections::BTreeMap;

use model::{AclMatchCriteria, Chain, Classifier, VnfPlacements, VnfRef};
use odl_intf::wire::{
    AccessList, AccessListEntries, AccessListEntry, AceActions, AceMatches, DEFAULT_LOCATOR_PORT,
    PortRange, ServiceFunction, ServiceFunctionChain, ServiceFunctionPath, SfDataPlaneLocator,
    SfcServiceFunction, VXLAN_GPE, service_function_type,
};

use crate::error::RealizeError;
use crate::topology::BridgeLocation;

/// Forwarder service functions are bound to until their bridge is known.
pub const PLACEHOLDER_FORWARDER: &str = "dummy";

/// Name of the data-plane locator of every service function.
const SF_LOCATOR_NAME: &str = "vxlan";

/// Everything needed to realize a chain, but its forwarders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainResources {
    pub service_functions: Vec<ServiceFunction>, /* chain order */
    pub vnf_ports: Vec<(VnfRef, String)>,        /* chain order, same length */
    pub chain_doc: ServiceFunctionChain,
    pub path_doc: ServiceFunctionPath,
}

/// Name of the service function path of a chain.
#[must_use]
pub fn path_name(chain_name: &str) -> String {
    format!("Path-{chain_name}")
}

/// Build the service functions, chain and path of `chain`.
///
/// # Errors
///
/// Fails with [`RealizeError::MissingPlacement`] if some VNF of the chain has no
/// placement.
pub fn build_chain_resources(
    chain: &Chain,
    placements: &VnfPlacements,
) -> Result<ChainResources, RealizeError> {
    let mut service_functions = Vec::with_capacity(chain.chain.len());
    let mut vnf_ports = Vec::with_capacity(chain.chain.len());

    for vnf in &chain.chain {
        let placement = placements
            .get(vnf)
            .ok_or_else(|| RealizeError::MissingPlacement(vnf.clone()))?;
        let ip = placement.management_ip.to_string();
        service_functions.push(ServiceFunction {
            name: placement.name.clone(),
            ip_mgmt_address: ip.clone(),
            sf_type: service_function_type(&placement.service_type),
            nsh_aware: true,
            data_plane_locators: vec![SfDataPlaneLocator {
                name: SF_LOCATOR_NAME.to_owned(),
                ip,
                port: DEFAULT_LOCATOR_PORT,
                transport: VXLAN_GPE.to_owned(),
                service_function_forwarder: PLACEHOLDER_FORWARDER.to_owned(),
            }],
        });
        vnf_ports.push((vnf.clone(), placement.port_id.clone()));
    }

    let chain_doc = ServiceFunctionChain {
        name: chain.name.clone(),
        symmetric: chain.symmetrical,
        functions: service_functions
            .iter()
            .map(|sf| SfcServiceFunction {
                name: sf.name.clone(),
                sf_type: sf.sf_type.clone(),
            })
            .collect(),
    };
    let path_doc = ServiceFunctionPath {
        name: path_name(&chain.name),
        service_chain_name: chain.name.clone(),
        symmetric: chain.symmetrical,
    };

    Ok(ChainResources {
        service_functions,
        vnf_ports,
        chain_doc,
        path_doc,
    })
}

impl ChainResources {
    /// Service functions keyed by the VNF they represent.
    #[must_use]
    pub fn functions_by_vnf(&self) -> BTreeMap<VnfRef, ServiceFunction> {
        self.vnf_ports
            .iter()
            .map(|(vnf, _)| vnf.clone())
            .zip(self.service_functions.iter().cloned())
            .collect()
    }

    /// Bind every service function to the forwarder of the bridge its VNF was found on.
    pub fn bind_forwarders(&mut self, location: &BridgeLocation) {
        for ((vnf, _), sf) in self.vnf_ports.iter().zip(self.service_functions.iter_mut()) {
            if let Some(forwarder) = location.forwarder_of(vnf) {
                for loc in &mut sf.data_plane_locators {
                    loc.service_function_forwarder = forwarder.to_owned();
                }
            }
        }
    }
}

fn port_range(port: Option<u16>) -> Option<PortRange> {
    port.map(PortRange::single)
}

/// Blank values don't match anything and are left out like unset ones.
fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(String::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn ace_matches(criteria: &AclMatchCriteria) -> AceMatches {
    AceMatches {
        source_mac_address: non_empty(criteria.source_mac.as_ref()),
        destination_mac_address: non_empty(criteria.dest_mac.as_ref()),
        ether_type: non_empty(criteria.ethertype.as_ref()),
        source_ipv4_network: non_empty(criteria.source_ip_prefix.as_ref()),
        destination_ipv4_network: non_empty(criteria.dest_ip_prefix.as_ref()),
        source_port_range: port_range(criteria.source_port),
        destination_port_range: port_range(criteria.dest_port),
        protocol: criteria.protocol,
    }
}

/// Build the access list redirecting what `classifier` matches into `rendered_path_id`.
#[must_use]
pub fn build_classifier_resources(classifier: &Classifier, rendered_path_id: &str) -> AccessList {
    AccessList {
        name: classifier.name.clone(),
        entries: AccessListEntries {
            ace: vec![AccessListEntry {
                rule_name: classifier.name.clone(),
                matches: ace_matches(&classifier.acl_match_criteria),
                actions: AceActions {
                    rsp_name: rendered_path_id.to_owned(),
                },
            }],
        },
    }
}
