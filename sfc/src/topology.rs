// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Locating the virtual switch bridges VNFs are attached to

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use model::VnfRef;
use odl_intf::Controller;
use odl_intf::wire::{NetworkTopologyDocument, Node, ServiceFunctionForwarder, TerminationPoint, Topology};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

use crate::alloc::ForwarderNameAllocator;
use crate::error::RealizeError;

/// A bridge is identified by its topology node id. Bridge names are not unique
/// across hosts.
pub type BridgeId = String;

/// What we know about one bridge hosting VNFs of a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeMapping {
    pub bridge_name: String,
    pub management_ip: String,
    pub vnfs: Vec<VnfRef>,                   /* in chain order */
    pub tap_ports: BTreeMap<VnfRef, String>, /* local port of each vnf */
    pub forwarder_name: String,
}

/// Outcome of locating the bridges of a set of VNFs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BridgeLocation {
    pub bridges: BTreeMap<BridgeId, BridgeMapping>,
    pub unplaced: Vec<VnfRef>,
}

impl BridgeLocation {
    /// The forwarder a VNF ended up bound to.
    #[must_use]
    pub fn forwarder_of(&self, vnf: &str) -> Option<&str> {
        self.bridges
            .values()
            .find(|b| b.vnfs.iter().any(|v| v == vnf))
            .map(|b| b.forwarder_name.as_str())
    }

    /// Distinct management addresses of the bridges, sorted.
    #[must_use]
    pub fn management_ips(&self) -> BTreeSet<&str> {
        self.bridges
            .values()
            .map(|b| b.management_ip.as_str())
            .collect()
    }
}

/// Where a port was found in the topology.
struct PortHit<'a> {
    topology: &'a Topology,
    node: &'a Node,
    tp: &'a TerminationPoint,
}

/// Find the first termination point whose external ids reference `port_id`.
fn find_port<'a>(doc: &'a NetworkTopologyDocument, port_id: &str) -> Option<PortHit<'a>> {
    doc.network_topology.topology.iter().find_map(|topology| {
        topology.node.iter().find_map(|node| {
            node.termination_point
                .iter()
                .find(|tp| tp.has_external_id_value(port_id))
                .map(|tp| PortHit { topology, node, tp })
        })
    })
}

/// Management address of the OVSDB instance a bridge node belongs to.
///
/// That is the node's own connection info if it has one, else that of the node
/// it is managed by, else that of the first node of the topology which has one.
fn management_ip<'a>(topology: &'a Topology, node: &'a Node) -> Option<&'a str> {
    node.remote_ip()
        .or_else(|| {
            node.manager_node_id()
                .and_then(|id| topology.node(id))
                .and_then(Node::remote_ip)
        })
        .or_else(|| topology.node.iter().find_map(Node::remote_ip))
}

/// Pick the forwarder name of a bridge: an existing forwarder reachable at the same
/// address (and bound to the same bridge, if it says) unless another bridge claimed
/// it already, else a fresh one.
fn forwarder_name(
    bridge_name: &str,
    management_ip: &str,
    existing: &[ServiceFunctionForwarder],
    claimed: &mut BTreeSet<String>,
    allocator: &ForwarderNameAllocator,
) -> Result<String, RealizeError> {
    let reusable = existing.iter().find(|sff| {
        sff.has_ip(management_ip)
            && sff.bridge_name().is_none_or(|name| name == bridge_name)
            && !claimed.contains(&sff.name)
    });
    let name = match reusable {
        Some(sff) => {
            debug!("Reusing forwarder {} for bridge {bridge_name} at {management_ip}", sff.name);
            sff.name.clone()
        }
        None => {
            let name = allocator.allocate().ok_or(RealizeError::ForwarderNamesExhausted)?;
            debug!("Allocated forwarder {name} for bridge {bridge_name} at {management_ip}");
            name
        }
    };
    claimed.insert(name.clone());
    Ok(name)
}

/// Map VNFs to the bridges their ports are attached to, as seen in `doc`.
///
/// `vnf_ports` lists `(vnf, port id)` in chain order. VNFs whose port can't be found,
/// or whose bridge has no known name or management address, are reported in
/// [`BridgeLocation::unplaced`].
///
/// # Errors
///
/// Fails if a bridge needs a new forwarder and `allocator` has no name left.
pub fn locate_bridges(
    doc: &NetworkTopologyDocument,
    vnf_ports: &[(VnfRef, String)],
    existing: &[ServiceFunctionForwarder],
    allocator: &ForwarderNameAllocator,
) -> Result<BridgeLocation, RealizeError> {
    let mut location = BridgeLocation::default();
    let mut claimed = BTreeSet::new();

    for (vnf, port_id) in vnf_ports {
        let Some((hit, bridge_name, ip)) = locate_port(doc, vnf, port_id) else {
            location.unplaced.push(vnf.clone());
            continue;
        };
        let mapping = match location.bridges.entry(hit.node.node_id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(BridgeMapping {
                bridge_name: bridge_name.to_owned(),
                management_ip: ip.to_owned(),
                vnfs: vec![],
                tap_ports: BTreeMap::new(),
                forwarder_name: forwarder_name(bridge_name, ip, existing, &mut claimed, allocator)?,
            }),
        };
        if !mapping.vnfs.contains(vnf) {
            mapping.vnfs.push(vnf.clone());
        }
        mapping
            .tap_ports
            .insert(vnf.clone(), hit.tp.port_name().to_owned());
    }
    Ok(location)
}

/// Find the bridge hosting the port of a vnf, along with the bridge name and the
/// management address of its switch.
fn locate_port<'a>(
    doc: &'a NetworkTopologyDocument,
    vnf: &str,
    port_id: &str,
) -> Option<(PortHit<'a>, &'a str, &'a str)> {
    let Some(hit) = find_port(doc, port_id) else {
        warn!("Port {port_id} of vnf {vnf} not found in topology");
        return None;
    };
    let (Some(bridge_name), Some(ip)) = (
        hit.node.bridge_name.as_deref(),
        management_ip(hit.topology, hit.node),
    ) else {
        warn!(
            "Node {} hosting port {port_id} of vnf {vnf} is not a reachable bridge",
            hit.node.node_id
        );
        return None;
    };
    trace!(
        "vnf {vnf}: port {port_id} is {} on {bridge_name} ({})",
        hit.tp.port_name(),
        hit.node.node_id
    );
    Some((hit, bridge_name, ip))
}

/// Management addresses of the switches hosting the given ports, sorted.
#[must_use]
pub fn bridge_addresses(doc: &NetworkTopologyDocument, vnf_ports: &[(VnfRef, String)]) -> BTreeSet<String> {
    vnf_ports
        .iter()
        .filter_map(|(vnf, port_id)| locate_port(doc, vnf, port_id))
        .map(|(_, _, ip)| ip.to_owned())
        .collect()
}

/// Read the network topology from the controller.
///
/// # Errors
///
/// Fails with [`RealizeError::TopologyUnavailable`] if the topology can't be read.
pub async fn fetch_topology(controller: &dyn Controller) -> Result<NetworkTopologyDocument, RealizeError> {
    controller
        .network_topology()
        .await
        .map_err(RealizeError::TopologyUnavailable)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use odl_intf::mock::{MockController, Operation};
    use odl_intf::wire::{DataPlaneLocator, OvsBridge, SffDataPlaneLocator, VXLAN_GPE};
    use pretty_assertions::assert_eq;

    /// Two hosts, each with a `br-int`. VNF ports `port-a` and `port-b` are on the
    /// first host, `port-c` on the second. The second host's bridge only references
    /// its manager.
    pub(crate) fn two_hosts() -> NetworkTopologyDocument {
        serde_json::from_value(serde_json::json!({
          "network-topology": {
            "topology": [
              { "topology-id": "netvirt:1" },
              {
                "topology-id": "ovsdb:1",
                "node": [
                  {
                    "node-id": "ovsdb://uuid/host1",
                    "ovsdb:connection-info": { "remote-ip": "192.168.0.21", "remote-port": 6640 }
                  },
                  {
                    "node-id": "ovsdb://uuid/host1/bridge/br-int",
                    "ovsdb:bridge-name": "br-int",
                    "ovsdb:managed-by": "/network-topology:network-topology/network-topology:topology[network-topology:topology-id='ovsdb:1']/network-topology:node[network-topology:node-id='ovsdb://uuid/host1']",
                    "termination-point": [
                      { "tp-id": "br-int", "ovsdb:name": "br-int" },
                      {
                        "tp-id": "tap-a", "ovsdb:name": "tap-a",
                        "ovsdb:interface-external-ids": [
                          { "external-id-key": "attached-mac", "external-id-value": "fa:16:3e:00:00:01" },
                          { "external-id-key": "iface-id", "external-id-value": "port-a" }
                        ]
                      },
                      {
                        "tp-id": "tap-b", "ovsdb:name": "tap-b",
                        "ovsdb:interface-external-ids": [
                          { "external-id-key": "iface-id", "external-id-value": "port-b" }
                        ]
                      }
                    ]
                  },
                  {
                    "node-id": "ovsdb://uuid/host2/bridge/br-int",
                    "ovsdb:bridge-name": "br-int",
                    "ovsdb:managed-by": "/network-topology:network-topology/network-topology:topology[network-topology:topology-id='ovsdb:1']/network-topology:node[network-topology:node-id='ovsdb://uuid/host2']",
                    "termination-point": [
                      {
                        "tp-id": "tap-c",
                        "ovsdb:interface-external-ids": [
                          { "external-id-key": "iface-id", "external-id-value": "port-c" }
                        ]
                      }
                    ]
                  },
                  {
                    "node-id": "ovsdb://uuid/host2",
                    "ovsdb:connection-info": { "remote-ip": "192.168.0.22", "remote-port": 6640 }
                  }
                ]
              }
            ]
          }
        }))
        .unwrap()
    }

    fn ports(pairs: &[(&str, &str)]) -> Vec<(VnfRef, String)> {
        pairs
            .iter()
            .map(|(v, p)| ((*v).to_string(), (*p).to_string()))
            .collect()
    }

    fn existing_forwarder(name: &str, ip: &str, bridge: Option<&str>) -> ServiceFunctionForwarder {
        ServiceFunctionForwarder {
            name: name.to_string(),
            ovs_bridge: bridge.map(OvsBridge::new),
            data_plane_locators: vec![SffDataPlaneLocator {
                name: name.to_string(),
                data_plane_locator: DataPlaneLocator {
                    transport: VXLAN_GPE.to_string(),
                    port: 6633,
                    ip: ip.to_string(),
                },
                other: serde_json::Map::new(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn vnfs_aggregate_per_bridge_in_chain_order() {
        let alloc = ForwarderNameAllocator::new();
        let location = locate_bridges(
            &two_hosts(),
            &ports(&[("vnf-b", "port-b"), ("vnf-c", "port-c"), ("vnf-a", "port-a")]),
            &[],
            &alloc,
        ).unwrap();
        assert!(location.unplaced.is_empty());
        assert_eq!(location.bridges.len(), 2);

        let host1 = &location.bridges["ovsdb://uuid/host1/bridge/br-int"];
        assert_eq!(host1.bridge_name, "br-int");
        assert_eq!(host1.management_ip, "192.168.0.21");
        assert_eq!(host1.vnfs, vec!["vnf-b".to_string(), "vnf-a".to_string()]);
        assert_eq!(host1.tap_ports["vnf-a"], "tap-a");
        assert_eq!(host1.forwarder_name, "sff1");

        let host2 = &location.bridges["ovsdb://uuid/host2/bridge/br-int"];
        assert_eq!(host2.management_ip, "192.168.0.22");
        assert_eq!(host2.tap_ports["vnf-c"], "tap-c");
        assert_eq!(host2.forwarder_name, "sff2");

        assert_eq!(location.forwarder_of("vnf-c"), Some("sff2"));
        assert_eq!(
            location.management_ips().into_iter().collect::<Vec<_>>(),
            vec!["192.168.0.21", "192.168.0.22"]
        );
    }

    #[test]
    fn discovery_is_deterministic() {
        let vnf_ports = ports(&[("vnf-a", "port-a"), ("vnf-b", "port-b"), ("vnf-c", "port-c")]);
        let first = locate_bridges(&two_hosts(), &vnf_ports, &[], &ForwarderNameAllocator::new()).unwrap();
        let second = locate_bridges(&two_hosts(), &vnf_ports, &[], &ForwarderNameAllocator::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn first_match_wins_without_duplicates() {
        let mut doc = two_hosts();
        // the same port id shows up again on host2, after host1
        let dup = doc.network_topology.topology[1].node[1].termination_point[1].clone();
        doc.network_topology.topology[1].node[2]
            .termination_point
            .push(dup);
        let location = locate_bridges(
            &doc,
            &ports(&[("vnf-a", "port-a"), ("vnf-a", "port-a")]),
            &[],
            &ForwarderNameAllocator::new(),
        ).unwrap();
        assert_eq!(location.bridges.len(), 1);
        let host1 = &location.bridges["ovsdb://uuid/host1/bridge/br-int"];
        assert_eq!(host1.vnfs, vec!["vnf-a".to_string()]);
    }

    #[test]
    fn unknown_ports_are_unplaced() {
        let location = locate_bridges(
            &two_hosts(),
            &ports(&[("vnf-a", "port-a"), ("vnf-x", "port-x")]),
            &[],
            &ForwarderNameAllocator::new(),
        ).unwrap();
        assert_eq!(location.unplaced, vec!["vnf-x".to_string()]);
        assert_eq!(location.bridges.len(), 1);
    }

    #[test]
    fn existing_forwarders_are_reused_by_address_and_bridge() {
        let alloc = ForwarderNameAllocator::starting_at(7);
        let existing = vec![
            existing_forwarder("sff-other-bridge", "192.168.0.21", Some("br-ex")),
            existing_forwarder("sff-host1", "192.168.0.21", Some("br-int")),
        ];
        let location = locate_bridges(
            &two_hosts(),
            &ports(&[("vnf-a", "port-a"), ("vnf-c", "port-c")]),
            &existing,
            &alloc,
        ).unwrap();
        assert_eq!(location.forwarder_of("vnf-a"), Some("sff-host1"));
        assert_eq!(location.forwarder_of("vnf-c"), Some("sff7"));
        assert_eq!(alloc.peek(), 8);
    }

    #[test]
    fn exhausted_allocator_fails_only_for_new_forwarders() {
        let alloc = ForwarderNameAllocator::starting_at(u64::MAX);
        let existing = vec![existing_forwarder("sff-host1", "192.168.0.21", Some("br-int"))];
        let location =
            locate_bridges(&two_hosts(), &ports(&[("vnf-a", "port-a")]), &existing, &alloc).unwrap();
        assert_eq!(location.forwarder_of("vnf-a"), Some("sff-host1"));

        let err = locate_bridges(&two_hosts(), &ports(&[("vnf-c", "port-c")]), &existing, &alloc)
            .unwrap_err();
        assert!(matches!(err, RealizeError::ForwarderNamesExhausted));
    }

    #[test]
    fn management_ip_falls_back_to_first_connected_node() {
        let mut doc = two_hosts();
        doc.network_topology.topology[1].node[2].managed_by = None;
        let location = locate_bridges(
            &doc,
            &ports(&[("vnf-c", "port-c")]),
            &[],
            &ForwarderNameAllocator::new(),
        ).unwrap();
        assert_eq!(
            location.bridges["ovsdb://uuid/host2/bridge/br-int"].management_ip,
            "192.168.0.21"
        );
    }

    #[test]
    fn addresses_of_bridges() {
        let ips = bridge_addresses(
            &two_hosts(),
            &ports(&[("vnf-c", "port-c"), ("vnf-a", "port-a"), ("vnf-x", "port-x")]),
        );
        assert_eq!(
            ips.into_iter().collect::<Vec<_>>(),
            vec!["192.168.0.21".to_string(), "192.168.0.22".to_string()]
        );
    }

    #[tokio::test]
    async fn topology_failures_are_reported() {
        let mock = MockController::with_topology(two_hosts());
        let doc = fetch_topology(&mock).await.unwrap();
        assert_eq!(doc, two_hosts());

        mock.fail_on(Operation::GetTopology);
        let err = fetch_topology(&mock).await.unwrap_err();
        assert!(matches!(err, RealizeError::TopologyUnavailable(_)));
    }
}
