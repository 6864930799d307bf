// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Operational network topology, as exposed by the OVSDB southbound plugin

use serde::{Deserialize, Serialize};

/// Body of `GET restconf/operational/network-topology:network-topology/`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkTopologyDocument {
    #[serde(rename = "network-topology", default)]
    pub network_topology: NetworkTopology,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkTopology {
    #[serde(default)]
    pub topology: Vec<Topology>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(rename = "topology-id", default)]
    pub topology_id: String,
    #[serde(default)]
    pub node: Vec<Node>,
}

/// A topology node. OVSDB managers carry `connection-info`; bridges carry a bridge
/// name, their ports and a reference to their manager.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "node-id", default)]
    pub node_id: String,
    #[serde(rename = "ovsdb:bridge-name", default, skip_serializing_if = "Option::is_none")]
    pub bridge_name: Option<String>,
    #[serde(rename = "ovsdb:connection-info", default, skip_serializing_if = "Option::is_none")]
    pub connection_info: Option<ConnectionInfo>,
    #[serde(rename = "ovsdb:managed-by", default, skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    #[serde(rename = "termination-point", default, skip_serializing_if = "Vec::is_empty")]
    pub termination_point: Vec<TerminationPoint>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    #[serde(rename = "remote-ip", default, skip_serializing_if = "Option::is_none")]
    pub remote_ip: Option<String>,
    #[serde(rename = "remote-port", default, skip_serializing_if = "Option::is_none")]
    pub remote_port: Option<u16>,
    #[serde(rename = "local-ip", default, skip_serializing_if = "Option::is_none")]
    pub local_ip: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminationPoint {
    #[serde(rename = "tp-id", default)]
    pub tp_id: String,
    #[serde(rename = "ovsdb:name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "ovsdb:interface-external-ids", default, skip_serializing_if = "Vec::is_empty")]
    pub external_ids: Vec<ExternalId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalId {
    #[serde(rename = "external-id-key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "external-id-value", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Topology {
    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.node.iter().find(|node| node.node_id == node_id)
    }
}

impl Node {
    /// The node id referenced by `ovsdb:managed-by`, if any.
    ///
    /// The reference is an instance identifier such as
    /// `/network-topology:network-topology/network-topology:topology[network-topology:topology-id='ovsdb:1']/network-topology:node[network-topology:node-id='ovsdb://uuid/..']`
    /// of which we only want the last `node-id` key.
    #[must_use]
    pub fn manager_node_id(&self) -> Option<&str> {
        let path = self.managed_by.as_deref()?;
        let (_, key) = path.rsplit_once("node-id='")?;
        key.split_once('\'').map(|(id, _)| id)
    }

    /// The remote address of the OVSDB connection of this node, if known.
    #[must_use]
    pub fn remote_ip(&self) -> Option<&str> {
        self.connection_info.as_ref()?.remote_ip.as_deref()
    }
}

impl TerminationPoint {
    /// Tell if any external id of this termination point carries `value`.
    #[must_use]
    pub fn has_external_id_value(&self, value: &str) -> bool {
        self.external_ids
            .iter()
            .any(|id| id.value.as_deref() == Some(value))
    }

    /// Name of the local port: the OVS interface name if reported, else the tp id.
    #[must_use]
    pub fn port_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.tp_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
      "network-topology": {
        "topology": [
          {
            "topology-id": "ovsdb:1",
            "node": [
              {
                "node-id": "ovsdb://uuid/0b8b",
                "ovsdb:connection-info": { "remote-ip": "192.168.0.21", "remote-port": 6640, "local-ip": "192.168.0.2" }
              },
              {
                "node-id": "ovsdb://uuid/0b8b/bridge/br-int",
                "ovsdb:bridge-name": "br-int",
                "ovsdb:managed-by": "/network-topology:network-topology/network-topology:topology[network-topology:topology-id='ovsdb:1']/network-topology:node[network-topology:node-id='ovsdb://uuid/0b8b']",
                "termination-point": [
                  {
                    "tp-id": "tap3c1f",
                    "ovsdb:name": "tap3c1f",
                    "ovsdb:interface-external-ids": [
                      { "external-id-key": "iface-id", "external-id-value": "3c1f0e2a" },
                      { "external-id-key": "attached-mac", "external-id-value": "fa:16:3e:00:00:01" }
                    ]
                  },
                  { "tp-id": "br-int" }
                ]
              }
            ]
          },
          { "topology-id": "flow:1" }
        ]
      }
    }"#;

    #[test]
    fn parse_ovsdb_topology() {
        let doc: NetworkTopologyDocument = serde_json::from_str(SAMPLE).unwrap();
        let topologies = &doc.network_topology.topology;
        assert_eq!(topologies.len(), 2);
        assert!(topologies[1].node.is_empty());

        let ovsdb = &topologies[0];
        let bridge = ovsdb.node("ovsdb://uuid/0b8b/bridge/br-int").unwrap();
        assert_eq!(bridge.bridge_name.as_deref(), Some("br-int"));
        assert_eq!(bridge.remote_ip(), None);
        assert_eq!(bridge.manager_node_id(), Some("ovsdb://uuid/0b8b"));

        let manager = ovsdb.node(bridge.manager_node_id().unwrap()).unwrap();
        assert_eq!(manager.remote_ip(), Some("192.168.0.21"));

        let tap = &bridge.termination_point[0];
        assert!(tap.has_external_id_value("3c1f0e2a"));
        assert!(!tap.has_external_id_value("3c1f"));
        assert_eq!(tap.port_name(), "tap3c1f");
        assert_eq!(bridge.termination_point[1].port_name(), "br-int");
    }

    #[test]
    fn empty_topology() {
        let doc: NetworkTopologyDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.network_topology.topology.is_empty());
    }
}
