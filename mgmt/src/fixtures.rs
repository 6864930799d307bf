// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Test fixtures: two hypervisors, two VNFs, and plugins driving a mock controller.

use std::collections::BTreeMap;
use std::sync::Arc;

use config::DriversConfig;
use model::{AclMatchCriteria, ChainCreateRequest, ClassifierCreateRequest};
use odl_intf::mock::MockController;
use odl_intf::wire::NetworkTopologyDocument;
use store::RecordStore;
use uuid::Uuid;

use crate::drivers::{Backends, Plugins};
use crate::inventory::Inventory;
use crate::plugin::{ChainPlugin, ClassifierPlugin};
use crate::records::Records;

/// vnf-a on host1 (192.168.0.21), vnf-c on host2 (192.168.0.22).
pub(crate) fn topology() -> NetworkTopologyDocument {
    serde_json::from_value(serde_json::json!({
      "network-topology": {
        "topology": [{
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
              "termination-point": [{
                "tp-id": "tap-a",
                "ovsdb:interface-external-ids": [
                  { "external-id-key": "iface-id", "external-id-value": "port-a" }
                ]
              }]
            },
            {
              "node-id": "ovsdb://uuid/host2",
              "ovsdb:connection-info": { "remote-ip": "192.168.0.22", "remote-port": 6640 }
            },
            {
              "node-id": "ovsdb://uuid/host2/bridge/br-int",
              "ovsdb:bridge-name": "br-int",
              "ovsdb:managed-by": "/network-topology:network-topology/network-topology:topology[network-topology:topology-id='ovsdb:1']/network-topology:node[network-topology:node-id='ovsdb://uuid/host2']",
              "termination-point": [{
                "tp-id": "tap-c",
                "ovsdb:interface-external-ids": [
                  { "external-id-key": "iface-id", "external-id-value": "port-c" }
                ]
              }]
            }
          ]
        }]
      }
    }))
    .unwrap()
}

pub(crate) fn inventory() -> Inventory {
    Inventory::from_yaml(
        "
vnfs:
  - { id: vnf-a, name: fw1, mgmt_url: '{\"vdu1\": \"10.0.0.5\"}', attributes: { service_type: firewall } }
  - { id: vnf-c, name: dpi1, mgmt_url: 'http://10.0.0.7:8080/', attributes: { service_type: dpi } }
ports:
  - { id: port-a, name: tap-vnf-a, device_id: vnf-a }
  - { id: port-c, name: port-of-vnf-c }
",
    )
    .unwrap()
}

pub(crate) fn chain_request(name: &str, vnfs: &[&str], symmetrical: bool) -> ChainCreateRequest {
    ChainCreateRequest {
        name: name.to_string(),
        description: None,
        chain: vnfs.iter().map(|v| (*v).to_string()).collect(),
        symmetrical,
        infra_driver: None,
        attributes: BTreeMap::new(),
    }
}

pub(crate) fn classifier_request(
    name: &str,
    chain: Uuid,
    source_port: Option<u16>,
) -> ClassifierCreateRequest {
    ClassifierCreateRequest {
        name: name.to_string(),
        description: None,
        chain,
        acl_match_criteria: AclMatchCriteria {
            source_port,
            ..Default::default()
        },
        infra_driver: None,
        attributes: BTreeMap::new(),
    }
}

pub(crate) struct Harness {
    pub controller: Arc<MockController>,
    pub chains: ChainPlugin,
    pub classifiers: ClassifierPlugin,
}

impl Harness {
    pub fn new() -> Self {
        let controller = Arc::new(MockController::with_topology(topology()));
        let inventory = Arc::new(inventory());
        let records = Arc::new(Records::volatile(RecordStore::new()));
        let backends = Backends {
            controller: controller.clone(),
            vnf_manager: inventory.clone(),
            port_lookup: inventory,
        };
        let Plugins {
            chains,
            classifiers,
        } = Plugins::new(&DriversConfig::default(), 2, &records, backends);
        Self {
            controller,
            chains,
            classifiers,
        }
    }
}
