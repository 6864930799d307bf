// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Collaborators consulted to place the VNFs of a chain: the VNF manager and the
//! virtual network port lookup.

use async_trait::async_trait;
use model::{VnfPlacement, VnfPlacements, VnfRef, extract_management_ip};
use serde::{Deserialize, Serialize};
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, error, info, warn};

use crate::error::PluginError;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("VNF {0} is not known to the VNF manager")]
    VnfNotFound(String),
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VnfAttributes {
    #[serde(default)]
    pub service_type: Option<String>,
}

/// A VNF as described by the VNF manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vnf {
    pub id: String,
    pub name: String,
    pub mgmt_url: String,
    #[serde(default)]
    pub attributes: VnfAttributes,
}

/// A port of the virtual network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub device_id: Option<String>, /* the VNF owning the port, if known */
}

#[async_trait]
pub trait VnfManager: Send + Sync {
    async fn get_vnf(&self, id: &str) -> Result<Vnf, CollaboratorError>;
}

#[async_trait]
pub trait PortLookup: Send + Sync {
    async fn list_ports(&self) -> Result<Vec<Port>, CollaboratorError>;
}

/// Find the port of a VNF. A port owned by the VNF wins. Else, the port whose name
/// embeds the VNF id is used, provided there is exactly one.
///
/// # Errors
///
/// Fails if no port matches, or if several names embed the VNF id.
pub fn find_vnf_port<'a>(vnf: &str, ports: &'a [Port]) -> Result<&'a Port, PluginError> {
    if let Some(port) = ports.iter().find(|p| p.device_id.as_deref() == Some(vnf)) {
        return Ok(port);
    }
    let candidates: Vec<&Port> = ports.iter().filter(|p| p.name.contains(vnf)).collect();
    match candidates.as_slice() {
        [] => Err(PluginError::PortNotFound(vnf.to_owned())),
        [port] => {
            debug!("Port {} of vnf {vnf} found by name", port.id);
            Ok(port)
        }
        several => Err(PluginError::AmbiguousPort {
            vnf: vnf.to_owned(),
            ports: several.iter().map(|p| p.id.clone()).collect(),
        }),
    }
}

/// Build the placement of every VNF of a chain.
///
/// # Errors
///
/// Collaborator failures are returned as they are. Fails as well if a VNF has no
/// management address, no service type or no port.
pub async fn resolve_placements(
    vnfs: &[VnfRef],
    vnf_manager: &dyn VnfManager,
    port_lookup: &dyn PortLookup,
) -> Result<VnfPlacements, PluginError> {
    let ports = port_lookup.list_ports().await?;
    let mut placements = VnfPlacements::new();
    for vnf_ref in vnfs {
        if placements.contains_key(vnf_ref) {
            continue;
        }
        let vnf = vnf_manager.get_vnf(vnf_ref).await?;
        let management_ip =
            extract_management_ip(&vnf.mgmt_url).ok_or_else(|| PluginError::NoManagementIp {
                vnf: vnf.id.clone(),
                mgmt_url: vnf.mgmt_url.clone(),
            })?;
        let service_type = vnf
            .attributes
            .service_type
            .clone()
            .ok_or_else(|| PluginError::MissingServiceType(vnf.id.clone()))?;
        let port = find_vnf_port(&vnf.id, &ports)?;
        debug!(
            "vnf {} ({}) is a {service_type} at {management_ip} on port {}",
            vnf.id, vnf.name, port.id
        );
        placements.insert(
            vnf_ref.clone(),
            VnfPlacement {
                vnf: vnf_ref.clone(),
                name: vnf.name,
                management_ip,
                service_type,
                port_id: port.id.clone(),
            },
        );
    }
    Ok(placements)
}
