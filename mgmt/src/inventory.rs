// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! A file-backed inventory of VNFs and ports, standing in for the VNF manager and
//! the port lookup service.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, info, warn};

use crate::collab::{CollaboratorError, Port, PortLookup, Vnf, VnfManager};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Failed to read inventory {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("Invalid inventory: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// VNFs and ports, as read from a YAML file:
///
/// ```yaml
/// vnfs:
///   - { id: vnf-a, name: fw1, mgmt_url: 'http://10.0.0.5/', attributes: { service_type: firewall } }
/// ports:
///   - { id: port-a, name: tap-vnf-a, device_id: vnf-a }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Inventory {
    #[serde(default)]
    pub vnfs: Vec<Vnf>,
    #[serde(default)]
    pub ports: Vec<Port>,
}

impl Inventory {
    /// # Errors
    ///
    /// Fails if the text is not a valid inventory.
    pub fn from_yaml(yaml: &str) -> Result<Self, InventoryError> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Read the inventory file at `path`. A missing file gives an empty inventory.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("No inventory at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(InventoryError::Read(path.to_path_buf(), e)),
        };
        let inventory = Self::from_yaml(&text)?;
        info!(
            "Inventory {} has {} vnf(s) and {} port(s)",
            path.display(),
            inventory.vnfs.len(),
            inventory.ports.len()
        );
        Ok(inventory)
    }
}

#[async_trait]
impl VnfManager for Inventory {
    async fn get_vnf(&self, id: &str) -> Result<Vnf, CollaboratorError> {
        self.vnfs
            .iter()
            .find(|vnf| vnf.id == id)
            .cloned()
            .ok_or_else(|| CollaboratorError::VnfNotFound(id.to_owned()))
    }
}

#[async_trait]
impl PortLookup for Inventory {
    async fn list_ports(&self) -> Result<Vec<Port>, CollaboratorError> {
        Ok(self.ports.clone())
    }
}
