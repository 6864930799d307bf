// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Errors of the chain and classifier plugins

use sfc::RealizeError;
use store::StoreError;
use thiserror::Error;
use uuid::Uuid;

use crate::collab::CollaboratorError;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error("No port found for vnf {0}")]
    PortNotFound(String),
    #[error("Several ports may belong to vnf {vnf}: {ports:?}")]
    AmbiguousPort { vnf: String, ports: Vec<String> },
    #[error("No management address in '{mgmt_url}' of vnf {vnf}")]
    NoManagementIp { vnf: String, mgmt_url: String },
    #[error("Vnf {0} has no service type")]
    MissingServiceType(String),
    #[error("Driver '{requested}' is not available, '{configured}' is")]
    UnknownDriver {
        requested: String,
        configured: &'static str,
    },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Chain {0} is not realized")]
    ChainNotRealized(Uuid),
    #[error("Chain {chain} is used by classifier(s) {classifiers:?}")]
    ChainInUse { chain: Uuid, classifiers: Vec<String> },
    #[error("Not supported: {0}")]
    NotSupported(&'static str),
    #[error(transparent)]
    Realize(RealizeError),
    #[error("Realization task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<RealizeError> for PluginError {
    fn from(e: RealizeError) -> Self {
        match e {
            RealizeError::NotSupported(what) => PluginError::NotSupported(what),
            e => PluginError::Realize(e),
        }
    }
}

impl PluginError {
    /// Tell if the request conflicts with the state of the records.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            PluginError::Store(StoreError::DuplicateName { .. } | StoreError::InUse { .. })
                | PluginError::ChainNotRealized(_)
                | PluginError::ChainInUse { .. }
        )
    }

    /// Tell if the request refers to something that does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PluginError::Store(StoreError::NotFound { .. })
                | PluginError::Collaborator(CollaboratorError::VnfNotFound(_))
                | PluginError::PortNotFound(_)
        )
    }
}
