// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Errors of chain and classifier realization

use model::{OrphanedResource, VnfRef};
use odl_intf::OdlError;
use thiserror::Error;

/// The ways realizing (or un-realizing) a chain or a classifier can fail.
///
/// Creation failures name the step that failed and carry the ledger of the
/// resources that had been created on the controller before the failure.
#[derive(Debug, Error)]
pub enum RealizeError {
    #[error("Network topology is unavailable: {0}")]
    TopologyUnavailable(#[source] OdlError),
    #[error("Could not read forwarders from the controller: {0}")]
    ForwarderQueryFailed(#[source] OdlError),
    #[error("No placement known for vnf {0}")]
    MissingPlacement(VnfRef),
    #[error("No forwarder name left to allocate")]
    ForwarderNamesExhausted,
    #[error("Could not locate the bridge of vnfs {}", .0.join(", "))]
    UnplacedVnfs(Vec<VnfRef>),
    #[error("Failed to create service function {name}: {source}")]
    ServiceFunctionCreateFailed {
        name: String,
        #[source]
        source: OdlError,
        orphans: Vec<OrphanedResource>,
    },
    #[error("Failed to create service function forwarder {name}: {source}")]
    ForwarderCreateFailed {
        name: String,
        #[source]
        source: OdlError,
        orphans: Vec<OrphanedResource>,
    },
    #[error("Failed to create service function chain {name}: {source}")]
    ChainCreateFailed {
        name: String,
        #[source]
        source: OdlError,
        orphans: Vec<OrphanedResource>,
    },
    #[error("Failed to create service function path {name}: {source}")]
    PathCreateFailed {
        name: String,
        #[source]
        source: OdlError,
        orphans: Vec<OrphanedResource>,
    },
    #[error("Failed to render service function path {name}: {source}")]
    RenderedPathCreateFailed {
        name: String,
        #[source]
        source: OdlError,
        orphans: Vec<OrphanedResource>,
    },
    #[error("Failed to delete rendered service path(s): {}", display_failures(.0))]
    RenderedPathDeleteFailed(Vec<(String, OdlError)>),
    #[error("Failed to create classifier {name}: {source}")]
    ClassifierCreateFailed {
        name: String,
        #[source]
        source: OdlError,
    },
    #[error("Failed to delete classifier {name}: {source}")]
    ClassifierDeleteFailed {
        name: String,
        #[source]
        source: OdlError,
    },
    #[error("Operation not supported: {0}")]
    NotSupported(&'static str),
}

fn display_failures(failures: &[(String, OdlError)]) -> String {
    failures
        .iter()
        .map(|(name, e)| format!("{name} ({e})"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl RealizeError {
    /// The resources left on the controller by a failed creation.
    #[must_use]
    pub fn orphans(&self) -> &[OrphanedResource] {
        match self {
            RealizeError::ServiceFunctionCreateFailed { orphans, .. }
            | RealizeError::ForwarderCreateFailed { orphans, .. }
            | RealizeError::ChainCreateFailed { orphans, .. }
            | RealizeError::PathCreateFailed { orphans, .. }
            | RealizeError::RenderedPathCreateFailed { orphans, .. } => orphans,
            _ => &[],
        }
    }
}
