// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Data model for service function chains and their classifiers.
//!
//! The types here are what the record store persists and what the plugins hand to
//! the realizers. Controller wire documents live in `sfc-odl-intf`.

#![deny(clippy::all, clippy::pedantic)]

mod chain;
mod classifier;
mod placement;
mod status;

pub use chain::{Chain, ChainCreateRequest, OrphanedResource, ResourceKind, VnfRef};
pub use classifier::{AclMatchCriteria, Classifier, ClassifierCreateRequest};
pub use placement::{VnfPlacement, VnfPlacements, extract_management_ip};
pub use status::{ACTIVE_UPDATE, DELETABLE, Status, UPDATABLE};

/// Name of the chain infra driver used when a request does not name one.
pub const DEFAULT_CHAIN_DRIVER: &str = "opendaylight";
/// Name of the classifier infra driver used when a request does not name one.
pub const DEFAULT_CLASSIFIER_DRIVER: &str = "netvirtsfc";
