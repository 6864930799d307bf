// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Management of service function chains and classifiers.
//!
//! The plugins keep the records of chains and classifiers, and hand their
//! realization to the configured drivers. Requests reach them through the chain
//! processor, which runs on a thread of its own.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod collab;
mod drivers;
mod error;
mod inventory;
mod plugin;
mod pool;
mod processor;
mod records;

#[cfg(test)]
mod fixtures;

pub use collab::{
    CollaboratorError, Port, PortLookup, Vnf, VnfAttributes, VnfManager, find_vnf_port,
    resolve_placements,
};
pub use drivers::{Backends, Plugins, chain_realizer, classifier_realizer};
pub use error::PluginError;
pub use inventory::{Inventory, InventoryError};
pub use plugin::{ChainPlugin, ClassifierPlugin, Pending};
pub use pool::WorkerPool;
pub use processor::display::{ChainDetail, ChainTable, ClassifierDetail, ClassifierTable};
pub use processor::launch::{LaunchError, MgmtParams, start_mgmt};
pub use processor::mgmt_client::{
    ProcessorError, SfcChannelRequest, SfcClient, SfcRequest, SfcResponse,
};
pub use processor::proc::SfcProcessor;
pub use records::Records;
