// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Realization of service function chains on an OpenDaylight controller.
//!
//! The topology locator finds the bridges hosting the VNFs of a chain, the forwarder
//! merge folds newly placed service functions into the forwarders already known to
//! the controller, and the sequencer pushes everything in order.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod alloc;
mod builder;
mod error;
mod forwarder;
mod realizer;
mod sequencer;
mod topology;

pub use alloc::ForwarderNameAllocator;
pub use builder::{
    ChainResources, PLACEHOLDER_FORWARDER, build_chain_resources, build_classifier_resources,
    path_name,
};
pub use error::RealizeError;
pub use forwarder::merge;
pub use realizer::{
    ChainRealizer, ClassifierRealizer, NETVIRTSFC_DRIVER, NetvirtClassifierRealizer,
    OPENDAYLIGHT_DRIVER, OpenDaylightRealizer,
};
pub use sequencer::{ForwarderLocks, Sequencer};
pub use topology::{
    BridgeId, BridgeLocation, BridgeMapping, bridge_addresses, fetch_topology, locate_bridges,
};
