// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Selection of the realizers, and assembly of the plugins using them.

use std::sync::Arc;

use config::{ChainDriver, ClassifierDriver, DriversConfig};
use odl_intf::Controller;
use sfc::{
    ChainRealizer, ClassifierRealizer, ForwarderLocks, ForwarderNameAllocator,
    NetvirtClassifierRealizer, OpenDaylightRealizer, Sequencer,
};
#[allow(unused)]
use tracing::{debug, info};

use crate::collab::{PortLookup, VnfManager};
use crate::plugin::{ChainPlugin, ClassifierPlugin};
use crate::pool::WorkerPool;
use crate::records::Records;

/// What the plugins talk to.
#[derive(Clone)]
pub struct Backends {
    pub controller: Arc<dyn Controller>,
    pub vnf_manager: Arc<dyn VnfManager>,
    pub port_lookup: Arc<dyn PortLookup>,
}

#[must_use]
pub fn chain_realizer(
    driver: ChainDriver,
    controller: Arc<dyn Controller>,
    allocator: Arc<ForwarderNameAllocator>,
) -> Arc<dyn ChainRealizer> {
    match driver {
        ChainDriver::OpenDaylight => Arc::new(OpenDaylightRealizer::new(Sequencer::new(
            controller,
            allocator,
            ForwarderLocks::new(),
        ))),
    }
}

#[must_use]
pub fn classifier_realizer(
    driver: ClassifierDriver,
    controller: Arc<dyn Controller>,
) -> Arc<dyn ClassifierRealizer> {
    match driver {
        ClassifierDriver::NetvirtSfc => Arc::new(NetvirtClassifierRealizer::new(controller)),
    }
}

pub struct Plugins {
    pub chains: ChainPlugin,
    pub classifiers: ClassifierPlugin,
}

impl Plugins {
    /// Build the plugins with the configured drivers. Both share one pool of
    /// `workers` realization tasks.
    #[must_use]
    pub fn new(
        drivers: &DriversConfig,
        workers: usize,
        records: &Arc<Records>,
        backends: Backends,
    ) -> Self {
        info!(
            "Chains realized by {}, classifiers by {}, {workers} worker(s)",
            drivers.chain, drivers.classifier
        );
        let pool = WorkerPool::new(workers);
        let allocator = Arc::new(ForwarderNameAllocator::new());
        let chains = ChainPlugin::new(
            records.clone(),
            chain_realizer(drivers.chain, backends.controller.clone(), allocator),
            backends.vnf_manager,
            backends.port_lookup,
            pool.clone(),
        );
        let classifiers = ClassifierPlugin::new(
            records.clone(),
            classifier_realizer(drivers.classifier, backends.controller),
            pool,
        );
        Self {
            chains,
            classifiers,
        }
    }
}
