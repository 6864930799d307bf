// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Realizer capabilities and their OpenDaylight implementations

use std::sync::Arc;

use async_trait::async_trait;
use model::{Chain, Classifier, OrphanedResource, VnfPlacements};
use odl_intf::Controller;
#[allow(unused)]
use tracing::{debug, error, info, instrument, warn};

use crate::builder::build_classifier_resources;
use crate::error::RealizeError;
use crate::sequencer::Sequencer;

/// Name of the OpenDaylight SFC chain driver.
pub const OPENDAYLIGHT_DRIVER: &str = "opendaylight";
/// Name of the OpenDaylight NetVirt SFC classifier driver.
pub const NETVIRTSFC_DRIVER: &str = "netvirtsfc";

/// Something able to realize chains on an infrastructure.
#[async_trait]
pub trait ChainRealizer: Send + Sync {
    /// The name requests use to select this realizer.
    fn driver(&self) -> &'static str;

    /// Realize a chain. Returns the instance id of the realized chain.
    async fn create_chain(
        &self,
        chain: &Chain,
        placements: &VnfPlacements,
    ) -> Result<String, RealizeError>;

    async fn update_chain(&self, chain: &Chain) -> Result<(), RealizeError>;

    /// Tear down the realized chain `instance_id`.
    async fn delete_chain(&self, instance_id: &str, symmetrical: bool) -> Result<(), RealizeError>;

    /// Delete resources left behind by a failed creation. Returns those that remain.
    async fn purge_orphans(&self, orphans: &[OrphanedResource]) -> Vec<OrphanedResource>;
}

/// Something able to realize classifiers steering traffic into realized chains.
#[async_trait]
pub trait ClassifierRealizer: Send + Sync {
    fn driver(&self) -> &'static str;

    /// Realize a classifier redirecting into `rendered_path_id`. Returns the
    /// instance id of the classifier.
    async fn create_classifier(
        &self,
        classifier: &Classifier,
        rendered_path_id: &str,
    ) -> Result<String, RealizeError>;

    async fn update_classifier(&self, classifier: &Classifier) -> Result<(), RealizeError>;

    async fn delete_classifier(&self, instance_id: &str) -> Result<(), RealizeError>;
}

/// Chains as OpenDaylight SFC rendered service paths.
pub struct OpenDaylightRealizer {
    sequencer: Sequencer,
}

impl OpenDaylightRealizer {
    #[must_use]
    pub fn new(sequencer: Sequencer) -> Self {
        Self { sequencer }
    }
}

#[async_trait]
impl ChainRealizer for OpenDaylightRealizer {
    fn driver(&self) -> &'static str {
        OPENDAYLIGHT_DRIVER
    }

    async fn create_chain(
        &self,
        chain: &Chain,
        placements: &VnfPlacements,
    ) -> Result<String, RealizeError> {
        self.sequencer.create_chain(chain, placements).await
    }

    async fn update_chain(&self, chain: &Chain) -> Result<(), RealizeError> {
        warn!("Refusing to update chain {}", chain.name);
        Err(RealizeError::NotSupported("chain update"))
    }

    async fn delete_chain(&self, instance_id: &str, symmetrical: bool) -> Result<(), RealizeError> {
        self.sequencer.delete_chain(instance_id, symmetrical).await
    }

    async fn purge_orphans(&self, orphans: &[OrphanedResource]) -> Vec<OrphanedResource> {
        self.sequencer.purge(orphans).await
    }
}

/// Classifiers as access lists of the NetVirt SFC application.
pub struct NetvirtClassifierRealizer {
    controller: Arc<dyn Controller>,
}

impl NetvirtClassifierRealizer {
    #[must_use]
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl ClassifierRealizer for NetvirtClassifierRealizer {
    fn driver(&self) -> &'static str {
        NETVIRTSFC_DRIVER
    }

    #[instrument(level = "info", skip_all, fields(classifier = %classifier.name))]
    async fn create_classifier(
        &self,
        classifier: &Classifier,
        rendered_path_id: &str,
    ) -> Result<String, RealizeError> {
        let acl = build_classifier_resources(classifier, rendered_path_id);
        self.controller
            .put_access_list(&acl)
            .await
            .map_err(|source| RealizeError::ClassifierCreateFailed {
                name: acl.name.clone(),
                source,
            })?;
        info!("Classifier {} redirects into {rendered_path_id}", acl.name);
        Ok(acl.name)
    }

    async fn update_classifier(&self, classifier: &Classifier) -> Result<(), RealizeError> {
        warn!("Refusing to update classifier {}", classifier.name);
        Err(RealizeError::NotSupported("classifier update"))
    }

    async fn delete_classifier(&self, instance_id: &str) -> Result<(), RealizeError> {
        self.controller
            .delete_access_list(instance_id)
            .await
            .map_err(|source| RealizeError::ClassifierDeleteFailed {
                name: instance_id.to_owned(),
                source,
            })?;
        info!("Classifier {instance_id} deleted");
        Ok(())
    }
}
