// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Lifecycle of chains

use std::sync::Arc;

use model::{Chain, ChainCreateRequest, DELETABLE, Status, VnfPlacements};
use sfc::ChainRealizer;
use store::StoreError;
#[allow(unused)]
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::collab::{PortLookup, VnfManager, resolve_placements};
use crate::error::PluginError;
use crate::plugin::{Pending, check_driver};
use crate::pool::WorkerPool;
use crate::records::Records;

pub struct ChainPlugin {
    records: Arc<Records>,
    realizer: Arc<dyn ChainRealizer>,
    vnf_manager: Arc<dyn VnfManager>,
    port_lookup: Arc<dyn PortLookup>,
    pool: WorkerPool,
}

impl ChainPlugin {
    #[must_use]
    pub fn new(
        records: Arc<Records>,
        realizer: Arc<dyn ChainRealizer>,
        vnf_manager: Arc<dyn VnfManager>,
        port_lookup: Arc<dyn PortLookup>,
        pool: WorkerPool,
    ) -> Self {
        Self {
            records,
            realizer,
            vnf_manager,
            port_lookup,
            pool,
        }
    }

    /// Record a new chain and start realizing it. The VNFs are placed before
    /// anything is recorded.
    ///
    /// # Errors
    ///
    /// Fails if the request selects another driver, lists no VNF, or if a VNF
    /// can't be placed.
    #[instrument(level = "info", skip_all, fields(chain = %request.name))]
    pub async fn create(&self, request: ChainCreateRequest) -> Result<Pending<Chain>, PluginError> {
        check_driver(request.infra_driver.as_deref(), self.realizer.driver())?;
        if request.chain.is_empty() {
            return Err(PluginError::InvalidRequest(format!(
                "chain {} has no vnf",
                request.name
            )));
        }
        let placements =
            resolve_placements(&request.chain, &*self.vnf_manager, &*self.port_lookup).await?;

        let chain = self
            .records
            .chains()
            .create(Chain::from_request(request, self.realizer.driver()))?;
        self.records.persist();
        info!("Chain {} ({}) accepted", chain.name, chain.id);

        let task = self.pool.spawn(realize(
            self.records.clone(),
            self.realizer.clone(),
            chain.clone(),
            placements,
        ));
        Ok(Pending::new(chain, task))
    }

    /// # Errors
    ///
    /// Chains can't be updated: this fails with `NotSupported`, or with not-found if
    /// there's no such chain. The record is left untouched.
    pub async fn update(&self, id: Uuid) -> Result<Chain, PluginError> {
        let chain = self.records.chains().get(id)?;
        self.realizer.update_chain(&chain).await?;
        Ok(chain)
    }

    /// Start deleting a chain. A chain that was never realized is removed at once.
    ///
    /// # Errors
    ///
    /// Fails if the chain does not exist, can't be deleted in its current status, or
    /// is still the target of some classifier.
    #[instrument(level = "info", skip(self))]
    pub fn delete(&self, id: Uuid) -> Result<Pending<Chain>, PluginError> {
        let classifiers: Vec<String> = self
            .records
            .classifiers()
            .list()
            .into_iter()
            .filter(|c| c.chain == id)
            .map(|c| c.name)
            .collect();
        if !classifiers.is_empty() {
            return Err(PluginError::ChainInUse {
                chain: id,
                classifiers,
            });
        }

        let chain = self
            .records
            .chains()
            .update_status(id, DELETABLE, Status::PendingDelete)?;
        self.records.persist();

        let Some(instance_id) = chain.instance_id.clone() else {
            let chain = self.records.chains().delete(id, &[Status::PendingDelete])?;
            self.records.persist();
            info!("Chain {} was never realized, removed", chain.name);
            return Ok(Pending::done(chain));
        };

        let records = self.records.clone();
        let realizer = self.realizer.clone();
        let symmetrical = chain.symmetrical;
        let task = self.pool.spawn(async move {
            match realizer.delete_chain(&instance_id, symmetrical).await {
                Ok(()) => {
                    let chain = records.chains().delete(id, &[Status::PendingDelete])?;
                    records.persist();
                    Ok(chain)
                }
                Err(e) => {
                    error!("Failed to delete chain {id}: {e}");
                    if let Err(store_error) =
                        records
                            .chains()
                            .update_status(id, &[Status::PendingDelete], Status::Error)
                    {
                        warn!("Could not flag chain {id} as failed: {store_error}");
                    }
                    records.persist();
                    Err(e.into())
                }
            }
        });
        Ok(Pending::new(chain, task))
    }

    /// Start deleting the resources a failed creation left behind. Those that can't
    /// be deleted stay in the ledger of the chain.
    ///
    /// # Errors
    ///
    /// Fails if the chain does not exist or is not in `ERROR`.
    pub fn purge_orphans(&self, id: Uuid) -> Result<Pending<Chain>, PluginError> {
        let chain = self.records.chains().get(id)?;
        if chain.status != Status::Error {
            return Err(StoreError::InUse {
                kind: "chain",
                id,
                current: chain.status,
            }
            .into());
        }
        if chain.orphans.is_empty() {
            debug!("Chain {} has no orphan", chain.name);
            return Ok(Pending::done(chain));
        }

        let records = self.records.clone();
        let realizer = self.realizer.clone();
        let orphans = chain.orphans.clone();
        let task = self.pool.spawn(async move {
            let remaining = realizer.purge_orphans(&orphans).await;
            info!(
                "Purged {} of {} orphan(s) of chain {id}",
                orphans.len() - remaining.len(),
                orphans.len()
            );
            let chain = records
                .chains()
                .update(id, &[Status::Error], |c| c.orphans = remaining)?;
            records.persist();
            Ok(chain)
        });
        Ok(Pending::new(chain, task))
    }

    /// # Errors
    ///
    /// Fails if there's no chain with that id.
    pub fn get(&self, id: Uuid) -> Result<Chain, PluginError> {
        Ok(self.records.chains().get(id)?)
    }

    #[must_use]
    pub fn list(&self) -> Vec<Chain> {
        self.records.chains().list()
    }
}

/// Realize a recorded chain, then record the outcome.
async fn realize(
    records: Arc<Records>,
    realizer: Arc<dyn ChainRealizer>,
    chain: Chain,
    placements: VnfPlacements,
) -> Result<Chain, PluginError> {
    match realizer.create_chain(&chain, &placements).await {
        Ok(instance_id) => {
            info!("Chain {} is active as {instance_id}", chain.name);
            let chain = records
                .chains()
                .update(chain.id, &[Status::PendingCreate], |c| {
                    c.status = Status::Active;
                    c.instance_id = Some(instance_id);
                    c.orphans.clear();
                })?;
            records.persist();
            Ok(chain)
        }
        Err(e) => {
            error!("Failed to realize chain {}: {e}", chain.name);
            let orphans = e.orphans().to_vec();
            if !orphans.is_empty() {
                warn!(
                    "Chain {} left {} resource(s) behind",
                    chain.name,
                    orphans.len()
                );
            }
            if let Err(store_error) =
                records
                    .chains()
                    .update(chain.id, &[Status::PendingCreate], |c| {
                        c.status = Status::Error;
                        c.instance_id = None;
                        c.orphans = orphans;
                    })
            {
                warn!("Could not flag chain {} as failed: {store_error}", chain.id);
            }
            records.persist();
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Harness, chain_request};
    use model::ResourceKind;
    use odl_intf::mock::Operation;
    use odl_intf::wire::ServiceFunctionForwarder;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn create_realizes_the_chain() {
        let harness = Harness::new();
        let pending = harness
            .chains
            .create(chain_request("web", &["vnf-a", "vnf-c"], true))
            .await
            .unwrap();
        assert_eq!(pending.record().status, Status::PendingCreate);
        assert_eq!(pending.record().instance_id, None);

        let chain = pending.wait().await.unwrap();
        assert_eq!(chain.status, Status::Active);
        assert_eq!(chain.instance_id.as_deref(), Some("Path-web-Path-1"));
        assert_eq!(harness.chains.get(chain.id).unwrap(), chain);
        assert_eq!(harness.controller.forwarders().len(), 2);
        assert!(logs_contain("is active as Path-web-Path-1"));
    }

    #[tokio::test]
    async fn unplaceable_chains_are_not_recorded() {
        let harness = Harness::new();
        let err = harness
            .chains
            .create(chain_request("web", &["vnf-a", "vnf-z"], false))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(harness.chains.list().is_empty());
        assert!(harness.controller.calls().is_empty());

        let err = harness
            .chains
            .create(chain_request("empty", &[], false))
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn other_driver_is_refused() {
        let harness = Harness::new();
        let mut request = chain_request("web", &["vnf-a"], false);
        request.infra_driver = Some("onos".to_string());
        assert!(matches!(
            harness.chains.create(request).await,
            Err(PluginError::UnknownDriver { .. })
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_creation_keeps_the_ledger() {
        let harness = Harness::new();
        harness.controller.fail_on(Operation::PutChain);
        let pending = harness
            .chains
            .create(chain_request("web", &["vnf-a", "vnf-c"], false))
            .await
            .unwrap();
        let id = pending.record().id;
        let err = pending.wait().await.unwrap_err();
        assert!(matches!(
            err,
            PluginError::Realize(sfc::RealizeError::ChainCreateFailed { .. })
        ));

        let chain = harness.chains.get(id).unwrap();
        assert_eq!(chain.status, Status::Error);
        assert_eq!(chain.instance_id, None);
        let kinds: Vec<ResourceKind> = chain.orphans.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ResourceKind::ServiceFunction,
                ResourceKind::ServiceFunction,
                ResourceKind::ServiceFunctionForwarder,
                ResourceKind::ServiceFunctionForwarder,
            ]
        );

        harness.controller.heal();
        let chain = harness.chains.purge_orphans(id).unwrap().wait().await.unwrap();
        assert!(chain.orphans.is_empty());
        assert_eq!(chain.status, Status::Error);
        assert!(harness.controller.service_functions().is_empty());
        assert_eq!(harness.controller.forwarders().len(), 2);
    }

    #[tokio::test]
    async fn exhausted_forwarder_names_fail_the_chain() {
        let harness = Harness::new();
        harness.controller.seed_forwarder(ServiceFunctionForwarder {
            name: "sff18446744073709551614".to_string(),
            ip_mgmt_address: Some("192.168.0.99".to_string()),
            ..Default::default()
        });
        let pending = harness
            .chains
            .create(chain_request("web", &["vnf-a", "vnf-c"], false))
            .await
            .unwrap();
        let id = pending.record().id;
        assert!(matches!(
            pending.wait().await,
            Err(PluginError::Realize(sfc::RealizeError::ForwarderNamesExhausted))
        ));
        let chain = harness.chains.get(id).unwrap();
        assert_eq!(chain.status, Status::Error);
        assert!(chain.orphans.is_empty());
        assert!(harness.controller.service_functions().is_empty());
        harness.chains.delete(id).unwrap().wait().await.unwrap();
    }

    #[tokio::test]
    async fn purge_needs_a_failed_chain() {
        let harness = Harness::new();
        let chain = harness
            .chains
            .create(chain_request("web", &["vnf-a"], false))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert!(harness.chains.purge_orphans(chain.id).unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn update_is_not_supported() {
        let harness = Harness::new();
        let chain = harness
            .chains
            .create(chain_request("web", &["vnf-a"], false))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert!(matches!(
            harness.chains.update(chain.id).await,
            Err(PluginError::NotSupported(_))
        ));
        assert_eq!(harness.chains.get(chain.id).unwrap(), chain);
        assert!(harness.chains.update(Uuid::new_v4()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn symmetric_delete() {
        let harness = Harness::new();
        let chain = harness
            .chains
            .create(chain_request("web", &["vnf-a", "vnf-c"], true))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        let pending = harness.chains.delete(chain.id).unwrap();
        assert_eq!(pending.record().status, Status::PendingDelete);
        pending.wait().await.unwrap();

        let deleted: Vec<Option<String>> = harness
            .controller
            .calls_of(Operation::DeleteRenderedPath)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(
            deleted,
            vec![
                Some("Path-web-Path-1".to_string()),
                Some("Path-web-Path-1-Reverse".to_string())
            ]
        );
        assert!(harness.chains.get(chain.id).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn failed_delete_leaves_an_error_record() {
        let harness = Harness::new();
        let chain = harness
            .chains
            .create(chain_request("web", &["vnf-a"], true))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        harness
            .controller
            .fail_on_name(Operation::DeleteRenderedPath, "Path-web-Path-1-Reverse");

        let err = harness.chains.delete(chain.id).unwrap().wait().await.unwrap_err();
        assert!(matches!(
            err,
            PluginError::Realize(sfc::RealizeError::RenderedPathDeleteFailed(ref failed)) if failed.len() == 1
        ));
        assert_eq!(harness.chains.get(chain.id).unwrap().status, Status::Error);
        assert_eq!(harness.controller.calls_of(Operation::DeleteRenderedPath).len(), 2);

        /* a failed chain can be deleted again */
        harness.controller.heal();
        harness.chains.delete(chain.id).unwrap().wait().await.unwrap();
    }

    #[tokio::test]
    async fn never_realized_chain_is_deleted_locally() {
        let harness = Harness::new();
        harness.controller.fail_on(Operation::GetTopology);
        let pending = harness
            .chains
            .create(chain_request("web", &["vnf-a"], false))
            .await
            .unwrap();
        let id = pending.record().id;
        assert!(pending.wait().await.is_err());
        harness.controller.heal();

        let calls = harness.controller.calls().len();
        harness.chains.delete(id).unwrap().wait().await.unwrap();
        assert_eq!(harness.controller.calls().len(), calls);
        assert!(harness.chains.list().is_empty());
    }

    #[tokio::test]
    async fn pending_chains_can_not_be_deleted() {
        let harness = Harness::new();
        let pending = harness
            .chains
            .create(chain_request("web", &["vnf-a"], false))
            .await
            .unwrap();
        let id = pending.record().id;
        /* the realization has not started yet: the test runtime has a single thread */
        assert_eq!(harness.chains.get(id).unwrap().status, Status::PendingCreate);
        assert!(harness.chains.delete(id).unwrap_err().is_conflict());
        pending.wait().await.unwrap();
    }
}
