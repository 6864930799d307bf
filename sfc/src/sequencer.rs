// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Ordered creation and deletion of the controller resources of a chain

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use model::{Chain, OrphanedResource, ResourceKind, VnfPlacements};
use odl_intf::Controller;
use odl_intf::wire::CreateRenderedPathInput;
use tokio::sync::{Mutex, OwnedMutexGuard};
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

use crate::alloc::ForwarderNameAllocator;
use crate::builder::build_chain_resources;
use crate::error::RealizeError;
use crate::forwarder::merge;
use crate::topology::{bridge_addresses, fetch_topology, locate_bridges};

/// Locks serializing the read-modify-write of forwarders, one per switch
/// management address.
#[derive(Clone, Debug, Default)]
pub struct ForwarderLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ForwarderLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the locks of all the `addresses`. Locks are always taken in address
    /// order so that concurrent callers can't deadlock.
    pub async fn lock_all(&self, addresses: &BTreeSet<String>) -> Vec<OwnedMutexGuard<()>> {
        let mut guards = Vec::with_capacity(addresses.len());
        for address in addresses {
            let lock = self.locks.entry(address.clone()).or_default().clone();
            trace!("Locking forwarders at {address}");
            guards.push(lock.lock_owned().await);
        }
        guards
    }
}

/// Drives the controller through the creation and deletion of chains.
///
/// Creation happens in a fixed order: service functions, forwarders, chain, path and
/// finally the rendered path. Nothing is attempted after the first failure and
/// nothing is rolled back: the failure carries the ledger of what was created.
pub struct Sequencer {
    controller: Arc<dyn Controller>,
    allocator: Arc<ForwarderNameAllocator>,
    locks: ForwarderLocks,
}

impl Sequencer {
    #[must_use]
    pub fn new(
        controller: Arc<dyn Controller>,
        allocator: Arc<ForwarderNameAllocator>,
        locks: ForwarderLocks,
    ) -> Self {
        Self {
            controller,
            allocator,
            locks,
        }
    }

    #[must_use]
    pub fn controller(&self) -> &Arc<dyn Controller> {
        &self.controller
    }

    /// Realize `chain` on the controller. Returns the name of the rendered path,
    /// which identifies the realized chain.
    ///
    /// # Errors
    ///
    /// Fails if the topology or the forwarders can't be read, if some VNF can't be
    /// located, or with the error of the first creation step that fails.
    #[instrument(level = "info", skip_all, fields(chain = %chain.name))]
    pub async fn create_chain(
        &self,
        chain: &Chain,
        placements: &VnfPlacements,
    ) -> Result<String, RealizeError> {
        let controller = self.controller.as_ref();
        let mut resources = build_chain_resources(chain, placements)?;

        let topology = fetch_topology(controller).await?;
        let addresses = bridge_addresses(&topology, &resources.vnf_ports);
        let guards = self.locks.lock_all(&addresses).await;

        let existing = controller
            .service_function_forwarders()
            .await
            .map_err(RealizeError::ForwarderQueryFailed)?;
        debug!("Controller has {} forwarder(s)", existing.len());
        self.allocator
            .skip_taken(existing.iter().map(|sff| sff.name.as_str()));

        let location = locate_bridges(&topology, &resources.vnf_ports, &existing, &self.allocator)?;
        if !location.unplaced.is_empty() {
            error!("Could not locate vnfs {:?}", location.unplaced);
            return Err(RealizeError::UnplacedVnfs(location.unplaced));
        }
        resources.bind_forwarders(&location);

        let mut orphans = Vec::new();

        for sf in &resources.service_functions {
            if let Err(source) = controller.put_service_function(sf).await {
                error!("Failed to create service function {}: {source}", sf.name);
                return Err(RealizeError::ServiceFunctionCreateFailed {
                    name: sf.name.clone(),
                    source,
                    orphans,
                });
            }
            debug!("Created service function {}", sf.name);
            orphans.push(OrphanedResource::new(ResourceKind::ServiceFunction, &sf.name));
        }

        let forwarders = merge(&location.bridges, &resources.functions_by_vnf(), &existing);
        for sff in &forwarders {
            if let Err(source) = controller.put_service_function_forwarder(sff).await {
                error!("Failed to create forwarder {}: {source}", sff.name);
                return Err(RealizeError::ForwarderCreateFailed {
                    name: sff.name.clone(),
                    source,
                    orphans,
                });
            }
            debug!("Wrote forwarder {} ({} entries)", sff.name, sff.dictionary.len());
            orphans.push(OrphanedResource::new(
                ResourceKind::ServiceFunctionForwarder,
                &sff.name,
            ));
        }
        drop(guards);

        let sfc = &resources.chain_doc;
        if let Err(source) = controller.put_service_function_chain(sfc).await {
            error!("Failed to create service function chain {}: {source}", sfc.name);
            return Err(RealizeError::ChainCreateFailed {
                name: sfc.name.clone(),
                source,
                orphans,
            });
        }
        orphans.push(OrphanedResource::new(ResourceKind::ServiceFunctionChain, &sfc.name));

        let sfp = &resources.path_doc;
        if let Err(source) = controller.put_service_function_path(sfp).await {
            error!("Failed to create service function path {}: {source}", sfp.name);
            return Err(RealizeError::PathCreateFailed {
                name: sfp.name.clone(),
                source,
                orphans,
            });
        }
        orphans.push(OrphanedResource::new(ResourceKind::ServiceFunctionPath, &sfp.name));

        let input = CreateRenderedPathInput {
            parent_service_function_path: sfp.name.clone(),
            symmetric: chain.symmetrical,
        };
        match controller.create_rendered_path(&input).await {
            Ok(instance_id) => {
                info!("Chain {} realized as {instance_id}", chain.name);
                Ok(instance_id)
            }
            Err(source) => {
                error!("Failed to render path {}: {source}", sfp.name);
                Err(RealizeError::RenderedPathCreateFailed {
                    name: sfp.name.clone(),
                    source,
                    orphans,
                })
            }
        }
    }

    /// Remove the rendered path `instance_id` and, for symmetric chains, its reverse.
    /// Both removals are attempted even if the first one fails.
    ///
    /// # Errors
    ///
    /// Fails with [`RealizeError::RenderedPathDeleteFailed`] listing the paths that
    /// could not be removed.
    #[instrument(level = "info", skip(self))]
    pub async fn delete_chain(&self, instance_id: &str, symmetrical: bool) -> Result<(), RealizeError> {
        let mut names = vec![instance_id.to_owned()];
        if symmetrical {
            names.push(Chain::reverse_instance_id(instance_id));
        }
        let mut failures = Vec::new();
        for name in names {
            match self.controller.delete_rendered_path(&name).await {
                Ok(()) => debug!("Deleted rendered path {name}"),
                Err(e) => {
                    error!("Failed to delete rendered path {name}: {e}");
                    failures.push((name, e));
                }
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(RealizeError::RenderedPathDeleteFailed(failures))
        }
    }

    /// Delete orphaned resources, dependents first. Forwarders are shared by all
    /// chains and are left alone. Returns the resources that could not be deleted.
    #[instrument(level = "info", skip_all)]
    pub async fn purge(&self, orphans: &[OrphanedResource]) -> Vec<OrphanedResource> {
        let mut remaining = Vec::new();
        for orphan in orphans.iter().rev() {
            let result = match orphan.kind {
                ResourceKind::ServiceFunctionPath => {
                    self.controller.delete_service_function_path(&orphan.name).await
                }
                ResourceKind::ServiceFunctionChain => {
                    self.controller.delete_service_function_chain(&orphan.name).await
                }
                ResourceKind::ServiceFunction => {
                    self.controller.delete_service_function(&orphan.name).await
                }
                ResourceKind::ServiceFunctionForwarder => {
                    debug!("Keeping shared {orphan}");
                    continue;
                }
            };
            match result {
                Ok(()) => info!("Purged {orphan}"),
                Err(e) if e.is_not_found() => info!("{orphan} was already gone"),
                Err(e) => {
                    warn!("Could not purge {orphan}: {e}");
                    remaining.push(orphan.clone());
                }
            }
        }
        remaining.reverse();
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::{placements, web_chain};
    use crate::topology::tests::two_hosts;
    use odl_intf::mock::{Call, MockController, Operation};
    use odl_intf::wire::ServiceFunctionForwarder;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn sequencer(mock: &Arc<MockController>) -> Sequencer {
        Sequencer::new(
            mock.clone(),
            Arc::new(ForwarderNameAllocator::new()),
            ForwarderLocks::new(),
        )
    }

    fn operations(mock: &MockController) -> Vec<Operation> {
        mock.calls().into_iter().map(|c| c.operation).collect()
    }

    #[tokio::test]
    #[traced_test]
    async fn create_in_order() {
        let mock = Arc::new(MockController::with_topology(two_hosts()));
        let instance_id = sequencer(&mock)
            .create_chain(&web_chain(true), &placements())
            .await
            .unwrap();
        assert_eq!(instance_id, "Path-web-Path-1");
        assert_eq!(
            operations(&mock),
            vec![
                Operation::GetTopology,
                Operation::GetForwarders,
                Operation::PutServiceFunction,
                Operation::PutServiceFunction,
                Operation::PutForwarder,
                Operation::PutForwarder,
                Operation::PutChain,
                Operation::PutPath,
                Operation::CreateRenderedPath,
            ]
        );
        let functions = mock.service_functions();
        let fw1 = functions.iter().find(|sf| sf.name == "fw1").unwrap();
        assert_eq!(fw1.forwarder(), Some("sff1"));
        let dpi1 = functions.iter().find(|sf| sf.name == "dpi1").unwrap();
        assert_eq!(dpi1.forwarder(), Some("sff2"));
        assert_eq!(
            mock.rendered_paths(),
            vec!["Path-web-Path-1".to_string(), "Path-web-Path-1-Reverse".to_string()]
        );
        assert!(logs_contain("Chain web realized as Path-web-Path-1"));
    }

    #[tokio::test]
    async fn forwarder_failure_short_circuits() {
        let mock = Arc::new(MockController::with_topology(two_hosts()));
        mock.fail_on(Operation::PutForwarder);
        let err = sequencer(&mock)
            .create_chain(&web_chain(false), &placements())
            .await
            .unwrap_err();
        assert!(matches!(err, RealizeError::ForwarderCreateFailed { .. }));
        assert_eq!(
            err.orphans(),
            &[
                OrphanedResource::new(ResourceKind::ServiceFunction, "fw1"),
                OrphanedResource::new(ResourceKind::ServiceFunction, "dpi1"),
            ]
        );
        for op in [Operation::PutChain, Operation::PutPath, Operation::CreateRenderedPath] {
            assert!(mock.calls_of(op).is_empty(), "unexpected {op:?}");
        }
    }

    #[tokio::test]
    async fn unplaced_vnfs_prevent_any_mutation() {
        let mock = Arc::new(MockController::with_topology(two_hosts()));
        let mut placements = placements();
        if let Some(p) = placements.get_mut("vnf-c") {
            p.port_id = "port-x".to_string();
        }
        let err = sequencer(&mock)
            .create_chain(&web_chain(false), &placements)
            .await
            .unwrap_err();
        assert!(matches!(&err, RealizeError::UnplacedVnfs(vnfs) if vnfs == &["vnf-c".to_string()]));
        assert_eq!(operations(&mock), vec![Operation::GetTopology, Operation::GetForwarders]);
    }

    #[tokio::test]
    async fn step_specific_failures() {
        let cases = [
            (Operation::GetTopology, "TopologyUnavailable"),
            (Operation::GetForwarders, "ForwarderQueryFailed"),
            (Operation::PutServiceFunction, "ServiceFunctionCreateFailed"),
            (Operation::PutChain, "ChainCreateFailed"),
            (Operation::PutPath, "PathCreateFailed"),
            (Operation::CreateRenderedPath, "RenderedPathCreateFailed"),
        ];
        for (operation, expected) in cases {
            let mock = Arc::new(MockController::with_topology(two_hosts()));
            mock.fail_on(operation);
            let err = sequencer(&mock)
                .create_chain(&web_chain(false), &placements())
                .await
                .unwrap_err();
            let debug = format!("{err:?}");
            assert!(debug.starts_with(expected), "{operation:?}: {debug}");
        }
    }

    #[tokio::test]
    async fn recreation_reuses_forwarders() {
        let mock = Arc::new(MockController::with_topology(two_hosts()));
        let sequencer = sequencer(&mock);
        sequencer
            .create_chain(&web_chain(false), &placements())
            .await
            .unwrap();
        let before = mock.forwarders();
        sequencer
            .create_chain(&web_chain(false), &placements())
            .await
            .unwrap();
        assert_eq!(mock.forwarders(), before);
    }

    #[tokio::test]
    async fn fresh_names_avoid_existing_forwarders() {
        let mock = Arc::new(MockController::with_topology(two_hosts()));
        mock.seed_forwarder(ServiceFunctionForwarder {
            name: "sff5".to_string(),
            ip_mgmt_address: Some("192.168.0.99".to_string()),
            ..Default::default()
        });
        /* a new process: its allocator starts over */
        sequencer(&mock)
            .create_chain(&web_chain(false), &placements())
            .await
            .unwrap();
        let names: Vec<String> = mock.forwarders().into_iter().map(|sff| sff.name).collect();
        assert_eq!(names, vec!["sff5", "sff6", "sff7"]);
    }

    #[tokio::test]
    async fn out_of_range_forwarder_names_are_ignored() {
        let mock = Arc::new(MockController::with_topology(two_hosts()));
        mock.seed_forwarder(ServiceFunctionForwarder {
            name: "sff18446744073709551615".to_string(),
            ip_mgmt_address: Some("192.168.0.99".to_string()),
            ..Default::default()
        });
        sequencer(&mock)
            .create_chain(&web_chain(false), &placements())
            .await
            .unwrap();
        let names: Vec<String> = mock.forwarders().into_iter().map(|sff| sff.name).collect();
        assert_eq!(names, vec!["sff1", "sff18446744073709551615", "sff2"]);
    }

    #[tokio::test]
    #[traced_test]
    async fn symmetric_delete_removes_both_paths() {
        let mock = Arc::new(MockController::new());
        sequencer(&mock).delete_chain("abc", true).await.unwrap();
        assert_eq!(
            mock.calls(),
            vec![
                Call {
                    operation: Operation::DeleteRenderedPath,
                    name: Some("abc".to_string())
                },
                Call {
                    operation: Operation::DeleteRenderedPath,
                    name: Some("abc-Reverse".to_string())
                },
            ]
        );
    }

    #[tokio::test]
    async fn delete_attempts_both_paths() {
        let mock = Arc::new(MockController::new());
        mock.fail_on_name(Operation::DeleteRenderedPath, "abc");
        let err = sequencer(&mock).delete_chain("abc", true).await.unwrap_err();
        let RealizeError::RenderedPathDeleteFailed(failures) = err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "abc");
        assert_eq!(mock.calls_of(Operation::DeleteRenderedPath).len(), 2);
    }

    #[tokio::test]
    async fn rejected_delete_is_a_failure() {
        let mock = Arc::new(MockController::new());
        mock.reject_rendered_path_deletes();
        let err = sequencer(&mock).delete_chain("abc", false).await.unwrap_err();
        assert!(matches!(err, RealizeError::RenderedPathDeleteFailed(_)));
    }

    #[tokio::test]
    async fn purge_keeps_forwarders_and_failures() {
        let mock = Arc::new(MockController::new());
        mock.fail_on_name(Operation::DeleteServiceFunction, "dpi1");
        let orphans = vec![
            OrphanedResource::new(ResourceKind::ServiceFunction, "fw1"),
            OrphanedResource::new(ResourceKind::ServiceFunction, "dpi1"),
            OrphanedResource::new(ResourceKind::ServiceFunctionForwarder, "sff1"),
            OrphanedResource::new(ResourceKind::ServiceFunctionChain, "web"),
        ];
        let remaining = sequencer(&mock).purge(&orphans).await;
        assert_eq!(
            remaining,
            vec![OrphanedResource::new(ResourceKind::ServiceFunction, "dpi1")]
        );
        assert_eq!(
            operations(&mock),
            vec![
                Operation::DeleteChain,
                Operation::DeleteServiceFunction,
                Operation::DeleteServiceFunction,
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creations_share_forwarders() {
        let mock = Arc::new(MockController::with_topology(two_hosts()));
        let sequencer = Arc::new(sequencer(&mock));
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let sequencer = sequencer.clone();
                tokio::spawn(async move {
                    sequencer
                        .create_chain(&web_chain(false), &placements())
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        let names: Vec<String> = mock.forwarders().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["sff1".to_string(), "sff2".to_string()]);
    }
}
