// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! In-memory [`Controller`] for tests.
//!
//! The mock keeps the configuration it is given, records every call in order and can
//! be told to fail specific operations, optionally for a single resource name only.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, Url};

use crate::client::{Controller, OdlError};
use crate::wire::{
    AccessList, CreateRenderedPathInput, NetworkTopologyDocument, ServiceFunction,
    ServiceFunctionChain, ServiceFunctionForwarder, ServiceFunctionPath,
};

/// The operations of a [`Controller`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    GetTopology,
    GetForwarders,
    PutServiceFunction,
    DeleteServiceFunction,
    PutForwarder,
    PutChain,
    DeleteChain,
    PutPath,
    DeletePath,
    CreateRenderedPath,
    DeleteRenderedPath,
    PutAccessList,
    DeleteAccessList,
}

/// A recorded call, with the name of the resource it targeted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub name: Option<String>,
}

impl Call {
    fn new(operation: Operation, name: Option<&str>) -> Self {
        Self {
            operation,
            name: name.map(str::to_owned),
        }
    }
}

#[derive(Default)]
struct MockState {
    topology: NetworkTopologyDocument,
    forwarders: BTreeMap<String, ServiceFunctionForwarder>,
    functions: BTreeMap<String, ServiceFunction>,
    chains: BTreeMap<String, ServiceFunctionChain>,
    paths: BTreeMap<String, ServiceFunctionPath>,
    rendered: BTreeSet<String>,
    access_lists: BTreeMap<String, AccessList>,
    calls: Vec<Call>,
    failures: Vec<(Operation, Option<String>)>,
    rejected_rsp_deletes: bool,
    rsp_counter: u64,
}

#[derive(Default)]
pub struct MockController {
    state: Mutex<MockState>,
}

fn injected(operation: Operation) -> OdlError {
    OdlError::Status {
        method: Method::from_bytes(format!("{operation:?}").as_bytes()).unwrap_or(Method::GET),
        url: Url::parse("http://mock.invalid/restconf/").expect("static url"),
        status: 500,
    }
}

impl MockController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_topology(topology: NetworkTopologyDocument) -> Self {
        let mock = Self::new();
        mock.set_topology(topology);
        mock
    }

    pub fn set_topology(&self, topology: NetworkTopologyDocument) {
        self.state.lock().topology = topology;
    }

    /// Pre-populate a forwarder, as if another tenant had configured it.
    pub fn seed_forwarder(&self, sff: ServiceFunctionForwarder) {
        self.state.lock().forwarders.insert(sff.name.clone(), sff);
    }

    /// Make every call of `operation` fail with status 500.
    pub fn fail_on(&self, operation: Operation) {
        self.state.lock().failures.push((operation, None));
    }

    /// Make calls of `operation` targeting `name` fail with status 500.
    pub fn fail_on_name(&self, operation: Operation, name: &str) {
        self.state
            .lock()
            .failures
            .push((operation, Some(name.to_owned())));
    }

    /// Make rendered path deletions reply `result: false`.
    pub fn reject_rendered_path_deletes(&self) {
        self.state.lock().rejected_rsp_deletes = true;
    }

    /// Forget about injected failures.
    pub fn heal(&self) {
        let mut state = self.state.lock();
        state.failures.clear();
        state.rejected_rsp_deletes = false;
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// The recorded calls of a given operation.
    #[must_use]
    pub fn calls_of(&self, operation: Operation) -> Vec<Call> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn forwarders(&self) -> Vec<ServiceFunctionForwarder> {
        self.state.lock().forwarders.values().cloned().collect()
    }

    #[must_use]
    pub fn forwarder(&self, name: &str) -> Option<ServiceFunctionForwarder> {
        self.state.lock().forwarders.get(name).cloned()
    }

    #[must_use]
    pub fn service_functions(&self) -> Vec<ServiceFunction> {
        self.state.lock().functions.values().cloned().collect()
    }

    #[must_use]
    pub fn chains(&self) -> Vec<ServiceFunctionChain> {
        self.state.lock().chains.values().cloned().collect()
    }

    #[must_use]
    pub fn paths(&self) -> Vec<ServiceFunctionPath> {
        self.state.lock().paths.values().cloned().collect()
    }

    #[must_use]
    pub fn rendered_paths(&self) -> Vec<String> {
        self.state.lock().rendered.iter().cloned().collect()
    }

    #[must_use]
    pub fn access_lists(&self) -> Vec<AccessList> {
        self.state.lock().access_lists.values().cloned().collect()
    }

    /// Record a call and tell if it should fail.
    fn record(&self, operation: Operation, name: Option<&str>) -> Result<(), OdlError> {
        let mut state = self.state.lock();
        state.calls.push(Call::new(operation, name));
        let fails = state.failures.iter().any(|(op, target)| {
            *op == operation && target.as_deref().is_none_or(|t| Some(t) == name)
        });
        if fails { Err(injected(operation)) } else { Ok(()) }
    }
}

#[async_trait]
impl Controller for MockController {
    async fn network_topology(&self) -> Result<NetworkTopologyDocument, OdlError> {
        self.record(Operation::GetTopology, None)?;
        Ok(self.state.lock().topology.clone())
    }

    async fn service_function_forwarders(&self) -> Result<Vec<ServiceFunctionForwarder>, OdlError> {
        self.record(Operation::GetForwarders, None)?;
        Ok(self.forwarders())
    }

    async fn put_service_function(&self, sf: &ServiceFunction) -> Result<(), OdlError> {
        self.record(Operation::PutServiceFunction, Some(&sf.name))?;
        self.state
            .lock()
            .functions
            .insert(sf.name.clone(), sf.clone());
        Ok(())
    }

    async fn delete_service_function(&self, name: &str) -> Result<(), OdlError> {
        self.record(Operation::DeleteServiceFunction, Some(name))?;
        self.state.lock().functions.remove(name);
        Ok(())
    }

    async fn put_service_function_forwarder(
        &self,
        sff: &ServiceFunctionForwarder,
    ) -> Result<(), OdlError> {
        self.record(Operation::PutForwarder, Some(&sff.name))?;
        self.seed_forwarder(sff.clone());
        Ok(())
    }

    async fn put_service_function_chain(&self, sfc: &ServiceFunctionChain) -> Result<(), OdlError> {
        self.record(Operation::PutChain, Some(&sfc.name))?;
        self.state.lock().chains.insert(sfc.name.clone(), sfc.clone());
        Ok(())
    }

    async fn delete_service_function_chain(&self, name: &str) -> Result<(), OdlError> {
        self.record(Operation::DeleteChain, Some(name))?;
        self.state.lock().chains.remove(name);
        Ok(())
    }

    async fn put_service_function_path(&self, sfp: &ServiceFunctionPath) -> Result<(), OdlError> {
        self.record(Operation::PutPath, Some(&sfp.name))?;
        self.state.lock().paths.insert(sfp.name.clone(), sfp.clone());
        Ok(())
    }

    async fn delete_service_function_path(&self, name: &str) -> Result<(), OdlError> {
        self.record(Operation::DeletePath, Some(name))?;
        self.state.lock().paths.remove(name);
        Ok(())
    }

    async fn create_rendered_path(&self, input: &CreateRenderedPathInput) -> Result<String, OdlError> {
        self.record(
            Operation::CreateRenderedPath,
            Some(&input.parent_service_function_path),
        )?;
        let mut state = self.state.lock();
        state.rsp_counter += 1;
        let name = format!("{}-Path-{}", input.parent_service_function_path, state.rsp_counter);
        if input.symmetric {
            state.rendered.insert(format!("{name}-Reverse"));
        }
        state.rendered.insert(name.clone());
        Ok(name)
    }

    async fn delete_rendered_path(&self, name: &str) -> Result<(), OdlError> {
        self.record(Operation::DeleteRenderedPath, Some(name))?;
        let mut state = self.state.lock();
        if state.rejected_rsp_deletes {
            return Err(OdlError::Rejected(format!("deletion of rendered path {name}")));
        }
        state.rendered.remove(name);
        Ok(())
    }

    async fn put_access_list(&self, acl: &AccessList) -> Result<(), OdlError> {
        self.record(Operation::PutAccessList, Some(&acl.name))?;
        self.state
            .lock()
            .access_lists
            .insert(acl.name.clone(), acl.clone());
        Ok(())
    }

    async fn delete_access_list(&self, name: &str) -> Result<(), OdlError> {
        self.record(Operation::DeleteAccessList, Some(name))?;
        self.state.lock().access_lists.remove(name);
        Ok(())
    }
}
