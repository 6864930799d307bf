// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Chain and classifier plugins.
//!
//! A plugin validates a request, records it, and hands the remote work to the
//! worker pool. The caller gets the record as stored, and a handle to wait for the
//! outcome of the realization.

mod chain;
mod classifier;

pub use chain::ChainPlugin;
pub use classifier::ClassifierPlugin;

use tokio::task::JoinHandle;

use crate::error::PluginError;

/// A record whose realization is in progress.
#[derive(Debug)]
pub struct Pending<R> {
    record: R,
    task: Option<JoinHandle<Result<R, PluginError>>>,
}

impl<R> Pending<R> {
    pub(crate) fn new(record: R, task: JoinHandle<Result<R, PluginError>>) -> Self {
        Self {
            record,
            task: Some(task),
        }
    }

    /// A record with nothing left to do remotely.
    pub(crate) fn done(record: R) -> Self {
        Self { record, task: None }
    }

    /// The record as it was stored when the request was accepted.
    #[must_use]
    pub fn record(&self) -> &R {
        &self.record
    }

    /// Wait for the realization to end. Returns the record in its final state.
    ///
    /// # Errors
    ///
    /// Fails if the realization failed. The record has been moved to `ERROR` then.
    pub async fn wait(self) -> Result<R, PluginError> {
        match self.task {
            Some(task) => task.await?,
            None => Ok(self.record),
        }
    }
}

/// Check that a request selects the driver that is configured, if it selects one.
fn check_driver(requested: Option<&str>, configured: &'static str) -> Result<(), PluginError> {
    match requested {
        Some(requested) if requested != configured => Err(PluginError::UnknownDriver {
            requested: requested.to_owned(),
            configured,
        }),
        _ => Ok(()),
    }
}
