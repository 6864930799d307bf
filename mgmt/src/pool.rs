// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Bounded pool of realization tasks

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
#[allow(unused)]
use tracing::{debug, trace};

/// Runs tasks with at most `workers` of them executing at any time.
/// Tasks in excess are spawned right away but wait for a slot.
#[derive(Clone, Debug)]
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    workers: usize,
}

impl WorkerPool {
    #[must_use]
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            slots: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of free slots.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.slots.available_permits()
    }

    /// Spawn `task` on the current runtime. It starts once a slot is free.
    pub fn spawn<F, T>(&self, task: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let slots = self.slots.clone();
        tokio::spawn(async move {
            /* the semaphore is never closed */
            let _slot = slots.acquire_owned().await.ok();
            trace!("Worker slot taken");
            task.await
        })
    }
}
