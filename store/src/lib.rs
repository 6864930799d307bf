// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Record store for chains and classifiers.
//!
//! Records live in memory. The whole store can be saved to and loaded from a JSON
//! snapshot so that state survives restarts.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod mem;
mod record;

use std::path::Path;

use model::{Chain, Classifier, Status};
use serde::{Deserialize, Serialize};
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub use mem::MemStore;
pub use record::Record;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No {kind} with id {id}")]
    NotFound { kind: &'static str, id: Uuid },
    #[error("A {kind} named '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },
    #[error("{kind} {id} is in use (status {current})")]
    InUse {
        kind: &'static str,
        id: Uuid,
        current: Status,
    },
    #[error("Could not access state file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid state file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of a [`RecordStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    chains: Vec<Chain>,
    #[serde(default)]
    classifiers: Vec<Classifier>,
}

/// Chains and classifiers. Classifier names are unique, chain names need not be.
pub struct RecordStore {
    pub chains: MemStore<Chain>,
    pub classifiers: MemStore<Classifier>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self {
            chains: MemStore::new(),
            classifiers: MemStore::with_unique_names(),
        }
    }
}

impl RecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from the snapshot at `path`. A missing file gives an empty store.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be read or is not a valid snapshot.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let store = Self::new();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state at {}, starting afresh", path.display());
                return Ok(store);
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot = serde_json::from_str(&text)?;
        info!(
            "Loaded {} chain(s) and {} classifier(s) from {}",
            snapshot.chains.len(),
            snapshot.classifiers.len(),
            path.display()
        );
        store.chains.replace_all(snapshot.chains)?;
        store.classifiers.replace_all(snapshot.classifiers)?;
        Ok(store)
    }

    /// Save a snapshot of the store to `path`, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot can't be written.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            chains: self.chains.list(),
            classifiers: self.classifiers.list(),
        };
        let text = serde_json::to_string_pretty(&snapshot)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, path)?;
        debug!("Saved state to {}", path.display());
        Ok(())
    }
}
