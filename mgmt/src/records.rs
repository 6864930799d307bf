// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The record store shared by the plugins, saved after every change.

use std::path::{Path, PathBuf};

use model::{Chain, Classifier};
use parking_lot::Mutex;
use store::{MemStore, RecordStore};
#[allow(unused)]
use tracing::{debug, error, info, warn};

pub struct Records {
    store: RecordStore,
    state_file: Option<PathBuf>,
    saving: Mutex<()>, /* one snapshot written at a time */
}

impl Records {
    /// Records saved to `state_file` after every change.
    #[must_use]
    pub fn persistent(store: RecordStore, state_file: &Path) -> Self {
        Self {
            store,
            state_file: Some(state_file.to_path_buf()),
            saving: Mutex::new(()),
        }
    }

    /// Records that live in memory only.
    #[must_use]
    pub fn volatile(store: RecordStore) -> Self {
        Self {
            store,
            state_file: None,
            saving: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn chains(&self) -> &MemStore<Chain> {
        &self.store.chains
    }

    #[must_use]
    pub fn classifiers(&self) -> &MemStore<Classifier> {
        &self.store.classifiers
    }

    /// Save a snapshot of the records, if they are persistent. A failure is logged:
    /// the in-memory records stay authoritative and the next change saves again.
    pub fn persist(&self) {
        let Some(path) = &self.state_file else {
            return;
        };
        let _guard = self.saving.lock();
        if let Err(e) = self.store.save(path) {
            error!("Could not save state to {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::ChainCreateRequest;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn changes_are_saved() {
        let path = std::env::temp_dir().join(format!("sfc-records-{}.json", uuid::Uuid::new_v4()));
        let records = Records::persistent(RecordStore::new(), &path);
        let chain = Chain::from_request(
            ChainCreateRequest {
                name: "web".to_string(),
                description: None,
                chain: vec!["vnf-a".to_string()],
                symmetrical: false,
                infra_driver: None,
                attributes: BTreeMap::new(),
            },
            model::DEFAULT_CHAIN_DRIVER,
        );
        records.chains().create(chain.clone()).unwrap();
        records.persist();

        let reloaded = RecordStore::load(&path).unwrap();
        assert_eq!(reloaded.chains.get(chain.id).unwrap(), chain);
        std::fs::remove_file(&path).unwrap();
    }
}
