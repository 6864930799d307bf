// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! In-memory record store

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use model::Status;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::StoreError;
use crate::record::Record;

/// A set of records of one kind, keyed by id.
///
/// Mutations of a record are serialized: a status transition checks the current
/// status and applies the new one atomically.
pub struct MemStore<R: Record> {
    records: DashMap<Uuid, R>,
    names: Option<DashMap<String, Uuid>>, /* only if names must be unique */
}

impl<R: Record> MemStore<R> {
    /// A store which accepts duplicate names.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            names: None,
        }
    }

    /// A store refusing two records with the same name.
    #[must_use]
    pub fn with_unique_names() -> Self {
        Self {
            records: DashMap::new(),
            names: Some(DashMap::new()),
        }
    }

    fn not_found(id: Uuid) -> StoreError {
        StoreError::NotFound { kind: R::KIND, id }
    }

    /// Add a record.
    ///
    /// # Errors
    ///
    /// Fails if names must be unique and one record already has the same name.
    pub fn create(&self, record: R) -> Result<R, StoreError> {
        let id = record.id();
        if let Some(names) = &self.names {
            match names.entry(record.name().to_owned()) {
                Entry::Occupied(_) => {
                    return Err(StoreError::DuplicateName {
                        kind: R::KIND,
                        name: record.name().to_owned(),
                    });
                }
                Entry::Vacant(e) => {
                    e.insert(id);
                }
            }
        }
        debug!("Storing {} {} ({id}) as {}", R::KIND, record.name(), record.status());
        self.records.insert(id, record.clone());
        Ok(record)
    }

    /// Get a copy of a record.
    ///
    /// # Errors
    ///
    /// Fails if there's no record with that id.
    pub fn get(&self, id: Uuid) -> Result<R, StoreError> {
        self.records
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or_else(|| Self::not_found(id))
    }

    /// Get a copy of the record with a given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<R> {
        self.records
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.value().clone())
    }

    /// Copies of all the records, sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<R> {
        let mut all: Vec<R> = self.records.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));
        all
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Modify a record whose status is one of `expected`. Returns the modified record.
    ///
    /// # Errors
    ///
    /// Fails if there's no such record, or if its status is not one of `expected`.
    pub fn update<F: FnOnce(&mut R)>(
        &self,
        id: Uuid,
        expected: &[Status],
        f: F,
    ) -> Result<R, StoreError> {
        let mut record = self.records.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        let current = record.status();
        if !current.is_one_of(expected) {
            debug!("{} {id} is {current}, expected one of {expected:?}", R::KIND);
            return Err(StoreError::InUse {
                kind: R::KIND,
                id,
                current,
            });
        }
        f(record.value_mut());
        Ok(record.value().clone())
    }

    /// Move a record whose status is one of `expected` to status `new`.
    ///
    /// # Errors
    ///
    /// Fails if there's no such record, or if its status is not one of `expected`.
    pub fn update_status(&self, id: Uuid, expected: &[Status], new: Status) -> Result<R, StoreError> {
        let record = self.update(id, expected, |r| r.set_status(new))?;
        debug!("{} {} ({id}) is now {new}", R::KIND, record.name());
        Ok(record)
    }

    /// Remove a record whose status is one of `expected`. Returns the removed record.
    ///
    /// # Errors
    ///
    /// Fails if there's no such record, or if its status is not one of `expected`.
    pub fn delete(&self, id: Uuid, expected: &[Status]) -> Result<R, StoreError> {
        match self
            .records
            .remove_if(&id, |_, r| r.status().is_one_of(expected))
        {
            Some((_, record)) => {
                if let Some(names) = &self.names {
                    names.remove_if(record.name(), |_, owner| *owner == id);
                }
                info!("Removed {} {} ({id})", R::KIND, record.name());
                Ok(record)
            }
            None => match self.records.get(&id) {
                Some(r) => Err(StoreError::InUse {
                    kind: R::KIND,
                    id,
                    current: r.status(),
                }),
                None => Err(Self::not_found(id)),
            },
        }
    }

    /// Replace the whole content of the store.
    ///
    /// # Errors
    ///
    /// Fails if names must be unique and two of the records share a name. The store
    /// is left empty in that case.
    pub fn replace_all(&self, records: Vec<R>) -> Result<(), StoreError> {
        self.records.clear();
        if let Some(names) = &self.names {
            names.clear();
        }
        for record in records {
            if let Err(e) = self.create(record) {
                self.records.clear();
                if let Some(names) = &self.names {
                    names.clear();
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

impl<R: Record> Default for MemStore<R> {
    fn default() -> Self {
        Self::new()
    }
}
