// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Lifecycle of classifiers

use std::sync::Arc;

use model::{ACTIVE_UPDATE, Classifier, ClassifierCreateRequest, DELETABLE, Status};
use sfc::ClassifierRealizer;
use store::StoreError;
#[allow(unused)]
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::PluginError;
use crate::plugin::{Pending, check_driver};
use crate::pool::WorkerPool;
use crate::records::Records;

pub struct ClassifierPlugin {
    records: Arc<Records>,
    realizer: Arc<dyn ClassifierRealizer>,
    pool: WorkerPool,
}

impl ClassifierPlugin {
    #[must_use]
    pub fn new(
        records: Arc<Records>,
        realizer: Arc<dyn ClassifierRealizer>,
        pool: WorkerPool,
    ) -> Self {
        Self {
            records,
            realizer,
            pool,
        }
    }

    /// Record a new classifier and start realizing it on the rendered path of its
    /// chain.
    ///
    /// # Errors
    ///
    /// Fails if the request selects another driver, if the name is taken, or if the
    /// target chain does not exist or is not realized.
    #[instrument(level = "info", skip_all, fields(classifier = %request.name))]
    pub fn create(
        &self,
        request: ClassifierCreateRequest,
    ) -> Result<Pending<Classifier>, PluginError> {
        check_driver(request.infra_driver.as_deref(), self.realizer.driver())?;
        if self.records.classifiers().find_by_name(&request.name).is_some() {
            return Err(StoreError::DuplicateName {
                kind: "classifier",
                name: request.name,
            }
            .into());
        }

        let chain = self.records.chains().get(request.chain)?;
        let rendered_path = match chain.instance_id {
            Some(instance_id) if chain.status.is_one_of(ACTIVE_UPDATE) => instance_id,
            _ => {
                warn!("Chain {} is {}, not realized", chain.name, chain.status);
                return Err(PluginError::ChainNotRealized(chain.id));
            }
        };

        let classifier = self
            .records
            .classifiers()
            .create(Classifier::from_request(request, self.realizer.driver()))?;
        self.records.persist();
        info!(
            "Classifier {} ({}) accepted for chain {}",
            classifier.name, classifier.id, chain.name
        );

        let records = self.records.clone();
        let realizer = self.realizer.clone();
        let record = classifier.clone();
        let task = self.pool.spawn(async move {
            let id = record.id;
            match realizer.create_classifier(&record, &rendered_path).await {
                Ok(instance_id) => {
                    info!("Classifier {} is active as {instance_id}", record.name);
                    let classifier =
                        records
                            .classifiers()
                            .update(id, &[Status::PendingCreate], |c| {
                                c.status = Status::Active;
                                c.instance_id = Some(instance_id);
                            })?;
                    records.persist();
                    Ok(classifier)
                }
                Err(e) => {
                    error!("Failed to realize classifier {}: {e}", record.name);
                    if let Err(store_error) = records.classifiers().update(
                        id,
                        &[Status::PendingCreate],
                        |c| {
                            c.status = Status::Error;
                            c.instance_id = None;
                        },
                    ) {
                        warn!("Could not flag classifier {id} as failed: {store_error}");
                    }
                    records.persist();
                    Err(e.into())
                }
            }
        });
        Ok(Pending::new(classifier, task))
    }

    /// # Errors
    ///
    /// Classifiers can't be updated: this fails with `NotSupported`, or with
    /// not-found if there's no such classifier.
    pub async fn update(&self, id: Uuid) -> Result<Classifier, PluginError> {
        let classifier = self.records.classifiers().get(id)?;
        self.realizer.update_classifier(&classifier).await?;
        Ok(classifier)
    }

    /// Start deleting a classifier. One that was never realized is removed at once.
    ///
    /// # Errors
    ///
    /// Fails if the classifier does not exist or can't be deleted in its current
    /// status.
    #[instrument(level = "info", skip(self))]
    pub fn delete(&self, id: Uuid) -> Result<Pending<Classifier>, PluginError> {
        let classifier =
            self.records
                .classifiers()
                .update_status(id, DELETABLE, Status::PendingDelete)?;
        self.records.persist();

        let Some(instance_id) = classifier.instance_id.clone() else {
            let classifier = self
                .records
                .classifiers()
                .delete(id, &[Status::PendingDelete])?;
            self.records.persist();
            info!("Classifier {} was never realized, removed", classifier.name);
            return Ok(Pending::done(classifier));
        };

        let records = self.records.clone();
        let realizer = self.realizer.clone();
        let task = self.pool.spawn(async move {
            match realizer.delete_classifier(&instance_id).await {
                Ok(()) => {
                    let classifier = records
                        .classifiers()
                        .delete(id, &[Status::PendingDelete])?;
                    records.persist();
                    Ok(classifier)
                }
                Err(e) => {
                    error!("Failed to delete classifier {id}: {e}");
                    if let Err(store_error) = records.classifiers().update_status(
                        id,
                        &[Status::PendingDelete],
                        Status::Error,
                    ) {
                        warn!("Could not flag classifier {id} as failed: {store_error}");
                    }
                    records.persist();
                    Err(e.into())
                }
            }
        });
        Ok(Pending::new(classifier, task))
    }

    /// # Errors
    ///
    /// Fails if there's no classifier with that id.
    pub fn get(&self, id: Uuid) -> Result<Classifier, PluginError> {
        Ok(self.records.classifiers().get(id)?)
    }

    #[must_use]
    pub fn list(&self) -> Vec<Classifier> {
        self.records.classifiers().list()
    }
}
