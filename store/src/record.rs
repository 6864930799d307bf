// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! What the store needs to know about the records it keeps

use model::{Chain, Classifier, Status};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// A record with an id, a name and a lifecycle status.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Kind of record, for messages.
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn status(&self) -> Status;
    fn set_status(&mut self, status: Status);
}

impl Record for Chain {
    const KIND: &'static str = "chain";

    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn status(&self) -> Status {
        self.status
    }
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

impl Record for Classifier {
    const KIND: &'static str = "classifier";

    fn id(&self) -> Uuid {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn status(&self) -> Status {
        self.status
    }
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}
