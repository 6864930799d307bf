// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Lifecycle status of chains and classifiers

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Lifecycle status shared by chain and classifier records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    PendingCreate,
    Active,
    PendingUpdate,
    PendingDelete,
    Error,
    Dead,
}

/// Statuses from which an update may start.
pub const UPDATABLE: &[Status] = &[Status::Active];

/// Statuses of records that are realized, or being updated while realized.
pub const ACTIVE_UPDATE: &[Status] = &[Status::Active, Status::PendingUpdate];

/// Statuses from which a delete may start.
pub const DELETABLE: &[Status] = &[
    Status::Active,
    Status::PendingUpdate,
    Status::Error,
    Status::Dead,
];

impl Status {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::PendingCreate => "PENDING_CREATE",
            Status::Active => "ACTIVE",
            Status::PendingUpdate => "PENDING_UPDATE",
            Status::PendingDelete => "PENDING_DELETE",
            Status::Error => "ERROR",
            Status::Dead => "DEAD",
        }
    }

    /// Tell if a transition is allowed to start from this status.
    #[must_use]
    pub fn is_one_of(&self, allowed: &[Status]) -> bool {
        allowed.contains(self)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        let encoded = serde_json::to_string(&Status::PendingDelete).unwrap();
        assert_eq!(encoded, "\"PENDING_DELETE\"");
        let decoded: Status = serde_json::from_str("\"ERROR\"").unwrap();
        assert_eq!(decoded, Status::Error);
        assert_eq!(Status::PendingCreate.to_string(), "PENDING_CREATE");
    }

    #[test]
    fn delete_sources() {
        assert!(Status::Active.is_one_of(DELETABLE));
        assert!(Status::Dead.is_one_of(DELETABLE));
        assert!(!Status::PendingCreate.is_one_of(DELETABLE));
        assert!(!Status::PendingDelete.is_one_of(DELETABLE));
    }

    #[test]
    fn update_sources() {
        assert!(Status::Active.is_one_of(UPDATABLE));
        assert!(!Status::PendingUpdate.is_one_of(UPDATABLE));
        assert!(Status::PendingUpdate.is_one_of(ACTIVE_UPDATE));
    }
}
