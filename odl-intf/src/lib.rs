// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Interface to the OpenDaylight controller: typed restconf documents for the SFC,
//! OVSDB topology and ACL models, and a client to read and write them.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod client;
pub mod wire;

#[cfg(any(test, feature = "testing"))]
pub mod mock;

pub use client::{Controller, OdlClient, OdlEndpoint, OdlError};
