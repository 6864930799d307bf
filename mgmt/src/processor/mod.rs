// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Chain processor.
//! This module serves the chain and classifier requests and runs them on a thread of its own.

pub(crate) mod display;
pub(crate) mod launch;
pub(crate) mod mgmt_client;
pub(crate) mod proc;
