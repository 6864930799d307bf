// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Rendered service path rpcs

use serde::{Deserialize, Serialize};

/// Envelope of an rpc request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcInput<T> {
    pub input: T,
}

/// Envelope of an rpc reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcOutput<T> {
    pub output: T,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRenderedPathInput {
    #[serde(rename = "parent-service-function-path")]
    pub parent_service_function_path: String,
    pub symmetric: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRenderedPathOutput {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRenderedPathInput {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRenderedPathOutput {
    #[serde(default)]
    pub result: bool,
}
