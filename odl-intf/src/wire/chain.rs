// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Service function chains and paths

use serde::{Deserialize, Serialize};

/// An ordered list of service function types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFunctionChain {
    pub name: String,
    pub symmetric: bool,
    #[serde(rename = "sfc-service-function")]
    pub functions: Vec<SfcServiceFunction>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SfcServiceFunction {
    pub name: String,
    #[serde(rename = "type")]
    pub sf_type: String,
}

/// Body of a `PUT` to `service-function-chain/<name>`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFunctionChainsBody {
    #[serde(rename = "service-function-chain")]
    pub service_function_chain: Vec<ServiceFunctionChain>,
}

/// A path template instantiating a chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFunctionPath {
    pub name: String,
    #[serde(rename = "service-chain-name")]
    pub service_chain_name: String,
    pub symmetric: bool,
}

/// Body of a `PUT` to `service-function-path/<name>`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFunctionPathsBody {
    #[serde(rename = "service-function-path")]
    pub service_function_path: Vec<ServiceFunctionPath>,
}
