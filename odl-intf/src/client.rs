// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Restconf client for the OpenDaylight controller

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

use crate::wire::{
    AccessList, AccessListsBody, CreateRenderedPathInput, CreateRenderedPathOutput,
    DeleteRenderedPathInput, DeleteRenderedPathOutput, NetworkTopologyDocument, RpcInput,
    RpcOutput, ServiceFunction, ServiceFunctionChain, ServiceFunctionChainsBody,
    ServiceFunctionForwarder, ServiceFunctionForwardersBody, ServiceFunctionForwardersDocument,
    ServiceFunctionPath, ServiceFunctionPathsBody, ServiceFunctionsBody,
};

const OPERATIONAL: &str = "operational";
const CONFIG: &str = "config";
const OPERATIONS: &str = "operations";

const TOPOLOGY: &str = "network-topology:network-topology";
const FORWARDERS: &str = "service-function-forwarder:service-function-forwarders";
const FUNCTIONS: &str = "service-function:service-functions";
const CHAINS: &str = "service-function-chain:service-function-chains";
const PATHS: &str = "service-function-path:service-function-paths";
const ACCESS_LISTS: &str = "ietf-access-control-list:access-lists";
const CREATE_RSP: &str = "rendered-service-path:create-rendered-path";
const DELETE_RSP: &str = "rendered-service-path:delete-rendered-path";

#[derive(Debug, thiserror::Error)]
pub enum OdlError {
    #[error("Could not build the http client: {0}")]
    Setup(#[source] reqwest::Error),
    #[error("Invalid controller url: {0}")]
    BadUrl(String),
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned status {status}")]
    Status {
        method: Method,
        url: Url,
        status: u16,
    },
    #[error("Could not decode reply of {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
    #[error("Controller rejected {0}")]
    Rejected(String),
}

impl OdlError {
    /// The http status the controller replied with, if it replied at all.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            OdlError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

/// Where and how to reach the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OdlEndpoint {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl Default for OdlEndpoint {
    fn default() -> Self {
        Self {
            ip: Ipv4Addr::LOCALHOST,
            port: 8080,
            username: "admin".to_string(),
            password: "admin".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Everything the realizers need from the controller.
///
/// Every operation is a single request. An operation succeeds only if the controller
/// replies with status 200; any other status is reported as [`OdlError::Status`].
#[async_trait]
pub trait Controller: Send + Sync {
    /// Read the operational network topology.
    async fn network_topology(&self) -> Result<NetworkTopologyDocument, OdlError>;
    /// Read the configured forwarders. A missing collection (404) reads as empty.
    async fn service_function_forwarders(&self) -> Result<Vec<ServiceFunctionForwarder>, OdlError>;
    async fn put_service_function(&self, sf: &ServiceFunction) -> Result<(), OdlError>;
    async fn delete_service_function(&self, name: &str) -> Result<(), OdlError>;
    async fn put_service_function_forwarder(
        &self,
        sff: &ServiceFunctionForwarder,
    ) -> Result<(), OdlError>;
    async fn put_service_function_chain(&self, sfc: &ServiceFunctionChain) -> Result<(), OdlError>;
    async fn delete_service_function_chain(&self, name: &str) -> Result<(), OdlError>;
    async fn put_service_function_path(&self, sfp: &ServiceFunctionPath) -> Result<(), OdlError>;
    async fn delete_service_function_path(&self, name: &str) -> Result<(), OdlError>;
    /// Render a path. Returns the name the controller gave to the rendered path.
    async fn create_rendered_path(&self, input: &CreateRenderedPathInput) -> Result<String, OdlError>;
    /// Remove a rendered path. A reply carrying `result: false` is an error.
    async fn delete_rendered_path(&self, name: &str) -> Result<(), OdlError>;
    async fn put_access_list(&self, acl: &AccessList) -> Result<(), OdlError>;
    async fn delete_access_list(&self, name: &str) -> Result<(), OdlError>;
}

/// [`Controller`] speaking restconf over http with basic authentication.
#[derive(Clone, Debug)]
pub struct OdlClient {
    base: Url,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl OdlClient {
    /// Build a client for the controller at `endpoint`.
    ///
    /// # Errors
    ///
    /// Fails if the http client can't be built or the endpoint doesn't make a valid url.
    pub fn new(endpoint: &OdlEndpoint) -> Result<Self, OdlError> {
        let base = format!("http://{}:{}/restconf/", endpoint.ip, endpoint.port);
        let base = Url::parse(&base).map_err(|e| OdlError::BadUrl(format!("{base}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .build()
            .map_err(OdlError::Setup)?;
        debug!("Controller endpoint is {base}");
        Ok(Self {
            base,
            username: endpoint.username.clone(),
            password: endpoint.password.clone(),
            client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build the url of a resource below `restconf/`. Segments are percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, OdlError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| OdlError::BadUrl(self.base.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<String, OdlError> {
        trace!("{method} {url}");
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|source| OdlError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;
        let status = response.status();
        if status != StatusCode::OK {
            debug!("{method} {url} -> {status}");
            return Err(OdlError::Status {
                method,
                url,
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(|source| OdlError::Transport {
            method,
            url,
            source,
        })
    }

    fn decode<T: DeserializeOwned>(url: Url, text: &str) -> Result<T, OdlError> {
        serde_json::from_str(text).map_err(|source| OdlError::Decode { url, source })
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, OdlError> {
        let url = self.url(segments)?;
        let text = self.send::<()>(Method::GET, url.clone(), None).await?;
        Self::decode(url, &text)
    }

    async fn put<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> Result<(), OdlError> {
        let url = self.url(segments)?;
        self.send(Method::PUT, url, Some(body)).await.map(|_| ())
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), OdlError> {
        let url = self.url(segments)?;
        self.send::<()>(Method::DELETE, url, None).await.map(|_| ())
    }

    async fn rpc<I: Serialize + Sync, O: DeserializeOwned>(
        &self,
        operation: &str,
        input: I,
    ) -> Result<O, OdlError> {
        let url = self.url(&[OPERATIONS, operation])?;
        let text = self
            .send(Method::POST, url.clone(), Some(&RpcInput { input }))
            .await?;
        Self::decode::<RpcOutput<O>>(url, &text).map(|reply| reply.output)
    }
}

#[async_trait]
impl Controller for OdlClient {
    async fn network_topology(&self) -> Result<NetworkTopologyDocument, OdlError> {
        self.get(&[OPERATIONAL, TOPOLOGY, ""]).await
    }

    async fn service_function_forwarders(&self) -> Result<Vec<ServiceFunctionForwarder>, OdlError> {
        match self
            .get::<ServiceFunctionForwardersDocument>(&[CONFIG, FORWARDERS, ""])
            .await
        {
            Ok(doc) => Ok(doc.service_function_forwarders.service_function_forwarder),
            Err(e) if e.is_not_found() => {
                debug!("No forwarders configured yet");
                Ok(vec![])
            }
            Err(e) => Err(e),
        }
    }

    async fn put_service_function(&self, sf: &ServiceFunction) -> Result<(), OdlError> {
        let body = ServiceFunctionsBody {
            service_function: vec![sf.clone()],
        };
        self.put(&[CONFIG, FUNCTIONS, "service-function", &sf.name], &body)
            .await
    }

    async fn delete_service_function(&self, name: &str) -> Result<(), OdlError> {
        self.delete(&[CONFIG, FUNCTIONS, "service-function", name])
            .await
    }

    async fn put_service_function_forwarder(
        &self,
        sff: &ServiceFunctionForwarder,
    ) -> Result<(), OdlError> {
        let body = ServiceFunctionForwardersBody {
            service_function_forwarder: vec![sff.clone()],
        };
        self.put(
            &[CONFIG, FORWARDERS, "service-function-forwarder", &sff.name],
            &body,
        )
        .await
    }

    async fn put_service_function_chain(&self, sfc: &ServiceFunctionChain) -> Result<(), OdlError> {
        let body = ServiceFunctionChainsBody {
            service_function_chain: vec![sfc.clone()],
        };
        self.put(&[CONFIG, CHAINS, "service-function-chain", &sfc.name], &body)
            .await
    }

    async fn delete_service_function_chain(&self, name: &str) -> Result<(), OdlError> {
        self.delete(&[CONFIG, CHAINS, "service-function-chain", name])
            .await
    }

    async fn put_service_function_path(&self, sfp: &ServiceFunctionPath) -> Result<(), OdlError> {
        let body = ServiceFunctionPathsBody {
            service_function_path: vec![sfp.clone()],
        };
        self.put(&[CONFIG, PATHS, "service-function-path", &sfp.name], &body)
            .await
    }

    async fn delete_service_function_path(&self, name: &str) -> Result<(), OdlError> {
        self.delete(&[CONFIG, PATHS, "service-function-path", name])
            .await
    }

    async fn create_rendered_path(&self, input: &CreateRenderedPathInput) -> Result<String, OdlError> {
        let output: CreateRenderedPathOutput = self.rpc(CREATE_RSP, input).await?;
        info!(
            "Rendered path {} created from {}",
            output.name, input.parent_service_function_path
        );
        Ok(output.name)
    }

    async fn delete_rendered_path(&self, name: &str) -> Result<(), OdlError> {
        let input = DeleteRenderedPathInput {
            name: name.to_owned(),
        };
        let output: DeleteRenderedPathOutput = self.rpc(DELETE_RSP, &input).await?;
        if output.result {
            info!("Rendered path {name} deleted");
            Ok(())
        } else {
            Err(OdlError::Rejected(format!("deletion of rendered path {name}")))
        }
    }

    async fn put_access_list(&self, acl: &AccessList) -> Result<(), OdlError> {
        let body = AccessListsBody {
            acl: vec![acl.clone()],
        };
        self.put(&[CONFIG, ACCESS_LISTS, "acl", &acl.name], &body)
            .await
    }

    async fn delete_access_list(&self, name: &str) -> Result<(), OdlError> {
        self.delete(&[CONFIG, ACCESS_LISTS, "acl", name]).await
    }
}
