// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Interface to the chain processor

use model::{Chain, ChainCreateRequest, Classifier, ClassifierCreateRequest};
use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot;
use tokio::sync::oneshot::Receiver;
#[allow(unused)]
use tracing::{debug, error, info};
use uuid::Uuid;

use thiserror::Error;

use crate::error::PluginError;
use crate::plugin::Pending;

/// A request type to the `SfcProcessor`
#[derive(Debug)]
pub enum SfcRequest {
    CreateChain(Box<ChainCreateRequest>),
    UpdateChain(Uuid),
    DeleteChain(Uuid),
    PurgeOrphans(Uuid),
    GetChain(Uuid),
    ListChains,
    CreateClassifier(Box<ClassifierCreateRequest>),
    UpdateClassifier(Uuid),
    DeleteClassifier(Uuid),
    GetClassifier(Uuid),
    ListClassifiers,
}

/// A response from the `SfcProcessor`
#[derive(Debug)]
pub enum SfcResponse {
    ChainPending(Result<Pending<Chain>, PluginError>),
    Chain(Result<Chain, PluginError>),
    Chains(Vec<Chain>),
    ClassifierPending(Result<Pending<Classifier>, PluginError>),
    Classifier(Result<Classifier, PluginError>),
    Classifiers(Vec<Classifier>),
}
type SfcResponseChannel = oneshot::Sender<SfcResponse>;

/// A request to the `SfcProcessor` and the channel to issue the response back
pub struct SfcChannelRequest {
    pub(crate) request: SfcRequest,
    pub(crate) reply_tx: SfcResponseChannel,
}
impl SfcChannelRequest {
    #[must_use]
    pub fn new(request: SfcRequest) -> (Self, Receiver<SfcResponse>) {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = Self { request, reply_tx };
        (request, reply_rx)
    }
}

/// The type of errors that can happen when issuing requests to an [`SfcProcessor`]
///
/// [`SfcProcessor`]: crate::processor::proc::SfcProcessor
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ProcessorError {
    #[error("Failure sending request to chain processor: {0}")]
    SendRequestError(#[from] tokio::sync::mpsc::error::SendError<SfcChannelRequest>),
    #[error("Failure receiving response from chain processor: {0}")]
    RecvResponseError(#[from] tokio::sync::oneshot::error::RecvError),
    #[error(transparent)]
    PluginError(#[from] PluginError),
}

/// A cloneable object that allows sending requests to an [`SfcProcessor`].
///
/// [`SfcProcessor`]: crate::processor::proc::SfcProcessor
#[derive(Clone)]
pub struct SfcClient {
    tx: Sender<SfcChannelRequest>,
}

impl SfcClient {
    #[must_use]
    pub fn new(channel_tx: Sender<SfcChannelRequest>) -> Self {
        Self { tx: channel_tx }
    }

    async fn request(&self, request: SfcRequest) -> Result<SfcResponse, ProcessorError> {
        let (req, rx) = SfcChannelRequest::new(request);
        self.tx.send(req).await?;
        Ok(rx.await?)
    }

    /// Create a chain. The returned handle tells when the chain is realized.
    ///
    /// # Errors
    /// This method returns `ProcessorError` if the request could not be sent, the response
    /// could not be received or the request was refused.
    pub async fn create_chain(
        &self,
        request: ChainCreateRequest,
    ) -> Result<Pending<Chain>, ProcessorError> {
        match self.request(SfcRequest::CreateChain(Box::new(request))).await? {
            SfcResponse::ChainPending(result) => Ok(result?),
            _ => unreachable!(),
        }
    }

    /// # Errors
    /// Chains can't be updated, so this always returns an error.
    pub async fn update_chain(&self, id: Uuid) -> Result<Chain, ProcessorError> {
        match self.request(SfcRequest::UpdateChain(id)).await? {
            SfcResponse::Chain(result) => Ok(result?),
            _ => unreachable!(),
        }
    }

    /// Delete a chain. The returned handle tells when the chain is gone.
    ///
    /// # Errors
    /// This method returns `ProcessorError` if the request could not be sent, the response
    /// could not be received or the request was refused.
    pub async fn delete_chain(&self, id: Uuid) -> Result<Pending<Chain>, ProcessorError> {
        match self.request(SfcRequest::DeleteChain(id)).await? {
            SfcResponse::ChainPending(result) => Ok(result?),
            _ => unreachable!(),
        }
    }

    /// Delete the resources a failed chain left behind on the controller.
    ///
    /// # Errors
    /// This method returns `ProcessorError` if the request could not be sent, the response
    /// could not be received or the request was refused.
    pub async fn purge_orphans(&self, id: Uuid) -> Result<Pending<Chain>, ProcessorError> {
        match self.request(SfcRequest::PurgeOrphans(id)).await? {
            SfcResponse::ChainPending(result) => Ok(result?),
            _ => unreachable!(),
        }
    }

    /// # Errors
    /// This method returns `ProcessorError` if the request could not be sent, the response
    /// could not be received or there's no such chain.
    pub async fn get_chain(&self, id: Uuid) -> Result<Chain, ProcessorError> {
        match self.request(SfcRequest::GetChain(id)).await? {
            SfcResponse::Chain(result) => Ok(result?),
            _ => unreachable!(),
        }
    }

    /// # Errors
    /// This method returns `ProcessorError` if the request could not be sent or the response
    /// could not be received.
    pub async fn list_chains(&self) -> Result<Vec<Chain>, ProcessorError> {
        match self.request(SfcRequest::ListChains).await? {
            SfcResponse::Chains(chains) => Ok(chains),
            _ => unreachable!(),
        }
    }

    /// Create a classifier. The returned handle tells when the classifier is realized.
    ///
    /// # Errors
    /// This method returns `ProcessorError` if the request could not be sent, the response
    /// could not be received or the request was refused.
    pub async fn create_classifier(
        &self,
        request: ClassifierCreateRequest,
    ) -> Result<Pending<Classifier>, ProcessorError> {
        match self
            .request(SfcRequest::CreateClassifier(Box::new(request)))
            .await?
        {
            SfcResponse::ClassifierPending(result) => Ok(result?),
            _ => unreachable!(),
        }
    }

    /// # Errors
    /// Classifiers can't be updated, so this always returns an error.
    pub async fn update_classifier(&self, id: Uuid) -> Result<Classifier, ProcessorError> {
        match self.request(SfcRequest::UpdateClassifier(id)).await? {
            SfcResponse::Classifier(result) => Ok(result?),
            _ => unreachable!(),
        }
    }

    /// # Errors
    /// This method returns `ProcessorError` if the request could not be sent, the response
    /// could not be received or the request was refused.
    pub async fn delete_classifier(&self, id: Uuid) -> Result<Pending<Classifier>, ProcessorError> {
        match self.request(SfcRequest::DeleteClassifier(id)).await? {
            SfcResponse::ClassifierPending(result) => Ok(result?),
            _ => unreachable!(),
        }
    }

    /// # Errors
    /// This method returns `ProcessorError` if the request could not be sent, the response
    /// could not be received or there's no such classifier.
    pub async fn get_classifier(&self, id: Uuid) -> Result<Classifier, ProcessorError> {
        match self.request(SfcRequest::GetClassifier(id)).await? {
            SfcResponse::Classifier(result) => Ok(result?),
            _ => unreachable!(),
        }
    }

    /// # Errors
    /// This method returns `ProcessorError` if the request could not be sent or the response
    /// could not be received.
    pub async fn list_classifiers(&self) -> Result<Vec<Classifier>, ProcessorError> {
        match self.request(SfcRequest::ListClassifiers).await? {
            SfcResponse::Classifiers(classifiers) => Ok(classifiers),
            _ => unreachable!(),
        }
    }
}
