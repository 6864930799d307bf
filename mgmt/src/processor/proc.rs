// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The chain processor: serves the requests of [`SfcClient`]s one at a time.

use tokio::sync::mpsc;
#[allow(unused)]
use tracing::{debug, error, info, warn};

use crate::drivers::Plugins;
use crate::processor::mgmt_client::{SfcChannelRequest, SfcClient, SfcRequest, SfcResponse};

/// Depth of the request channel.
const REQUEST_QUEUE: usize = 32;

pub struct SfcProcessor {
    rx: mpsc::Receiver<SfcChannelRequest>,
    plugins: Plugins,
}

impl SfcProcessor {
    /// Build a processor, and a client to send it requests.
    #[must_use]
    pub fn new(plugins: Plugins) -> (Self, SfcClient) {
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE);
        (Self { rx, plugins }, SfcClient::new(tx))
    }

    async fn handle(&self, request: SfcRequest) -> SfcResponse {
        let chains = &self.plugins.chains;
        let classifiers = &self.plugins.classifiers;
        match request {
            SfcRequest::CreateChain(request) => {
                SfcResponse::ChainPending(chains.create(*request).await)
            }
            SfcRequest::UpdateChain(id) => SfcResponse::Chain(chains.update(id).await),
            SfcRequest::DeleteChain(id) => SfcResponse::ChainPending(chains.delete(id)),
            SfcRequest::PurgeOrphans(id) => SfcResponse::ChainPending(chains.purge_orphans(id)),
            SfcRequest::GetChain(id) => SfcResponse::Chain(chains.get(id)),
            SfcRequest::ListChains => SfcResponse::Chains(chains.list()),
            SfcRequest::CreateClassifier(request) => {
                SfcResponse::ClassifierPending(classifiers.create(*request))
            }
            SfcRequest::UpdateClassifier(id) => {
                SfcResponse::Classifier(classifiers.update(id).await)
            }
            SfcRequest::DeleteClassifier(id) => {
                SfcResponse::ClassifierPending(classifiers.delete(id))
            }
            SfcRequest::GetClassifier(id) => SfcResponse::Classifier(classifiers.get(id)),
            SfcRequest::ListClassifiers => SfcResponse::Classifiers(classifiers.list()),
        }
    }

    /// Serve requests until every client is gone.
    pub async fn run(mut self) {
        info!("Chain processor started");
        while let Some(req) = self.rx.recv().await {
            debug!("Got request {:?}", req.request);
            let response = self.handle(req.request).await;
            if req.reply_tx.send(response).is_err() {
                warn!("Requester went away before the response");
            }
        }
        info!("Chain processor stopped: no more clients");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::fixtures::{Harness, chain_request, classifier_request};
    use crate::processor::mgmt_client::ProcessorError;
    use model::Status;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;
    use uuid::Uuid;

    fn processor() -> (SfcProcessor, SfcClient) {
        let Harness {
            chains,
            classifiers,
            ..
        } = Harness::new();
        SfcProcessor::new(Plugins {
            chains,
            classifiers,
        })
    }

    #[tokio::test]
    #[traced_test]
    async fn requests_through_the_client() {
        let (processor, client) = processor();
        let served = tokio::spawn(processor.run());

        let chain = client
            .create_chain(chain_request("web", &["vnf-a", "vnf-c"], false))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(chain.status, Status::Active);
        assert_eq!(client.get_chain(chain.id).await.unwrap(), chain);
        assert_eq!(client.list_chains().await.unwrap(), vec![chain.clone()]);

        let classifier = client
            .create_classifier(classifier_request("http", chain.id, Some(80)))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(client.list_classifiers().await.unwrap(), vec![classifier.clone()]);
        assert!(matches!(
            client.update_classifier(classifier.id).await,
            Err(ProcessorError::PluginError(PluginError::NotSupported(_)))
        ));
        assert!(matches!(
            client.update_chain(chain.id).await,
            Err(ProcessorError::PluginError(PluginError::NotSupported(_)))
        ));

        client
            .delete_classifier(classifier.id)
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        client.delete_chain(chain.id).await.unwrap().wait().await.unwrap();
        assert!(client.list_chains().await.unwrap().is_empty());
        assert!(matches!(
            client.get_classifier(Uuid::new_v4()).await,
            Err(ProcessorError::PluginError(e)) if e.is_not_found()
        ));

        drop(client);
        served.await.unwrap();
        assert!(logs_contain("no more clients"));
    }

    #[tokio::test]
    async fn refused_requests() {
        let (processor, client) = processor();
        tokio::spawn(processor.run());
        assert!(matches!(
            client.purge_orphans(Uuid::new_v4()).await,
            Err(ProcessorError::PluginError(e)) if e.is_not_found()
        ));
        assert!(matches!(
            client.create_chain(chain_request("web", &["vnf-x"], false)).await,
            Err(ProcessorError::PluginError(e)) if e.is_not_found()
        ));
    }
}
