// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Execution of the operator commands through the chain processor.

use std::path::{Path, PathBuf};

use args::{ChainCommand, ClassifierCommand, Command};
use mgmt::{
    ChainDetail, ChainTable, ClassifierDetail, ClassifierTable, PluginError, ProcessorError,
    SfcClient,
};
use model::{ChainCreateRequest, ClassifierCreateRequest};
use serde::de::DeserializeOwned;
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to read request {0}: {1}")]
    ReadRequest(PathBuf, #[source] std::io::Error),
    #[error("Invalid request {0}: {1}")]
    BadRequest(PathBuf, #[source] serde_yaml_ng::Error),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

fn read_request<T: DeserializeOwned>(path: &Path) -> Result<T, CommandError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CommandError::ReadRequest(path.to_path_buf(), e))?;
    serde_yaml_ng::from_str(&text).map_err(|e| CommandError::BadRequest(path.to_path_buf(), e))
}

async fn chain(client: &SfcClient, command: &ChainCommand) -> Result<String, CommandError> {
    let output = match command {
        ChainCommand::Create { file } => {
            let request: ChainCreateRequest = read_request(file)?;
            let pending = client.create_chain(request).await?;
            info!("Chain {} is being created", pending.record().id);
            ChainDetail(&pending.wait().await?).to_string()
        }
        ChainCommand::Delete { id } => {
            let deleted = client.delete_chain(*id).await?.wait().await?;
            format!("Deleted chain {} ({id})\n", deleted.name)
        }
        ChainCommand::List => ChainTable(&client.list_chains().await?).to_string(),
        ChainCommand::Show { id } => ChainDetail(&client.get_chain(*id).await?).to_string(),
        ChainCommand::PurgeOrphans { id } => {
            let chain = client.purge_orphans(*id).await?.wait().await?;
            ChainDetail(&chain).to_string()
        }
    };
    Ok(output)
}

async fn classifier(
    client: &SfcClient,
    command: &ClassifierCommand,
) -> Result<String, CommandError> {
    let output = match command {
        ClassifierCommand::Create { file } => {
            let request: ClassifierCreateRequest = read_request(file)?;
            let pending = client.create_classifier(request).await?;
            info!("Classifier {} is being created", pending.record().id);
            ClassifierDetail(&pending.wait().await?).to_string()
        }
        ClassifierCommand::Delete { id } => {
            let deleted = client.delete_classifier(*id).await?.wait().await?;
            format!("Deleted classifier {} ({id})\n", deleted.name)
        }
        ClassifierCommand::List => ClassifierTable(&client.list_classifiers().await?).to_string(),
        ClassifierCommand::Show { id } => {
            ClassifierDetail(&client.get_classifier(*id).await?).to_string()
        }
    };
    Ok(output)
}

/// Run a command to completion. Returns what to show the operator.
///
/// # Errors
///
/// Fails if the request file is invalid, or if the request fails.
pub async fn execute(client: &SfcClient, command: &Command) -> Result<String, CommandError> {
    debug!("Executing {command:?}");
    match command {
        Command::Chain(command) => chain(client, command).await,
        Command::Classifier(command) => classifier(client, command).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::DriversConfig;
    use mgmt::{Backends, Inventory, MgmtParams, Records, start_mgmt};
    use odl_intf::mock::MockController;
    use std::sync::Arc;
    use store::RecordStore;
    use uuid::Uuid;

    struct Scratch(PathBuf);

    impl Scratch {
        fn new() -> Self {
            let dir = std::env::temp_dir().join(format!("sfcd-{}", Uuid::new_v4()));
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }
        fn file(&self, name: &str, content: &str) -> PathBuf {
            let path = self.0.join(name);
            std::fs::write(&path, content).unwrap();
            path
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[tokio::test]
    async fn requests_from_files() {
        let scratch = Scratch::new();
        let controller = Arc::new(MockController::new());
        let inventory = Arc::new(
            Inventory::from_yaml(
                "
vnfs:
  - { id: vnf-a, name: fw1, mgmt_url: 'http://10.0.0.5/', attributes: { service_type: firewall } }
ports:
  - { id: port-a, name: tap-vnf-a, device_id: vnf-a }
",
            )
            .unwrap(),
        );
        let (client, mgmt) = start_mgmt(MgmtParams {
            drivers: DriversConfig::default(),
            workers: 1,
            records: Arc::new(Records::volatile(RecordStore::new())),
            backends: Backends {
                controller,
                vnf_manager: inventory.clone(),
                port_lookup: inventory,
            },
        })
        .unwrap();

        /* the mock topology is empty: the vnf can't be located */
        let file = scratch.file("web.yaml", "{ name: web, chain: [vnf-a], symmetrical: false }");
        let command = Command::Chain(ChainCommand::Create { file });
        assert!(matches!(
            execute(&client, &command).await,
            Err(CommandError::Plugin(PluginError::Realize(
                sfc_error
            ))) if sfc_error.to_string().contains("vnf-a")
        ));

        let listing = execute(&client, &Command::Chain(ChainCommand::List))
            .await
            .unwrap();
        assert!(listing.contains("web"));
        assert!(listing.contains("ERROR"));

        let file = scratch.file("bad.yaml", "{ name: web }");
        assert!(matches!(
            execute(&client, &Command::Chain(ChainCommand::Create { file })).await,
            Err(CommandError::BadRequest(..))
        ));
        let file = scratch.0.join("missing.yaml");
        assert!(matches!(
            execute(&client, &Command::Classifier(ClassifierCommand::Create { file })).await,
            Err(CommandError::ReadRequest(..))
        ));

        drop(client);
        mgmt.join().unwrap().unwrap();
    }
}
