// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]
#![deny(rustdoc::all)]
#![allow(rustdoc::missing_crate_level_docs)]

mod commands;

use std::sync::Arc;

use args::{CmdArgs, Parser};
use config::{ConfigError, SfcdConfig};
use mgmt::{Backends, Inventory, InventoryError, LaunchError, MgmtParams, Records, start_mgmt};
use odl_intf::{OdlClient, OdlEndpoint, OdlError};
use store::{RecordStore, StoreError};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::commands::{CommandError, execute};

#[derive(Debug, Error)]
enum SfcdError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Could not load state: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error("Could not set up the controller client: {0}")]
    Controller(#[from] OdlError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("Could not build the runtime: {0}")]
    Runtime(std::io::Error),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("The management thread panicked")]
    MgmtPanicked,
}

/// Log to stderr. `RUST_LOG` wins over `level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &CmdArgs) -> Result<String, SfcdError> {
    let mut config = SfcdConfig::load_or_default(args.config())?;
    if let Some(state_file) = args.state_file() {
        config.state_file = state_file.to_path_buf();
    }
    init_logging(args.log_level().unwrap_or(&config.log_level));
    info!(
        "Controller at {}:{}, state in {}",
        config.controller.ip,
        config.controller.port,
        config.state_file.display()
    );

    let records = Arc::new(Records::persistent(
        RecordStore::load(&config.state_file)?,
        &config.state_file,
    ));
    let inventory = Arc::new(Inventory::load(&config.inventory)?);
    let controller = Arc::new(OdlClient::new(&OdlEndpoint::from(&config.controller))?);

    let (client, mgmt) = start_mgmt(MgmtParams {
        drivers: config.drivers.clone(),
        workers: config.workers,
        records,
        backends: Backends {
            controller,
            vnf_manager: inventory.clone(),
            port_lookup: inventory,
        },
    })?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(SfcdError::Runtime)?;
    let output = rt.block_on(execute(&client, args.command()));

    /* the management thread ends with its last client */
    drop(client);
    mgmt.join().map_err(|_| SfcdError::MgmtPanicked)??;
    Ok(output?)
}

fn main() {
    let args = CmdArgs::parse();
    match run(&args) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            error!("{e}");
            eprintln!("sfcd: {e}");
            std::process::exit(1);
        }
    }
}
