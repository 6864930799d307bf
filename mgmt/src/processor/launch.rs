// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use std::sync::Arc;

use config::DriversConfig;
#[allow(unused)]
use tracing::{debug, error, info, warn};

use crate::drivers::{Backends, Plugins};
use crate::processor::mgmt_client::SfcClient;
use crate::processor::proc::SfcProcessor;
use crate::records::Records;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Error starting the management thread: {0}")]
    IoError(std::io::Error),
    #[error("Error building the management runtime: {0}")]
    RuntimeError(std::io::Error),
}

/// What the management thread needs
pub struct MgmtParams {
    pub drivers: DriversConfig,
    pub workers: usize,
    pub records: Arc<Records>,
    pub backends: Backends,
}

/// Start the management thread. It runs the chain processor, and the realizations
/// it starts, on a runtime of its own.
///
/// The thread ends once every [`SfcClient`] is dropped. Realizations still in
/// progress at that point are abandoned, so clients should wait for the handles
/// they got before going away.
///
/// # Errors
///
/// Fails if the thread can't be spawned.
pub fn start_mgmt(
    params: MgmtParams,
) -> Result<(SfcClient, std::thread::JoinHandle<Result<(), LaunchError>>), LaunchError> {
    let plugins = Plugins::new(
        &params.drivers,
        params.workers,
        &params.records,
        params.backends,
    );
    let (processor, client) = SfcProcessor::new(plugins);
    let handle = std::thread::Builder::new()
        .name("mgmt".to_string())
        .spawn(move || {
            debug!("Starting chain management thread");
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(LaunchError::RuntimeError)?;
            rt.block_on(processor.run());
            debug!("Chain management thread exiting");
            Ok(())
        })
        .map_err(LaunchError::IoError)?;
    Ok((client, handle))
}
