// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Command line of the chain orchestration daemon

#![deny(clippy::all, clippy::pedantic)]

use std::path::{Path, PathBuf};

pub use clap::Parser;
use clap::Subcommand;
use config::DEFAULT_CONFIG_PATH;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "sfcd")]
#[command(version)]
#[command(about = "Service function chains and classifiers on OpenDaylight", long_about = None)]
pub struct CmdArgs {
    #[arg(
        long,
        short,
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_PATH,
        help = "Configuration file (YAML or JSON)"
    )]
    config: PathBuf,

    #[arg(
        long,
        value_name = "LEVEL",
        help = "Log level, one of off, error, warn, info, debug, trace. RUST_LOG takes precedence"
    )]
    log_level: Option<String>,

    #[arg(long, value_name = "PATH", help = "Override the state file of the configuration")]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Manage service function chains
    #[command(subcommand)]
    Chain(ChainCommand),
    /// Manage traffic classifiers
    #[command(subcommand)]
    Classifier(ClassifierCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ChainCommand {
    /// Create a chain from a YAML request file and wait for its realization
    Create { file: PathBuf },
    /// Delete a chain
    Delete { id: Uuid },
    /// List chains
    List,
    /// Show a chain
    Show { id: Uuid },
    /// Delete the controller resources left behind by a failed chain creation
    PurgeOrphans { id: Uuid },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierCommand {
    /// Create a classifier from a YAML request file and wait for its realization
    Create { file: PathBuf },
    /// Delete a classifier
    Delete { id: Uuid },
    /// List classifiers
    List,
    /// Show a classifier
    Show { id: Uuid },
}

impl CmdArgs {
    #[must_use]
    pub fn config(&self) -> &Path {
        &self.config
    }
    #[must_use]
    pub fn log_level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }
    #[must_use]
    pub fn state_file(&self) -> Option<&Path> {
        self.state_file.as_deref()
    }
    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }
}
