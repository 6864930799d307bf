// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration of the chain orchestration daemon.
//!
//! The configuration is read from a YAML (or JSON) file. Every section has defaults,
//! so an empty file is a valid configuration.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::fmt::Display;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use odl_intf::OdlEndpoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/sfcd/sfcd.yaml";
pub const DEFAULT_STATE_FILE: &str = "/var/lib/sfcd/state.json";
pub const DEFAULT_INVENTORY: &str = "/etc/sfcd/inventory.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse configuration file {0}: {1}")]
    Yaml(PathBuf, #[source] serde_yaml_ng::Error),
    #[error("Failed to parse configuration file {0}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),
    #[error("Unsupported configuration file extension: {0}")]
    UnsupportedExtension(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How to reach the OpenDaylight controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            ip: Ipv4Addr::LOCALHOST,
            port: 8080,
            username: "admin".to_string(),
            password: "admin".to_string(),
            timeout_secs: 15,
        }
    }
}

impl From<&ControllerConfig> for OdlEndpoint {
    fn from(config: &ControllerConfig) -> Self {
        OdlEndpoint {
            ip: config.ip,
            port: config.port,
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Infrastructure driver realizing chains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainDriver {
    #[default]
    #[serde(rename = "opendaylight")]
    OpenDaylight,
}

/// Infrastructure driver realizing classifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierDriver {
    #[default]
    #[serde(rename = "netvirtsfc")]
    NetvirtSfc,
}

impl ChainDriver {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainDriver::OpenDaylight => "opendaylight",
        }
    }
}

impl ClassifierDriver {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierDriver::NetvirtSfc => "netvirtsfc",
        }
    }
}

impl Display for ChainDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for ClassifierDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriversConfig {
    pub chain: ChainDriver,
    pub classifier: ClassifierDriver,
}

/// The whole daemon configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SfcdConfig {
    pub controller: ControllerConfig,
    pub drivers: DriversConfig,
    pub workers: usize,         /* concurrent realizations */
    pub state_file: PathBuf,    /* record store snapshot */
    pub inventory: PathBuf,     /* vnfs and ports */
    pub log_level: String,
}

impl Default for SfcdConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            drivers: DriversConfig::default(),
            workers: 4,
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            inventory: PathBuf::from(DEFAULT_INVENTORY),
            log_level: "info".to_string(),
        }
    }
}

impl SfcdConfig {
    /// Check the values that can't be checked by the parser.
    ///
    /// # Errors
    ///
    /// Fails if the controller port is zero or there are no workers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.controller.port == 0 {
            return Err(ConfigError::Invalid("controller port can't be 0".to_string()));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("at least one worker is needed".to_string()));
        }
        Ok(())
    }

    /// Parse a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Fails if the text is not a valid configuration.
    pub fn from_yaml(path: &Path, yaml: &str) -> Result<Self, ConfigError> {
        let config: SfcdConfig = serde_yaml_ng::from_str(yaml)
            .map_err(|e| ConfigError::Yaml(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Read the configuration file at `path`, in YAML or JSON depending on its extension.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be read, parsed or is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config = match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::from_yaml(path, &text)?
            }
            Some(ext) if ext.eq_ignore_ascii_case("json") => {
                let config: SfcdConfig = serde_json::from_str(&text)
                    .map_err(|e| ConfigError::Json(path.to_path_buf(), e))?;
                config.validate()?;
                config
            }
            Some(ext) => {
                return Err(ConfigError::UnsupportedExtension(
                    ext.to_string_lossy().into_owned(),
                ));
            }
            None => return Err(ConfigError::UnsupportedExtension(String::new())),
        };
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Read the configuration file at `path` if it exists, else use the defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but can't be loaded.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
