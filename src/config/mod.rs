// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulation arguments, which may be specified in toml or json files.
//!
//! Arguments are unpacked into [`SimArgs`], where everything is optional.
//! Multiple sets of arguments can be merged, and then [`SimArgs::parse`]
//! checks them and fills in defaults to make a [`SimConfig`].


use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::{
    constants::{DEFAULT_SAMPLES_PER_TASK, DEFAULT_THREADS_PER_BLOCK},
    model::{ExecutionConfig, ModelDevice, ModelParams, PhaseConvention},
};

lazy_static::lazy_static! {
    static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    static ref MODEL_DEVICES_COMMA_SEPARATED: String = ModelDevice::iter().join(", ");
}

#[derive(Debug, Display, EnumIter, EnumString)]
enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Argument file '{file}' doesn't have a recognised file extension! Valid extensions are: {}", *ARG_FILE_TYPES_COMMA_SEPARATED)]
    UnknownArgFileType { file: PathBuf },

    #[error("Couldn't decode toml structure from {file:?}:\n{err}")]
    Toml { file: PathBuf, err: toml::de::Error },

    #[error("Couldn't decode json structure from {file:?}:\n{err}")]
    Json {
        file: PathBuf,
        err: serde_json::Error,
    },

    #[error("No modelling frequency was specified")]
    NoFreq,

    #[error("The modelling frequency must be positive; got {0} Hz")]
    BadFreq(f64),

    #[error("Unrecognised model device '{0}'. Valid devices are: {}", *MODEL_DEVICES_COMMA_SEPARATED)]
    BadDevice(String),

    #[error("'{name}' cannot be 0")]
    Zero { name: &'static str },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// Simulation arguments as they appear in an argument file. Nothing is
/// required here; [`SimArgs::parse`] reports anything that's missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimArgs {
    /// The device to model with ("cpu" or "gpu").
    pub device: Option<String>,

    /// The modelling frequency \[Hz\].
    pub freq_hz: Option<f64>,

    pub phase_convention: Option<PhaseConvention>,

    pub samples_per_task: Option<usize>,

    pub threads_per_block: Option<u32>,
}

/// Everything needed to model visibilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub device: ModelDevice,
    pub params: ModelParams,
    pub exec: ExecutionConfig,
}

impl SimArgs {
    /// Read arguments from a toml or json file; the format is determined by
    /// the file's extension.
    pub fn from_file<P: AsRef<Path>>(arg_file: P) -> Result<SimArgs, ConfigError> {
        let arg_file = arg_file.as_ref();
        debug!("Attempting to parse argument file {}", arg_file.display());

        let arg_file_type = arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        let mut contents = String::new();
        let args = match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(arg_file)?;
                fh.read_to_string(&mut contents)?;
                toml::from_str(&contents).map_err(|err| ConfigError::Toml {
                    file: arg_file.to_path_buf(),
                    err,
                })?
            }

            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(arg_file)?;
                fh.read_to_string(&mut contents)?;
                serde_json::from_str(&contents).map_err(|err| ConfigError::Json {
                    file: arg_file.to_path_buf(),
                    err,
                })?
            }

            None => {
                return Err(ConfigError::UnknownArgFileType {
                    file: arg_file.to_path_buf(),
                })
            }
        };
        trace!("{args:?}");

        Ok(args)
    }

    /// Combine two sets of arguments. Anything set in `self` takes precedence
    /// over `other`.
    pub fn merge(self, other: Self) -> Self {
        Self {
            device: self.device.or(other.device),
            freq_hz: self.freq_hz.or(other.freq_hz),
            phase_convention: self.phase_convention.or(other.phase_convention),
            samples_per_task: self.samples_per_task.or(other.samples_per_task),
            threads_per_block: self.threads_per_block.or(other.threads_per_block),
        }
    }

    /// Check the arguments and fill in defaults.
    pub fn parse(self) -> Result<SimConfig, ConfigError> {
        let SimArgs {
            device,
            freq_hz,
            phase_convention,
            samples_per_task,
            threads_per_block,
        } = self;

        let device = match device {
            None => ModelDevice::Cpu,
            Some(d) => ModelDevice::from_str(&d.to_lowercase())
                .map_err(|_| ConfigError::BadDevice(d))?,
        };

        let freq_hz = freq_hz.ok_or(ConfigError::NoFreq)?;
        if !(freq_hz.is_finite() && freq_hz > 0.0) {
            return Err(ConfigError::BadFreq(freq_hz));
        }

        let samples_per_task = samples_per_task.unwrap_or(DEFAULT_SAMPLES_PER_TASK);
        if samples_per_task == 0 {
            return Err(ConfigError::Zero {
                name: "samples_per_task",
            });
        }
        let threads_per_block = threads_per_block.unwrap_or(DEFAULT_THREADS_PER_BLOCK);
        if threads_per_block == 0 {
            return Err(ConfigError::Zero {
                name: "threads_per_block",
            });
        }

        let config = SimConfig {
            device,
            params: ModelParams {
                freq_hz,
                phase_convention: phase_convention.unwrap_or_default(),
            },
            exec: ExecutionConfig {
                samples_per_task,
                threads_per_block,
            },
        };
        debug!("Simulation config: {config:?}");
        Ok(config)
    }
}
