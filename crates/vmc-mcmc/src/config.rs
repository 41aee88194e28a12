use serde::{Deserialize, Serialize};

use vmc_core::errors::{ErrorInfo, VmcError};

/// YAML-configurable parameters governing a sampler instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Number of replicas in the tempering ladder.
    #[serde(default = "default_replicas")]
    pub replicas: usize,
    /// Master seed for the sampler's random stream.
    #[serde(default = "default_master_seed")]
    pub seed: u64,
    /// Optional override for the number of local steps per sweep.
    ///
    /// When absent the sweep size defaults to the configuration size,
    /// incremented by one if even, so sweep-synchronized measurements do not
    /// alias onto a periodicity of the move schedule.
    #[serde(default)]
    pub sweep_size: Option<usize>,
    /// Inverse-temperature ladder specification.
    #[serde(default)]
    pub ladder: LadderPolicy,
}

fn default_replicas() -> usize {
    1
}

fn default_master_seed() -> u64 {
    0xD1CE_5EED_0000_0001_u64
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            replicas: default_replicas(),
            seed: default_master_seed(),
            sweep_size: None,
            ladder: LadderPolicy::default(),
        }
    }
}

impl SamplerConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, VmcError> {
        serde_yaml::from_str(text).map_err(|err| {
            VmcError::Serde(ErrorInfo::new("config-parse", err.to_string()))
        })
    }
}

/// Supported inverse-temperature ladder constructions.
///
/// The replica at index 0 is always the physical chain at β = 1; exchanges
/// move configurations between indices, never the temperatures themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LadderPolicy {
    /// Evenly spaced ladder `β_i = 1 − i/R`.
    Linear,
    /// Explicit list of inverse temperatures, one per replica.
    Custom {
        /// Ordered inverse temperatures; `betas[0]` must equal 1.
        betas: Vec<f64>,
    },
}

impl Default for LadderPolicy {
    fn default() -> Self {
        LadderPolicy::Linear
    }
}
