//! Configuration-space descriptions consumed by samplers and oracles.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, VmcError};
use crate::rng::RngHandle;

/// Describes the configuration space a wavefunction is defined over.
///
/// A configuration is an ordered sequence of real site variables of length
/// [`ConfigSpace::size`]. Discrete spaces carry the per-site value set; every
/// site draws from the same set. Continuous spaces carry no value set and
/// cannot be sampled by the Metropolis machinery in this workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSpace {
    size: usize,
    local_states: Vec<f64>,
}

impl ConfigSpace {
    /// Creates a discrete space with the given per-site value set.
    pub fn discrete(size: usize, local_states: Vec<f64>) -> Result<Self, VmcError> {
        if size == 0 {
            return Err(VmcError::Space(ErrorInfo::new(
                "empty-space",
                "space must have at least one site",
            )));
        }
        if local_states.is_empty() {
            return Err(VmcError::Space(ErrorInfo::new(
                "empty-local-states",
                "discrete space requires a non-empty per-site value set",
            )));
        }
        for (idx, value) in local_states.iter().enumerate() {
            if !value.is_finite() {
                return Err(VmcError::Space(
                    ErrorInfo::new("non-finite-state", "local state must be finite")
                        .with_context("index", idx.to_string()),
                ));
            }
            if local_states[..idx].contains(value) {
                return Err(VmcError::Space(
                    ErrorInfo::new("duplicate-state", "local states must be distinct")
                        .with_context("value", value.to_string()),
                ));
            }
        }
        Ok(Self { size, local_states })
    }

    /// Creates a continuous space of the given size.
    pub fn continuous(size: usize) -> Result<Self, VmcError> {
        if size == 0 {
            return Err(VmcError::Space(ErrorInfo::new(
                "empty-space",
                "space must have at least one site",
            )));
        }
        Ok(Self {
            size,
            local_states: Vec::new(),
        })
    }

    /// Returns the number of sites (visible units).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns whether each site draws from a finite value set.
    pub fn is_discrete(&self) -> bool {
        !self.local_states.is_empty()
    }

    /// Returns the number of values a single site can take.
    pub fn local_size(&self) -> usize {
        self.local_states.len()
    }

    /// Returns the per-site value set (empty for continuous spaces).
    pub fn local_states(&self) -> &[f64] {
        &self.local_states
    }

    /// Returns the index of `value` within the per-site value set.
    pub fn state_index(&self, value: f64) -> Option<usize> {
        self.local_states.iter().position(|&state| state == value)
    }

    /// Fills `config` with an independent uniform draw per site.
    pub fn random_fill(&self, config: &mut [f64], rng: &mut RngHandle) -> Result<(), VmcError> {
        if !self.is_discrete() {
            return Err(VmcError::Space(ErrorInfo::new(
                "continuous-random",
                "uniform configuration draws require a discrete space",
            )));
        }
        if config.len() != self.size {
            return Err(VmcError::Space(
                ErrorInfo::new("config-size", "configuration length disagrees with space")
                    .with_context("expected", self.size.to_string())
                    .with_context("actual", config.len().to_string()),
            ));
        }
        for site in config.iter_mut() {
            *site = self.local_states[rng.index(self.local_states.len())];
        }
        Ok(())
    }
}
