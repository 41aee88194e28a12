#![deny(missing_docs)]

//! Metropolis-Hastings sampler with replica exchange (parallel tempering).
//!
//! The sampler draws correlated configurations from the Born density |ψ|² of
//! a variational wavefunction, evaluated through the narrow oracle traits of
//! `vmc-core`. One sweep performs a fixed number of incremental local
//! Metropolis steps per replica and then proposes adjacent-pair exchanges
//! along the inverse-temperature ladder.

/// YAML configuration schema and defaults.
pub mod config;
/// The replica-exchange sampling kernel.
pub mod sampler;
/// Inverse-temperature ladder helpers.
pub mod tempering;

pub use config::{LadderPolicy, SamplerConfig};
pub use sampler::MetropolisExchangeSampler;
