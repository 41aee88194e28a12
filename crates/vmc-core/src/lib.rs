#![deny(missing_docs)]

//! Core traits and data types for the VMC sampling engine.
//!
//! This crate defines the narrow interfaces the sampler consumes: the
//! configuration-space description, the amplitude oracle with its opaque
//! incremental lookup cache, and the move-proposal oracle, together with the
//! structured error surface and the deterministic RNG policy shared by the
//! whole workspace.

/// Structured error types shared across the VMC crates.
pub mod errors;
/// Amplitude-oracle trait for variational wavefunctions.
pub mod machine;
/// Move-proposal oracles and the reusable candidate buffer.
pub mod moves;
/// Deterministic RNG wrapper and seed-derivation helpers.
pub mod rng;
/// Configuration-space descriptions.
pub mod space;

pub use errors::{ErrorInfo, VmcError};
pub use machine::Machine;
pub use moves::{LocalMoveOperator, LocalMoveSet, MoveCandidates, MoveProposer};
pub use rng::{derive_substream_seed, RngHandle};
pub use space::ConfigSpace;
