#![deny(missing_docs)]

//! Online statistics for Markov-chain sample streams.
//!
//! The binning engine consumes one scalar or vector value per recorded sweep
//! and maintains mean, variance and an autocorrelation-corrected error bar in
//! O(log N) memory. The observable registry maps names to engines and feeds
//! the JSON reporting layer.

/// Logarithmic binning (blocking) estimators.
pub mod binning;
/// Observable registry.
pub mod obs;
/// Iteration records and the JSON report writer.
pub mod report;

pub use binning::{BinStats, Binning, VectorBinning, MIN_BINS};
pub use obs::{ObsManager, ObsStats, ObsValue};
pub use report::{IterationRecord, ReportWriter};
