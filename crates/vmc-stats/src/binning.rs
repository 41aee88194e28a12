use serde::{Deserialize, Serialize};

use vmc_core::errors::{ErrorInfo, VmcError};

/// Minimum number of completed bins a level must hold before its variance is
/// trusted for the error estimate. Policy constant, not a derived value.
pub const MIN_BINS: u64 = 16;

/// Structured summary of one scalar sample stream.
///
/// `sigma` and `tau_corr` are `None` while too few bins have accumulated for
/// a reliable estimate; this is deliberately distinct from a zero value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinStats {
    /// Number of raw samples pushed.
    #[serde(rename = "N")]
    pub n: u64,
    /// Running mean over all raw samples.
    #[serde(rename = "Mean")]
    pub mean: f64,
    /// Autocorrelation-corrected error of the mean, when available.
    #[serde(rename = "Sigma")]
    pub sigma: Option<f64>,
    /// Integrated autocorrelation time estimate, when available.
    #[serde(rename = "TauCorr")]
    pub tau_corr: Option<f64>,
}

/// One rung of the binning ladder.
///
/// A level receives values that are already averages over a fixed window of
/// raw samples; it pairs consecutive arrivals into bins twice that long and
/// keeps running moments over the completed bins.
#[derive(Debug, Clone, Default)]
struct BinLevel {
    pending: Option<f64>,
    count: u64,
    sum: f64,
    sum_sq: f64,
}

impl BinLevel {
    fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    fn variance(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        let mean = self.sum / self.count as f64;
        Some((self.sum_sq / self.count as f64 - mean * mean).max(0.0))
    }
}

/// Online logarithmic-binning estimator for a scalar sample stream.
///
/// The engine keeps O(levels) state: raw running moments for the mean, plus
/// one [`BinLevel`] per reduction rung. A pushed value cascades through the
/// ladder as far as completed pairs carry it, so the amortized cost per
/// sample is O(1) and no sample history is ever materialized. The deepest
/// level bounds the detectable correlation window at `2^levels` raw samples;
/// completed bins that would cascade past it are dropped.
#[derive(Debug, Clone)]
pub struct Binning {
    levels: Vec<BinLevel>,
    n: u64,
    total: f64,
    total_sq: f64,
}

impl Binning {
    /// Creates an engine with the given number of reduction levels.
    pub fn new(levels: usize) -> Result<Self, VmcError> {
        if levels == 0 {
            return Err(VmcError::Input(ErrorInfo::new(
                "no-levels",
                "binning requires at least one reduction level",
            )));
        }
        Ok(Self {
            levels: vec![BinLevel::default(); levels],
            n: 0,
            total: 0.0,
            total_sq: 0.0,
        })
    }

    /// Accepts one raw sample.
    pub fn push(&mut self, value: f64) {
        self.n += 1;
        self.total += value;
        self.total_sq += value * value;

        let mut carried = value;
        for level in self.levels.iter_mut() {
            match level.pending.take() {
                None => {
                    level.pending = Some(carried);
                    return;
                }
                Some(waiting) => {
                    let bin = 0.5 * (waiting + carried);
                    level.record(bin);
                    carried = bin;
                }
            }
        }
        // A bin cascading past the deepest level is dropped; memory stays
        // bounded at the configured level count.
    }

    /// Returns the number of raw samples pushed so far.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Returns the running mean (0 before the first push).
    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        self.total / self.n as f64
    }

    /// Returns the number of completed bins at `level`.
    pub fn bins_at_level(&self, level: usize) -> u64 {
        self.levels.get(level).map_or(0, |entry| entry.count)
    }

    /// Returns the variance of the completed bin averages at `level`.
    pub fn variance_at_level(&self, level: usize) -> Option<f64> {
        self.levels.get(level).and_then(BinLevel::variance)
    }

    /// Variance of the raw sample stream, ignoring correlation.
    pub fn naive_variance(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.total_sq / self.n as f64 - mean * mean).max(0.0)
    }

    /// Autocorrelation-corrected error of the mean.
    ///
    /// Bin averages decorrelate as the window grows, so the variance of the
    /// deepest well-populated level gives the plateau estimate of the true
    /// squared error. The largest level with at least [`MIN_BINS`] completed
    /// bins is used; `None` when no level qualifies yet.
    pub fn error_of_mean(&self) -> Option<f64> {
        let level = self
            .levels
            .iter()
            .rposition(|entry| entry.count >= MIN_BINS)?;
        let entry = &self.levels[level];
        let variance = entry.variance()?;
        Some((variance / entry.count as f64).sqrt())
    }

    /// Integrated autocorrelation time from the ratio of corrected to naive
    /// variance of the mean, clamped at zero against numerical noise.
    pub fn tau_corr(&self) -> Option<f64> {
        let sigma = self.error_of_mean()?;
        let naive = self.naive_variance();
        if naive <= 0.0 {
            return Some(0.0);
        }
        let tau = 0.5 * ((sigma * sigma) / (naive / self.n as f64) - 1.0);
        Some(tau.max(0.0))
    }

    /// Clears all levels and running totals.
    pub fn reset(&mut self) {
        for level in self.levels.iter_mut() {
            *level = BinLevel::default();
        }
        self.n = 0;
        self.total = 0.0;
        self.total_sq = 0.0;
    }

    /// Produces the structured summary of the stream so far.
    pub fn stats(&self) -> BinStats {
        BinStats {
            n: self.n,
            mean: self.mean(),
            sigma: self.error_of_mean(),
            tau_corr: self.tau_corr(),
        }
    }
}

/// Binning over a fixed-dimension vector stream, one engine per component.
#[derive(Debug, Clone)]
pub struct VectorBinning {
    components: Vec<Binning>,
}

impl VectorBinning {
    /// Creates an engine for `dim`-component samples.
    pub fn new(dim: usize, levels: usize) -> Result<Self, VmcError> {
        if dim == 0 {
            return Err(VmcError::Input(ErrorInfo::new(
                "empty-shape",
                "vector binning requires at least one component",
            )));
        }
        let mut components = Vec::with_capacity(dim);
        for _ in 0..dim {
            components.push(Binning::new(levels)?);
        }
        Ok(Self { components })
    }

    /// Returns the fixed sample dimension.
    pub fn dim(&self) -> usize {
        self.components.len()
    }

    /// Accepts one vector sample; the dimension must match exactly.
    pub fn push(&mut self, values: &[f64]) -> Result<(), VmcError> {
        if values.len() != self.components.len() {
            return Err(VmcError::Stats(
                ErrorInfo::new("dimension-mismatch", "sample dimension disagrees with engine")
                    .with_context("expected", self.components.len().to_string())
                    .with_context("actual", values.len().to_string()),
            ));
        }
        for (component, &value) in self.components.iter_mut().zip(values.iter()) {
            component.push(value);
        }
        Ok(())
    }

    /// Returns the number of vector samples pushed so far.
    pub fn n(&self) -> u64 {
        self.components[0].n()
    }

    /// Clears every component engine.
    pub fn reset(&mut self) {
        for component in self.components.iter_mut() {
            component.reset();
        }
    }

    /// Produces ordered per-component summaries.
    pub fn stats(&self) -> Vec<BinStats> {
        self.components.iter().map(Binning::stats).collect()
    }
}
