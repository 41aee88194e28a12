use indexmap::IndexMap;
use serde::Serialize;

use vmc_core::errors::{ErrorInfo, VmcError};

use crate::binning::{BinStats, Binning, VectorBinning};

/// Default number of binning levels for registered observables.
const DEFAULT_LEVELS: usize = 16;

/// One sample for a registered observable.
#[derive(Debug, Clone, PartialEq)]
pub enum ObsValue {
    /// A scalar sample.
    Scalar(f64),
    /// A fixed-dimension vector sample.
    Vector(Vec<f64>),
}

/// Summary statistics for one observable.
///
/// Vector observables report one record per component, in component order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ObsStats {
    /// Summary of a scalar observable.
    Scalar(BinStats),
    /// Ordered per-component summaries of a vector observable.
    Vector(Vec<BinStats>),
}

#[derive(Debug, Clone)]
enum ObsEntry {
    Scalar(Binning),
    Vector(VectorBinning),
}

/// Registry mapping observable names to binning engines.
///
/// Entries keep their insertion order, which is also the order reports are
/// emitted in.
#[derive(Debug, Clone)]
pub struct ObsManager {
    entries: IndexMap<String, ObsEntry>,
    levels: usize,
}

impl Default for ObsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ObsManager {
    /// Creates a registry using the default level count per engine.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            levels: DEFAULT_LEVELS,
        }
    }

    /// Creates a registry whose engines use `levels` reduction levels.
    pub fn with_levels(levels: usize) -> Result<Self, VmcError> {
        if levels == 0 {
            return Err(VmcError::Input(ErrorInfo::new(
                "no-levels",
                "binning requires at least one reduction level",
            )));
        }
        Ok(Self {
            entries: IndexMap::new(),
            levels,
        })
    }

    /// Registers a scalar observable, replacing any engine under `name`.
    pub fn add_scalar(&mut self, name: impl Into<String>) -> Result<(), VmcError> {
        let engine = Binning::new(self.levels)?;
        self.entries.insert(name.into(), ObsEntry::Scalar(engine));
        Ok(())
    }

    /// Registers a `dim`-component vector observable, replacing any engine
    /// under `name`.
    pub fn add_vector(&mut self, name: impl Into<String>, dim: usize) -> Result<(), VmcError> {
        let engine = VectorBinning::new(dim, self.levels)?;
        self.entries.insert(name.into(), ObsEntry::Vector(engine));
        Ok(())
    }

    /// Pushes one sample into the named observable's engine.
    pub fn push(&mut self, name: &str, value: ObsValue) -> Result<(), VmcError> {
        let entry = self.entries.get_mut(name).ok_or_else(|| {
            VmcError::Stats(
                ErrorInfo::new("unknown-observable", "observable was never registered")
                    .with_context("name", name.to_string())
                    .with_hint("call add_scalar or add_vector first"),
            )
        })?;
        match (entry, value) {
            (ObsEntry::Scalar(engine), ObsValue::Scalar(sample)) => {
                engine.push(sample);
                Ok(())
            }
            (ObsEntry::Vector(engine), ObsValue::Vector(sample)) => engine.push(&sample),
            _ => Err(VmcError::Stats(
                ErrorInfo::new("shape-mismatch", "sample shape disagrees with the registration")
                    .with_context("name", name.to_string()),
            )),
        }
    }

    /// Returns the registered observable names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of registered observables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no observable is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the summary of one observable.
    pub fn stats(&self, name: &str) -> Result<ObsStats, VmcError> {
        let entry = self.entries.get(name).ok_or_else(|| {
            VmcError::Stats(
                ErrorInfo::new("unknown-observable", "observable was never registered")
                    .with_context("name", name.to_string()),
            )
        })?;
        Ok(match entry {
            ObsEntry::Scalar(engine) => ObsStats::Scalar(engine.stats()),
            ObsEntry::Vector(engine) => ObsStats::Vector(engine.stats()),
        })
    }

    /// Returns every observable's summary in insertion order.
    pub fn all_stats(&self) -> Vec<(String, ObsStats)> {
        self.entries
            .iter()
            .map(|(name, entry)| {
                let stats = match entry {
                    ObsEntry::Scalar(engine) => ObsStats::Scalar(engine.stats()),
                    ObsEntry::Vector(engine) => ObsStats::Vector(engine.stats()),
                };
                (name.clone(), stats)
            })
            .collect()
    }

    /// Clears every engine while keeping the registrations.
    pub fn reset_all(&mut self) {
        for entry in self.entries.values_mut() {
            match entry {
                ObsEntry::Scalar(engine) => engine.reset(),
                ObsEntry::Vector(engine) => engine.reset(),
            }
        }
    }
}
