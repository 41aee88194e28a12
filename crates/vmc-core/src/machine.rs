//! Amplitude-oracle trait for variational wavefunctions.

use num_complex::Complex64;

use crate::errors::VmcError;
use crate::space::ConfigSpace;

/// Variational wavefunction amplitude oracle.
///
/// Implementations return `log ψ(v)` as a complex number; the sampled density
/// is the Born probability `|ψ|²`, so acceptance ratios formed from these
/// values square the modulus (`exp(2·Re Δlogψ)`). Samplers apply this
/// convention uniformly to local moves and replica exchanges.
///
/// `Lookup` is the incremental evaluation cache: an opaque capability owned
/// by the machine, created from a configuration and kept consistent with it
/// by [`Machine::update_lookup`] after every committed move. Samplers never
/// inspect a lookup; they only create, pass and swap values of this type,
/// which keeps the per-move cost proportional to the move size rather than
/// the configuration size.
pub trait Machine {
    /// Incremental evaluation cache paired with one configuration.
    type Lookup;

    /// Returns the configuration space the machine is defined over.
    fn space(&self) -> &ConfigSpace;

    /// Builds a fresh lookup cache for `config`.
    fn init_lookup(&self, config: &[f64]) -> Result<Self::Lookup, VmcError>;

    /// Evaluates `log ψ(config)` using the paired lookup cache.
    fn log_val(&self, config: &[f64], lookup: &Self::Lookup) -> Result<Complex64, VmcError>;

    /// Evaluates `log ψ(config') − log ψ(config)` for the local change that
    /// sets `config[sites[i]] = new_values[i]`, without committing it.
    fn log_val_diff(
        &self,
        config: &[f64],
        sites: &[usize],
        new_values: &[f64],
        lookup: &Self::Lookup,
    ) -> Result<Complex64, VmcError>;

    /// Updates the lookup cache to reflect a move that is about to be
    /// committed to `config`.
    fn update_lookup(
        &self,
        config: &[f64],
        sites: &[usize],
        new_values: &[f64],
        lookup: &mut Self::Lookup,
    ) -> Result<(), VmcError>;
}
