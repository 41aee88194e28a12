use num_complex::Complex64;

use vmc_core::errors::{ErrorInfo, VmcError};

use crate::config::LadderPolicy;

/// Builds the inverse-temperature ladder following the provided policy.
///
/// Index 0 always carries β = 1 (the physical chain). Custom ladders must be
/// strictly decreasing with every β in `(0, 1]`.
pub fn build_beta_ladder(policy: &LadderPolicy, replicas: usize) -> Result<Vec<f64>, VmcError> {
    if replicas == 0 {
        return Err(VmcError::Input(ErrorInfo::new(
            "no-replicas",
            "sampler requires at least one replica",
        )));
    }
    match policy {
        LadderPolicy::Linear => Ok((0..replicas)
            .map(|i| 1.0 - i as f64 / replicas as f64)
            .collect()),
        LadderPolicy::Custom { betas } => {
            if betas.len() != replicas {
                return Err(VmcError::Input(
                    ErrorInfo::new("ladder-length", "ladder length disagrees with replica count")
                        .with_context("replicas", replicas.to_string())
                        .with_context("betas", betas.len().to_string()),
                ));
            }
            if !betas[0].is_finite() || (betas[0] - 1.0).abs() > f64::EPSILON {
                return Err(VmcError::Input(
                    ErrorInfo::new("ladder-head", "replica 0 must run at β = 1")
                        .with_context("beta", betas[0].to_string()),
                ));
            }
            for pair in betas.windows(2) {
                if !pair[1].is_finite() || pair[1] <= 0.0 || pair[1] >= pair[0] {
                    return Err(VmcError::Input(
                        ErrorInfo::new(
                            "ladder-order",
                            "inverse temperatures must strictly decrease within (0, 1]",
                        )
                        .with_context("betas", format!("{:?}", pair)),
                    ));
                }
            }
            Ok(betas.clone())
        }
    }
}

/// Acceptance probability for exchanging two replicas.
///
/// The sampled density is Born |ψ|², so the detailed-balance criterion uses
/// twice the real part of the log-amplitude difference:
/// `min(1, exp(2·(β_a − β_b)·Re(logψ_b − logψ_a)))`. Only the two replicas'
/// own amplitudes and temperatures enter.
pub fn exchange_acceptance(
    beta_a: f64,
    log_val_a: Complex64,
    beta_b: f64,
    log_val_b: Complex64,
) -> f64 {
    (2.0 * (beta_a - beta_b) * (log_val_b - log_val_a).re)
        .exp()
        .min(1.0)
}
