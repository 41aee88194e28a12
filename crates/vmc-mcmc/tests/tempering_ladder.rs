use num_complex::Complex64;

use vmc_mcmc::config::LadderPolicy;
use vmc_mcmc::tempering::{build_beta_ladder, exchange_acceptance};

fn log_val(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

#[test]
fn linear_ladder_spans_down_from_one() {
    let ladder = build_beta_ladder(&LadderPolicy::Linear, 4).unwrap();
    assert_eq!(ladder, vec![1.0, 0.75, 0.5, 0.25]);
}

#[test]
fn single_replica_ladder_is_the_physical_chain() {
    let ladder = build_beta_ladder(&LadderPolicy::Linear, 1).unwrap();
    assert_eq!(ladder, vec![1.0]);
}

#[test]
fn zero_replicas_are_rejected() {
    let err = build_beta_ladder(&LadderPolicy::Linear, 0).unwrap_err();
    assert_eq!(err.info().code, "no-replicas");
}

#[test]
fn custom_ladder_is_validated() {
    let policy = LadderPolicy::Custom {
        betas: vec![1.0, 0.6, 0.2],
    };
    assert_eq!(build_beta_ladder(&policy, 3).unwrap(), vec![1.0, 0.6, 0.2]);

    let err = build_beta_ladder(&policy, 2).unwrap_err();
    assert_eq!(err.info().code, "ladder-length");

    let err = build_beta_ladder(
        &LadderPolicy::Custom {
            betas: vec![0.9, 0.5],
        },
        2,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "ladder-head");

    let err = build_beta_ladder(
        &LadderPolicy::Custom {
            betas: vec![1.0, 0.2, 0.6],
        },
        3,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "ladder-order");
}

#[test]
fn exchange_acceptance_is_a_probability() {
    let prob = exchange_acceptance(1.0, log_val(-3.0, 0.4), 0.5, log_val(-1.0, 1.1));
    assert!((0.0..=1.0).contains(&prob));
}

#[test]
fn exchange_acceptance_is_symmetric_in_the_pair() {
    // The proposal is the same physical event no matter which replica of the
    // pair names it first; together with the involutive swap this makes two
    // identical draws a no-op.
    let (beta_a, beta_b) = (1.0, 0.5);
    let (la, lb) = (log_val(-3.0, 0.4), log_val(-1.0, 1.1));
    let forward = exchange_acceptance(beta_a, la, beta_b, lb);
    let relabeled = exchange_acceptance(beta_b, lb, beta_a, la);
    assert!((forward - relabeled).abs() < 1e-15);
}

#[test]
fn exchange_acceptance_satisfies_detailed_balance() {
    let (beta_a, beta_b) = (1.0, 0.5);
    let (la, lb) = (log_val(-3.0, 0.4), log_val(-1.0, 1.1));

    let forward = exchange_acceptance(beta_a, la, beta_b, lb);
    // After an accepted swap the assignment is reversed; undoing it is the
    // reverse proposal.
    let reverse = exchange_acceptance(beta_a, lb, beta_b, la);

    assert!(forward == 1.0 || reverse == 1.0);
    let weight_ratio = (2.0 * (beta_a - beta_b) * (lb - la).re).exp();
    assert!((forward / reverse - weight_ratio).abs() < 1e-12);
}

#[test]
fn exchange_acceptance_ignores_imaginary_parts() {
    // Born density depends on |ψ|² only: a pure phase shift changes nothing.
    let base = exchange_acceptance(1.0, log_val(-2.0, 0.0), 0.75, log_val(-1.5, 0.0));
    let phased = exchange_acceptance(1.0, log_val(-2.0, 2.2), 0.75, log_val(-1.5, -0.7));
    assert!((base - phased).abs() < 1e-15);
}

#[test]
fn identical_replicas_always_exchange() {
    let prob = exchange_acceptance(1.0, log_val(-2.0, 0.1), 0.5, log_val(-2.0, 0.1));
    assert_eq!(prob, 1.0);
}
