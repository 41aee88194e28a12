use vmc_mcmc::config::{LadderPolicy, SamplerConfig};

#[test]
fn defaults_fill_missing_fields() {
    let config = SamplerConfig::from_yaml("replicas: 4\n").unwrap();
    assert_eq!(config.replicas, 4);
    assert_eq!(config.sweep_size, None);
    assert!(matches!(config.ladder, LadderPolicy::Linear));
}

#[test]
fn custom_ladder_parses() {
    let text = "replicas: 3\nseed: 7\nladder:\n  type: custom\n  betas: [1.0, 0.5, 0.25]\n";
    let config = SamplerConfig::from_yaml(text).unwrap();
    assert_eq!(config.seed, 7);
    match config.ladder {
        LadderPolicy::Custom { betas } => assert_eq!(betas, vec![1.0, 0.5, 0.25]),
        LadderPolicy::Linear => panic!("expected custom ladder"),
    }
}

#[test]
fn malformed_yaml_is_a_serde_error() {
    let err = SamplerConfig::from_yaml("replicas: [oops\n").unwrap_err();
    assert_eq!(err.info().code, "config-parse");
}
