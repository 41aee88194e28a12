use num_complex::Complex64;

use vmc_core::errors::{ErrorInfo, VmcError};
use vmc_core::machine::Machine;
use vmc_core::moves::{MoveCandidates, MoveProposer};
use vmc_core::rng::RngHandle;

use crate::config::SamplerConfig;
use crate::tempering;

/// State of one tempered chain: its configuration, the machine's incremental
/// lookup cache paired with it, and the inverse temperature pinned to this
/// ladder index.
struct Replica<L> {
    config: Vec<f64>,
    lookup: L,
    beta: f64,
}

/// Metropolis-Hastings sampler with replica exchange.
///
/// The sampler owns one configuration per replica and drives `sweep_size`
/// local Metropolis steps per replica per sweep, followed by an exchange pass
/// over adjacent ladder pairs. Acceptance-ratio evaluation is incremental:
/// every proposal is scored through [`Machine::log_val_diff`] against the
/// replica's lookup cache, so the cost of a step scales with the move size
/// rather than the configuration size.
///
/// Counters use the `2R` layout of the read surface: slots `0..R` count local
/// moves per replica, slots `R..2R` count exchange attempts per replica.
pub struct MetropolisExchangeSampler<M: Machine, P: MoveProposer> {
    machine: M,
    proposer: P,
    move_weights: Vec<f64>,
    weight_total: f64,
    replicas: Vec<Replica<M::Lookup>>,
    accept: Vec<f64>,
    moves: Vec<f64>,
    sweep_size: usize,
    log_val_accum: Complex64,
    rng: RngHandle,
    candidates: MoveCandidates,
}

impl<M: Machine, P: MoveProposer> std::fmt::Debug for MetropolisExchangeSampler<M, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetropolisExchangeSampler")
            .field("num_replicas", &self.replicas.len())
            .field("move_weights", &self.move_weights)
            .field("weight_total", &self.weight_total)
            .field("sweep_size", &self.sweep_size)
            .field("log_val_accum", &self.log_val_accum)
            .finish_non_exhaustive()
    }
}

impl<M: Machine, P: MoveProposer> MetropolisExchangeSampler<M, P> {
    /// Creates a sampler and draws an initial random configuration per
    /// replica.
    ///
    /// Fails with an input error when the machine and proposer disagree on
    /// the configuration-space size, when a supplied move-weight vector does
    /// not match the proposer's move count, or when the space is not
    /// discrete. Default move weights are uniform.
    pub fn new(
        machine: M,
        proposer: P,
        move_weights: Option<Vec<f64>>,
        config: &SamplerConfig,
    ) -> Result<Self, VmcError> {
        let space = machine.space();
        let nv = space.size();
        if !space.is_discrete() {
            return Err(VmcError::Space(ErrorInfo::new(
                "continuous-space",
                "Metropolis sampling with local moves requires a discrete space",
            )));
        }
        if proposer.space_size() != nv {
            return Err(VmcError::Input(
                ErrorInfo::new(
                    "space-mismatch",
                    "move proposer acts on a different space than the machine",
                )
                .with_context("machine", nv.to_string())
                .with_context("proposer", proposer.space_size().to_string()),
            ));
        }
        if proposer.num_moves() == 0 {
            return Err(VmcError::Input(ErrorInfo::new(
                "no-moves",
                "move proposer exposes no moves to select from",
            )));
        }
        let move_weights = match move_weights {
            Some(weights) => {
                if weights.len() != proposer.num_moves() {
                    return Err(VmcError::Input(
                        ErrorInfo::new(
                            "weight-length",
                            "move weights disagree with the proposer's move count",
                        )
                        .with_context("weights", weights.len().to_string())
                        .with_context("moves", proposer.num_moves().to_string()),
                    ));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(VmcError::Input(ErrorInfo::new(
                        "weight-range",
                        "move weights must be finite and non-negative",
                    )));
                }
                weights
            }
            None => vec![1.0; proposer.num_moves()],
        };
        let weight_total: f64 = move_weights.iter().sum();
        if weight_total <= 0.0 {
            return Err(VmcError::Input(ErrorInfo::new(
                "weight-sum",
                "move weights must not all vanish",
            )));
        }
        let betas = tempering::build_beta_ladder(&config.ladder, config.replicas)?;
        let sweep_size = match config.sweep_size {
            Some(n) => checked_sweep_size(n)?,
            // Odd sweep size avoids periodicity artifacts in measurements
            // synchronized with sweep boundaries.
            None => {
                if nv % 2 == 0 {
                    nv + 1
                } else {
                    nv
                }
            }
        };

        let mut rng = RngHandle::from_seed(config.seed);
        let mut replicas = Vec::with_capacity(betas.len());
        for beta in betas {
            let mut chain_config = vec![0.0; nv];
            space.random_fill(&mut chain_config, &mut rng)?;
            let lookup = machine.init_lookup(&chain_config)?;
            replicas.push(Replica {
                config: chain_config,
                lookup,
                beta,
            });
        }
        let log_val_accum = machine.log_val(&replicas[0].config, &replicas[0].lookup)?;
        let slots = 2 * replicas.len();

        Ok(Self {
            machine,
            proposer,
            move_weights,
            weight_total,
            replicas,
            accept: vec![0.0; slots],
            moves: vec![0.0; slots],
            sweep_size,
            log_val_accum,
            rng,
            candidates: MoveCandidates::new(),
        })
    }

    /// Clears all sampling state.
    ///
    /// When `randomize` is set every replica's configuration is redrawn
    /// uniformly from the space. In all cases the lookup caches are rebuilt
    /// from scratch, the physical chain's accumulated log-amplitude is
    /// re-derived and every counter is zeroed.
    pub fn reset(&mut self, randomize: bool) -> Result<(), VmcError> {
        for replica in &mut self.replicas {
            if randomize {
                self.machine
                    .space()
                    .random_fill(&mut replica.config, &mut self.rng)?;
            }
            replica.lookup = self.machine.init_lookup(&replica.config)?;
        }
        self.log_val_accum = self
            .machine
            .log_val(&self.replicas[0].config, &self.replicas[0].lookup)?;
        self.accept.iter_mut().for_each(|slot| *slot = 0.0);
        self.moves.iter_mut().for_each(|slot| *slot = 0.0);
        Ok(())
    }

    /// Runs one sweep: local Metropolis steps on every replica, then the
    /// replica-exchange pass.
    pub fn sweep(&mut self) -> Result<(), VmcError> {
        for rep in 0..self.replicas.len() {
            self.local_sweep(rep)?;
        }
        self.exchange_pass()
    }

    /// Returns the physical chain's current configuration.
    pub fn current_config(&self) -> &[f64] {
        &self.replicas[0].config
    }

    /// Returns the physical chain's accumulated log-amplitude.
    pub fn log_val(&self) -> Complex64 {
        self.log_val_accum
    }

    /// Returns elementwise acceptance rates over the `2R` counter layout.
    ///
    /// Slots with no recorded moves yield 0.
    pub fn acceptance(&self) -> Vec<f64> {
        self.accept
            .iter()
            .zip(self.moves.iter())
            .map(|(acc, total)| if *total == 0.0 { 0.0 } else { acc / total })
            .collect()
    }

    /// Returns the raw accept counters (`2R` layout).
    pub fn accept_counts(&self) -> &[f64] {
        &self.accept
    }

    /// Returns the raw move counters (`2R` layout).
    pub fn move_counts(&self) -> &[f64] {
        &self.moves
    }

    /// Returns the number of replicas in the ladder.
    pub fn num_replicas(&self) -> usize {
        self.replicas.len()
    }

    /// Returns the inverse temperature of every ladder index.
    pub fn betas(&self) -> Vec<f64> {
        self.replicas.iter().map(|replica| replica.beta).collect()
    }

    /// Returns the number of local steps performed per replica per sweep.
    pub fn sweep_size(&self) -> usize {
        self.sweep_size
    }

    /// Overrides the number of local steps per sweep.
    pub fn set_sweep_size(&mut self, sweep_size: usize) -> Result<(), VmcError> {
        self.sweep_size = checked_sweep_size(sweep_size)?;
        Ok(())
    }

    /// Samples produced per sweep call.
    pub fn batch_size(&self) -> usize {
        1
    }

    /// Returns the machine driving this sampler.
    pub fn machine(&self) -> &M {
        &self.machine
    }

    fn local_sweep(&mut self, rep: usize) -> Result<(), VmcError> {
        let beta = self.replicas[rep].beta;
        for _ in 0..self.sweep_size {
            let draw = self.rng.uniform() * self.weight_total;
            let move_index = pick_by_cumulative(draw, self.move_weights.iter().copied());
            self.proposer
                .candidate_moves(move_index, &self.replicas[rep].config, &mut self.candidates)?;
            if self.candidates.is_empty() {
                // An attempted move with no candidates still counts.
                self.moves[rep] += 1.0;
                continue;
            }
            let pick = self.rng.uniform();
            let chosen = pick_by_cumulative(pick, self.candidates.weights().iter().map(|w| w.re));
            let (sites, new_values) = self.candidates.candidate(chosen);

            let diff = self.machine.log_val_diff(
                &self.replicas[rep].config,
                sites,
                new_values,
                &self.replicas[rep].lookup,
            )?;
            // Born density: the acceptance ratio is the squared modulus of
            // the amplitude ratio, tempered by this replica's β.
            let ratio = (2.0 * beta * diff.re).exp();
            if ratio > self.rng.uniform() {
                self.accept[rep] += 1.0;
                let replica = &mut self.replicas[rep];
                self.machine
                    .update_lookup(&replica.config, sites, new_values, &mut replica.lookup)?;
                for (&site, &value) in sites.iter().zip(new_values.iter()) {
                    replica.config[site] = value;
                }
                if rep == 0 {
                    self.log_val_accum += diff;
                }
            }
            self.moves[rep] += 1.0;
        }
        Ok(())
    }

    fn exchange_pass(&mut self) -> Result<(), VmcError> {
        let nrep = self.replicas.len();
        if nrep < 2 {
            return Ok(());
        }
        // Odd-offset pairs first, then even offsets, so no replica takes
        // part in two proposed swaps within one pass.
        for start in [1usize, 2] {
            let mut rep = start;
            while rep < nrep {
                let prob = self.exchange_prob(rep, rep - 1)?;
                if prob > self.rng.uniform() {
                    self.swap_replicas(rep, rep - 1)?;
                    self.accept[nrep + rep] += 1.0;
                    self.accept[nrep + rep - 1] += 1.0;
                }
                self.moves[nrep + rep] += 1.0;
                self.moves[nrep + rep - 1] += 1.0;
                rep += 2;
            }
        }
        Ok(())
    }

    /// Exchange acceptance from fresh amplitude evaluations; cached deltas
    /// are not trusted across replica boundaries.
    fn exchange_prob(&self, a: usize, b: usize) -> Result<f64, VmcError> {
        let log_val_a = self
            .machine
            .log_val(&self.replicas[a].config, &self.replicas[a].lookup)?;
        let log_val_b = self
            .machine
            .log_val(&self.replicas[b].config, &self.replicas[b].lookup)?;
        Ok(tempering::exchange_acceptance(
            self.replicas[a].beta,
            log_val_a,
            self.replicas[b].beta,
            log_val_b,
        ))
    }

    fn swap_replicas(&mut self, a: usize, b: usize) -> Result<(), VmcError> {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.replicas.split_at_mut(hi);
        let low = &mut head[lo];
        let high = &mut tail[0];
        std::mem::swap(&mut low.config, &mut high.config);
        std::mem::swap(&mut low.lookup, &mut high.lookup);
        if lo == 0 {
            // The physical chain changed identity; its incremental
            // accumulator must be re-derived from a fresh evaluation.
            self.log_val_accum = self
                .machine
                .log_val(&self.replicas[0].config, &self.replicas[0].lookup)?;
        }
        Ok(())
    }
}

fn checked_sweep_size(sweep_size: usize) -> Result<usize, VmcError> {
    if sweep_size == 0 {
        return Err(VmcError::Input(
            ErrorInfo::new("sweep-size", "sweep size must be a positive integer")
                .with_context("sweep_size", sweep_size.to_string()),
        ));
    }
    Ok(sweep_size)
}

/// Returns the first index whose running weight sum meets or exceeds `draw`.
///
/// The tie break (first index, `>=`) is part of the sampling contract;
/// seeded runs depend on it. Falls back to the last index when rounding
/// leaves the cumulative sum short of the draw.
fn pick_by_cumulative(draw: f64, weights: impl Iterator<Item = f64>) -> usize {
    let mut cumulative = 0.0;
    let mut chosen = 0;
    for (index, weight) in weights.enumerate() {
        chosen = index;
        cumulative += weight;
        if draw <= cumulative {
            break;
        }
    }
    chosen
}
