//! Move-proposal oracles and the reusable candidate buffer.

use num_complex::Complex64;

use crate::errors::{ErrorInfo, VmcError};
use crate::space::ConfigSpace;

/// Tolerance applied when validating stochastic move matrices.
const STOCHASTIC_TOL: f64 = 1e-6;

/// Reusable buffer of candidate local changes for one proposed move.
///
/// Each candidate is a `(sites, new_values, weight)` triple: the sites whose
/// values change, their proposed values, and the complex transition weight.
/// The buffer recycles its inner vectors so the sampling hot path performs no
/// allocation once warmed up.
#[derive(Debug, Default, Clone)]
pub struct MoveCandidates {
    sites: Vec<Vec<usize>>,
    new_values: Vec<Vec<f64>>,
    weights: Vec<Complex64>,
    len: usize,
}

impl MoveCandidates {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the buffer while keeping its allocations.
    pub fn clear(&mut self) {
        self.len = 0;
        self.weights.clear();
    }

    /// Appends one candidate, copying the slices into recycled storage.
    pub fn push(&mut self, sites: &[usize], new_values: &[f64], weight: Complex64) {
        if self.len == self.sites.len() {
            self.sites.push(Vec::new());
            self.new_values.push(Vec::new());
        }
        let slot = self.len;
        self.sites[slot].clear();
        self.sites[slot].extend_from_slice(sites);
        self.new_values[slot].clear();
        self.new_values[slot].extend_from_slice(new_values);
        self.weights.push(weight);
        self.len += 1;
    }

    /// Returns the number of stored candidates.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the buffer holds no candidates.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the candidate weights in insertion order.
    pub fn weights(&self) -> &[Complex64] {
        &self.weights
    }

    /// Returns the sites and values of the candidate at `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn candidate(&self, index: usize) -> (&[usize], &[f64]) {
        assert!(index < self.len, "candidate index out of range");
        (&self.sites[index], &self.new_values[index])
    }
}

/// Oracle enumerating candidate local changes for a selected move index.
pub trait MoveProposer {
    /// Returns the number of sites of the space the moves act on.
    fn space_size(&self) -> usize;

    /// Returns the number of distinct moves that can be selected.
    fn num_moves(&self) -> usize;

    /// Fills `out` with the candidates of move `move_index` from `config`.
    ///
    /// The first candidate must be the diagonal (no-op) entry so that the
    /// cumulative-weight draw over a row-stochastic operator is well formed.
    fn candidate_moves(
        &self,
        move_index: usize,
        config: &[f64],
        out: &mut MoveCandidates,
    ) -> Result<(), VmcError>;
}

/// One local stochastic operator: a transition-weight matrix over the joint
/// value assignments of a fixed set of sites.
#[derive(Debug, Clone)]
pub struct LocalMoveOperator {
    sites: Vec<usize>,
    matrix: Vec<Vec<Complex64>>,
}

impl LocalMoveOperator {
    /// Creates an operator acting on `sites` with the given matrix.
    ///
    /// The matrix is indexed by local configuration, least significant site
    /// first; validation happens when the operator joins a [`LocalMoveSet`].
    pub fn new(sites: Vec<usize>, matrix: Vec<Vec<Complex64>>) -> Self {
        Self { sites, matrix }
    }

    /// Returns the sites the operator acts on.
    pub fn sites(&self) -> &[usize] {
        &self.sites
    }
}

/// A validated set of local stochastic move operators over one space.
#[derive(Debug, Clone)]
pub struct LocalMoveSet {
    space: ConfigSpace,
    operators: Vec<LocalMoveOperator>,
}

impl LocalMoveSet {
    /// Builds a move set, checking every operator against `space`.
    ///
    /// Each operator matrix must be square over the joint local states of its
    /// sites, real and non-negative, row-stochastic and symmetric; anything
    /// else would bias the proposal kernel and is rejected here instead of
    /// surfacing as a silently wrong chain.
    pub fn new(space: ConfigSpace, operators: Vec<LocalMoveOperator>) -> Result<Self, VmcError> {
        if !space.is_discrete() {
            return Err(VmcError::Input(ErrorInfo::new(
                "continuous-moves",
                "local move operators require a discrete space",
            )));
        }
        if operators.is_empty() {
            return Err(VmcError::Input(ErrorInfo::new(
                "no-operators",
                "move set must hold at least one operator",
            )));
        }
        for (op_index, op) in operators.iter().enumerate() {
            validate_operator(&space, op, op_index)?;
        }
        Ok(Self { space, operators })
    }

    /// Builds one uniform single-site flip operator per site.
    ///
    /// Each operator proposes any of the other `d − 1` local values with
    /// equal weight, which is symmetric and row-stochastic by construction.
    pub fn single_site_flips(space: &ConfigSpace) -> Result<Self, VmcError> {
        let d = space.local_size();
        if d < 2 {
            return Err(VmcError::Input(ErrorInfo::new(
                "degenerate-local-space",
                "single-site flips need at least two local states",
            )));
        }
        let weight = Complex64::new(1.0 / (d - 1) as f64, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let mut operators = Vec::with_capacity(space.size());
        for site in 0..space.size() {
            let matrix = (0..d)
                .map(|row| (0..d).map(|col| if row == col { zero } else { weight }).collect())
                .collect();
            operators.push(LocalMoveOperator::new(vec![site], matrix));
        }
        Self::new(space.clone(), operators)
    }

    /// Returns the space the move set is defined over.
    pub fn space(&self) -> &ConfigSpace {
        &self.space
    }
}

impl MoveProposer for LocalMoveSet {
    fn space_size(&self) -> usize {
        self.space.size()
    }

    fn num_moves(&self) -> usize {
        self.operators.len()
    }

    fn candidate_moves(
        &self,
        move_index: usize,
        config: &[f64],
        out: &mut MoveCandidates,
    ) -> Result<(), VmcError> {
        let op = self.operators.get(move_index).ok_or_else(|| {
            VmcError::Input(
                ErrorInfo::new("move-index", "move index out of range")
                    .with_context("index", move_index.to_string())
                    .with_context("moves", self.operators.len().to_string()),
            )
        })?;
        let row = encode_local(&self.space, config, &op.sites)?;

        out.clear();
        // Diagonal entry first: a no-op candidate carrying the stay weight.
        out.push(&[], &[], op.matrix[row][row]);

        let mut values = vec![0.0; op.sites.len()];
        for (col, &weight) in op.matrix[row].iter().enumerate() {
            if col == row || weight.norm_sqr() == 0.0 {
                continue;
            }
            decode_local(&self.space, col, &mut values);
            out.push(&op.sites, &values, weight);
        }
        Ok(())
    }
}

fn validate_operator(
    space: &ConfigSpace,
    op: &LocalMoveOperator,
    op_index: usize,
) -> Result<(), VmcError> {
    let fail = |code: &str, message: &str| {
        VmcError::Input(
            ErrorInfo::new(code, message).with_context("operator", op_index.to_string()),
        )
    };
    if op.sites.is_empty() {
        return Err(fail("empty-sites", "operator must act on at least one site"));
    }
    for (idx, &site) in op.sites.iter().enumerate() {
        if site >= space.size() {
            return Err(fail("site-range", "operator site out of range"));
        }
        if op.sites[..idx].contains(&site) {
            return Err(fail("duplicate-site", "operator sites must be distinct"));
        }
    }
    let dim = space
        .local_size()
        .checked_pow(op.sites.len() as u32)
        .ok_or_else(|| fail("operator-dim", "operator dimension overflows"))?;
    if op.matrix.len() != dim || op.matrix.iter().any(|row| row.len() != dim) {
        return Err(fail(
            "matrix-shape",
            "operator matrix must be square over the joint local states",
        ));
    }
    for (i, matrix_row) in op.matrix.iter().enumerate() {
        let mut sum = 0.0;
        for (j, weight) in matrix_row.iter().enumerate() {
            if weight.im.abs() > STOCHASTIC_TOL || weight.re < -STOCHASTIC_TOL {
                return Err(fail(
                    "non-stochastic",
                    "operator weights must be real and non-negative",
                ));
            }
            if (weight.re - op.matrix[j][i].re).abs() > STOCHASTIC_TOL {
                return Err(fail("asymmetric", "operator matrix must be symmetric"));
            }
            sum += weight.re;
        }
        if (sum - 1.0).abs() > STOCHASTIC_TOL {
            return Err(fail("row-sum", "operator rows must sum to one"));
        }
    }
    Ok(())
}

/// Encodes the joint local configuration of `sites`, least significant first.
fn encode_local(space: &ConfigSpace, config: &[f64], sites: &[usize]) -> Result<usize, VmcError> {
    let d = space.local_size();
    let mut index = 0;
    let mut stride = 1;
    for &site in sites {
        let value = config.get(site).copied().ok_or_else(|| {
            VmcError::Space(
                ErrorInfo::new("config-size", "configuration shorter than operator site")
                    .with_context("site", site.to_string()),
            )
        })?;
        let local = space.state_index(value).ok_or_else(|| {
            VmcError::Space(
                ErrorInfo::new("unknown-state", "configuration value not in the local state set")
                    .with_context("site", site.to_string())
                    .with_context("value", value.to_string()),
            )
        })?;
        index += local * stride;
        stride *= d;
    }
    Ok(index)
}

/// Decodes a joint local configuration index into per-site values.
fn decode_local(space: &ConfigSpace, mut index: usize, values: &mut [f64]) {
    let d = space.local_size();
    for value in values.iter_mut() {
        *value = space.local_states()[index % d];
        index /= d;
    }
}
