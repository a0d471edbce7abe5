use nalgebra::DMatrix;
use opest_core::{
    Backend, ErrorInfo, Instruction, OpestError, Operand, PauliSum, PauliTerm, Program, RngHandle,
};
use opest_group::{
    commuting_sets_by_zbasis, diagonal_basis_commutes, get_diagonalizing_basis, remove_identity,
    remove_imaginary, rotation_for_basis, BasisAssignment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EstimatorConfig;
use crate::parity::{get_parity, OutcomeTable};
use crate::stats::{estimator_variance, row_means, sample_covariance};

/// Statistics of one adaptive estimation of a diagonal set of terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    /// Estimated expectation of the weighted sum.
    pub mean: f64,
    /// Coefficient-weighted mean parity of every term.
    pub term_means: Vec<f64>,
    /// Sample covariance of the weighted parity series.
    pub covariance: DMatrix<f64>,
    /// `sum(covariance) / (shots - 1)`.
    pub estimator_variance: f64,
    /// Pooled shots.
    pub shots: usize,
}

/// Result of estimating a locally commuting sum, identity offset included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEstimate {
    /// Expectation value including the identity coefficient.
    pub expectation: f64,
    /// Estimator variance.
    pub variance: f64,
    /// Pooled shots.
    pub shots: usize,
}

/// Per-group part of a [`GeneralEstimate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEstimate {
    /// Identifier of the measurement basis, e.g. `"X0X1"`.
    pub basis: String,
    /// Ids of the member terms.
    pub terms: Vec<String>,
    /// Estimated expectation of the group.
    pub expectation: f64,
    /// Estimator variance of the group.
    pub variance: f64,
    /// Shots spent on the group.
    pub shots: usize,
}

/// Result of estimating an arbitrary sum group by group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralEstimate {
    /// Sum of group expectations plus the identity coefficient.
    pub expectation: f64,
    /// Sum of group variances.
    pub variance: f64,
    /// Total shots over all groups.
    pub shots: usize,
    /// Group results in grouping order.
    pub groups: Vec<GroupEstimate>,
}

fn estimate_error(code: &str, message: impl Into<String>) -> OpestError {
    OpestError::Estimate(ErrorInfo::new(code, message.into()))
}

fn check_bound(variance_bound: f64) -> Result<(), OpestError> {
    if variance_bound.is_finite() && variance_bound > 0.0 {
        Ok(())
    } else {
        Err(OpestError::Estimate(
            ErrorInfo::new("invalid-variance-bound", "variance bound must be finite and positive")
                .with_context("variance_bound", variance_bound.to_string()),
        ))
    }
}

fn check_diagonal(terms: &[PauliTerm], basis: &BasisAssignment) -> Result<(), OpestError> {
    for (idx, a) in terms.iter().enumerate() {
        if let Some(b) = terms[idx + 1..]
            .iter()
            .find(|b| !diagonal_basis_commutes(a, b))
        {
            return Err(OpestError::Commutation(
                ErrorInfo::new("non-diagonal-terms", "terms do not share a diagonal basis")
                    .with_context("left", a.id())
                    .with_context("right", b.id()),
            ));
        }
    }
    for term in terms {
        let covered = term
            .factors()
            .iter()
            .all(|(&qubit, &kind)| basis.kind(qubit) == Some(kind));
        if !covered {
            return Err(OpestError::Commutation(
                ErrorInfo::new("term-outside-basis", "term is not diagonal in the basis")
                    .with_context("term", term.id())
                    .with_context("basis", basis.to_term().id()),
            ));
        }
    }
    Ok(())
}

fn measurement_program(
    program: &Program,
    rotations: &Program,
    qubits: &[usize],
    flips: &[bool],
) -> Program {
    let mut experiment = program.clone();
    experiment.extend_from(rotations);
    for (&qubit, &flip) in qubits.iter().zip(flips) {
        if flip {
            experiment.push(Instruction::X { qubit });
        }
    }
    for (slot, &qubit) in qubits.iter().enumerate() {
        experiment.push(Instruction::Measure { qubit, slot });
    }
    experiment
}

/// Runs one experiment and undoes the flips on the returned rows.
fn run_flipped(
    backend: &dyn Backend,
    experiment: &Program,
    flips: &[bool],
    trials: usize,
) -> Result<Vec<Vec<u8>>, OpestError> {
    let mut rows = backend.run(experiment, trials)?;
    if rows.is_empty() {
        return Err(OpestError::Estimate(
            ErrorInfo::new("empty-batch", "backend returned no outcomes")
                .with_context("requested", trials.to_string()),
        ));
    }
    for row in &mut rows {
        for (bit, &flip) in row.iter_mut().zip(flips) {
            if flip {
                *bit ^= 1;
            }
        }
    }
    Ok(rows)
}

fn summarize(
    terms: &[PauliTerm],
    coefficients: &[f64],
    table: &OutcomeTable,
) -> Result<EstimationResult, OpestError> {
    let parity = get_parity(terms, table)?;
    let weighted = DMatrix::from_fn(parity.nrows(), parity.ncols(), |term, shot| {
        coefficients[term] * parity[(term, shot)]
    });
    let means = row_means(&weighted);
    let covariance = sample_covariance(&weighted)?;
    let shots = table.shots();
    Ok(EstimationResult {
        mean: means.sum(),
        term_means: means.iter().copied().collect(),
        estimator_variance: estimator_variance(&covariance, shots),
        covariance,
        shots,
    })
}

/// Adaptive estimator carrying its configuration and symmetrization RNG.
#[derive(Debug, Clone)]
pub struct Estimator {
    config: EstimatorConfig,
    rng: RngHandle,
}

impl Estimator {
    /// Validates `config` and seeds the RNG from its seed policy.
    pub fn new(config: EstimatorConfig) -> Result<Self, OpestError> {
        config.validate()?;
        let rng = config.seed_policy.rng(0);
        Ok(Self { config, rng })
    }

    /// Active configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    fn shot_cap(&self, coefficients: &[f64], variance_bound: f64) -> usize {
        if let Some(max_shots) = self.config.max_shots {
            return max_shots;
        }
        let l1: f64 = coefficients.iter().map(|c| c.abs()).sum();
        let samples = (l1 * l1 / variance_bound).ceil() as usize;
        self.config
            .sample_bound_factor
            .saturating_mul(samples)
            .max(2)
    }

    /// Runs one batch of `trials` shots.
    ///
    /// With symmetrization the batch is split into a random flip pattern and
    /// its complement, so every pooled batch sees each qubit flipped in half
    /// of its shots.
    fn run_batch(
        &mut self,
        backend: &dyn Backend,
        program: &Program,
        rotations: &Program,
        qubits: &[usize],
        trials: usize,
    ) -> Result<Vec<Vec<u8>>, OpestError> {
        if !self.config.symmetrize {
            let flips = vec![false; qubits.len()];
            let experiment = measurement_program(program, rotations, qubits, &flips);
            return run_flipped(backend, &experiment, &flips, trials);
        }

        let flips = self.rng.bits(qubits.len());
        let complement: Vec<bool> = flips.iter().map(|flip| !flip).collect();
        let first = (trials + 1) / 2;
        let experiment = measurement_program(program, rotations, qubits, &flips);
        let mut rows = run_flipped(backend, &experiment, &flips, first)?;
        if trials > first {
            let experiment = measurement_program(program, rotations, qubits, &complement);
            rows.extend(run_flipped(backend, &experiment, &complement, trials - first)?);
        }
        Ok(rows)
    }

    /// Samples `terms` in `basis` until the estimator variance reaches `variance_bound`.
    ///
    /// `terms` must be a sum or a list of terms that are all diagonal in
    /// `basis`. Each batch runs a copy of `program` followed by the basis
    /// rotations, optional symmetrization flips, and one measurement per basis
    /// qubit in ascending order. Symmetrized batches run as a complementary
    /// pair of flip patterns. Sampling stops at the bound or at the shot cap,
    /// whichever comes first.
    pub fn estimate_pauli_sum(
        &mut self,
        terms: impl Into<Operand>,
        basis: &BasisAssignment,
        program: &Program,
        variance_bound: f64,
        backend: &dyn Backend,
    ) -> Result<EstimationResult, OpestError> {
        let terms = terms.into().into_terms()?;
        if terms.is_empty() {
            return Err(estimate_error("empty-sum", "no terms to estimate"));
        }
        check_bound(variance_bound)?;
        check_diagonal(&terms, basis)?;

        let coefficients: Vec<f64> = terms.iter().map(|term| term.coefficient().re).collect();
        let cap = self.shot_cap(&coefficients, variance_bound);
        let qubits = basis.qubits();
        let rotations = rotation_for_basis(basis);
        let mut table = OutcomeTable::new(qubits.clone())?;
        let mut latest: Option<EstimationResult> = None;

        while table.shots() < cap {
            let trials = self.config.batch_size.min(cap - table.shots());
            let rows = self.run_batch(backend, program, &rotations, &qubits, trials)?;
            table.append(rows)?;
            if table.shots() < 2 {
                continue;
            }

            let current = summarize(&terms, &coefficients, &table)?;
            debug!(
                shots = current.shots,
                variance = current.estimator_variance,
                bound = variance_bound,
                "pooled measurement batch"
            );
            if current.estimator_variance <= variance_bound {
                info!(
                    shots = current.shots,
                    mean = current.mean,
                    variance = current.estimator_variance,
                    "estimate converged"
                );
                return Ok(current);
            }
            latest = Some(current);
        }

        match latest {
            Some(result) => {
                info!(
                    shots = result.shots,
                    cap,
                    variance = result.estimator_variance,
                    bound = variance_bound,
                    "shot cap reached before variance bound"
                );
                Ok(result)
            }
            None => Err(OpestError::Estimate(
                ErrorInfo::new("insufficient-shots", "shot cap reached with fewer than two shots")
                    .with_context("cap", cap.to_string())
                    .with_context("shots", table.shots().to_string()),
            )),
        }
    }

    /// Estimates a sum whose terms share one diagonal basis.
    ///
    /// Imaginary parts are dropped and the identity coefficient is added back
    /// after sampling with zero variance. An identity-only sum never reaches
    /// the backend.
    pub fn estimate_locally_commuting_operator(
        &mut self,
        program: &Program,
        pauli_sum: &PauliSum,
        variance_bound: f64,
        backend: &dyn Backend,
    ) -> Result<LocalEstimate, OpestError> {
        check_bound(variance_bound)?;
        let real = remove_imaginary(pauli_sum)?;
        let (remainder, identity) = remove_identity(&real);
        let offset = identity.coefficient().re;
        if remainder.is_empty() {
            return Ok(LocalEstimate {
                expectation: offset,
                variance: 0.0,
                shots: 0,
            });
        }

        let basis = BasisAssignment::from_term(&get_diagonalizing_basis(remainder.terms())?);
        let result = self.estimate_pauli_sum(remainder, &basis, program, variance_bound, backend)?;
        Ok(LocalEstimate {
            expectation: result.mean + offset,
            variance: result.estimator_variance,
            shots: result.shots,
        })
    }

    /// Estimates an arbitrary real sum by grouping it into shared bases.
    ///
    /// Every group receives `variance_bound / groups` so that the summed
    /// variance meets the overall bound.
    pub fn estimate_general_psum(
        &mut self,
        program: &Program,
        pauli_sum: &PauliSum,
        variance_bound: f64,
        backend: &dyn Backend,
    ) -> Result<GeneralEstimate, OpestError> {
        check_bound(variance_bound)?;
        let real = remove_imaginary(pauli_sum)?;
        let (remainder, identity) = remove_identity(&real);
        let sets = commuting_sets_by_zbasis(&remainder);
        let mut estimate = GeneralEstimate {
            expectation: identity.coefficient().re,
            variance: 0.0,
            shots: 0,
            groups: Vec::with_capacity(sets.len()),
        };
        if sets.is_empty() {
            return Ok(estimate);
        }

        let group_bound = variance_bound / sets.len() as f64;
        for (key, members) in &sets {
            let basis = key.to_assignment();
            let result =
                self.estimate_pauli_sum(members.as_slice(), &basis, program, group_bound, backend)?;
            estimate.expectation += result.mean;
            estimate.variance += result.estimator_variance;
            estimate.shots += result.shots;
            estimate.groups.push(GroupEstimate {
                basis: key.to_term().id(),
                terms: members.iter().map(PauliTerm::id).collect(),
                expectation: result.mean,
                variance: result.estimator_variance,
                shots: result.shots,
            });
        }
        info!(
            groups = estimate.groups.len(),
            shots = estimate.shots,
            expectation = estimate.expectation,
            "estimated general pauli sum"
        );
        Ok(estimate)
    }
}

/// Estimates a diagonal set of terms with the default configuration.
pub fn estimate_pauli_sum(
    terms: impl Into<Operand>,
    basis: &BasisAssignment,
    program: &Program,
    variance_bound: f64,
    backend: &dyn Backend,
    symmetrize: bool,
) -> Result<EstimationResult, OpestError> {
    let config = EstimatorConfig {
        symmetrize,
        ..EstimatorConfig::default()
    };
    Estimator::new(config)?.estimate_pauli_sum(terms, basis, program, variance_bound, backend)
}

/// Estimates a locally commuting sum with the default configuration.
pub fn estimate_locally_commuting_operator(
    program: &Program,
    pauli_sum: &PauliSum,
    variance_bound: f64,
    backend: &dyn Backend,
) -> Result<LocalEstimate, OpestError> {
    Estimator::new(EstimatorConfig::default())?.estimate_locally_commuting_operator(
        program,
        pauli_sum,
        variance_bound,
        backend,
    )
}

/// Estimates an arbitrary sum with the default configuration.
pub fn estimate_general_psum(
    program: &Program,
    pauli_sum: &PauliSum,
    variance_bound: f64,
    backend: &dyn Backend,
) -> Result<GeneralEstimate, OpestError> {
    Estimator::new(EstimatorConfig::default())?.estimate_general_psum(
        program,
        pauli_sum,
        variance_bound,
        backend,
    )
}
