#![deny(missing_docs)]
#![doc = "Adaptive expectation estimation of Pauli sums from sampled measurement outcomes."]

/// Replay and product-state backends.
pub mod backend;
/// YAML estimator configuration.
pub mod config;
/// Adaptive sampling loop and result types.
pub mod estimator;
/// Outcome tables and parity extraction.
pub mod parity;
/// Sample means and covariances.
pub mod stats;

pub use backend::{BlochVector, ProductStateBackend, ReplayBackend};
pub use config::{EstimatorConfig, ReadoutNoise, SeedPolicy};
pub use estimator::{
    estimate_general_psum, estimate_locally_commuting_operator, estimate_pauli_sum,
    EstimationResult, Estimator, GeneralEstimate, GroupEstimate, LocalEstimate,
};
pub use parity::{get_parity, OutcomeTable, ParitySeries};
pub use stats::{estimator_variance, row_means, sample_covariance};
