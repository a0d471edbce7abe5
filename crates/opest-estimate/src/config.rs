use std::fs;
use std::path::Path;

use opest_core::{ErrorInfo, OpestError, RngHandle};
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters of the adaptive estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Shots requested from the backend per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Hard cap on pooled shots. Derived from the coefficients and the bound when absent.
    #[serde(default)]
    pub max_shots: Option<usize>,
    /// Multiplier applied to `ceil((sum |c|)^2 / bound)` for the derived cap.
    #[serde(default = "default_sample_bound_factor")]
    pub sample_bound_factor: usize,
    /// Randomly flip measured qubits per batch and undo the flips classically.
    #[serde(default = "default_symmetrize")]
    pub symmetrize: bool,
    /// Master seed and substream policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Readout noise applied by the bundled simulator.
    #[serde(default)]
    pub readout: Option<ReadoutNoise>,
}

fn default_batch_size() -> usize {
    1024
}

fn default_sample_bound_factor() -> usize {
    10
}

fn default_symmetrize() -> bool {
    true
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_shots: None,
            sample_bound_factor: default_sample_bound_factor(),
            symmetrize: default_symmetrize(),
            seed_policy: SeedPolicy::default(),
            readout: None,
        }
    }
}

fn config_error(code: &str, message: impl Into<String>) -> OpestError {
    OpestError::Config(ErrorInfo::new(code, message.into()))
}

impl EstimatorConfig {
    /// Parses a YAML document; missing fields take their defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, OpestError> {
        let config: Self = serde_yaml::from_str(contents)
            .map_err(|err| config_error("config-parse", err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, OpestError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            OpestError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents)
            .map_err(|err| err.with_context("path", path.display().to_string()))
    }

    /// Renders the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, OpestError> {
        serde_yaml::to_string(self).map_err(|err| config_error("config-serialize", err.to_string()))
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), OpestError> {
        if self.batch_size < 2 {
            return Err(OpestError::Config(
                ErrorInfo::new("batch-too-small", "batch_size must be at least 2")
                    .with_context("batch_size", self.batch_size.to_string()),
            ));
        }
        if self.sample_bound_factor == 0 {
            return Err(config_error(
                "invalid-sample-bound-factor",
                "sample_bound_factor must be positive",
            ));
        }
        if let Some(max_shots) = self.max_shots {
            if max_shots < 2 {
                return Err(OpestError::Config(
                    ErrorInfo::new("max-shots-too-small", "max_shots must be at least 2")
                        .with_context("max_shots", max_shots.to_string()),
                ));
            }
        }
        if let Some(readout) = &self.readout {
            readout.validate()?;
        }
        Ok(())
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed used for symmetrization and simulation.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional run label; labelled runs draw from their own substreams.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x0935_7E57_0B5E_4EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

impl SeedPolicy {
    /// RNG for the given substream of the master seed.
    pub fn rng(&self, substream: u64) -> RngHandle {
        match &self.label {
            Some(label) => RngHandle::labelled(self.master_seed, label, substream),
            None => RngHandle::substream(self.master_seed, substream),
        }
    }
}

/// Asymmetric readout error probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadoutNoise {
    /// Probability of reading 1 when the qubit collapsed to 0.
    #[serde(default)]
    pub p01: f64,
    /// Probability of reading 0 when the qubit collapsed to 1.
    #[serde(default)]
    pub p10: f64,
}

impl ReadoutNoise {
    /// Checks that both probabilities lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), OpestError> {
        for (name, value) in [("p01", self.p01), ("p10", self.p10)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OpestError::Config(
                    ErrorInfo::new("invalid-readout-probability", "probability outside [0, 1]")
                        .with_context(name, value.to_string()),
                ));
            }
        }
        Ok(())
    }
}
