use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use opest_core::Program;
use opest_estimate::{Estimator, EstimatorConfig, ProductStateBackend};
use tracing::info;

use crate::{read_hamiltonian, write_json};

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// JSON list of `{label, coefficient}` terms.
    #[arg(long)]
    pub hamiltonian: PathBuf,
    /// JSON state-preparation program; qubits start in |0> when omitted.
    #[arg(long)]
    pub program: Option<PathBuf>,
    /// YAML estimator configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Target variance of the summed estimator.
    #[arg(long)]
    pub variance_bound: f64,
    /// Output directory for estimation artefacts.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &EstimateArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let hamiltonian = read_hamiltonian(&args.hamiltonian)?;
    let program: Program = match &args.program {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Program::new(),
    };
    let config = match &args.config {
        Some(path) => EstimatorConfig::load(path)?,
        None => EstimatorConfig::default(),
    };

    let mut backend = ProductStateBackend::new(config.seed_policy.rng(1));
    if let Some(readout) = config.readout {
        backend = backend.with_readout(readout)?;
    }
    let mut estimator = Estimator::new(config.clone())?;
    let estimate =
        estimator.estimate_general_psum(&program, &hamiltonian, args.variance_bound, &backend)?;
    info!(
        expectation = estimate.expectation,
        variance = estimate.variance,
        shots = estimate.shots,
        "estimation finished"
    );

    let payload = serde_json::json!({
        "hamiltonian": args.hamiltonian.display().to_string(),
        "variance_bound": args.variance_bound,
        "seed": config.seed_policy.master_seed,
        "label": config.seed_policy.label,
        "estimate": estimate,
    });
    write_json(args.out.join("estimate.json"), &payload)?;
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}
