use std::error::Error;
use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};
use commands::{
    estimate::{self, EstimateArgs},
    group::{self, GroupArgs},
};
use opest_core::PauliSum;
use tracing::Level;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "opest-sim", about = "Pauli-sum grouping and adaptive estimation CLI")]
struct Cli {
    /// Log verbosity: error, warn, info, debug or trace.
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Group a Hamiltonian into shared measurement bases.
    Group(GroupArgs),
    /// Estimate a Hamiltonian against the product-state simulator.
    Estimate(EstimateArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Group(args) => group::run(&args),
        Command::Estimate(args) => estimate::run(&args),
    }
}

fn read_hamiltonian(path: &Path) -> Result<PauliSum, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    Ok(opest_group::sum_from_json(&contents)?)
}

fn write_json<P: AsRef<Path>, T: serde::Serialize>(
    path: P,
    value: &T,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
