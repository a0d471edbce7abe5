use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use opest_group::{
    canonical_grouping_hash, commuting_sets_by_zbasis, remove_identity, remove_imaginary,
};
use tracing::info;

use crate::{read_hamiltonian, write_json};

#[derive(Args, Debug)]
pub struct GroupArgs {
    /// JSON list of `{label, coefficient}` terms.
    #[arg(long)]
    pub hamiltonian: PathBuf,
    /// Output directory for grouping artefacts.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &GroupArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let hamiltonian = read_hamiltonian(&args.hamiltonian)?;
    let (remainder, identity) = remove_identity(&remove_imaginary(&hamiltonian)?);
    let sets = commuting_sets_by_zbasis(&remainder);
    let grouping_hash = canonical_grouping_hash(&sets);

    fs::write(args.out.join("groups.json"), opest_group::to_json(&sets)?)?;

    let group_sizes: Vec<usize> = sets.values().map(Vec::len).collect();
    let summary = serde_json::json!({
        "hamiltonian": args.hamiltonian.display().to_string(),
        "terms": hamiltonian.len(),
        "measured_terms": remainder.len(),
        "identity": identity.coefficient().re,
        "groups": sets.len(),
        "group_sizes": group_sizes,
        "grouping_hash": grouping_hash,
    });
    write_json(args.out.join("summary.json"), &summary)?;
    info!(groups = sets.len(), hash = %grouping_hash, "wrote grouping");
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
