use sha2::{Digest, Sha256};

use crate::grouping::DiagonalSets;

fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

/// Computes the canonical hash of a grouping.
///
/// Covers the group order, each key and the ids of the member terms;
/// coefficients are excluded so that reweighting a Hamiltonian keeps its digest.
pub fn canonical_grouping_hash(sets: &DiagonalSets) -> String {
    let mut hasher = Sha256::new();
    hasher.update((sets.len() as u64).to_le_bytes());
    for (key, members) in sets {
        hasher.update((key.len() as u64).to_le_bytes());
        for &(qubit, kind) in key.pairs() {
            hasher.update((qubit as u64).to_le_bytes());
            hasher.update([kind.as_char() as u8]);
        }
        hasher.update((members.len() as u64).to_le_bytes());
        for term in members {
            update_str(&mut hasher, &term.id());
        }
    }

    let digest = hasher.finalize();
    digest
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<String>()
}
