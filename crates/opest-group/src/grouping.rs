use indexmap::IndexMap;
use opest_core::{PauliSum, PauliTerm};
use tracing::debug;

use crate::diagonal::DiagonalBasisKey;

/// Measurement groups keyed by their shared basis, in creation order.
pub type DiagonalSets = IndexMap<DiagonalBasisKey, Vec<PauliTerm>>;

/// Greedily partitions `sum` into groups that share a diagonal basis.
///
/// Terms are visited in the sum's order and each one is placed with
/// [`max_key_overlap`]. The result depends on term order and is not an
/// optimal colouring.
pub fn commuting_sets_by_zbasis(sum: &PauliSum) -> DiagonalSets {
    let sets = sum
        .iter()
        .fold(DiagonalSets::new(), |sets, term| max_key_overlap(term, sets));
    debug!(terms = sum.len(), groups = sets.len(), "grouped pauli sum");
    sets
}

/// Places one term into `sets`.
///
/// Among the keys whose union with `term` exists, the one sharing the most
/// `(qubit, kind)` pairs wins, ties going to the earliest key. A winning key
/// that lacks some of the term's qubits is replaced by the union; the group
/// keeps its members and moves to the end. Without a compatible key the term
/// opens a group of its own.
pub fn max_key_overlap(term: &PauliTerm, mut sets: DiagonalSets) -> DiagonalSets {
    let mut best: Option<(usize, usize, DiagonalBasisKey)> = None;
    for (idx, key) in sets.keys().enumerate() {
        let Ok(merged) = key.union(term) else {
            continue;
        };
        let overlap = key.overlap(term);
        if best.as_ref().map_or(true, |(_, top, _)| overlap > *top) {
            best = Some((idx, overlap, merged));
        }
    }

    let Some((idx, overlap, merged)) = best else {
        let key = DiagonalBasisKey::from_term(term);
        debug!(key = %key, term = %term.id(), "opened measurement group");
        sets.entry(key).or_default().push(term.clone());
        return sets;
    };

    if overlap == term.len() {
        if let Some((_, members)) = sets.get_index_mut(idx) {
            members.push(term.clone());
        }
        return sets;
    }

    if let Some((_, mut members)) = sets.shift_remove_index(idx) {
        debug!(key = %merged, term = %term.id(), "re-keyed measurement group");
        members.push(term.clone());
        sets.entry(merged).or_default().extend(members);
    }
    sets
}
