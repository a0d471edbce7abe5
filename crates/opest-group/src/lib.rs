#![deny(missing_docs)]
#![doc = "Term validation, diagonal-basis analysis, greedy measurement grouping and basis rotations for OPEST."]

/// Diagonal-basis commutation and measurement basis types.
pub mod diagonal;
/// Greedy grouping of terms into shared measurement bases.
pub mod grouping;
/// Canonical hashing helpers for groupings.
pub mod hash;
/// Basis-change programs.
pub mod rotation;
/// JSON routines for Hamiltonians and groupings.
pub mod serde;
/// Coefficient and identity clean-up of Pauli sums.
pub mod validate;

pub use diagonal::{
    diagonal_basis_commutes, get_diagonalizing_basis, BasisAssignment, DiagonalBasisKey,
};
pub use grouping::{commuting_sets_by_zbasis, max_key_overlap, DiagonalSets};
pub use hash::canonical_grouping_hash;
pub use rotation::{get_rotation_program, rotation_for_basis};
pub use crate::serde::{from_json, sum_from_json, sum_to_json, to_json, TermRecord};
pub use validate::{remove_identity, remove_imaginary};
