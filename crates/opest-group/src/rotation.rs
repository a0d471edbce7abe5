use std::f64::consts::FRAC_PI_2;

use opest_core::{Instruction, PauliKind, PauliTerm, Program};

use crate::diagonal::BasisAssignment;

fn rotation_for(qubit: usize, kind: PauliKind) -> Option<Instruction> {
    match kind {
        PauliKind::X => Some(Instruction::RY {
            angle: -FRAC_PI_2,
            qubit,
        }),
        PauliKind::Y => Some(Instruction::RX {
            angle: FRAC_PI_2,
            qubit,
        }),
        PauliKind::Z | PauliKind::I => None,
    }
}

/// Single-qubit rotations mapping the eigenbasis of `term` onto the Z basis.
///
/// X factors get `RY(-pi/2)`, Y factors get `RX(pi/2)`, Z and identity need
/// nothing. Instructions are emitted in ascending qubit order.
pub fn get_rotation_program(term: &PauliTerm) -> Program {
    term.factors()
        .iter()
        .filter_map(|(&qubit, &kind)| rotation_for(qubit, kind))
        .collect()
}

/// Rotation program for a whole measurement basis.
pub fn rotation_for_basis(basis: &BasisAssignment) -> Program {
    basis
        .kinds()
        .iter()
        .filter_map(|(&qubit, &kind)| rotation_for(qubit, kind))
        .collect()
}
