use std::f64::consts::FRAC_PI_2;

use opest_core::{si, sx, sy, sz, Complex64, Instruction, OpestError, PauliSum, PauliTerm};
use opest_group::{
    diagonal_basis_commutes, get_diagonalizing_basis, get_rotation_program, remove_identity,
    remove_imaginary, rotation_for_basis, BasisAssignment,
};

fn i() -> Complex64 {
    Complex64::new(0.0, 1.0)
}

#[test]
fn imaginary_terms_are_removed() {
    let mut sum = sx(1) * sz(2) * sx(3) * 0.25 + sx(1) * sz(2) * sy(3) * (0.25 * i());
    sum = sum + sy(1) * sz(2) * sx(3) * (-0.25 * i()) + sy(1) * sz(2) * sy(3) * 0.25;
    let expected = sx(1) * sz(2) * sx(3) * 0.25 + sy(1) * sz(2) * sy(3) * 0.25;
    assert_eq!(remove_imaginary(sum).expect("sum"), expected);
}

#[test]
fn mixed_coefficients_keep_real_part() {
    let sum = sx(0) * sz(2) * Complex64::new(0.25, 1.0) + sz(2) * i();
    let reduced = remove_imaginary(sum).expect("sum");
    assert_eq!(reduced, PauliSum::new(vec![sx(0) * sz(2) * 0.25]));

    let sum = sx(0) * sz(2) * 0.25 + sz(2) * i();
    assert_eq!(
        remove_imaginary(&sum).expect("sum"),
        PauliSum::new(vec![sx(0) * sz(2) * 0.25])
    );
}

#[test]
fn remove_imaginary_rejects_non_sums() {
    for err in [
        remove_imaginary(5.0).expect_err("scalar"),
        remove_imaginary(sx(0)).expect_err("term"),
        remove_imaginary(vec![sx(0), sz(1)]).expect_err("term list"),
    ] {
        match err {
            OpestError::Type(info) => assert_eq!(info.code, "unexpected-operand"),
            other => panic!("unexpected error variant: {:?}", other),
        }
    }
}

#[test]
fn identity_is_split_off() {
    let sum = sx(1) * sz(2) * sx(3) * 0.25 + sy(1) * sz(2) * sy(3) * 0.25;
    let with_identity = sum.clone() + si(0) * 200.0;
    let (remainder, identity) = remove_identity(&with_identity);
    assert_eq!(remainder, sum);
    assert_eq!(identity, PauliTerm::identity(200.0));

    let (_, none) = remove_identity(&sum);
    assert_eq!(none.coefficient(), Complex64::new(0.0, 0.0));
}

#[test]
fn rotations_match_factor_kinds() {
    let term = sz(0) * sx(20) * si(100) * sy(5);
    let program = get_rotation_program(&term);
    let expected = [
        Instruction::RX {
            angle: FRAC_PI_2,
            qubit: 5,
        },
        Instruction::RY {
            angle: -FRAC_PI_2,
            qubit: 20,
        },
    ];
    assert_eq!(program.len(), expected.len());
    for rotation in &program {
        assert!(expected.contains(rotation));
    }
    assert_eq!(rotation_for_basis(&BasisAssignment::from_term(&term)), program);
}

#[test]
fn diagonal_commutation_cases() {
    let x_term = sx(0) * sx(1);
    let z1_term = sz(1);
    let z0_term = sz(0);
    let z0z1_term = sz(0) * sz(1);
    assert!(!diagonal_basis_commutes(&x_term, &z1_term));
    assert!(!diagonal_basis_commutes(&z0z1_term, &x_term));

    assert!(diagonal_basis_commutes(&z1_term, &z0_term));
    assert!(diagonal_basis_commutes(&z0z1_term, &z0_term));
    assert!(diagonal_basis_commutes(&z0z1_term, &z1_term));
    assert!(diagonal_basis_commutes(&z0z1_term, &si(1)));
    assert!(diagonal_basis_commutes(&z0z1_term, &si(2)));
    assert!(diagonal_basis_commutes(&z0z1_term, &(sx(5) * sy(7))));
}

#[test]
fn diagonalizing_basis_is_union() {
    let xxxx = sx(1) * sx(2)
        + sx(2)
        + sx(3) * sx(4)
        + sx(4)
        + sx(1) * sx(3) * sx(4)
        + sx(1) * sx(4)
        + sx(1) * sx(2) * sx(3);
    assert_eq!(
        get_diagonalizing_basis(xxxx.terms()).expect("diagonal"),
        sx(1) * sx(2) * sx(3) * sx(4)
    );

    let zzzz = sz(1) * sz(2) + sz(3) * sz(4) + sz(1) * sz(3) + sz(1) * sz(3) * sz(4);
    assert_eq!(
        get_diagonalizing_basis(zzzz.terms()).expect("diagonal"),
        sz(1) * sz(2) * sz(3) * sz(4)
    );
}

#[test]
fn diagonalizing_basis_rejects_conflicts() {
    let err = get_diagonalizing_basis(&[sx(0), sy(0)]).expect_err("conflict");
    assert!(matches!(err, OpestError::Commutation(_)));
}
