use opest_core::{sx, sz, OpestError, PauliTerm, RngHandle};
use opest_estimate::{get_parity, OutcomeTable};
use proptest::prelude::*;
use rand::Rng;

fn bernoulli_table(seed: u64, shots: usize) -> Vec<Vec<u8>> {
    let mut rng = RngHandle::from_seed(seed);
    (0..shots)
        .map(|_| vec![u8::from(rng.gen_bool(0.25)), u8::from(rng.gen_bool(0.4))])
        .collect()
}

#[test]
fn single_qubit_parity_uses_term_column() {
    let rows: Vec<Vec<u8>> = std::iter::repeat(vec![0])
        .take(50)
        .chain(std::iter::repeat(vec![1]).take(50))
        .collect();
    let terms = [sz(5)];
    let table = OutcomeTable::for_terms(&terms, rows).expect("table");
    assert_eq!(table.qubits(), &[5]);

    let parity = get_parity(&terms, &table).expect("parity");
    assert_eq!(parity.shape(), (1, 100));
    for shot in 0..100 {
        let expected = if shot < 50 { 1.0 } else { -1.0 };
        assert_eq!(parity[(0, shot)], expected);
    }
}

#[test]
fn two_qubit_parities_match_bits() {
    let rows = bernoulli_table(87655678, 500);
    let terms = [sz(0), sz(1), sz(0) * sz(1)];
    let table = OutcomeTable::from_rows(vec![0, 1], rows.clone()).expect("table");
    let parity = get_parity(&terms, &table).expect("parity");

    for (shot, row) in rows.iter().enumerate() {
        let z0 = 1.0 - 2.0 * f64::from(row[0]);
        let z1 = 1.0 - 2.0 * f64::from(row[1]);
        assert_eq!(parity[(0, shot)], z0);
        assert_eq!(parity[(1, shot)], z1);
        assert_eq!(parity[(2, shot)], z0 * z1);
    }
}

#[test]
fn identity_terms_are_always_positive() {
    let table = OutcomeTable::from_rows(vec![0], vec![vec![1], vec![0]]).expect("table");
    let parity = get_parity(&[PauliTerm::identity(3.0)], &table).expect("parity");
    assert!(parity.iter().all(|&value| value == 1.0));
}

#[test]
fn unmeasured_qubit_is_rejected() {
    let table = OutcomeTable::from_rows(vec![0], vec![vec![0]]).expect("table");
    match get_parity(&[sx(0) * sz(3)], &table).expect_err("qubit 3 missing") {
        OpestError::Estimate(info) => {
            assert_eq!(info.code, "unmeasured-qubit");
            assert_eq!(info.context.get("qubit").map(String::as_str), Some("3"));
        }
        other => panic!("unexpected error variant: {:?}", other),
    }
}

#[test]
fn malformed_rows_are_rejected() {
    for rows in [vec![vec![0, 1, 1]], vec![vec![0, 2]]] {
        match OutcomeTable::from_rows(vec![0, 1], rows).expect_err("malformed") {
            OpestError::Estimate(info) => assert_eq!(info.code, "malformed-outcome"),
            other => panic!("unexpected error variant: {:?}", other),
        }
    }
    assert!(OutcomeTable::new(vec![1, 0]).is_err());
}

proptest! {
    #[test]
    fn flipping_a_bit_flips_only_that_shot(
        rows in proptest::collection::vec(proptest::collection::vec(0u8..2, 3), 1..20),
        shot_seed in any::<usize>(),
        qubit in 0usize..3,
    ) {
        let terms = [sz(0), sz(1) * sz(2), sz(0) * sz(1) * sz(2), PauliTerm::identity(1.0)];
        let table = OutcomeTable::from_rows(vec![0, 1, 2], rows.clone()).unwrap();
        let base = get_parity(&terms, &table).unwrap();

        let shot = shot_seed % rows.len();
        let mut flipped_rows = rows.clone();
        flipped_rows[shot][qubit] ^= 1;
        let flipped = get_parity(&terms, &OutcomeTable::from_rows(vec![0, 1, 2], flipped_rows).unwrap()).unwrap();

        for (idx, term) in terms.iter().enumerate() {
            let touches = term.factors().contains_key(&qubit);
            for s in 0..rows.len() {
                let expected = if s == shot && touches { -base[(idx, s)] } else { base[(idx, s)] };
                prop_assert_eq!(flipped[(idx, s)], expected);
            }
        }
    }

    #[test]
    fn all_zero_rows_have_positive_parity(shots in 1usize..30) {
        let terms = [sx(0), sz(0) * sz(1), sz(1)];
        let table = OutcomeTable::from_rows(vec![0, 1], vec![vec![0, 0]; shots]).unwrap();
        let parity = get_parity(&terms, &table).unwrap();
        prop_assert!(parity.iter().all(|&value| value == 1.0));
    }
}
