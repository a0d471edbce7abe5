use std::collections::BTreeSet;

use opest_core::PauliKind::{X, Y, Z};
use opest_core::{si, sx, sy, sz, PauliKind, PauliSum, PauliTerm};
use opest_group::{commuting_sets_by_zbasis, max_key_overlap, DiagonalBasisKey, DiagonalSets};

fn key(pairs: &[(usize, PauliKind)]) -> DiagonalBasisKey {
    DiagonalBasisKey::from_pairs(pairs.iter().copied()).expect("valid key")
}

fn ids(terms: &[PauliTerm]) -> BTreeSet<String> {
    terms.iter().map(PauliTerm::id).collect()
}

fn sum_ids(sum: &PauliSum) -> BTreeSet<String> {
    ids(sum.terms())
}

#[test]
fn joins_existing_key_with_largest_overlap() {
    let mut sets = DiagonalSets::new();
    sets.insert(key(&[(0, X), (1, Z)]), vec![sx(0) * sz(1), sz(1)]);
    sets.insert(key(&[(0, Y), (1, Z)]), vec![sy(0), sz(1), sy(0) * sz(1)]);

    let mut expected = DiagonalSets::new();
    expected.insert(key(&[(0, X), (1, Z)]), vec![sx(0) * sz(1), sz(1), sx(0)]);
    expected.insert(key(&[(0, Y), (1, Z)]), vec![sy(0), sz(1), sy(0) * sz(1)]);

    assert_eq!(max_key_overlap(&sx(0), sets), expected);
}

#[test]
fn incompatible_term_opens_new_key() {
    let mut sets = DiagonalSets::new();
    sets.insert(key(&[(0, Z), (1, Z)]), vec![sz(0) * sz(1), sz(1)]);
    sets.insert(key(&[(0, Y), (1, Z)]), vec![sy(0), sz(1), sy(0) * sz(1)]);

    let updated = max_key_overlap(&sx(0), sets);
    assert_eq!(updated.len(), 3);
    let (last_key, last_terms) = updated.get_index(2).expect("new group");
    assert_eq!(last_key, &key(&[(0, X)]));
    assert_eq!(last_terms, &vec![sx(0)]);
}

#[test]
fn ties_go_to_the_earliest_key() {
    let mut sets = DiagonalSets::new();
    sets.insert(key(&[(0, Z)]), vec![sz(0)]);
    sets.insert(key(&[(1, Z)]), vec![sz(1)]);

    let updated = max_key_overlap(&sx(2), sets);
    assert_eq!(updated.len(), 2);
    let (first, members) = updated.get_index(1).expect("re-keyed group moved last");
    assert_eq!(first, &key(&[(0, Z), (2, X)]));
    let expected: BTreeSet<String> = ["X2", "Z0"].iter().map(|s| s.to_string()).collect();
    assert_eq!(ids(members), expected);
    assert_eq!(updated.get_index(0).map(|(k, _)| k), Some(&key(&[(1, Z)])));
}

#[test]
fn overlapping_terms_merge_into_single_key() {
    let coeff1 = 0.012870253243021476;
    let coeff2 = 0.13131672212575296;
    let term1 = PauliTerm::from_list(&[(X, 1), (Z, 2), (Y, 3), (Y, 5), (Z, 6), (X, 7)], coeff1)
        .expect("term1");
    let term2 = PauliTerm::from_list(&[(Z, 0), (Z, 6)], coeff2).expect("term2");

    let result = commuting_sets_by_zbasis(&(term1.clone() + term2.clone()));

    let mut expected = DiagonalSets::new();
    expected.insert(
        key(&[(0, Z), (1, X), (2, Z), (3, Y), (5, Y), (6, Z), (7, X)]),
        vec![
            coeff1 * sx(1) * sz(2) * sy(3) * sy(5) * sz(6) * sx(7),
            coeff2 * sz(0) * sz(6),
        ],
    );
    assert_eq!(result, expected);
}

#[test]
fn h2_terms_split_into_two_bases() {
    let x_term = sx(0) * sx(1);
    let z1_term = sz(1);
    let z0_term = sz(0);
    let zz_term = sz(0) * sz(1);
    let hamiltonian = zz_term.clone() + z0_term.clone() + z1_term.clone() + x_term.clone();

    let sets = commuting_sets_by_zbasis(&hamiltonian);
    assert_eq!(sets.len(), 2);
    assert_eq!(
        sets.get(&key(&[(0, Z), (1, Z)])).map(|terms| ids(terms)),
        Some(ids(&[z1_term, z0_term, zz_term]))
    );
    assert_eq!(
        sets.get(&key(&[(0, X), (1, X)])).map(|terms| ids(terms)),
        Some(ids(&[x_term]))
    );
}

#[test]
fn four_qubit_families_stay_separate() {
    let zzzz = sz(1) * sz(2) + sz(3) * sz(4) + sz(1) * sz(3) + sz(1) * sz(3) * sz(4);
    let xzxz = sx(1) * sz(2)
        + sx(3) * sz(4)
        + sx(1) * sz(2) * sx(3) * sz(4)
        + sx(1) * sx(3) * sz(4);
    let xxxx = sx(1) * sx(2)
        + sx(2)
        + sx(3) * sx(4)
        + sx(4)
        + sx(1) * sx(3) * sx(4)
        + sx(1) * sx(4)
        + sx(1) * sx(2) * sx(3);
    let yyyy = sy(1) * sy(2) + sy(3) * sy(4) + sy(1) * sy(2) * sy(3) * sy(4);

    let hamiltonian = zzzz.clone() + xzxz.clone() + xxxx.clone() + yyyy.clone();
    let sets = commuting_sets_by_zbasis(&hamiltonian);

    let expected = [
        (key(&[(1, Z), (2, Z), (3, Z), (4, Z)]), sum_ids(&zzzz)),
        (key(&[(1, X), (2, Z), (3, X), (4, Z)]), sum_ids(&xzxz)),
        (key(&[(1, X), (2, X), (3, X), (4, X)]), sum_ids(&xxxx)),
        (key(&[(1, Y), (2, Y), (3, Y), (4, Y)]), sum_ids(&yyyy)),
    ];
    assert_eq!(sets.len(), expected.len());
    for (basis, members) in expected {
        assert_eq!(sets.get(&basis).map(|terms| ids(terms)), Some(members), "{basis}");
    }
}

#[test]
fn identity_joins_first_group_or_opens_empty_key() {
    let sets = commuting_sets_by_zbasis(&(sz(0) + sx(1) * sx(0) + si(0) * 2.0));
    let (first_key, first_members) = sets.get_index(0).expect("first group");
    assert_eq!(first_key, &key(&[(0, Z)]));
    assert!(first_members.iter().any(PauliTerm::is_identity));

    let alone = commuting_sets_by_zbasis(&PauliSum::new(vec![PauliTerm::identity(1.5)]));
    assert_eq!(alone.len(), 1);
    assert!(alone.get_index(0).map(|(k, _)| k.is_empty()).unwrap_or(false));
}

#[test]
fn re_keyed_groups_cover_every_member() {
    let sum = sz(0)
        + sx(1)
        + sz(0) * sy(2)
        + sx(1) * sz(3)
        + sz(0) * sx(1) * sz(3)
        + sy(2) * sz(4);
    let sets = commuting_sets_by_zbasis(&sum);

    let grouped: usize = sets.values().map(Vec::len).sum();
    assert_eq!(grouped, sum.len());
    for (key, members) in &sets {
        for member in members {
            assert!(key.is_compatible(member), "{key} vs {}", member.id());
            assert_eq!(key.overlap(member), member.len(), "{key} misses {}", member.id());
        }
    }
}
