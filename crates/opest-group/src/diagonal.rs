use std::collections::BTreeMap;
use std::fmt;

use opest_core::{ErrorInfo, OpestError, PauliKind, PauliTerm};
use serde::{Deserialize, Serialize};

fn commutation_error(code: &str, message: impl Into<String>) -> OpestError {
    OpestError::Commutation(ErrorInfo::new(code, message.into()))
}

/// Returns true when `a` and `b` agree on every qubit both act on non-trivially.
///
/// Two such terms are diagonal in a common single-qubit product basis and can be
/// estimated from the same measurement record.
pub fn diagonal_basis_commutes(a: &PauliTerm, b: &PauliTerm) -> bool {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .factors()
        .iter()
        .all(|(qubit, kind)| match large.factors().get(qubit) {
            Some(other) => other == kind,
            None => true,
        })
}

/// Returns the unit-coefficient term whose factors are the union of `terms`.
///
/// Fails with [`OpestError::Commutation`] when two inputs disagree on a qubit.
pub fn get_diagonalizing_basis(terms: &[PauliTerm]) -> Result<PauliTerm, OpestError> {
    let mut basis = BasisAssignment::default();
    for term in terms {
        basis = basis.try_union(term)?;
    }
    Ok(basis.to_term())
}

/// Canonical identifier of a shared measurement basis.
///
/// Holds `(qubit, kind)` pairs sorted by qubit, never containing identity
/// factors. The empty key is the basis of the identity term.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiagonalBasisKey(Vec<(usize, PauliKind)>);

impl DiagonalBasisKey {
    /// Key made of the factors of `term`.
    pub fn from_term(term: &PauliTerm) -> Self {
        Self(term.factors().iter().map(|(&q, &k)| (q, k)).collect())
    }

    /// Builds a key from arbitrary pairs, dropping identities and sorting by qubit.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (usize, PauliKind)>,
    ) -> Result<Self, OpestError> {
        Ok(BasisAssignment::from_pairs(pairs)?.key())
    }

    /// The sorted `(qubit, kind)` pairs.
    pub fn pairs(&self) -> &[(usize, PauliKind)] {
        &self.0
    }

    /// Qubits the basis acts on, ascending.
    pub fn qubits(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().map(|&(qubit, _)| qubit)
    }

    /// Number of qubits in the basis.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the identity basis.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn kind(&self, qubit: usize) -> Option<PauliKind> {
        self.0
            .binary_search_by_key(&qubit, |&(q, _)| q)
            .ok()
            .map(|idx| self.0[idx].1)
    }

    /// True when `term` agrees with the key on every shared qubit.
    pub fn is_compatible(&self, term: &PauliTerm) -> bool {
        term.factors()
            .iter()
            .all(|(&qubit, &kind)| self.kind(qubit).map_or(true, |own| own == kind))
    }

    /// Number of `(qubit, kind)` pairs shared with `term`.
    pub fn overlap(&self, term: &PauliTerm) -> usize {
        term.factors()
            .iter()
            .filter(|(qubit, kind)| self.kind(**qubit) == Some(**kind))
            .count()
    }

    /// Key extended with the factors of a compatible `term`.
    pub fn union(&self, term: &PauliTerm) -> Result<Self, OpestError> {
        Ok(self.to_assignment().try_union(term)?.key())
    }

    /// Map form of the key.
    pub fn to_assignment(&self) -> BasisAssignment {
        BasisAssignment {
            kinds: self.0.iter().copied().collect(),
        }
    }

    /// Unit-coefficient term acting with the key's kinds.
    pub fn to_term(&self) -> PauliTerm {
        PauliTerm::new(1.0, self.0.iter().copied())
    }
}

impl fmt::Display for DiagonalBasisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, (qubit, kind)) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "({qubit},{kind})")?;
        }
        write!(f, ")")
    }
}

/// Qubit to kind mapping realizing a [`DiagonalBasisKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisAssignment {
    kinds: BTreeMap<usize, PauliKind>,
}

impl BasisAssignment {
    /// Assignment covering exactly the factors of `term`.
    pub fn from_term(term: &PauliTerm) -> Self {
        Self {
            kinds: term.factors().clone(),
        }
    }

    /// Builds an assignment from pairs, rejecting two kinds on one qubit.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (usize, PauliKind)>,
    ) -> Result<Self, OpestError> {
        let mut kinds = BTreeMap::new();
        for (qubit, kind) in pairs {
            if kind == PauliKind::I {
                continue;
            }
            if let Some(previous) = kinds.insert(qubit, kind) {
                if previous != kind {
                    return Err(OpestError::Commutation(
                        ErrorInfo::new("conflicting-basis", "qubit assigned two bases")
                            .with_context("qubit", qubit.to_string())
                            .with_context("kinds", format!("{previous},{kind}")),
                    ));
                }
            }
        }
        Ok(Self { kinds })
    }

    /// Kind measured on `qubit`, if any.
    pub fn kind(&self, qubit: usize) -> Option<PauliKind> {
        self.kinds.get(&qubit).copied()
    }

    /// Ordered qubit to kind mapping.
    pub fn kinds(&self) -> &BTreeMap<usize, PauliKind> {
        &self.kinds
    }

    /// Measured qubits, ascending.
    pub fn qubits(&self) -> Vec<usize> {
        self.kinds.keys().copied().collect()
    }

    /// Number of qubits in the assignment.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// True when nothing needs to be measured.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// True when `term` agrees with the assignment on every shared qubit.
    pub fn is_compatible(&self, term: &PauliTerm) -> bool {
        term.factors()
            .iter()
            .all(|(qubit, kind)| self.kinds.get(qubit).map_or(true, |own| own == kind))
    }

    /// Number of `(qubit, kind)` pairs shared with `term`.
    pub fn overlap(&self, term: &PauliTerm) -> usize {
        term.factors()
            .iter()
            .filter(|(qubit, kind)| self.kinds.get(*qubit) == Some(*kind))
            .count()
    }

    /// Returns the assignment extended with the factors of `term`.
    pub fn try_union(mut self, term: &PauliTerm) -> Result<Self, OpestError> {
        for (&qubit, &kind) in term.factors() {
            match self.kinds.get(&qubit) {
                Some(&own) if own != kind => {
                    return Err(commutation_error(
                        "non-diagonal-terms",
                        format!("term {} conflicts with basis on qubit {qubit}", term.id()),
                    ))
                }
                Some(_) => {}
                None => {
                    self.kinds.insert(qubit, kind);
                }
            }
        }
        Ok(self)
    }

    /// Canonical key of the assignment.
    pub fn key(&self) -> DiagonalBasisKey {
        DiagonalBasisKey(self.kinds.iter().map(|(&q, &k)| (q, k)).collect())
    }

    /// Unit-coefficient term acting with the assigned kinds.
    pub fn to_term(&self) -> PauliTerm {
        PauliTerm::new(1.0, self.kinds.iter().map(|(&q, &k)| (q, k)))
    }
}

impl From<&DiagonalBasisKey> for BasisAssignment {
    fn from(key: &DiagonalBasisKey) -> Self {
        key.to_assignment()
    }
}
