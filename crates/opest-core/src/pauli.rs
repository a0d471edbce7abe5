//! Immutable Pauli algebra: single-qubit kinds, weighted Pauli products and sums.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, Mul, Neg};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, OpestError};

const COEFF_ABS_TOL: f64 = 1e-8;
const COEFF_REL_TOL: f64 = 1e-5;

fn algebra_error(code: &str, message: impl Into<String>) -> OpestError {
    OpestError::Algebra(ErrorInfo::new(code, message.into()))
}

/// Single-qubit Pauli operator label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PauliKind {
    /// Identity.
    I,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
}

impl PauliKind {
    /// Parses an operator label, accepting lower case input.
    pub fn from_char(label: char) -> Result<Self, OpestError> {
        match label.to_ascii_uppercase() {
            'I' => Ok(PauliKind::I),
            'X' => Ok(PauliKind::X),
            'Y' => Ok(PauliKind::Y),
            'Z' => Ok(PauliKind::Z),
            other => Err(OpestError::Algebra(
                ErrorInfo::new("unknown-pauli-label", "operator label is not one of I, X, Y, Z")
                    .with_context("label", other.to_string()),
            )),
        }
    }

    /// Returns the canonical upper case label.
    pub fn as_char(self) -> char {
        match self {
            PauliKind::I => 'I',
            PauliKind::X => 'X',
            PauliKind::Y => 'Y',
            PauliKind::Z => 'Z',
        }
    }

    /// Multiplies two single-qubit Paulis, returning the phase and resulting kind.
    pub fn product(self, rhs: PauliKind) -> (Complex64, PauliKind) {
        use PauliKind::*;
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        match (self, rhs) {
            (I, other) | (other, I) => (one, other),
            (X, X) | (Y, Y) | (Z, Z) => (one, I),
            (X, Y) => (i, Z),
            (Y, X) => (-i, Z),
            (Y, Z) => (i, X),
            (Z, Y) => (-i, X),
            (Z, X) => (i, Y),
            (X, Z) => (-i, Y),
        }
    }
}

impl fmt::Display for PauliKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Coefficient-weighted tensor product of single-qubit Paulis.
///
/// Only non-identity factors are stored; an empty factor map is the identity
/// term. Values are immutable: every arithmetic operation returns a new term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauliTerm {
    coefficient: Complex64,
    #[serde(with = "factor_pairs")]
    factors: BTreeMap<usize, PauliKind>,
}

/// Factors travel as an ordered `[[qubit, kind], ..]` sequence so that
/// qubit indices stay integers in every data format.
mod factor_pairs {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::PauliKind;

    pub fn serialize<S>(
        factors: &BTreeMap<usize, PauliKind>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let pairs: Vec<(usize, PauliKind)> = factors.iter().map(|(&q, &k)| (q, k)).collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<usize, PauliKind>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(usize, PauliKind)>::deserialize(deserializer)?;
        let mut factors = BTreeMap::new();
        for (qubit, kind) in pairs {
            if kind == PauliKind::I {
                continue;
            }
            if factors.insert(qubit, kind).is_some() {
                return Err(serde::de::Error::custom(format!("qubit {qubit} listed twice")));
            }
        }
        Ok(factors)
    }
}

impl PauliTerm {
    /// Creates a term from a coefficient and `(qubit, kind)` factors.
    ///
    /// Identity factors are dropped. Repeated qubits are multiplied together in
    /// iteration order, folding any phase into the coefficient.
    pub fn new(
        coefficient: impl Into<Complex64>,
        factors: impl IntoIterator<Item = (usize, PauliKind)>,
    ) -> Self {
        let mut term = Self::identity(coefficient);
        for (qubit, kind) in factors {
            term = term.apply_factor(qubit, kind);
        }
        term
    }

    /// Creates a term from `(kind, qubit)` pairs, rejecting repeated qubits.
    pub fn from_list(
        ops: &[(PauliKind, usize)],
        coefficient: impl Into<Complex64>,
    ) -> Result<Self, OpestError> {
        let mut seen = BTreeSet::new();
        for (idx, (_, qubit)) in ops.iter().enumerate() {
            if !seen.insert(*qubit) {
                return Err(OpestError::Algebra(
                    ErrorInfo::new("duplicate-qubit", "factor list names a qubit twice")
                        .with_context("qubit", qubit.to_string())
                        .with_context("position", idx.to_string()),
                ));
            }
        }
        Ok(Self::new(
            coefficient,
            ops.iter().map(|&(kind, qubit)| (qubit, kind)),
        ))
    }

    /// Parses a compact label such as `"X0Z3"` or `"Y12"`.
    pub fn from_label(label: &str, coefficient: impl Into<Complex64>) -> Result<Self, OpestError> {
        let mut ops = Vec::new();
        let mut chars = label.chars().filter(|c| !c.is_whitespace()).peekable();
        while let Some(head) = chars.next() {
            let kind = PauliKind::from_char(head)?;
            let mut digits = String::new();
            while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(c);
                chars.next();
            }
            if digits.is_empty() {
                return Err(algebra_error(
                    "missing-qubit-index",
                    format!("operator '{head}' in label '{label}' has no qubit index"),
                ));
            }
            let qubit = digits.parse::<usize>().map_err(|err| {
                algebra_error("invalid-qubit-index", format!("{digits}: {err}"))
            })?;
            ops.push((kind, qubit));
        }
        Self::from_list(&ops, coefficient)
    }

    /// Creates the identity term with the given coefficient.
    pub fn identity(coefficient: impl Into<Complex64>) -> Self {
        Self {
            coefficient: coefficient.into(),
            factors: BTreeMap::new(),
        }
    }

    /// Returns the complex coefficient.
    pub fn coefficient(&self) -> Complex64 {
        self.coefficient
    }

    /// Returns a copy of the term carrying a different coefficient.
    pub fn with_coefficient(&self, coefficient: impl Into<Complex64>) -> Self {
        Self {
            coefficient: coefficient.into(),
            factors: self.factors.clone(),
        }
    }

    /// Returns the ordered qubit to kind mapping (non-identity factors only).
    pub fn factors(&self) -> &BTreeMap<usize, PauliKind> {
        &self.factors
    }

    /// Returns the kind acting on `qubit`, `I` when the qubit is untouched.
    pub fn kind(&self, qubit: usize) -> PauliKind {
        self.factors.get(&qubit).copied().unwrap_or(PauliKind::I)
    }

    /// Returns the qubits with a non-identity factor in ascending order.
    pub fn qubits(&self) -> impl Iterator<Item = usize> + '_ {
        self.factors.keys().copied()
    }

    /// Number of non-identity factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// True for the identity term (no factors).
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// True when the term carries no non-identity factor.
    pub fn is_identity(&self) -> bool {
        self.factors.is_empty()
    }

    /// Stable identifier built from the factors, e.g. `"X0Z3"`.
    pub fn id(&self) -> String {
        self.factors
            .iter()
            .map(|(qubit, kind)| format!("{kind}{qubit}"))
            .collect()
    }

    fn apply_factor(mut self, qubit: usize, kind: PauliKind) -> Self {
        if kind == PauliKind::I {
            return self;
        }
        let (phase, merged) = self.kind(qubit).product(kind);
        self.coefficient *= phase;
        if merged == PauliKind::I {
            self.factors.remove(&qubit);
        } else {
            self.factors.insert(qubit, merged);
        }
        self
    }

    fn coefficient_close(&self, other: &Self) -> bool {
        let diff = (self.coefficient - other.coefficient).norm();
        let scale = self.coefficient.norm().max(other.coefficient.norm());
        diff <= COEFF_ABS_TOL + COEFF_REL_TOL * scale
    }
}

impl PartialEq for PauliTerm {
    fn eq(&self, other: &Self) -> bool {
        self.factors == other.factors && self.coefficient_close(other)
    }
}

impl fmt::Display for PauliTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.coefficient.re)?;
        if self.coefficient.im != 0.0 {
            write!(f, "{:+}j", self.coefficient.im)?;
        }
        write!(f, ")*")?;
        if self.factors.is_empty() {
            return write!(f, "I");
        }
        let labels: Vec<String> = self
            .factors
            .iter()
            .map(|(qubit, kind)| format!("{kind}{qubit}"))
            .collect();
        write!(f, "{}", labels.join("*"))
    }
}

/// Creates a unit-coefficient X on `qubit`.
pub fn sx(qubit: usize) -> PauliTerm {
    PauliTerm::new(1.0, [(qubit, PauliKind::X)])
}

/// Creates a unit-coefficient Y on `qubit`.
pub fn sy(qubit: usize) -> PauliTerm {
    PauliTerm::new(1.0, [(qubit, PauliKind::Y)])
}

/// Creates a unit-coefficient Z on `qubit`.
pub fn sz(qubit: usize) -> PauliTerm {
    PauliTerm::new(1.0, [(qubit, PauliKind::Z)])
}

/// Creates the unit identity; the qubit label carries no factor.
pub fn si(_qubit: usize) -> PauliTerm {
    PauliTerm::identity(1.0)
}

impl Mul for PauliTerm {
    type Output = PauliTerm;

    fn mul(self, rhs: PauliTerm) -> PauliTerm {
        let coefficient = self.coefficient * rhs.coefficient;
        let mut product = self.with_coefficient(coefficient);
        for (qubit, kind) in rhs.factors {
            product = product.apply_factor(qubit, kind);
        }
        product
    }
}

impl Mul<Complex64> for PauliTerm {
    type Output = PauliTerm;

    fn mul(self, rhs: Complex64) -> PauliTerm {
        let coefficient = self.coefficient * rhs;
        PauliTerm {
            coefficient,
            factors: self.factors,
        }
    }
}

impl Mul<f64> for PauliTerm {
    type Output = PauliTerm;

    fn mul(self, rhs: f64) -> PauliTerm {
        self * Complex64::new(rhs, 0.0)
    }
}

impl Mul<PauliTerm> for f64 {
    type Output = PauliTerm;

    fn mul(self, rhs: PauliTerm) -> PauliTerm {
        rhs * self
    }
}

impl Mul<PauliTerm> for Complex64 {
    type Output = PauliTerm;

    fn mul(self, rhs: PauliTerm) -> PauliTerm {
        rhs * self
    }
}

impl Neg for PauliTerm {
    type Output = PauliTerm;

    fn neg(self) -> PauliTerm {
        self * -1.0
    }
}

impl Add for PauliTerm {
    type Output = PauliSum;

    fn add(self, rhs: PauliTerm) -> PauliSum {
        PauliSum::new(vec![self, rhs])
    }
}

impl Add<PauliSum> for PauliTerm {
    type Output = PauliSum;

    fn add(self, rhs: PauliSum) -> PauliSum {
        PauliSum::new(vec![self]) + rhs
    }
}

/// Ordered collection of Pauli terms with unique factor maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PauliSum {
    terms: Vec<PauliTerm>,
}

impl PauliSum {
    /// Builds a sum, merging terms with identical factor maps.
    pub fn new(terms: Vec<PauliTerm>) -> Self {
        let mut sum = Self {
            terms: Vec::with_capacity(terms.len()),
        };
        for term in terms {
            sum.absorb(term);
        }
        sum
    }

    fn absorb(&mut self, term: PauliTerm) {
        match self
            .terms
            .iter_mut()
            .find(|existing| existing.factors == term.factors)
        {
            Some(existing) => existing.coefficient += term.coefficient,
            None => self.terms.push(term),
        }
    }

    /// Returns the terms in insertion order.
    pub fn terms(&self) -> &[PauliTerm] {
        &self.terms
    }

    /// Consumes the sum and returns its terms.
    pub fn into_terms(self) -> Vec<PauliTerm> {
        self.terms
    }

    /// Iterates over the terms.
    pub fn iter(&self) -> std::slice::Iter<'_, PauliTerm> {
        self.terms.iter()
    }

    /// Iterates over `(coefficient, factor map)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (Complex64, &BTreeMap<usize, PauliKind>)> + '_ {
        self.terms.iter().map(|term| (term.coefficient, &term.factors))
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when the sum holds no term.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sorted union of all qubits touched by the sum.
    pub fn qubits(&self) -> Vec<usize> {
        let set: BTreeSet<usize> = self.terms.iter().flat_map(|term| term.qubits()).collect();
        set.into_iter().collect()
    }
}

impl PartialEq for PauliSum {
    fn eq(&self, other: &Self) -> bool {
        self.terms.len() == other.terms.len()
            && self
                .terms
                .iter()
                .all(|term| other.terms.iter().any(|candidate| candidate == term))
    }
}

impl<'a> IntoIterator for &'a PauliSum {
    type Item = &'a PauliTerm;
    type IntoIter = std::slice::Iter<'a, PauliTerm>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

impl IntoIterator for PauliSum {
    type Item = PauliTerm;
    type IntoIter = std::vec::IntoIter<PauliTerm>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.into_iter()
    }
}

impl FromIterator<PauliTerm> for PauliSum {
    fn from_iter<T: IntoIterator<Item = PauliTerm>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Add for PauliSum {
    type Output = PauliSum;

    fn add(mut self, rhs: PauliSum) -> PauliSum {
        for term in rhs.terms {
            self.absorb(term);
        }
        self
    }
}

impl Add<PauliTerm> for PauliSum {
    type Output = PauliSum;

    fn add(mut self, rhs: PauliTerm) -> PauliSum {
        self.absorb(rhs);
        self
    }
}

impl Mul<Complex64> for PauliSum {
    type Output = PauliSum;

    fn mul(self, rhs: Complex64) -> PauliSum {
        PauliSum {
            terms: self.terms.into_iter().map(|term| term * rhs).collect(),
        }
    }
}

impl Mul<f64> for PauliSum {
    type Output = PauliSum;

    fn mul(self, rhs: f64) -> PauliSum {
        self * Complex64::new(rhs, 0.0)
    }
}

impl fmt::Display for PauliSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (idx, term) in self.terms.iter().enumerate() {
            if idx > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_tracks_phase() {
        let term = sx(0) * sy(0);
        assert_eq!(term.factors().get(&0), Some(&PauliKind::Z));
        assert_eq!(term.coefficient(), Complex64::new(0.0, 1.0));

        let back = sz(0) * sy(0);
        assert_eq!(back.kind(0), PauliKind::X);
        assert_eq!(back.coefficient(), Complex64::new(0.0, -1.0));
    }

    #[test]
    fn squares_collapse_to_identity() {
        let term = sx(3) * sx(3);
        assert!(term.is_identity());
        assert_eq!(term, PauliTerm::identity(1.0));
    }

    #[test]
    fn sums_merge_identical_factors() {
        let sum = sz(0) * 0.5 + sz(0) * 0.25 + sx(1);
        assert_eq!(sum.len(), 2);
        assert_eq!(sum.terms()[0].coefficient(), Complex64::new(0.75, 0.0));
    }

    #[test]
    fn identity_constructor_ignores_qubit() {
        assert_eq!(si(5) * 200.0, PauliTerm::identity(200.0));
    }

    #[test]
    fn label_parsing_round_trips_id() {
        let term = PauliTerm::from_label("X1 Z2 Y13", 1.0).unwrap();
        assert_eq!(term.id(), "X1Z2Y13");
        assert!(PauliTerm::from_label("X", 1.0).is_err());
        assert!(PauliTerm::from_label("Q1", 1.0).is_err());
    }
}
