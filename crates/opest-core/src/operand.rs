//! Boundary type for values whose shape is only known at runtime.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, OpestError};
use crate::pauli::{PauliSum, PauliTerm};

/// A scalar, a single term, a sum, or a bare sequence of terms.
///
/// Entry points that historically accepted any of these shapes take
/// `impl Into<Operand>` and reject the shapes they cannot handle with
/// [`OpestError::Type`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    /// A bare number, serialized as `[re, im]`.
    Scalar(Complex64),
    /// A single weighted Pauli product.
    Term(PauliTerm),
    /// A sum of Pauli products.
    Sum(PauliSum),
    /// An explicit sequence of terms.
    Terms(Vec<PauliTerm>),
}

impl Operand {
    /// Short name of the operand shape, used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Operand::Scalar(_) => "scalar",
            Operand::Term(_) => "term",
            Operand::Sum(_) => "sum",
            Operand::Terms(_) => "terms",
        }
    }

    /// Accepts only [`Operand::Sum`].
    pub fn into_sum(self) -> Result<PauliSum, OpestError> {
        match self {
            Operand::Sum(sum) => Ok(sum),
            other => Err(type_error("sum", &other)),
        }
    }

    /// Accepts a sequence of terms or a sum; rejects scalars and single terms.
    pub fn into_terms(self) -> Result<Vec<PauliTerm>, OpestError> {
        match self {
            Operand::Terms(terms) => Ok(terms),
            Operand::Sum(sum) => Ok(sum.into_terms()),
            other => Err(type_error("sequence of terms", &other)),
        }
    }
}

fn type_error(expected: &str, found: &Operand) -> OpestError {
    OpestError::Type(
        ErrorInfo::new("unexpected-operand", format!("expected a {expected}"))
            .with_context("expected", expected)
            .with_context("found", found.shape()),
    )
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Scalar(Complex64::new(value, 0.0))
    }
}

impl From<Complex64> for Operand {
    fn from(value: Complex64) -> Self {
        Operand::Scalar(value)
    }
}

impl From<PauliTerm> for Operand {
    fn from(value: PauliTerm) -> Self {
        Operand::Term(value)
    }
}

impl From<&PauliTerm> for Operand {
    fn from(value: &PauliTerm) -> Self {
        Operand::Term(value.clone())
    }
}

impl From<PauliSum> for Operand {
    fn from(value: PauliSum) -> Self {
        Operand::Sum(value)
    }
}

impl From<&PauliSum> for Operand {
    fn from(value: &PauliSum) -> Self {
        Operand::Sum(value.clone())
    }
}

impl From<Vec<PauliTerm>> for Operand {
    fn from(value: Vec<PauliTerm>) -> Self {
        Operand::Terms(value)
    }
}

impl From<&[PauliTerm]> for Operand {
    fn from(value: &[PauliTerm]) -> Self {
        Operand::Terms(value.to_vec())
    }
}

impl<const N: usize> From<[PauliTerm; N]> for Operand {
    fn from(value: [PauliTerm; N]) -> Self {
        Operand::Terms(value.into())
    }
}
