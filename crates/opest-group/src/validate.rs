use opest_core::{Complex64, OpestError, Operand, PauliSum, PauliTerm};

const REAL_PART_EPS: f64 = 1e-12;

/// Replaces every coefficient of a sum by its real part.
///
/// Terms whose real part vanishes are discarded. Only [`Operand::Sum`] is
/// accepted; scalars, single terms and bare term lists fail with
/// [`OpestError::Type`].
pub fn remove_imaginary(operand: impl Into<Operand>) -> Result<PauliSum, OpestError> {
    let sum = operand.into().into_sum()?;
    Ok(sum
        .into_iter()
        .filter(|term| term.coefficient().re.abs() > REAL_PART_EPS)
        .map(|term| {
            let real = term.coefficient().re;
            term.with_coefficient(real)
        })
        .collect())
}

/// Splits a sum into its non-identity remainder and its identity term.
///
/// The identity term carries a zero coefficient when the sum has none.
pub fn remove_identity(sum: &PauliSum) -> (PauliSum, PauliTerm) {
    let mut identity = PauliTerm::identity(Complex64::new(0.0, 0.0));
    let mut remainder = Vec::with_capacity(sum.len());
    for term in sum {
        if term.is_identity() {
            identity = identity.with_coefficient(identity.coefficient() + term.coefficient());
        } else {
            remainder.push(term.clone());
        }
    }
    (PauliSum::new(remainder), identity)
}
