use std::collections::BTreeSet;

use nalgebra::DMatrix;
use opest_core::{ErrorInfo, OpestError, PauliTerm};
use serde::{Deserialize, Serialize};

/// Terms x shots matrix of signed parities (`+1.0` or `-1.0`).
pub type ParitySeries = DMatrix<f64>;

/// Pooled measurement record: one column per measured qubit, one row per shot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTable {
    qubits: Vec<usize>,
    rows: Vec<Vec<u8>>,
}

fn malformed(message: impl Into<String>) -> ErrorInfo {
    ErrorInfo::new("malformed-outcome", message.into())
}

impl OutcomeTable {
    /// Empty table labelled with `qubits`, which must be strictly ascending.
    pub fn new(qubits: Vec<usize>) -> Result<Self, OpestError> {
        if qubits.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(OpestError::Estimate(
                ErrorInfo::new("invalid-columns", "column labels must be strictly ascending")
                    .with_context("qubits", format!("{qubits:?}")),
            ));
        }
        Ok(Self {
            qubits,
            rows: Vec::new(),
        })
    }

    /// Table holding `rows`, validated against the column labels.
    pub fn from_rows(qubits: Vec<usize>, rows: Vec<Vec<u8>>) -> Result<Self, OpestError> {
        let mut table = Self::new(qubits)?;
        table.append(rows)?;
        Ok(table)
    }

    /// Table whose columns are the sorted union of the qubits of `terms`.
    pub fn for_terms(terms: &[PauliTerm], rows: Vec<Vec<u8>>) -> Result<Self, OpestError> {
        let qubits: BTreeSet<usize> = terms.iter().flat_map(|term| term.qubits()).collect();
        Self::from_rows(qubits.into_iter().collect(), rows)
    }

    /// Appends rows after checking width and that every entry is 0 or 1.
    pub fn append(&mut self, rows: Vec<Vec<u8>>) -> Result<(), OpestError> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != self.qubits.len() {
                return Err(OpestError::Estimate(
                    malformed("row width does not match the measured qubits")
                        .with_context("row", idx.to_string())
                        .with_context("expected", self.qubits.len().to_string())
                        .with_context("found", row.len().to_string()),
                ));
            }
            if let Some(bit) = row.iter().find(|&&bit| bit > 1) {
                return Err(OpestError::Estimate(
                    malformed("outcome entries must be 0 or 1")
                        .with_context("row", idx.to_string())
                        .with_context("value", bit.to_string()),
                ));
            }
        }
        self.rows.extend(rows);
        Ok(())
    }

    /// Column labels.
    pub fn qubits(&self) -> &[usize] {
        &self.qubits
    }

    /// Recorded rows in arrival order.
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Number of pooled shots.
    pub fn shots(&self) -> usize {
        self.rows.len()
    }

    /// Column index of `qubit`, if measured.
    pub fn column(&self, qubit: usize) -> Option<usize> {
        self.qubits.binary_search(&qubit).ok()
    }
}

/// Signed parity of every term on every recorded shot.
///
/// Entry `(i, s)` is the product of `1 - 2 * bit` over the qubits of term `i`
/// in shot `s`; identity terms are `+1` throughout. A term acting on a qubit
/// without a column fails with `unmeasured-qubit`.
pub fn get_parity(
    terms: &[PauliTerm],
    outcomes: &OutcomeTable,
) -> Result<ParitySeries, OpestError> {
    let mut columns = Vec::with_capacity(terms.len());
    for term in terms {
        let cols = term
            .qubits()
            .map(|qubit| {
                outcomes.column(qubit).ok_or_else(|| {
                    OpestError::Estimate(
                        ErrorInfo::new("unmeasured-qubit", "term acts on an unmeasured qubit")
                            .with_context("term", term.id())
                            .with_context("qubit", qubit.to_string()),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        columns.push(cols);
    }

    Ok(DMatrix::from_fn(terms.len(), outcomes.shots(), |term, shot| {
        let row = &outcomes.rows[shot];
        let ones = columns[term].iter().filter(|&&col| row[col] == 1).count();
        if ones % 2 == 0 {
            1.0
        } else {
            -1.0
        }
    }))
}
