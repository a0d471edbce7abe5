use opest_core::{Complex64, ErrorInfo, OpestError, PauliSum, PauliTerm};
use serde::{Deserialize, Serialize};

use crate::diagonal::DiagonalBasisKey;
use crate::grouping::DiagonalSets;
use crate::hash::canonical_grouping_hash;

/// One term of a Hamiltonian file, e.g. `{"label": "X0Z1", "coefficient": 0.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    /// Compact operator label; an empty label is the identity.
    pub label: String,
    /// Real part of the coefficient.
    pub coefficient: f64,
    /// Imaginary part of the coefficient.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub imag: f64,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

#[derive(Debug, Serialize, Deserialize)]
struct GroupRecord {
    key: DiagonalBasisKey,
    basis: String,
    terms: Vec<TermRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableGrouping {
    grouping_hash: String,
    groups: Vec<GroupRecord>,
}

fn serialize_error(err: serde_json::Error) -> OpestError {
    OpestError::Serde(ErrorInfo::new("json-serialize", err.to_string()))
}

fn deserialize_error(err: serde_json::Error) -> OpestError {
    OpestError::Serde(ErrorInfo::new("json-deserialize", err.to_string()))
}

impl From<&PauliTerm> for TermRecord {
    fn from(term: &PauliTerm) -> Self {
        Self {
            label: term.id(),
            coefficient: term.coefficient().re,
            imag: term.coefficient().im,
        }
    }
}

impl TermRecord {
    /// Parses the record into a term.
    pub fn to_term(&self) -> Result<PauliTerm, OpestError> {
        PauliTerm::from_label(&self.label, Complex64::new(self.coefficient, self.imag))
    }
}

/// Reads a Hamiltonian given as a JSON list of [`TermRecord`]s.
pub fn sum_from_json(data: &str) -> Result<PauliSum, OpestError> {
    let records: Vec<TermRecord> = serde_json::from_str(data).map_err(deserialize_error)?;
    records
        .iter()
        .map(TermRecord::to_term)
        .collect::<Result<Vec<_>, _>>()
        .map(PauliSum::new)
}

/// Writes a sum as a JSON list of [`TermRecord`]s.
pub fn sum_to_json(sum: &PauliSum) -> Result<String, OpestError> {
    let records: Vec<TermRecord> = sum.iter().map(TermRecord::from).collect();
    serde_json::to_string_pretty(&records).map_err(serialize_error)
}

/// Serializes a grouping, in group order, together with its canonical hash.
pub fn to_json(sets: &DiagonalSets) -> Result<String, OpestError> {
    let payload = SerializableGrouping {
        grouping_hash: canonical_grouping_hash(sets),
        groups: sets
            .iter()
            .map(|(key, members)| GroupRecord {
                key: key.clone(),
                basis: key.to_term().id(),
                terms: members.iter().map(TermRecord::from).collect(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&payload).map_err(serialize_error)
}

/// Restores a grouping written by [`to_json`].
pub fn from_json(data: &str) -> Result<DiagonalSets, OpestError> {
    let payload: SerializableGrouping = serde_json::from_str(data).map_err(deserialize_error)?;
    let mut sets = DiagonalSets::new();
    for group in payload.groups {
        let members = group
            .terms
            .iter()
            .map(TermRecord::to_term)
            .collect::<Result<Vec<_>, _>>()?;
        sets.insert(group.key, members);
    }
    let digest = canonical_grouping_hash(&sets);
    if digest != payload.grouping_hash {
        return Err(OpestError::Serde(
            ErrorInfo::new("grouping-hash-mismatch", "stored digest does not match groups")
                .with_context("expected", payload.grouping_hash)
                .with_context("actual", digest),
        ));
    }
    Ok(sets)
}
