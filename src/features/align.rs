//! Schema alignment: reconcile an encoded record with the training columns.
//!
//! The model accepts exactly one vector shape: one value per schema column,
//! in schema order. Alignment therefore:
//!
//! - copies encoded values for columns the schema knows
//! - zero-fills schema columns the encoding did not produce (an indicator
//!   column for an unselected category is legitimately absent and must read 0)
//! - drops encoded columns the schema does not know (the model never learned
//!   them), recording them for visibility

use std::collections::{HashMap, HashSet};

use crate::domain::{AlignedVector, SchemaColumns};
use crate::features::encode::EncodedVector;

/// What happened during alignment, for reporting.
///
/// Dropped columns are not an error: a category value the training data never
/// contained simply has no column to land in. They are worth surfacing,
/// though, since a systematically dropped column usually means the form labels
/// and the training labels have drifted apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentReport {
    /// Schema columns that received a value from the encoding.
    pub matched: usize,
    /// Schema columns zero-filled because the encoding did not produce them.
    pub zero_filled: usize,
    /// Encoded columns with no schema counterpart, in encoding order.
    pub dropped: Vec<String>,
}

/// Alignment output: the model-ready vector plus the report.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub vector: AlignedVector,
    pub report: AlignmentReport,
}

/// Align an encoded record to the training schema.
///
/// Pure and deterministic; the output vector always has `schema.len()` values
/// in schema order.
pub fn align(encoded: &EncodedVector, schema: &SchemaColumns) -> Alignment {
    let by_name: HashMap<&str, f64> = encoded
        .columns
        .iter()
        .map(|(name, value)| (name.as_str(), *value))
        .collect();

    let mut values = Vec::with_capacity(schema.len());
    let mut report = AlignmentReport::default();

    for name in schema.names() {
        match by_name.get(name.as_str()) {
            Some(&value) => {
                report.matched += 1;
                values.push(value);
            }
            None => {
                report.zero_filled += 1;
                values.push(0.0);
            }
        }
    }

    let known: HashSet<&str> = schema.names().iter().map(String::as_str).collect();
    for (name, _) in &encoded.columns {
        if !known.contains(name.as_str()) {
            report.dropped.push(name.clone());
        }
    }

    Alignment {
        vector: AlignedVector::new(values),
        report,
    }
}
