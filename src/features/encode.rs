//! Record encoding: categorical attributes to indicator columns.
//!
//! Only one record is ever encoded at a time, so indicator columns are derived
//! from the values present in *this* record, not from a fixed category
//! universe. The schema aligner downstream zero-fills the indicator columns
//! that training saw but this record did not produce, which is what makes the
//! record-scoped encoding safe.

use crate::domain::{AttributeValue, RawRecord};

/// A record after one-hot encoding, keyed by sanitized column name.
///
/// Column order follows record order (indicator columns in place of their
/// source attribute), which keeps the encoding deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVector {
    pub columns: Vec<(String, f64)>,
}

impl EncodedVector {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|&(_, v)| v)
    }
}

/// Encode a raw record into a wide numeric vector.
///
/// - categorical attributes emit one indicator column `{attr}_{value}` = 1.0
/// - numeric attributes pass through unchanged under their own name
/// - every emitted column name is sanitized for the model's naming rules
pub fn encode(record: &RawRecord) -> EncodedVector {
    let mut columns = Vec::with_capacity(record.len());

    for (name, value) in record.iter() {
        match value {
            AttributeValue::Categorical(category) => {
                columns.push((sanitize_column(&format!("{name}_{category}")), 1.0));
            }
            AttributeValue::Numeric(v) => {
                columns.push((sanitize_column(name), *v));
            }
        }
    }

    EncodedVector { columns }
}

/// Replace the characters the model's column parser rejects (`[`, `]`, `<`)
/// with `_`.
///
/// The training pipeline applies the same substitution before persisting the
/// schema, so sanitized names here line up with schema names exactly.
pub fn sanitize_column(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '[' | ']' | '<' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Applicant;

    #[test]
    fn sanitize_replaces_bracket_and_lt() {
        assert_eq!(
            sanitize_column("Existing_account_< 0 DM"),
            "Existing_account__ 0 DM"
        );
        assert_eq!(sanitize_column("f[0]<x"), "f_0__x");
        // `>` and `/` are fine as-is.
        assert_eq!(
            sanitize_column("Existing_account_>= 200 DM / Salary assignments"),
            "Existing_account_>= 200 DM / Salary assignments"
        );
    }

    #[test]
    fn encode_emits_one_column_per_attribute() {
        let record = Applicant::default().to_record();
        let encoded = encode(&record);
        assert_eq!(encoded.len(), record.len());
    }

    #[test]
    fn encode_indicator_and_passthrough_values() {
        let record = Applicant::default().to_record();
        let encoded = encode(&record);

        // Default checking status `< 0 DM` becomes a sanitized indicator.
        assert_eq!(encoded.get("Existing_account__ 0 DM"), Some(1.0));
        // Numerics keep their attribute name and value.
        assert_eq!(encoded.get("Duration_month"), Some(24.0));
        assert_eq!(encoded.get("Credit_amount"), Some(3000.0));
    }

    #[test]
    fn encode_is_deterministic() {
        let record = Applicant::default().to_record();
        assert_eq!(encode(&record), encode(&record));
    }

    #[test]
    fn inequality_labels_sanitize_inside_the_name() {
        let mut applicant = Applicant::default();
        applicant.savings = crate::domain::Savings::Mid; // "100 <= x < 500 DM"
        let encoded = encode(&applicant.to_record());
        assert_eq!(encoded.get("Savings_account_100 _= x _ 500 DM"), Some(1.0));
    }
}
