//! The trained classifier and the scoring contract on top of it.

pub mod tree;

pub use tree::{Tree, TreeEnsemble, TreeNode};

use crate::domain::{AlignedVector, Decision, ScoreResult};
use crate::error::AppError;

/// Score an aligned vector: binary decision plus probability of default.
///
/// The probability reported is always the mass assigned to the default class
/// (as declared by the artifact), independent of which class wins the
/// decision.
pub fn score(vector: &AlignedVector, model: &TreeEnsemble) -> Result<ScoreResult, AppError> {
    let class = model.predict_class(vector.values())?;
    let probabilities = model.predict_probability(vector.values())?;

    Ok(ScoreResult {
        decision: Decision::from_class(class),
        probability_of_default: probabilities[model.default_class],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample;
    use crate::domain::Applicant;
    use crate::features::{align, encode};

    fn aligned_default() -> (AlignedVector, TreeEnsemble) {
        let schema = sample::schema_columns();
        let model = sample::tree_ensemble(&schema).unwrap();
        let alignment = align(&encode(&Applicant::default().to_record()), &schema);
        (alignment.vector, model)
    }

    #[test]
    fn probability_is_always_the_default_class_mass() {
        let (vector, model) = aligned_default();
        let result = score(&vector, &model).unwrap();
        let probabilities = model.predict_probability(vector.values()).unwrap();
        assert!((result.probability_of_default - probabilities[1]).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&result.probability_of_default));
    }

    #[test]
    fn decision_tracks_raw_class_output() {
        let (vector, model) = aligned_default();
        let result = score(&vector, &model).unwrap();
        let class = model.predict_class(vector.values()).unwrap();
        assert_eq!(result.decision == Decision::Rejected, class == 1);
    }

    #[test]
    fn wrong_length_vector_is_rejected() {
        let (_, model) = aligned_default();
        let short = AlignedVector::new(vec![0.0; 3]);
        assert!(score(&short, &model).is_err());
    }
}
