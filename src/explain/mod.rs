//! Local explanation of a single prediction.
//!
//! The explainer is constructed once per process against the loaded model and
//! reused across requests; each `explain` call decomposes one aligned vector
//! into a baseline (the model's expected margin over its training
//! distribution) plus one signed contribution per schema column. The
//! decomposition is additive: baseline + Σ contributions equals the model's
//! raw margin for the vector, up to floating-point noise.

mod path;

use rayon::prelude::*;

use crate::domain::{AlignedVector, Attribution, FeatureContribution, SchemaColumns};
use crate::error::AppError;
use crate::model::{Tree, TreeEnsemble};

/// Reusable explainer for one loaded model.
#[derive(Debug, Clone)]
pub struct TreeExplainer {
    baseline: f64,
}

impl TreeExplainer {
    /// Precompute the per-tree expectations that anchor every explanation.
    pub fn new(model: &TreeEnsemble) -> Self {
        let expected: f64 = model.trees.iter().map(Tree::expected_value).sum();
        Self {
            baseline: model.base_margin + expected,
        }
    }

    /// Expected model margin over the training distribution.
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Per-feature attribution for a single aligned vector.
    ///
    /// Trees are independent, so their SHAP values are computed in parallel
    /// and summed element-wise. Neither the model nor the vector is mutated.
    pub fn explain(
        &self,
        model: &TreeEnsemble,
        vector: &AlignedVector,
        schema: &SchemaColumns,
    ) -> Result<Attribution, AppError> {
        if vector.len() != model.n_features {
            return Err(AppError::shape_mismatch("explain", model.n_features, vector.len()));
        }
        if schema.len() != model.n_features {
            return Err(AppError::shape_mismatch(
                "explain (schema)",
                model.n_features,
                schema.len(),
            ));
        }

        let x = vector.values();
        let n = model.n_features;

        let phi = model
            .trees
            .par_iter()
            .map(|tree| path::shap_values(tree, x, n))
            .reduce(
                || vec![0.0; n],
                |mut acc, tree_phi| {
                    for (a, b) in acc.iter_mut().zip(&tree_phi) {
                        *a += b;
                    }
                    acc
                },
            );

        let raw_margin = model.margin(x)?;

        let contributions = schema
            .names()
            .iter()
            .zip(x.iter())
            .zip(phi)
            .map(|((name, &value), contribution)| FeatureContribution {
                name: name.clone(),
                value,
                contribution,
            })
            .collect();

        Ok(Attribution {
            baseline: self.baseline,
            raw_margin,
            contributions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample;
    use crate::domain::{Applicant, Checking, CreditHistory, Savings};
    use crate::features::{align, encode};

    fn demo() -> (TreeEnsemble, SchemaColumns, TreeExplainer) {
        let schema = sample::schema_columns();
        let model = sample::tree_ensemble(&schema).unwrap();
        let explainer = TreeExplainer::new(&model);
        (model, schema, explainer)
    }

    fn explain_applicant(applicant: &Applicant) -> (Attribution, f64) {
        let (model, schema, explainer) = demo();
        let alignment = align(&encode(&applicant.to_record()), &schema);
        let margin = model.margin(alignment.vector.values()).unwrap();
        let attribution = explainer.explain(&model, &alignment.vector, &schema).unwrap();
        (attribution, margin)
    }

    #[test]
    fn additivity_holds_for_the_default_applicant() {
        let (attribution, margin) = explain_applicant(&Applicant::default());
        let total: f64 = attribution.contributions.iter().map(|c| c.contribution).sum();
        assert!((attribution.baseline + total - margin).abs() < 1e-9);
        assert!((attribution.raw_margin - margin).abs() < 1e-12);
    }

    #[test]
    fn additivity_holds_across_varied_applicants() {
        let applicants = [
            Applicant {
                checking: Checking::NoAccount,
                duration_months: 60,
                credit_amount: 12_000,
                history: CreditHistory::Critical,
                savings: Savings::Unknown,
                age: 22,
            },
            Applicant {
                checking: Checking::High,
                duration_months: 6,
                credit_amount: 500,
                history: CreditHistory::AllPaid,
                savings: Savings::VeryHigh,
                age: 67,
            },
        ];
        for applicant in applicants {
            let (attribution, margin) = explain_applicant(&applicant);
            let total: f64 = attribution.contributions.iter().map(|c| c.contribution).sum();
            assert!(
                (attribution.baseline + total - margin).abs() < 1e-9,
                "applicant={applicant:?}"
            );
        }
    }

    #[test]
    fn one_contribution_per_schema_column() {
        let (attribution, _) = explain_applicant(&Applicant::default());
        let (_, schema, _) = demo();
        assert_eq!(attribution.contributions.len(), schema.len());
        for (contribution, name) in attribution.contributions.iter().zip(schema.names()) {
            assert_eq!(&contribution.name, name);
        }
    }

    #[test]
    fn wrong_shape_is_a_contract_violation() {
        let (model, schema, explainer) = demo();
        let short = AlignedVector::new(vec![0.0; 2]);
        assert!(explainer.explain(&model, &short, &schema).is_err());
    }
}
