//! Demo artifacts: a hand-specified credit model over the full German-credit
//! column universe.
//!
//! The real deployment loads a trained model and its column list from disk;
//! this module provides an equivalent pair built into the binary so the
//! pipeline can run end-to-end with `--demo` (or after `rlens sample`), and so
//! tests have a realistic fixture with one-hot columns, covers, and a base
//! margin. Split choices and leaf values are hand-tuned to plausible credit
//! heuristics, not trained.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};

use crate::domain::{Applicant, Checking, CreditHistory, Savings, SchemaColumns};
use crate::error::AppError;
use crate::features::sanitize_column;
use crate::model::{Tree, TreeEnsemble, TreeNode};

/// Base margin in log-odds space; sigmoid(-0.8473) ≈ 0.30, the default rate
/// of the training population.
const BASE_MARGIN: f64 = -0.8473;

/// Training-set size the covers are denominated in.
const TRAIN_ROWS: f64 = 1000.0;

const PURPOSES: [&str; 10] = [
    "Car (new)",
    "Car (used)",
    "Furniture/Equipment",
    "Radio/Television",
    "Domestic appliances",
    "Repairs",
    "Education",
    "Retraining",
    "Business",
    "Others",
];

const EMPLOYMENT_BANDS: [&str; 5] = [
    "Unemployed",
    "< 1 year",
    "1 <= x < 4 years",
    "4 <= x < 7 years",
    ">= 7 years",
];

const PERSONAL_STATUS: [&str; 4] = [
    "Male : Divorced/Separated",
    "Female : Divorced/Separated/Married",
    "Male : Single",
    "Male : Married/Widowed",
];

const GUARANTORS: [&str; 3] = ["None", "Co-applicant", "Guarantor"];

const PROPERTY: [&str; 4] = [
    "Real estate",
    "Savings agreement/Life insurance",
    "Car or other",
    "Unknown / No property",
];

const OTHER_PLANS: [&str; 3] = ["Bank", "Stores", "None"];

const HOUSING: [&str; 3] = ["Rent", "Own", "For free"];

const JOBS: [&str; 4] = [
    "Unemployed/Unskilled - Non-resident",
    "Unskilled - Resident",
    "Skilled employee / Official",
    "Management/ Self-employed/ Highly qualified employee/ Officer",
];

const TELEPHONE: [&str; 2] = ["None", "Yes, registered under the customers name"];

const FOREIGN_WORKER: [&str; 2] = ["Yes", "No"];

/// The sanitized training-column list, in attribute order: numerics under
/// their own name, one indicator column per category otherwise.
pub fn schema_columns() -> SchemaColumns {
    let mut names: Vec<String> = Vec::new();

    push_categories(&mut names, "Existing_account", Checking::ALL.map(Checking::label));
    names.push(sanitize_column("Duration_month"));
    names.push(sanitize_column("Credit_amount"));
    push_categories(&mut names, "Credit_history", CreditHistory::ALL.map(CreditHistory::label));
    push_categories(&mut names, "Savings_account", Savings::ALL.map(Savings::label));
    names.push(sanitize_column("Age"));
    push_categories(&mut names, "Purpose", PURPOSES);
    push_categories(&mut names, "Employment_since", EMPLOYMENT_BANDS);
    names.push(sanitize_column("Installment_rate"));
    push_categories(&mut names, "Personal_status_sex", PERSONAL_STATUS);
    push_categories(&mut names, "Guarantors", GUARANTORS);
    names.push(sanitize_column("Residence_since"));
    push_categories(&mut names, "Property", PROPERTY);
    push_categories(&mut names, "Other_installment_plans", OTHER_PLANS);
    push_categories(&mut names, "Housing", HOUSING);
    names.push(sanitize_column("Num_existing_credits"));
    push_categories(&mut names, "Job", JOBS);
    names.push(sanitize_column("Num_people_liable"));
    push_categories(&mut names, "Telephone", TELEPHONE);
    push_categories(&mut names, "Foreign_worker", FOREIGN_WORKER);

    SchemaColumns::new(names)
}

fn push_categories<const N: usize>(names: &mut Vec<String>, attr: &str, values: [&str; N]) {
    for value in values {
        names.push(sanitize_column(&format!("{attr}_{value}")));
    }
}

/// The demo classifier: five shallow trees over the schema above.
pub fn tree_ensemble(schema: &SchemaColumns) -> Result<TreeEnsemble, AppError> {
    let col = |name: &str| -> Result<i32, AppError> {
        schema
            .names()
            .iter()
            .position(|n| n == name)
            .map(|i| i as i32)
            .ok_or_else(|| {
                AppError::new(4, format!("Demo model references unknown column '{name}'."))
            })
    };

    let overdrawn = col("Existing_account__ 0 DM")?;
    let no_account = col("Existing_account_No checking account")?;
    let duration = col("Duration_month")?;
    let amount = col("Credit_amount")?;
    let low_savings = col("Savings_account__ 100 DM")?;
    let critical = col("Credit_history_Critical account / Other credits existing")?;
    let age = col("Age")?;
    let new_car = col("Purpose_Car (new)")?;
    let installment = col("Installment_rate")?;

    let trees = vec![
        Tree {
            nodes: vec![
                split(overdrawn, 0.5, 1, 4, TRAIN_ROWS),
                split(duration, 22.5, 2, 3, 726.0),
                leaf(-0.45, 455.0),
                leaf(0.12, 271.0),
                split(amount, 7882.0, 5, 6, 274.0),
                leaf(0.38, 228.0),
                leaf(0.95, 46.0),
            ],
        },
        Tree {
            nodes: vec![
                split(duration, 31.5, 1, 4, TRAIN_ROWS),
                split(low_savings, 0.5, 2, 3, 812.0),
                leaf(-0.30, 389.0),
                leaf(0.08, 423.0),
                leaf(0.52, 188.0),
            ],
        },
        Tree {
            nodes: vec![
                split(critical, 0.5, 1, 4, TRAIN_ROWS),
                split(age, 25.5, 2, 3, 707.0),
                leaf(0.22, 190.0),
                leaf(-0.08, 517.0),
                leaf(-0.35, 293.0),
            ],
        },
        Tree {
            nodes: vec![
                split(no_account, 0.5, 1, 4, TRAIN_ROWS),
                split(amount, 3913.0, 2, 3, 606.0),
                leaf(0.15, 410.0),
                leaf(0.33, 196.0),
                leaf(-0.40, 394.0),
            ],
        },
        Tree {
            nodes: vec![
                split(age, 29.5, 1, 4, TRAIN_ROWS),
                split(new_car, 0.5, 2, 3, 410.0),
                leaf(0.18, 312.0),
                leaf(0.30, 98.0),
                split(installment, 3.5, 5, 6, 590.0),
                leaf(-0.12, 324.0),
                leaf(0.05, 266.0),
            ],
        },
    ];

    let model = TreeEnsemble {
        class_labels: ["repaid".to_string(), "default".to_string()],
        default_class: 1,
        base_margin: BASE_MARGIN,
        n_features: schema.len(),
        trees,
    };
    model.validate(schema.len())?;
    Ok(model)
}

fn leaf(value: f64, cover: f64) -> TreeNode {
    TreeNode { feature: -1, threshold: 0.0, left: -1, right: -1, value, cover }
}

fn split(feature: i32, threshold: f64, left: i32, right: i32, cover: f64) -> TreeNode {
    TreeNode { feature, threshold, left, right, value: 0.0, cover }
}

/// Draw a plausible applicant for the `--random` flag and the TUI.
///
/// Deterministic for a given seed. Numeric fields are sampled from rough
/// population shapes (log-normal amounts, normal ages) and clamped to the
/// form bounds.
pub fn random_applicant(seed: u64) -> Result<Applicant, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let duration_dist: Normal<f64> = Normal::new(24.0, 12.0)
        .map_err(|e| AppError::new(4, format!("Duration distribution error: {e}")))?;
    let amount_dist: LogNormal<f64> = LogNormal::new(8.0, 0.55)
        .map_err(|e| AppError::new(4, format!("Amount distribution error: {e}")))?;
    let age_dist: Normal<f64> = Normal::new(35.0, 11.0)
        .map_err(|e| AppError::new(4, format!("Age distribution error: {e}")))?;

    let checking = Checking::ALL[rng.gen_range(0..Checking::ALL.len())];
    let history = CreditHistory::ALL[rng.gen_range(0..CreditHistory::ALL.len())];
    let savings = Savings::ALL[rng.gen_range(0..Savings::ALL.len())];

    let duration_months = duration_dist.sample(&mut rng).round().clamp(4.0, 72.0) as u32;
    let credit_amount = amount_dist.sample(&mut rng).round().clamp(250.0, 20_000.0) as u32;
    let age = age_dist.sample(&mut rng).round().clamp(19.0, 75.0) as u32;

    Ok(Applicant {
        checking,
        duration_months,
        credit_amount,
        history,
        savings,
        age,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_columns_are_unique_and_sanitized() {
        let schema = schema_columns();
        assert_eq!(schema.len(), 61);

        let mut names: Vec<&String> = schema.names().iter().collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 61);

        for name in schema.names() {
            assert!(
                !name.contains(['[', ']', '<']),
                "unsanitized column name: {name}"
            );
        }
    }

    #[test]
    fn demo_model_passes_artifact_validation() {
        let schema = schema_columns();
        let model = tree_ensemble(&schema).unwrap();
        assert_eq!(model.n_features, schema.len());
        assert!(model.validate(schema.len()).is_ok());
    }

    #[test]
    fn random_applicant_is_seed_deterministic_and_in_bounds() {
        let a = random_applicant(7).unwrap();
        let b = random_applicant(7).unwrap();
        assert_eq!(a, b);

        for seed in 0..50 {
            let applicant = random_applicant(seed).unwrap();
            assert!((4..=72).contains(&applicant.duration_months));
            assert!((250..=20_000).contains(&applicant.credit_amount));
            assert!((19..=75).contains(&applicant.age));
        }
    }
}
