//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while scoring
//! - exported to JSON/CSV
//! - reloaded later for comparisons across runs

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Checking-account status of the applicant.
///
/// The attached labels are the exact category strings the model was trained
/// on; encoding relies on them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Checking {
    /// Balance below zero.
    #[value(name = "overdrawn")]
    Overdrawn,
    /// Balance between 0 and 200 DM.
    #[value(name = "low")]
    Low,
    /// Balance of 200 DM or more, or salary assignment.
    #[value(name = "high")]
    High,
    /// No checking account at all.
    #[value(name = "none")]
    NoAccount,
}

impl Checking {
    pub const ALL: [Checking; 4] = [
        Checking::Overdrawn,
        Checking::Low,
        Checking::High,
        Checking::NoAccount,
    ];

    /// Training-time category label.
    pub fn label(self) -> &'static str {
        match self {
            Checking::Overdrawn => "< 0 DM",
            Checking::Low => "0 <= x < 200 DM",
            Checking::High => ">= 200 DM / Salary assignments",
            Checking::NoAccount => "No checking account",
        }
    }
}

impl std::fmt::Display for Checking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Checking::Overdrawn => "overdrawn",
            Checking::Low => "low",
            Checking::High => "high",
            Checking::NoAccount => "none",
        })
    }
}

/// Credit history of the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CreditHistory {
    #[value(name = "none")]
    NoCredits,
    #[value(name = "all-paid")]
    AllPaid,
    #[value(name = "existing-paid")]
    ExistingPaid,
    #[value(name = "delayed")]
    Delayed,
    #[value(name = "critical")]
    Critical,
}

impl CreditHistory {
    pub const ALL: [CreditHistory; 5] = [
        CreditHistory::NoCredits,
        CreditHistory::AllPaid,
        CreditHistory::ExistingPaid,
        CreditHistory::Delayed,
        CreditHistory::Critical,
    ];

    /// Training-time category label.
    pub fn label(self) -> &'static str {
        match self {
            CreditHistory::NoCredits => "No credits taken",
            CreditHistory::AllPaid => "All credits paid back duly",
            CreditHistory::ExistingPaid => "Existing credits paid back duly",
            CreditHistory::Delayed => "Delay in paying off",
            CreditHistory::Critical => "Critical account / Other credits existing",
        }
    }
}

impl std::fmt::Display for CreditHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CreditHistory::NoCredits => "none",
            CreditHistory::AllPaid => "all-paid",
            CreditHistory::ExistingPaid => "existing-paid",
            CreditHistory::Delayed => "delayed",
            CreditHistory::Critical => "critical",
        })
    }
}

/// Savings-account balance band of the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Savings {
    #[value(name = "low")]
    Low,
    #[value(name = "mid")]
    Mid,
    #[value(name = "high")]
    High,
    #[value(name = "very-high")]
    VeryHigh,
    #[value(name = "unknown")]
    Unknown,
}

impl Savings {
    pub const ALL: [Savings; 5] = [
        Savings::Low,
        Savings::Mid,
        Savings::High,
        Savings::VeryHigh,
        Savings::Unknown,
    ];

    /// Training-time category label.
    pub fn label(self) -> &'static str {
        match self {
            Savings::Low => "< 100 DM",
            Savings::Mid => "100 <= x < 500 DM",
            Savings::High => "500 <= x < 1000 DM",
            Savings::VeryHigh => ">= 1000 DM",
            Savings::Unknown => "Unknown/No savings account",
        }
    }
}

impl std::fmt::Display for Savings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Savings::Low => "low",
            Savings::Mid => "mid",
            Savings::High => "high",
            Savings::VeryHigh => "very-high",
            Savings::Unknown => "unknown",
        })
    }
}

/// The user-editable part of an application.
///
/// The remaining ~14 attributes the model expects are held at fixed default
/// values; `to_record` merges both sets into a complete [`RawRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub checking: Checking,
    /// Loan duration in months (4..=72).
    pub duration_months: u32,
    /// Requested credit amount in DM (250..=20_000).
    pub credit_amount: u32,
    pub history: CreditHistory,
    pub savings: Savings,
    /// Applicant age in years (19..=75).
    pub age: u32,
}

impl Default for Applicant {
    fn default() -> Self {
        Self {
            checking: Checking::Overdrawn,
            duration_months: 24,
            credit_amount: 3000,
            history: CreditHistory::NoCredits,
            savings: Savings::Low,
            age: 30,
        }
    }
}

impl Applicant {
    /// Merge the editable fields with the fixed defaults into a complete
    /// attribute record.
    ///
    /// Every attribute the training schema can reference by name must appear
    /// here; anything missing would silently read as zero after alignment.
    pub fn to_record(&self) -> RawRecord {
        use AttributeValue::{Categorical, Numeric};

        let entries = vec![
            ("Existing_account", Categorical(self.checking.label().to_string())),
            ("Duration_month", Numeric(f64::from(self.duration_months))),
            ("Credit_amount", Numeric(f64::from(self.credit_amount))),
            ("Credit_history", Categorical(self.history.label().to_string())),
            ("Savings_account", Categorical(self.savings.label().to_string())),
            ("Age", Numeric(f64::from(self.age))),
            ("Purpose", Categorical("Radio/Television".to_string())),
            ("Employment_since", Categorical("1 <= x < 4 years".to_string())),
            ("Installment_rate", Numeric(4.0)),
            ("Personal_status_sex", Categorical("Male : Single".to_string())),
            ("Guarantors", Categorical("None".to_string())),
            ("Residence_since", Numeric(4.0)),
            ("Property", Categorical("Real estate".to_string())),
            ("Other_installment_plans", Categorical("None".to_string())),
            ("Housing", Categorical("Own".to_string())),
            ("Num_existing_credits", Numeric(1.0)),
            ("Job", Categorical("Skilled employee / Official".to_string())),
            ("Num_people_liable", Numeric(1.0)),
            ("Telephone", Categorical("None".to_string())),
            ("Foreign_worker", Categorical("Yes".to_string())),
        ];

        RawRecord {
            entries: entries
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

/// A single applicant attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Categorical(String),
    Numeric(f64),
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Categorical(s) => write!(f, "{s}"),
            AttributeValue::Numeric(v) => {
                if v.fract() == 0.0 {
                    write!(f, "{}", *v as i64)
                } else {
                    write!(f, "{v}")
                }
            }
        }
    }
}

/// A complete applicant attribute record (editable fields + fixed defaults).
///
/// Entry order is preserved so reports show attributes in form order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub entries: Vec<(String, AttributeValue)>,
}

impl RawRecord {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The ordered list of feature columns the model was trained on.
///
/// Loaded once per process from the schema artifact and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumns {
    names: Vec<String>,
}

impl SchemaColumns {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A feature vector aligned to a [`SchemaColumns`]: same length, same order.
///
/// This is the only vector shape the scorer and explainer accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedVector {
    values: Vec<f64>,
}

impl AlignedVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Binary credit decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Map the model's raw class output to a decision.
    ///
    /// Class 0 is the repaid/good outcome, class 1 the default/bad outcome;
    /// the artifact loader validates this convention at startup.
    pub fn from_class(class: usize) -> Self {
        if class == 0 {
            Decision::Approved
        } else {
            Decision::Rejected
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Decision::Approved => "Approved (low risk)",
            Decision::Rejected => "Rejected (high risk)",
        }
    }
}

/// Scoring output for a single applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub decision: Decision,
    /// Probability mass the model assigns to the default class, in [0, 1].
    pub probability_of_default: f64,
}

/// One feature's share of the prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    /// The aligned input value this contribution was computed for.
    pub value: f64,
    /// Signed contribution in margin (log-odds) space.
    pub contribution: f64,
}

/// Additive per-feature decomposition of a single prediction.
///
/// Invariant: `baseline + Σ contributions == raw_margin` up to floating-point
/// tolerance. Contributions are stored in schema order; use [`Attribution::ranked`]
/// for magnitude-sorted display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Expected model margin over the training distribution.
    pub baseline: f64,
    /// The model's raw margin (log-odds) for this vector.
    pub raw_margin: f64,
    pub contributions: Vec<FeatureContribution>,
}

impl Attribution {
    /// Contributions sorted by descending absolute magnitude.
    pub fn ranked(&self) -> Vec<&FeatureContribution> {
        let mut sorted: Vec<&FeatureContribution> = self.contributions.iter().collect();
        sorted.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    pub applicant: Applicant,
    /// Artifact directory override; env/cwd resolution applies when `None`.
    pub artifact_dir: Option<PathBuf>,
    /// Use the built-in demo artifacts instead of loading from disk.
    pub demo: bool,
    /// Replace the applicant with a randomly drawn one.
    pub random: bool,
    pub seed: u64,

    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,

    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_covers_all_training_attributes() {
        let record = Applicant::default().to_record();
        assert_eq!(record.len(), 20);

        // Every attribute name is unique.
        let mut names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 20);
    }

    #[test]
    fn default_applicant_matches_form_defaults() {
        let a = Applicant::default();
        assert_eq!(a.checking.label(), "< 0 DM");
        assert_eq!(a.duration_months, 24);
        assert_eq!(a.credit_amount, 3000);
        assert_eq!(a.age, 30);
    }

    #[test]
    fn ranked_sorts_by_magnitude() {
        let attribution = Attribution {
            baseline: 0.0,
            raw_margin: 0.0,
            contributions: vec![
                FeatureContribution { name: "a".into(), value: 1.0, contribution: 0.1 },
                FeatureContribution { name: "b".into(), value: 0.0, contribution: -0.5 },
                FeatureContribution { name: "c".into(), value: 1.0, contribution: 0.3 },
            ],
        };
        let ranked = attribution.ranked();
        assert_eq!(ranked[0].name, "b");
        assert_eq!(ranked[1].name, "c");
        assert_eq!(ranked[2].name, "a");
    }
}
