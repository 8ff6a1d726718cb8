//! Shared scoring pipeline used by both the CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! record -> encode -> align -> score -> explain
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::sample;
use crate::domain::{
    AlignedVector, Applicant, Attribution, RawRecord, ScoreConfig, ScoreResult,
};
use crate::error::AppError;
use crate::features::{align, encode, AlignmentReport};
use crate::io::artifact::Artifacts;

/// All computed outputs of a single scoring run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub applicant: Applicant,
    pub record: RawRecord,
    pub aligned: AlignedVector,
    pub alignment: AlignmentReport,
    pub score: ScoreResult,
    pub attribution: Attribution,
}

/// Resolve the applicant to score: the configured one, or a random draw.
pub fn resolve_applicant(config: &ScoreConfig) -> Result<Applicant, AppError> {
    if config.random {
        sample::random_applicant(config.seed)
    } else {
        Ok(config.applicant)
    }
}

/// Load the artifacts the run needs (demo or on-disk).
pub fn load_artifacts(config: &ScoreConfig) -> Result<Artifacts, AppError> {
    if config.demo {
        Artifacts::demo()
    } else {
        let dir = Artifacts::resolve_dir(config.artifact_dir.as_deref());
        Artifacts::load(&dir)
    }
}

/// Execute the full pipeline for one applicant and return the computed outputs.
///
/// Artifacts are passed in by reference so the TUI can re-score without
/// reloading anything.
pub fn run_score(applicant: &Applicant, artifacts: &Artifacts) -> Result<RunOutput, AppError> {
    let record = applicant.to_record();
    let encoded = encode(&record);
    let alignment = align(&encoded, &artifacts.schema);

    let score = crate::model::score(&alignment.vector, &artifacts.model)?;
    let attribution =
        artifacts
            .explainer
            .explain(&artifacts.model, &alignment.vector, &artifacts.schema)?;

    Ok(RunOutput {
        applicant: *applicant,
        record,
        aligned: alignment.vector,
        alignment: alignment.report,
        score,
        attribution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_applicant_scores_end_to_end() {
        let artifacts = Artifacts::demo().unwrap();
        let run = run_score(&Applicant::default(), &artifacts).unwrap();

        assert_eq!(run.aligned.len(), artifacts.schema.len());
        assert!((0.0..=1.0).contains(&run.score.probability_of_default));

        let total: f64 = run.attribution.contributions.iter().map(|c| c.contribution).sum();
        assert!((run.attribution.baseline + total - run.attribution.raw_margin).abs() < 1e-9);
    }

    #[test]
    fn no_encoded_column_is_silently_invented() {
        let artifacts = Artifacts::demo().unwrap();
        let run = run_score(&Applicant::default(), &artifacts).unwrap();

        // All 20 attributes land in the schema, so nothing is dropped and
        // exactly 20 schema columns carry values.
        assert!(run.alignment.dropped.is_empty());
        assert_eq!(run.alignment.matched, 20);
        assert_eq!(run.alignment.zero_filled, artifacts.schema.len() - 20);
    }

    #[test]
    fn pipeline_is_deterministic() {
        let artifacts = Artifacts::demo().unwrap();
        let a = run_score(&Applicant::default(), &artifacts).unwrap();
        let b = run_score(&Applicant::default(), &artifacts).unwrap();
        assert_eq!(a.aligned, b.aligned);
        assert_eq!(a.score, b.score);
        assert_eq!(a.attribution, b.attribution);
    }

    #[test]
    fn random_applicants_score_without_error() {
        let artifacts = Artifacts::demo().unwrap();
        for seed in 0..25 {
            let applicant = sample::random_applicant(seed).unwrap();
            let run = run_score(&applicant, &artifacts).unwrap();
            assert!((0.0..=1.0).contains(&run.score.probability_of_default));
        }
    }
}
