//! Read/write the trained-model artifacts.
//!
//! Two files live side by side in one directory, following the training
//! pipeline's convention:
//!
//! - `credit_model.json`: tool tag, training date, and the tree ensemble
//! - `feature_columns.json`: plain JSON array of schema column names
//!
//! Both are loaded exactly once per process; a missing file is fatal for the
//! whole run, so loading happens before any request is served.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::sample;
use crate::domain::SchemaColumns;
use crate::error::AppError;
use crate::explain::TreeExplainer;
use crate::model::TreeEnsemble;

pub const MODEL_FILE: &str = "credit_model.json";
pub const COLUMNS_FILE: &str = "feature_columns.json";

/// Environment variable naming the artifact directory (read via `.env` too).
pub const ARTIFACT_DIR_ENV: &str = "RISKLENS_ARTIFACTS";

/// On-disk wrapper for the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub tool: String,
    pub trained_at: NaiveDate,
    pub model: TreeEnsemble,
}

/// The process-wide read-only state: model, schema, and the explainer built
/// against them. Constructed once, passed by reference into every
/// request-scoped call, never mutated.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub model: TreeEnsemble,
    pub schema: SchemaColumns,
    pub explainer: TreeExplainer,
    pub trained_at: Option<NaiveDate>,
}

impl Artifacts {
    /// Resolve the artifact directory: explicit flag, then the
    /// `RISKLENS_ARTIFACTS` environment variable (with `.env` support), then
    /// the current directory.
    pub fn resolve_dir(flag: Option<&Path>) -> PathBuf {
        if let Some(dir) = flag {
            return dir.to_path_buf();
        }
        dotenvy::dotenv().ok();
        if let Ok(dir) = std::env::var(ARTIFACT_DIR_ENV) {
            return PathBuf::from(dir);
        }
        PathBuf::from(".")
    }

    /// Load and validate both artifacts from a directory.
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        let model_path = dir.join(MODEL_FILE);
        let file = File::open(&model_path).map_err(|e| AppError::artifact_missing(&model_path, &e))?;
        let artifact: ModelArtifact = serde_json::from_reader(file).map_err(|e| {
            AppError::new(2, format!("Invalid model artifact '{}': {e}", model_path.display()))
        })?;

        let columns_path = dir.join(COLUMNS_FILE);
        let file =
            File::open(&columns_path).map_err(|e| AppError::artifact_missing(&columns_path, &e))?;
        let names: Vec<String> = serde_json::from_reader(file).map_err(|e| {
            AppError::new(2, format!("Invalid column list '{}': {e}", columns_path.display()))
        })?;

        Self::from_parts(artifact.model, SchemaColumns::new(names), Some(artifact.trained_at))
    }

    /// Build the in-memory demo artifacts (no filesystem access).
    pub fn demo() -> Result<Self, AppError> {
        let schema = sample::schema_columns();
        let model = sample::tree_ensemble(&schema)?;
        Self::from_parts(model, schema, None)
    }

    fn from_parts(
        model: TreeEnsemble,
        schema: SchemaColumns,
        trained_at: Option<NaiveDate>,
    ) -> Result<Self, AppError> {
        model.validate(schema.len())?;
        let explainer = TreeExplainer::new(&model);
        Ok(Self { model, schema, explainer, trained_at })
    }
}

/// Write both artifact files into `dir` (created if absent).
pub fn write_artifacts(
    dir: &Path,
    artifact: &ModelArtifact,
    schema: &SchemaColumns,
) -> Result<(), AppError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::new(2, format!("Failed to create artifact directory '{}': {e}", dir.display()))
    })?;

    let model_path = dir.join(MODEL_FILE);
    let file = File::create(&model_path).map_err(|e| {
        AppError::new(2, format!("Failed to create model artifact '{}': {e}", model_path.display()))
    })?;
    serde_json::to_writer_pretty(file, artifact)
        .map_err(|e| AppError::new(2, format!("Failed to write model artifact: {e}")))?;

    let columns_path = dir.join(COLUMNS_FILE);
    let file = File::create(&columns_path).map_err(|e| {
        AppError::new(2, format!("Failed to create column list '{}': {e}", columns_path.display()))
    })?;
    serde_json::to_writer_pretty(file, schema.names())
        .map_err(|e| AppError::new(2, format!("Failed to write column list: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rlens-artifact-{tag}-{}", std::process::id()))
    }

    #[test]
    fn round_trip_preserves_model_and_schema() {
        let demo = Artifacts::demo().unwrap();
        let artifact = ModelArtifact {
            tool: "rlens".to_string(),
            trained_at: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            model: demo.model.clone(),
        };

        let dir = scratch_dir("roundtrip");
        write_artifacts(&dir, &artifact, &demo.schema).unwrap();
        let loaded = Artifacts::load(&dir).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded.model, demo.model);
        assert_eq!(loaded.schema, demo.schema);
        assert_eq!(loaded.trained_at, Some(artifact.trained_at));
    }

    #[test]
    fn missing_artifacts_are_fatal_with_exit_code_2() {
        let dir = scratch_dir("missing").join("nope");
        let err = Artifacts::load(&dir).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn explicit_flag_wins_dir_resolution() {
        let dir = Artifacts::resolve_dir(Some(Path::new("/srv/models")));
        assert_eq!(dir, PathBuf::from("/srv/models"));
    }
}
