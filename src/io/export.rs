//! Export per-feature attribution results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Attribution, ScoreResult};
use crate::error::AppError;

/// Write the ranked attribution to a CSV file.
///
/// Rows are ordered by descending absolute contribution so the file reads
/// like the waterfall: the strongest drivers first.
pub fn write_attribution_csv(
    path: &Path,
    score: &ScoreResult,
    attribution: &Attribution,
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "rank,feature,value,contribution,direction")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (rank, c) in attribution.ranked().iter().enumerate() {
        let direction = if c.contribution >= 0.0 { "risk_up" } else { "risk_down" };
        writeln!(
            file,
            "{},{},{:.10},{:.10},{}",
            rank + 1,
            csv_field(&c.name),
            c.value,
            c.contribution,
            direction,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writeln!(
        file,
        ",baseline,,{:.10},\n,raw_margin,,{:.10},\n,probability_of_default,,{:.10},",
        attribution.baseline, attribution.raw_margin, score.probability_of_default,
    )
    .map_err(|e| AppError::new(2, format!("Failed to write export CSV footer: {e}")))?;

    Ok(())
}

/// Quote a field when it contains CSV metacharacters (feature names carry
/// commas and slashes from the category labels).
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
