//! Reporting utilities: formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the scoring/explanation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::RunOutput;
use crate::io::artifact::Artifacts;

/// Format the full run summary (decision + model info + applicant data).
pub fn format_score_summary(run: &RunOutput, artifacts: &Artifacts) -> String {
    let mut out = String::new();

    out.push_str("=== rlens - Credit Risk Score ===\n");
    out.push_str(&format!("Decision: {}\n", run.score.decision.display_name()));
    out.push_str(&format!(
        "Probability of default: {:.1}%\n",
        run.score.probability_of_default * 100.0
    ));

    let trained = match artifacts.trained_at {
        Some(date) => format!("trained {date}"),
        None => "built-in demo".to_string(),
    };
    out.push_str(&format!(
        "Model: {} trees | {} features | {trained}\n",
        artifacts.model.trees.len(),
        artifacts.model.n_features,
    ));

    out.push_str(&format!(
        "Alignment: {} matched | {} zero-filled\n",
        run.alignment.matched, run.alignment.zero_filled,
    ));
    if !run.alignment.dropped.is_empty() {
        out.push_str(&format!(
            "Note: {} encoded column(s) unknown to the training schema were ignored: {}\n",
            run.alignment.dropped.len(),
            run.alignment.dropped.join(", "),
        ));
    }

    out.push_str("\nApplicant:\n");
    for (name, value) in run.record.iter() {
        out.push_str(&format!("  {name:<24} {value}\n"));
    }

    out
}

/// Format the top-N attribution table (magnitude-ranked).
pub fn format_attribution_table(run: &RunOutput, top_n: usize) -> String {
    let mut out = String::new();
    let ranked = run.attribution.ranked();
    let shown = top_n.min(ranked.len());

    out.push_str(&format!(
        "Top {shown} drivers (contribution in log-odds; + pushes toward default):\n"
    ));
    for c in ranked.iter().take(shown) {
        out.push_str(&format!(
            "  {:+.4}  {} = {}\n",
            c.contribution,
            truncate_name(&c.name, 48),
            fmt_value(c.value),
        ));
    }

    if shown < ranked.len() {
        let rest: f64 = ranked.iter().skip(shown).map(|c| c.contribution).sum();
        out.push_str(&format!(
            "  {rest:+.4}  ({} remaining features)\n",
            ranked.len() - shown
        ));
    }

    out.push_str(&format!(
        "\nbaseline {:+.4}  ->  margin {:+.4}\n",
        run.attribution.baseline, run.attribution.raw_margin,
    ));

    out
}

/// One-line output for `rlens decide` (script-friendly).
pub fn format_decision_line(run: &RunOutput) -> String {
    let decision = match run.score.decision {
        crate::domain::Decision::Approved => "approved",
        crate::domain::Decision::Rejected => "rejected",
    };
    format!("{decision} {:.6}", run.score.probability_of_default)
}

pub fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let kept: String = name.chars().take(max.saturating_sub(2)).collect();
    format!("{kept}..")
}

fn fmt_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}
