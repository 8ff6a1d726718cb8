//! ASCII waterfall for attribution output.
//!
//! Bars share one axis: contributions pushing toward default extend right,
//! contributions pushing away extend left. The rows walk from the strongest
//! driver down, with an aggregate row for everything past the cutoff, so the
//! chart tells the same story as a waterfall plot without leaving the
//! terminal.

use crate::domain::Attribution;
use crate::report::truncate_name;

const LABEL_WIDTH: usize = 30;
const VALUE_WIDTH: usize = 8;

/// Render a two-sided bar chart of the top-N contributions.
pub fn render_waterfall(attribution: &Attribution, top_n: usize, width: usize) -> String {
    let ranked = attribution.ranked();
    let shown = top_n.min(ranked.len());

    // Rows: the shown features plus an aggregate of the rest (if any).
    let mut rows: Vec<(String, f64)> = ranked
        .iter()
        .take(shown)
        .map(|c| (truncate_name(&c.name, LABEL_WIDTH), c.contribution))
        .collect();
    if shown < ranked.len() {
        let rest: f64 = ranked.iter().skip(shown).map(|c| c.contribution).sum();
        rows.push((format!("({} others)", ranked.len() - shown), rest));
    }

    let max_mag = rows
        .iter()
        .map(|(_, v)| v.abs())
        .fold(0.0_f64, f64::max)
        .max(f64::MIN_POSITIVE);

    let half = width
        .saturating_sub(LABEL_WIDTH + VALUE_WIDTH + 4)
        .max(8)
        / 2;

    let mut out = String::new();
    out.push_str(&format!(
        "{:<LABEL_WIDTH$} {:>VALUE_WIDTH$} {}{}\n",
        "baseline",
        format!("{:+.3}", attribution.baseline),
        " ".repeat(half),
        "│",
    ));

    for (label, value) in &rows {
        let bar_len = ((value.abs() / max_mag) * half as f64).round() as usize;
        let bar_len = bar_len.min(half);
        let (left, right) = if *value < 0.0 {
            (format!("{}{}", " ".repeat(half - bar_len), "█".repeat(bar_len)), String::new())
        } else {
            (" ".repeat(half), "█".repeat(bar_len))
        };
        out.push_str(&format!(
            "{:<LABEL_WIDTH$} {:>VALUE_WIDTH$} {left}│{right}\n",
            label,
            format!("{value:+.3}"),
        ));
    }

    out.push_str(&format!(
        "{:<LABEL_WIDTH$} {:>VALUE_WIDTH$} {}{}\n",
        "final margin",
        format!("{:+.3}", attribution.raw_margin),
        " ".repeat(half),
        "│",
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureContribution;

    fn fixture() -> Attribution {
        Attribution {
            baseline: -0.8,
            raw_margin: -0.2,
            contributions: vec![
                FeatureContribution { name: "A".into(), value: 1.0, contribution: 0.5 },
                FeatureContribution { name: "B".into(), value: 0.0, contribution: -0.25 },
                FeatureContribution { name: "C".into(), value: 1.0, contribution: 0.1 },
                FeatureContribution { name: "D".into(), value: 3.0, contribution: 0.25 },
            ],
        }
    }

    #[test]
    fn rows_cover_top_n_plus_aggregate_and_anchors() {
        let text = render_waterfall(&fixture(), 2, 80);
        let lines: Vec<&str> = text.lines().collect();
        // baseline + 2 features + aggregate + final margin
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("baseline"));
        assert!(lines[1].contains('A'));
        // B and D tie on magnitude; the sort is stable, so B keeps its slot.
        assert!(lines[2].contains('B'));
        assert!(lines[3].contains("(2 others)"));
        assert!(lines[4].starts_with("final margin"));
    }

    #[test]
    fn negative_bars_sit_left_of_the_axis() {
        let text = render_waterfall(&fixture(), 4, 80);
        for line in text.lines() {
            if line.contains('B') {
                let axis = line.find('│').unwrap();
                let bar = line.find('█').unwrap();
                assert!(bar < axis);
            }
            if line.contains('A') {
                let axis = line.find('│').unwrap();
                let bar = line.find('█').unwrap();
                assert!(bar > axis);
            }
        }
    }

    #[test]
    fn strongest_bar_spans_the_half_width() {
        let text = render_waterfall(&fixture(), 4, 80);
        let a_line = text.lines().find(|l| l.contains('A')).unwrap();
        let bars = a_line.matches('█').count();
        assert!(bars >= 8);
    }
}
