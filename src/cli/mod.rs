//! Command-line parsing for the credit scoring dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the scoring/explanation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{Checking, CreditHistory, Savings};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rlens", version, about = "Explainable credit risk scoring")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score an applicant and print the full report (attribution + waterfall).
    Score(ScoreArgs),
    /// Print only `<decision> <probability>` (useful for scripting).
    Decide(ScoreArgs),
    /// Print metadata about the loaded model and schema artifacts.
    Inspect(InspectArgs),
    /// Write the built-in demo artifacts to a directory.
    Sample(SampleArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying scoring pipeline as `rlens score`, but
    /// renders results in a terminal UI using Ratatui.
    Tui(ScoreArgs),
}

/// Common options for scoring and deciding.
#[derive(Debug, Parser, Clone)]
pub struct ScoreArgs {
    /// Checking account balance band.
    #[arg(long, value_enum, default_value_t = Checking::Overdrawn)]
    pub checking: Checking,

    /// Loan duration in months.
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u32).range(4..=72))]
    pub duration: u32,

    /// Credit amount in DM.
    #[arg(long, default_value_t = 3000, value_parser = clap::value_parser!(u32).range(250..=20_000))]
    pub amount: u32,

    /// Credit history band.
    #[arg(long, value_enum, default_value_t = CreditHistory::NoCredits)]
    pub history: CreditHistory,

    /// Savings account balance band.
    #[arg(long, value_enum, default_value_t = Savings::Low)]
    pub savings: Savings,

    /// Applicant age in years.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(19..=75))]
    pub age: u32,

    /// Directory holding `credit_model.json` and `feature_columns.json`
    /// (falls back to $RISKLENS_ARTIFACTS, then the current directory).
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Use the built-in demo model instead of loading artifacts.
    #[arg(long)]
    pub demo: bool,

    /// Score a randomly drawn applicant instead of the flag values.
    #[arg(long)]
    pub random: bool,

    /// Seed for `--random`.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Show the top-N drivers in tables and plots.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Render the ASCII waterfall (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the waterfall.
    #[arg(long)]
    pub no_plot: bool,

    /// Waterfall width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Export the ranked attribution to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for inspecting artifacts.
#[derive(Debug, Parser)]
pub struct InspectArgs {
    /// Artifact directory (same resolution as `score --artifacts`).
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Inspect the built-in demo model.
    #[arg(long)]
    pub demo: bool,
}

/// Options for writing the demo artifacts.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Output directory for the artifact pair.
    #[arg(long, default_value = "artifacts")]
    pub out: PathBuf,
}
