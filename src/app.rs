//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the model/schema artifacts
//! - runs the scoring + explanation pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use chrono::NaiveDate;

use crate::cli::{Command, InspectArgs, SampleArgs, ScoreArgs};
use crate::domain::ScoreConfig;
use crate::error::AppError;
use crate::io::artifact::{self, Artifacts, ModelArtifact};

pub mod pipeline;

/// Entry point for the `rlens` binary.
pub fn run() -> Result<(), AppError> {
    // We want `rlens` and `rlens --demo` to behave like `rlens tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Score(args) => handle_score(args, OutputMode::Full),
        Command::Decide(args) => handle_score(args, OutputMode::DecisionOnly),
        Command::Inspect(args) => handle_inspect(args),
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => handle_tui(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    DecisionOnly,
}

fn handle_score(args: ScoreArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = score_config_from_args(&args);
    let artifacts = pipeline::load_artifacts(&config)?;
    let applicant = pipeline::resolve_applicant(&config)?;
    let run = pipeline::run_score(&applicant, &artifacts)?;

    match mode {
        OutputMode::Full => {
            println!("{}", crate::report::format_score_summary(&run, &artifacts));
            println!("{}", crate::report::format_attribution_table(&run, config.top_n));

            if config.plot {
                println!(
                    "{}",
                    crate::plot::render_waterfall(&run.attribution, config.top_n, config.plot_width)
                );
            }
        }
        OutputMode::DecisionOnly => {
            println!("{}", crate::report::format_decision_line(&run));
        }
    }

    if let Some(path) = &config.export {
        crate::io::export::write_attribution_csv(path, &run.score, &run.attribution)?;
    }

    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let artifacts = if args.demo {
        Artifacts::demo()?
    } else {
        Artifacts::load(&Artifacts::resolve_dir(args.artifacts.as_deref()))?
    };

    println!("Model:");
    println!("- trees   : {}", artifacts.model.trees.len());
    println!("- features: {}", artifacts.model.n_features);
    println!("- classes : {} / {}", artifacts.model.class_labels[0], artifacts.model.class_labels[1]);
    println!("- default : class {} ('{}')", artifacts.model.default_class, artifacts.model.class_labels[artifacts.model.default_class]);
    println!("- baseline: {:+.4} (expected log-odds)", artifacts.explainer.baseline());
    match artifacts.trained_at {
        Some(date) => println!("- trained : {date}"),
        None => println!("- trained : built-in demo"),
    }
    println!("\nSchema: {} columns", artifacts.schema.len());
    for name in artifacts.schema.names() {
        println!("  {name}");
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let demo = Artifacts::demo()?;
    let model_artifact = ModelArtifact {
        tool: "rlens".to_string(),
        // The demo ensemble is hand-specified, not trained; the date marks the
        // artifact format version.
        trained_at: NaiveDate::from_ymd_opt(2025, 11, 3)
            .ok_or_else(|| AppError::new(4, "Invalid demo artifact date."))?,
        model: demo.model.clone(),
    };

    artifact::write_artifacts(&args.out, &model_artifact, &demo.schema)?;
    println!(
        "Wrote {} and {} to '{}'.",
        artifact::MODEL_FILE,
        artifact::COLUMNS_FILE,
        args.out.display()
    );
    Ok(())
}

fn handle_tui(args: ScoreArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

pub fn score_config_from_args(args: &ScoreArgs) -> ScoreConfig {
    ScoreConfig {
        applicant: crate::domain::Applicant {
            checking: args.checking,
            duration_months: args.duration,
            credit_amount: args.amount,
            history: args.history,
            savings: args.savings,
            age: args.age,
        },
        artifact_dir: args.artifacts.clone(),
        demo: args.demo,
        random: args.random,
        seed: args.seed,
        top_n: args.top,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        export: args.export.clone(),
    }
}

/// Rewrite argv so `rlens` defaults to `rlens tui`.
///
/// Rules:
/// - `rlens`                   -> `rlens tui`
/// - `rlens --demo ...`        -> `rlens tui --demo ...`
/// - `rlens --help/--version`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "score" | "decide" | "inspect" | "sample" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
