//! reqcheck - requirement quality checker
//!
//! Derives quality criteria from a subject's guideline, lets a reviewer pick
//! the ones that matter, then grades and refines every requirement with the
//! configured models.
//!
//! ## Commands
//!
//! - `run`: all stages over every (subject, model) pair
//! - `status`: checkpoint state, without calling any model
//! - `generate`: criteria generation for one pair
//! - `filter`: interactive criteria review for one pair
//! - `analyze`: grading and refinement for one pair

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqcheck_backends::BackendRegistry;
use reqcheck_pipeline::{
    CheckpointLayout, CriteriaReviewer, Pipeline, PipelineConfig, RunReport, StageOutcome,
    TerminalReviewer, UnitOutcome,
};
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "reqcheck")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Grade and refine requirements against guideline-derived criteria", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines and JSON status output
    #[arg(long, global = true)]
    json: bool,

    /// JSON configuration file (environment variables still apply on top)
    #[arg(short, long, global = true, env = "REQCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding one folder per subject
    #[arg(long, global = true)]
    subjects_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every stage over the cross-product of subjects and models
    Run {
        /// Subject to process (repeatable; default: configured subjects)
        #[arg(short, long = "subject")]
        subjects: Vec<String>,

        /// Model identifier (repeatable; default: configured models)
        #[arg(short, long = "model")]
        models: Vec<String>,

        /// Write the run report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show checkpoint state for every (subject, model) pair
    Status {
        #[arg(short, long = "subject")]
        subjects: Vec<String>,

        #[arg(short, long = "model")]
        models: Vec<String>,
    },

    /// Generate criteria from the subject's guideline
    Generate {
        #[arg(short, long)]
        subject: String,

        #[arg(short, long)]
        model: String,
    },

    /// Review generated criteria interactively
    Filter {
        #[arg(short, long)]
        subject: String,

        #[arg(short, long)]
        model: String,
    },

    /// Analyze and refine requirements against the filtered criteria
    Analyze {
        #[arg(short, long)]
        subject: String,

        #[arg(short, long)]
        model: String,

        /// Only this requirement file (default: all)
        #[arg(short, long)]
        requirement: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    reqcheck_core::init_tracing(cli.json, level);

    let mut config =
        PipelineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = cli.subjects_dir {
        config.subjects_dir = dir;
    }
    debug!(?config, "configuration loaded");

    let mut pipeline = build_pipeline(&config, Box::new(terminal_reviewer()));

    match cli.command {
        Commands::Run {
            subjects,
            models,
            report,
        } => {
            let subjects = pick(subjects, &config.subjects, "subjects")?;
            let models = pick(models, &config.models, "models")?;
            cmd_run(&mut pipeline, &subjects, &models, report.as_deref()).await
        }
        Commands::Status { subjects, models } => {
            let subjects = pick(subjects, &config.subjects, "subjects")?;
            let models = pick(models, &config.models, "models")?;
            cmd_status(&pipeline, &subjects, &models, cli.json)
        }
        Commands::Generate { subject, model } => cmd_generate(&pipeline, &subject, &model).await,
        Commands::Filter { subject, model } => cmd_filter(&mut pipeline, &subject, &model),
        Commands::Analyze {
            subject,
            model,
            requirement,
        } => cmd_analyze(&pipeline, &subject, &model, requirement.as_deref()).await,
    }
}

fn terminal_reviewer() -> TerminalReviewer<io::StdinLock<'static>, io::Stdout> {
    TerminalReviewer::new(io::stdin().lock(), io::stdout())
}

fn build_pipeline(config: &PipelineConfig, reviewer: Box<dyn CriteriaReviewer>) -> Pipeline {
    let registry = Arc::new(BackendRegistry::new(config.backend.clone()));
    Pipeline::new(
        CheckpointLayout::new(&config.subjects_dir),
        registry,
        reviewer,
    )
}

/// Command-line values win over configured ones; an empty result is an error.
fn pick(flags: Vec<String>, configured: &[String], what: &str) -> Result<Vec<String>> {
    let values = if flags.is_empty() {
        configured.to_vec()
    } else {
        flags
    };
    if values.is_empty() {
        anyhow::bail!(
            "No {what} given: pass them as flags or set `{what}` to a JSON array in the environment"
        );
    }
    Ok(values)
}

fn describe(outcome: &StageOutcome, what: &str) -> String {
    match outcome {
        StageOutcome::Written(path) => format!("✓ {what} written to {}", path.display()),
        StageOutcome::Skipped(path) => {
            format!("- {what} already present at {}", path.display())
        }
    }
}

fn print_report(report: &RunReport) {
    for unit in report.failures() {
        if let UnitOutcome::Failed(error) = &unit.outcome {
            println!("  ✗ {} [{}]: {}", unit.key, unit.stage, error);
        }
    }
    println!("Summary: {}", report.summary());
}

fn finish(report: &RunReport) -> Result<()> {
    print_report(report);
    if report.is_success() {
        Ok(())
    } else {
        anyhow::bail!("{} stage(s) failed", report.failed_count())
    }
}

async fn cmd_run(
    pipeline: &mut Pipeline,
    subjects: &[String],
    models: &[String],
    report_path: Option<&Path>,
) -> Result<()> {
    println!(
        "Running {} subject(s) x {} model(s) under {}",
        subjects.len(),
        models.len(),
        pipeline.layout().root().display()
    );

    let report = pipeline.run(subjects, models).await;

    if let Some(path) = report_path {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write run report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }
    finish(&report)
}

fn cmd_status(
    pipeline: &Pipeline,
    subjects: &[String],
    models: &[String],
    json: bool,
) -> Result<()> {
    let statuses = pipeline.status(subjects, models);
    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    for status in &statuses {
        println!("{} / {}: {}", status.subject, status.model, status.criteria);
        if let Some(error) = &status.requirements_error {
            println!("  ✗ requirements: {error}");
        }
        for requirement in &status.requirements {
            println!("  {}: {}", requirement.name, requirement.state);
        }
    }
    Ok(())
}

async fn cmd_generate(pipeline: &Pipeline, subject: &str, model: &str) -> Result<()> {
    let outcome = pipeline
        .generate(subject, model)
        .await
        .with_context(|| format!("Criteria generation failed for {subject} / {model}"))?;
    println!("{}", describe(&outcome, "criteria"));
    Ok(())
}

fn cmd_filter(pipeline: &mut Pipeline, subject: &str, model: &str) -> Result<()> {
    let outcome = pipeline
        .filter(subject, model)
        .with_context(|| format!("Criteria review failed for {subject} / {model}"))?;
    println!("{}", describe(&outcome, "filtered criteria"));
    Ok(())
}

async fn cmd_analyze(
    pipeline: &Pipeline,
    subject: &str,
    model: &str,
    requirement: Option<&str>,
) -> Result<()> {
    let report = pipeline
        .analyze(subject, model, requirement)
        .await
        .with_context(|| format!("Analysis failed for {subject} / {model}"))?;
    finish(&report)
}
