//! Building-plan scrutiny CLI
//!
//! Reads a drawing (JSON layer map) and a jurisdiction config (TOML), runs
//! extraction and scrutiny, and prints the report.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use plan_extract::InMemoryDrawing;
use scrutiny_engine::{JurisdictionConfig, ScrutinyEngine};
use shared_types::{Plan, PlanMetadata};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "scrutiny-cli")]
#[command(version, about = "Check a building plan drawing against jurisdiction rules")]
struct Args {
    /// Drawing as a JSON layer map
    #[arg(short, long)]
    drawing: PathBuf,

    /// Jurisdiction configuration (TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Date that selects the rule amendments in force (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,

    #[arg(long, default_value = "UNNUMBERED")]
    application_number: String,

    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Also print the extracted plan (JSON format only)
    #[arg(long)]
    include_plan: bool,

    /// Exit with status 2 when any rule is not accepted
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the report; logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = JurisdictionConfig::from_file(&args.config)?;
    let jurisdiction = config.jurisdiction.clone();
    let engine = ScrutinyEngine::new(config).context("Invalid jurisdiction configuration")?;

    let json = fs::read_to_string(&args.drawing)
        .with_context(|| format!("Failed to read drawing: {}", args.drawing.display()))?;
    let drawing = InMemoryDrawing::from_json(&json)
        .with_context(|| format!("Failed to parse drawing: {}", args.drawing.display()))?;
    tracing::info!(layers = drawing.layers.len(), "Drawing loaded");

    let plan = Plan::new(PlanMetadata {
        application_number: args.application_number.clone(),
        jurisdiction,
        effective_date: args.date,
    });
    let (plan, report) = engine.run(plan, &drawing).context("Scrutiny failed")?;

    match args.format {
        Format::Text => {
            print!("{}", report.to_text());
            for warning in &plan.warnings {
                eprintln!("warning: {}", warning);
            }
        }
        Format::Json => {
            let output = if args.include_plan {
                serde_json::json!({ "plan": plan, "report": report })
            } else {
                serde_json::to_value(&report)?
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    if args.strict && !report.is_compliant() {
        std::process::exit(2);
    }
    Ok(())
}
