//! djangogen CLI - generate a Django starter project packaged as a zip

mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use djangogen_core::runtime::check_toolchain;
use djangogen_core::{Pipeline, PipelineConfig, RunReport, Settings};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "djangogen")]
#[command(about = "Generate a Django starter project and package it as a zip")]
#[command(version)]
pub struct Args {
    /// YAML settings file; DJANGOGEN_* environment variables take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

fn load_settings(args: &Args) -> Result<Settings> {
    let settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    Ok(settings.with_env())
}

/// Report the toolchain up front; a missing tool still fails in the bootstrap stage
fn report_toolchain(config: &PipelineConfig) {
    for info in check_toolchain(config) {
        if info.available {
            println!(
                "  {} {} {}",
                "✓".green(),
                info.name,
                info.version.unwrap_or_default().dimmed()
            );
        } else {
            warn!(tool = %info.name, "tool did not answer --version");
            eprintln!(
                "  {} {} was not found",
                "Warning:".yellow(),
                info.name.bold()
            );
        }
    }
}

fn next_steps(config: &PipelineConfig) -> Vec<String> {
    let name = config.project_name();
    vec![
        format!("unzip {} -d {}", config.archive_name(), name),
        format!("cd {}", name),
        "python manage.py shell < seed_data.py".to_string(),
        "python manage.py runserver".to_string(),
        "Open http://127.0.0.1:8000/".to_string(),
    ]
}

fn print_summary(config: &PipelineConfig, report: &RunReport) {
    println!();
    println!(
        "{} {}",
        "Created".green().bold(),
        report.archive_path.display()
    );
    println!(
        "  {} files, {:.1} KB",
        report.summary.entry_count,
        report.summary.size_kb()
    );
    println!(
        "  {} sample posts in {}",
        report.seed.records.len(),
        report.seed_path.display()
    );
    println!();
    println!("{}", "Next steps:".cyan().bold());
    for (i, step) in next_steps(config).iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle Ctrl+C: drop any live workspace before exiting
    ctrlc::set_handler(move || {
        djangogen_core::workspace::remove_active();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    logging::init_logging(args.verbose, args.quiet)?;

    let settings = load_settings(&args)?;
    let config = PipelineConfig::from_settings(&settings).context("invalid configuration")?;

    println!(
        "{} {}",
        "Generating Django project".cyan().bold(),
        config.project_name().to_string().bold()
    );
    report_toolchain(&config);

    let report = Pipeline::new(config.clone()).run().await?;
    print_summary(&config, &report);

    Ok(())
}
