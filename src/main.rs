use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

use vitalrs::batch::{BatchConfig, BatchScorer, SubjectDay};
use vitalrs::config::AppConfig;
use vitalrs::display::{render_batch_summary, render_report};
use vitalrs::logging::init_logging;
use vitalrs::models::MetricSnapshot;
use vitalrs::report::{IntelligenceEngine, IntelligenceReport};

/// VitalRS - Biometric Intelligence CLI
///
/// Scores daily wearable metrics into Recovery, Performance Readiness,
/// Wellness and Strain, with trends, recommendations and training clearance.
#[derive(Parser)]
#[command(name = "vitalrs")]
#[command(author = "VitalRS Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Biometric Intelligence CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an intelligence report for one snapshot
    Score {
        /// Snapshot JSON file
        #[arg(short, long)]
        snapshot: PathBuf,

        /// JSON array of earlier snapshots used for trends
        #[arg(long)]
        history: Option<PathBuf>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Score many subject-days in parallel
    Batch {
        /// JSON array of {snapshot, history} requests
        #[arg(short, long)]
        input: PathBuf,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,

        /// Write successful reports to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage the configuration file
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match (&cli.config, &cli.command) {
        (Some(path), Commands::Config { init: true, .. }) if !path.exists() => AppConfig::default(),
        (Some(path), _) => AppConfig::load_from_file(path)?,
        (None, _) => AppConfig::load_or_default(),
    };

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    init_logging(&log_config)?;

    if cli.verbose > 0 {
        eprintln!("{}", format!("Log level: {:?}", log_config.level).dimmed());
    }

    match cli.command {
        Commands::Score {
            snapshot,
            history,
            format,
        } => {
            let engine = IntelligenceEngine::try_with_config(config.engine.clone())?;
            let snapshot: MetricSnapshot = read_json(&snapshot)?;
            let history: Vec<MetricSnapshot> = match history {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };

            let report = engine
                .try_generate_report(&snapshot, &history)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;

            match format {
                OutputFormat::Text => print!("{}", render_report(&report)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        Commands::Batch {
            input,
            threads,
            progress,
            output,
        } => {
            println!("{}", "Scoring batch...".blue().bold());

            let engine = IntelligenceEngine::try_with_config(config.engine.clone())?;
            let requests: Vec<SubjectDay> = read_json(&input)?;
            let scorer = BatchScorer::with_config(
                engine,
                BatchConfig {
                    num_threads: threads,
                    show_progress: progress,
                },
            );

            let summary = scorer.score(&requests)?;
            print!("{}", render_batch_summary(&summary));

            if let Some(path) = output {
                let reports: Vec<&IntelligenceReport> = summary.reports().collect();
                let json = serde_json::to_string_pretty(&reports)?;
                fs::write(&path, json)
                    .with_context(|| format!("Failed to write reports: {}", path.display()))?;
                println!("{}", format!("✓ Reports written to {}", path.display()).green());
            }
        }
        Commands::Config { init, show } => {
            let path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);

            if init {
                AppConfig::default().save_to_file(&path)?;
                println!("{}", format!("✓ Default configuration written to {}", path.display()).green());
            }
            if show || !init {
                println!("{}", format!("# {}", path.display()).dimmed());
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
