//! Equity Screener - rank candidate equities from the command line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use equity_screener::data::parse_candidates;
use equity_screener::screener::{ReportFormat, ScreenerEngine, ScreenerReport};
use equity_screener::Config;
use screener_common::config_loader::check_modular_files;
use screener_common::logging::init_logging;

/// Screen equities against fundamental and technical thresholds.
#[derive(Parser, Debug)]
#[command(name = "screener")]
#[command(version)]
#[command(about = "Rank equities by a three-stage screen and a composite score.", long_about = None)]
struct Cli {
    /// Configuration directory (default: ~/.screener)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Screen and rank the candidates in a JSON file
    Rank {
        /// JSON array of candidates
        input: PathBuf,

        /// Report format (markdown, json, text)
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,

        /// Also save the report into this directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Size of the top-picks shortlist
        #[arg(long)]
        top: Option<usize>,

        /// Evaluate candidates on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Print the effective screening criteria
    Criteria,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config_dir.clone())?;

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::debug!("Equity Screener v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Rank {
            input,
            format,
            out,
            top,
            sequential,
        } => rank_command(config, &input, format, out, top, sequential).await,
        Commands::Criteria => {
            for (file, present) in check_modular_files(cli.config_dir) {
                info!(file = %file, present, "Config file");
            }
            let json = serde_json::to_string_pretty(&config.screener.criteria)
                .context("Failed to serialize criteria")?;
            println!("{json}");
            Ok(())
        }
    }
}

async fn rank_command(
    config: Config,
    input: &Path,
    format: ReportFormat,
    out: Option<PathBuf>,
    top: Option<usize>,
    sequential: bool,
) -> Result<()> {
    let mut screener = config.screener;
    if let Some(n) = top {
        anyhow::ensure!(n > 0, "--top must be greater than 0");
        screener.top_n = n;
    }
    if sequential {
        screener.parallel = false;
    }

    let content = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read candidates from {}", input.display()))?;

    let candidates = match parse_candidates(&content) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(path = %input.display(), error = %e, "Unusable candidate file");
            std::process::exit(e.exit_code());
        }
    };

    let top_n = screener.top_n;
    let output = screener.output.clone();
    let engine = ScreenerEngine::new(screener);
    let result = tokio::task::spawn_blocking(move || engine.run(&candidates))
        .await
        .context("Screening task failed")?;

    let report = ScreenerReport::new(result, top_n);
    println!("{}", report.generate(format));

    let mut targets: Vec<(PathBuf, ReportFormat)> = Vec::new();
    if let Some(dir) = out {
        targets.push((dir, format));
    } else if output.local_report_enabled {
        for name in &output.report_format {
            let fmt = name
                .parse::<ReportFormat>()
                .map_err(anyhow::Error::msg)?;
            targets.push((PathBuf::from(&output.report_dir), fmt));
        }
    }

    if targets.is_empty() {
        return Ok(());
    }

    let saved = tokio::task::spawn_blocking(move || {
        targets
            .into_iter()
            .map(|(dir, fmt)| report.save_to_dir(&dir, fmt).map(|path| (path, fmt)))
            .collect::<Result<Vec<_>>>()
    })
    .await
    .context("Report task failed")??;

    for (path, fmt) in saved {
        info!(path = %path.display(), format = %fmt, "Report saved");
    }

    Ok(())
}
