use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_curator::{
    config::Config,
    patterns::{PatternRegistry, PatternsConfig},
    services::CurationService,
};

#[derive(Parser)]
#[command(name = "m3u-curator")]
#[command(version)]
#[command(about = "Cleans, classifies, deduplicates and groups IPTV channel lists")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Detection pattern file (overrides config file)
    #[arg(short, long, value_name = "PATH")]
    patterns: Option<PathBuf>,

    /// Channel record file (overrides config file)
    #[arg(long, value_name = "PATH")]
    channels: Option<PathBuf>,

    /// Import playlist; repeat for several files (overrides config file)
    #[arg(short, long = "import", value_name = "PATH")]
    imports: Vec<PathBuf>,

    /// Output playlist (overrides config file)
    #[arg(long, value_name = "PATH")]
    playlist: Option<PathBuf>,

    /// Report directory (overrides config file)
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    /// Process everything but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Validate the pattern file, print warnings and exit
    #[arg(long)]
    check_patterns: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("m3u_curator={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting M3U Curator v{}", env!("CARGO_PKG_VERSION"));

    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(patterns) = cli.patterns {
        config.storage.patterns_file = patterns;
    }
    if let Some(channels) = cli.channels {
        config.storage.channels_file = channels;
    }
    if !cli.imports.is_empty() {
        config.storage.import_files = cli.imports;
    }
    if let Some(playlist) = cli.playlist {
        config.storage.playlist_file = playlist;
    }
    if let Some(report_dir) = cli.report_dir {
        config.storage.report_dir = report_dir;
    }

    if cli.check_patterns {
        return check_patterns(&config);
    }

    let service = CurationService::from_config(config)?;
    let summary = service.run(cli.dry_run)?;

    info!(
        "{} entries in, {} channels out, {} duplicates removed, {} rejected",
        summary.stats.input_entries,
        summary.stats.total_entries,
        summary.stats.duplicates_removed,
        summary.stats.rejected
    );
    if let Some(playlist) = &summary.playlist_file {
        info!("Playlist written to {}", playlist.display());
    }
    if let Some(report) = &summary.report_file {
        info!("Report written to {}", report.display());
    }

    Ok(())
}

fn check_patterns(config: &Config) -> Result<()> {
    let path = &config.storage.patterns_file;
    let patterns = if path.exists() {
        PatternsConfig::from_file(path)?
    } else {
        warn!("{} does not exist, checking built-in patterns", path.display());
        PatternsConfig::default()
    };
    let registry = PatternRegistry::from_config(&patterns)?;

    let warnings = registry.lint();
    for warning in &warnings {
        warn!("{}", warning);
    }

    println!("{}", registry.summary());
    if warnings.is_empty() {
        println!("Pattern file OK");
    } else {
        println!("{} warnings", warnings.len());
    }
    Ok(())
}
