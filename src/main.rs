//! autocommit - CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use autocommit::config::{Config, DEFAULT_CONFIG_FILE};
use autocommit::git::{Git2Client, GitClient};
use autocommit::scheduler::CommitScheduler;
use autocommit::tracker::ChangeTracker;
use autocommit::watcher::{FileWatcher, IgnoreRules};

/// Automatically commits changed files at regular intervals.
#[derive(Parser, Debug)]
#[command(name = "autocommit")]
#[command(about = "Automatically commits changes at regular intervals")]
#[command(version)]
struct Cli {
    /// Commit interval in seconds (overrides the config file)
    #[arg(short = 'i', long)]
    interval: Option<u64>,

    /// Path to the config file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Create a default config file and exit
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Recoverable errors (config parse failures, watcher errors, commit
    // failures) are reported as warnings and belong on standard error.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // --init writes the default config and never starts the watcher
    if cli.init {
        let created =
            Config::write_default(&cli.config).context("Error creating config file")?;
        if created {
            println!("Created default config file at {}", cli.config.display());
        } else {
            println!("Config file already exists at {}", cli.config.display());
        }
        return Ok(());
    }

    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;

    // Repository absence is fatal, checked before any watching starts
    let git = Git2Client::new(&cwd);
    if !git.is_repository() {
        bail!("Current directory is not a git repository");
    }

    let config = Config::load(&cli.config, cli.interval);

    println!(
        "Starting autocommit with {} seconds interval",
        config.interval().as_secs()
    );

    let tracker = Arc::new(ChangeTracker::new());
    let rules = IgnoreRules::compile(&cwd, &config.ignore);
    let _watcher = FileWatcher::spawn(&cwd, rules, Arc::clone(&tracker))
        .context("Failed to start file watcher")?;

    println!("Watching for file changes...");

    let scheduler = CommitScheduler::new(tracker, git, config.interval());
    scheduler.run(config.tick_period()).await;

    // The scheduler loop never returns; termination is external (signal)
    Ok(())
}
