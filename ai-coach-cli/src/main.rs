use ai_coach_cli::commands::Cli;
use ai_coach_cli::config::Config;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose() {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // The session screen owns the terminal, so its logs go to a file
    let log_file = if cli.is_interactive() {
        match open_log_file() {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Logging to stderr: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    // Initialize tokio runtime
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { cli.execute().await })
}

fn open_log_file() -> Result<File> {
    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir).context("Failed to create config directory")?;

    let path = dir.join("ai-coach.log");
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}
