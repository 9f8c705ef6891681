use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;
mod commands;
mod config;
mod envfile;
mod envlist;

use cli::{Cli, Commands};
use config::{Config, LogLevel};

fn log_file() -> Result<PathBuf> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("envfile")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    Ok(log_dir.join("envfile.log"))
}

fn setup_logging(cli: &Cli, log_level: LogLevel) {
    let level = if cli.verbose {
        LogLevel::Debug
    } else if cli.quiet {
        LogLevel::Error
    } else {
        log_level
    };

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();
    let from_env = std::env::var("RUST_LOG").is_ok();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level.to_level_filter());
    }

    // Logging is best effort: an unwritable log file falls back to stderr
    let target = log_file().and_then(|path| {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open log file")?;
        Ok((path, file))
    });

    match target {
        Ok((path, file)) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            if builder.try_init().is_ok() {
                info!("Logging initialized, writing to: {}", path.display());
            }
        }
        Err(e) => {
            builder.target(env_logger::Target::Stderr);
            if builder.try_init().is_ok() {
                log::debug!("Logging to stderr: {:#}", e);
            }
        }
    }

    info!(
        "Log level: {} (from {})",
        level.as_filter(),
        if from_env { "RUST_LOG env" } else { "config" }
    );
}

fn run(cli: Cli, config: Config) -> Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Apply { command } => commands::apply::run(&command, quiet, &config),
        Commands::Merge {
            assignments,
            from_file,
            from_env_list,
            command,
        } => commands::merge::run(
            &assignments,
            from_file.as_deref(),
            from_env_list,
            &command,
            quiet,
            &config,
        ),
        Commands::Show { key, format } => {
            commands::show::run(key.as_deref(), cli::OutputFormat::resolve(format), &config)
        }
        Commands::Export => commands::export::run(&config),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&cli, config.log_level);

    info!("Starting envfile with config from: {:?}", cli.config);

    // Run the command
    run(cli, config).context("Command failed")?;

    Ok(())
}
