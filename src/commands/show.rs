use colored::*;
use eyre::Result;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::envfile::{LoadStatus, Record};

pub fn run(key: Option<&str>, format: OutputFormat, config: &Config) -> Result<()> {
    let store = config.store();
    let loaded = store.load();

    match &loaded.status {
        LoadStatus::Found => {}
        LoadStatus::Missing => log::info!("No envfile at {}", store.path().display()),
        LoadStatus::Unreadable(e) | LoadStatus::Corrupt(e) => {
            log::warn!("{}", e);
            eprintln!("{} {}", "⚠".yellow(), e);
        }
    }

    if let Some(key) = key {
        match loaded.record.get(key) {
            Some(value) => println!("{}", value),
            None => {
                eprintln!("{} {} is not set in {}", "✗".red(), key, store.path().display());
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&loaded.record)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&loaded.record)?);
        }
        OutputFormat::Text => {
            println!("{} {}", "envfile:".bold(), store.path().display());
            for line in text_lines(&loaded.record) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

/// Indented `KEY=VALUE` lines, taken from the map so keys containing `=`
/// stay intact
fn text_lines(record: &Record) -> Vec<String> {
    if record.is_empty() {
        return vec![format!("  {}", "(empty)".dimmed())];
    }
    record
        .env
        .iter()
        .map(|(key, value)| format!("  {}={}", key.cyan(), value))
        .collect()
}
