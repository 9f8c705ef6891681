use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "envfile Configuration".bold());
            println!();

            println!("{}:", "envfile".cyan());
            println!("  path: {}", config.store_path().display());
            println!("  lock: {}", config.envfile.lock);
            println!("  lock_timeout_ms: {}", config.envfile.lock_timeout_ms);
            println!("  atomic_write: {}", config.envfile.atomic_write);
            println!();

            println!("{}: {}", "log_level".cyan(), config.log_level.as_filter());
        }
    }

    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    match key {
        "envfile.path" | "path" => Some(config.store_path().display().to_string()),
        "envfile.lock" => Some(config.envfile.lock.to_string()),
        "envfile.lock_timeout_ms" => Some(config.envfile.lock_timeout_ms.to_string()),
        "envfile.atomic_write" => Some(config.envfile.atomic_write.to_string()),
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        _ => None,
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => {
            eprintln!("{} Unknown config key: {}", "✗".red(), key);
            std::process::exit(1);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_keys() {
        let config = Config::default();
        assert_eq!(lookup("envfile.path", &config).as_deref(), Some("/etc/envfile.json"));
        assert_eq!(lookup("envfile.lock", &config).as_deref(), Some("true"));
        assert_eq!(lookup("log-level", &config).as_deref(), Some("info"));
    }

    #[test]
    fn test_lookup_unknown_key() {
        assert!(lookup("envfile.nope", &Config::default()).is_none());
    }
}
