use eyre::Result;

use crate::config::Config;
use crate::envfile::Record;

pub fn run(config: &Config) -> Result<()> {
    let loaded = config.store().load();
    if !loaded.found() {
        log::info!("No persisted environment to export");
    }
    for line in export_lines(&loaded.record) {
        println!("{}", line);
    }
    Ok(())
}

/// `export KEY='VALUE'` lines for names a POSIX shell accepts
fn export_lines(record: &Record) -> Vec<String> {
    record
        .env
        .iter()
        .filter(|(key, _)| {
            let valid = is_shell_name(key);
            if !valid {
                log::warn!("Not exporting {:?}: not a valid shell variable name", key);
            }
            valid
        })
        .map(|(key, value)| format!("export {}={}", key, shell_quote(value)))
        .collect()
}

fn is_shell_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => chars.all(|c| c == '_' || c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// Single-quote for POSIX shells
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
