use eyre::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use super::{exec, report};
use crate::config::Config;
use crate::envfile::{EnvMap, apply};
use crate::envlist;

pub fn run(
    assignments: &[String],
    from_file: Option<&Path>,
    from_env_list: bool,
    command: &[String],
    quiet: bool,
    config: &Config,
) -> Result<()> {
    let env_list = if from_env_list {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read assignments from stdin")?;
        Some(buffer)
    } else {
        None
    };

    let incoming = collect(assignments, from_file, env_list.as_deref())?;
    let store = config.store();

    match store.merge_and_apply(&incoming) {
        Some(outcome) => {
            report::print(&report::merge_notes(&outcome, store.path()), quiet || !command.is_empty());
        }
        None => {
            log::info!("Nothing to merge into {}", store.path().display());
            if !quiet && command.is_empty() {
                eprintln!("Nothing to merge");
            }
        }
    }

    if command.is_empty() {
        return Ok(());
    }
    exec::run(command)
}

/// Gather variables: file first, then the env list, then positional
/// assignments; later sources win. Names that could never be applied are
/// dropped here so they are not persisted.
fn collect(assignments: &[String], from_file: Option<&Path>, env_list: Option<&str>) -> Result<EnvMap> {
    let mut entries = Vec::new();

    if let Some(path) = from_file {
        let content =
            fs::read_to_string(path).context(format!("Failed to read assignments from {}", path.display()))?;
        entries.extend(envlist::parse_lines(&content));
    }

    if let Some(content) = env_list {
        entries.extend(envlist::split_list(content));
    }

    for assignment in assignments {
        if !assignment.contains('=') {
            log::warn!("Ignoring argument without '=': {}", assignment);
            eprintln!("Ignoring {} (expected KEY=VALUE)", assignment);
            continue;
        }
        entries.push(assignment.clone());
    }

    let mut env = envlist::list_to_object(entries);
    env.retain(|key, value| match apply::validate(key, value) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Ignoring {}", e);
            eprintln!("Ignoring {}", e);
            false
        }
    });
    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_positional_wins_over_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("vars.env");
        fs::write(&file, "# defaults\nA=from-file\nB=2\n").unwrap();

        let env = collect(&["A=from-arg".to_string(), "bare".to_string()], Some(file.as_path()), None).unwrap();

        assert_eq!(env.get("A").map(String::as_str), Some("from-arg"));
        assert_eq!(env.get("B").map(String::as_str), Some("2"));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_collect_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("missing.env");
        assert!(collect(&[], Some(file.as_path()), None).is_err());
    }

    #[test]
    fn test_collect_nothing() {
        assert!(collect(&[], None, None).unwrap().is_empty());
    }

    #[test]
    fn test_collect_env_list_keeps_values_verbatim() {
        let env = collect(&[], None, Some("PADDED=x  \nHASH=#notcomment\n#K=v\nexport E=1\n")).unwrap();

        assert_eq!(
            env,
            envlist::list_to_object(["PADDED=x  ", "HASH=#notcomment", "#K=v", "export E=1"])
        );
        assert_eq!(env.get("PADDED").map(String::as_str), Some("x  "));
    }

    #[test]
    fn test_collect_drops_unusable_names() {
        let env = collect(
            &["=oops".to_string(), "A=B=C".to_string(), "NUL=a\0b".to_string()],
            None,
            Some("=from-stdin\n"),
        )
        .unwrap();

        assert!(!env.contains_key(""));
        assert!(!env.contains_key("NUL"));
        assert_eq!(env.get("A").map(String::as_str), Some("B=C"));
        assert_eq!(env.len(), 1);
    }
}
