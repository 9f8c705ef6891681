//! Conversion between `KEY=VALUE` lists and variable maps

use crate::envfile::EnvMap;

/// Build a map from `KEY=VALUE` entries.
///
/// Each entry is split at the first `=`, so values may contain `=`. Entries
/// without `=` are skipped. Later duplicates win.
pub fn list_to_object<I, S>(list: I) -> EnvMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut env = EnvMap::new();
    for entry in list {
        let entry = entry.as_ref();
        match entry.split_once('=') {
            Some((key, value)) => {
                env.insert(key.to_string(), value.to_string());
            }
            None => log::debug!("Ignoring entry without '=': {}", entry),
        }
    }
    env
}

/// Render a map as `KEY=VALUE` entries, sorted by key
#[allow(dead_code)] // inverse of list_to_object; the CLI prints from the map
pub fn object_to_list(env: &EnvMap) -> Vec<String> {
    env.iter().map(|(k, v)| format!("{}={}", k, v)).collect()
}

/// Entries from a newline-separated env list, kept byte for byte: only empty
/// lines and the `\r` of a `\r\n` ending are dropped.
pub fn split_list(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Entries from an env-file style text: one assignment per line, blank lines
/// and `#` comments skipped, an optional leading `export ` stripped.
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.strip_prefix("export ").unwrap_or(line).trim_start().to_string())
        .collect()
}
