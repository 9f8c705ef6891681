//! Copy a record into the live process environment
//!
//! This is the only place in the crate that mutates the process environment.

use super::error::EnvFileError;
use super::record::Record;

/// Which keys were set and which were rejected
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub set: Vec<String>,
    pub skipped: Vec<EnvFileError>,
}

impl ApplyReport {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.skipped.is_empty()
    }
}

/// Check that a pair can be handed to the OS without panicking
pub fn validate(key: &str, value: &str) -> Result<(), EnvFileError> {
    let reason = if key.is_empty() {
        Some("name is empty")
    } else if key.contains('=') {
        Some("name contains '='")
    } else if key.contains('\0') {
        Some("name contains NUL")
    } else if value.contains('\0') {
        Some("value contains NUL")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(EnvFileError::InvalidVariable {
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Set every variable of `record` in the current process, overwriting any
/// existing value. Invalid pairs are skipped; the rest are still applied.
///
/// Must not run while other threads access the environment.
pub fn apply(record: &Record) -> ApplyReport {
    let mut report = ApplyReport::default();

    for (key, value) in &record.env {
        if let Err(e) = validate(key, value) {
            log::debug!("Skipping {}", e);
            report.skipped.push(e);
            continue;
        }

        // SAFETY: the pair was validated above, so set_var cannot panic.
        // Callers must not read or write the environment from another thread
        // while this runs; the binary only applies from its main thread
        // before any command is spawned.
        unsafe {
            std::env::set_var(key, value);
        }
        report.set.push(key.clone());
    }

    report
}
