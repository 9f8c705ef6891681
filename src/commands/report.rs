//! Human-readable summaries of store outcomes, written to stderr

use colored::*;
use std::path::Path;

use crate::envfile::apply::ApplyReport;
use crate::envfile::{ApplyOutcome, LoadStatus, LockStatus, MergeOutcome, PersistStatus};

#[derive(Debug, PartialEq, Eq)]
pub enum Note {
    Done(String),
    Warn(String),
}

fn load_notes(status: &LoadStatus, path: &Path, notes: &mut Vec<Note>) {
    match status {
        LoadStatus::Found => {}
        LoadStatus::Missing => notes.push(Note::Done(format!("No envfile at {}", path.display()))),
        LoadStatus::Unreadable(e) | LoadStatus::Corrupt(e) => {
            notes.push(Note::Warn(format!("Ignoring existing envfile: {}", e)))
        }
    }
}

fn applied_notes(applied: &ApplyReport, path: &Path, notes: &mut Vec<Note>) {
    if applied.is_empty() {
        notes.push(Note::Done(format!("Nothing to apply from {}", path.display())));
    } else {
        notes.push(Note::Done(format!(
            "Applied {} variable(s) from {}",
            applied.set.len(),
            path.display()
        )));
    }
    for e in &applied.skipped {
        notes.push(Note::Warn(format!("Skipped {}", e)));
    }
}

pub fn apply_notes(outcome: &ApplyOutcome, path: &Path) -> Vec<Note> {
    let mut notes = Vec::new();
    load_notes(&outcome.load, path, &mut notes);
    applied_notes(&outcome.applied, path, &mut notes);
    notes
}

pub fn merge_notes(outcome: &MergeOutcome, path: &Path) -> Vec<Note> {
    let mut notes = Vec::new();
    load_notes(&outcome.load, path, &mut notes);

    if let LockStatus::Unavailable(e) = &outcome.lock {
        notes.push(Note::Warn(format!("Merged without lock: {}", e)));
    }

    match &outcome.persist {
        PersistStatus::Written => notes.push(Note::Done(format!(
            "Saved {} variable(s) to {}",
            outcome.record.len(),
            path.display()
        ))),
        PersistStatus::Failed(e) => notes.push(Note::Warn(format!("Not saved: {}", e))),
    }

    applied_notes(&outcome.applied, path, &mut notes);
    notes
}

/// Log and print notes unless quiet; warnings are printed even when quiet
pub fn print(notes: &[Note], quiet: bool) {
    for note in notes {
        match note {
            Note::Done(msg) => {
                log::info!("{}", msg);
                if !quiet {
                    eprintln!("{} {}", "✓".green(), msg);
                }
            }
            Note::Warn(msg) => {
                log::warn!("{}", msg);
                eprintln!("{} {}", "⚠".yellow(), msg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envfile::error::EnvFileError;
    use crate::envfile::{EnvMap, Record};
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_merge_notes_report_failed_persist() {
        let path = PathBuf::from("/etc/envfile.json");
        let outcome = MergeOutcome {
            load: LoadStatus::Missing,
            lock: LockStatus::Disabled,
            persist: PersistStatus::Failed(EnvFileError::Write {
                path: path.clone(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            }),
            record: Record::new(EnvMap::from([("A".to_string(), "1".to_string())])),
            applied: ApplyReport {
                set: vec!["A".to_string()],
                skipped: Vec::new(),
            },
        };

        let notes = merge_notes(&outcome, &path);

        assert_eq!(notes[0], Note::Done("No envfile at /etc/envfile.json".to_string()));
        assert!(matches!(&notes[1], Note::Warn(msg) if msg.starts_with("Not saved")));
        assert_eq!(
            notes[2],
            Note::Done("Applied 1 variable(s) from /etc/envfile.json".to_string())
        );
        assert_eq!(notes.len(), 3);
    }

    #[test]
    fn test_apply_notes_list_skipped_keys() {
        let path = PathBuf::from("/etc/envfile.json");
        let outcome = ApplyOutcome {
            load: LoadStatus::Found,
            applied: ApplyReport {
                set: Vec::new(),
                skipped: vec![EnvFileError::InvalidVariable {
                    key: "A=B".to_string(),
                    reason: "name contains '='",
                }],
            },
        };

        let notes = apply_notes(&outcome, &path);

        assert_eq!(notes.len(), 2);
        assert!(matches!(&notes[1], Note::Warn(msg) if msg.contains("A=B")));
    }
}
