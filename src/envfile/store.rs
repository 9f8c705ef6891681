//! Load, persist and the two public operations built on them

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::apply::{self, ApplyReport};
use super::error::EnvFileError;
use super::lock::{self, LockGuard};
use super::merge;
use super::record::{EnvMap, Record};

/// Default location of the record on the host
pub const DEFAULT_LOCATION: &str = "/etc/envfile.json";

/// How the store writes and coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Hold an advisory lock across load, merge and persist
    pub lock: bool,
    pub lock_timeout: Duration,
    /// Write to a temp file and rename it into place
    pub atomic_write: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            lock: true,
            lock_timeout: Duration::from_secs(5),
            atomic_write: true,
        }
    }
}

/// Result of reading the record location
#[derive(Debug)]
pub enum LoadStatus {
    Found,
    Missing,
    Unreadable(EnvFileError),
    Corrupt(EnvFileError),
}

#[derive(Debug)]
pub struct Loaded {
    pub record: Record,
    pub status: LoadStatus,
}

impl Loaded {
    pub fn found(&self) -> bool {
        matches!(self.status, LoadStatus::Found)
    }
}

#[derive(Debug)]
pub enum LockStatus {
    Held,
    Disabled,
    /// Lock could not be taken; the cycle ran unlocked
    Unavailable(EnvFileError),
}

#[derive(Debug)]
pub enum PersistStatus {
    Written,
    Failed(EnvFileError),
}

/// What `apply` did
#[derive(Debug)]
pub struct ApplyOutcome {
    pub load: LoadStatus,
    pub applied: ApplyReport,
}

/// What `merge_and_apply` did
#[derive(Debug)]
pub struct MergeOutcome {
    pub load: LoadStatus,
    pub lock: LockStatus,
    pub persist: PersistStatus,
    /// The merged record that was applied
    pub record: Record,
    pub applied: ApplyReport,
}

struct Merged {
    load: LoadStatus,
    lock: LockStatus,
    persist: PersistStatus,
    record: Record,
}

/// Persistent environment store at a single location
#[derive(Debug, Clone)]
pub struct EnvStore {
    path: PathBuf,
    options: StoreOptions,
}

impl EnvStore {
    #[allow(dead_code)] // the CLI always builds from config
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, StoreOptions::default())
    }

    pub fn with_options(path: impl Into<PathBuf>, options: StoreOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record. Never fails: absence, unreadable and corrupt files
    /// all yield an empty record with the reason in `status`.
    pub fn load(&self) -> Loaded {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Loaded {
                    record: Record::default(),
                    status: LoadStatus::Missing,
                };
            }
            Err(source) => {
                let err = EnvFileError::Read {
                    path: self.path.clone(),
                    source,
                };
                log::debug!("Error reading envfile: {}", err);
                return Loaded {
                    record: Record::default(),
                    status: LoadStatus::Unreadable(err),
                };
            }
        };

        match Record::decode(&bytes, &self.path) {
            Ok(record) => Loaded {
                record,
                status: LoadStatus::Found,
            },
            Err(err) => {
                log::debug!("Error parsing envfile: {}", err);
                Loaded {
                    record: Record::default(),
                    status: LoadStatus::Corrupt(err),
                }
            }
        }
    }

    /// Replace the file with the full record, readable by the owner only.
    /// Serialization happens before anything on disk is touched.
    pub fn persist(&self, record: &Record) -> Result<(), EnvFileError> {
        let bytes = record.encode()?;

        let write_err = |source: io::Error| EnvFileError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent,
            None => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(write_err)?;

        if self.options.atomic_write {
            write_atomic(&self.path, parent, &bytes).map_err(write_err)
        } else {
            write_in_place(&self.path, &bytes).map_err(write_err)
        }
    }

    /// Read-only bootstrap: load the record and apply it
    pub fn apply(&self) -> ApplyOutcome {
        let loaded = self.load();
        let applied = apply::apply(&loaded.record);
        log::debug!(
            "Applied {} variable(s) from {}",
            applied.set.len(),
            self.path.display()
        );

        ApplyOutcome {
            load: loaded.status,
            applied,
        }
    }

    /// Load, merge `incoming` over it, persist, then apply the merged record.
    ///
    /// Returns `None` without touching the file or the environment when
    /// `incoming` is empty. The merged record is applied even when persisting
    /// it failed.
    pub fn merge_and_apply(&self, incoming: &EnvMap) -> Option<MergeOutcome> {
        if incoming.is_empty() {
            log::debug!("No new variables, leaving {} untouched", self.path.display());
            return None;
        }

        let merged = self.merge_and_persist(incoming);
        let applied = apply::apply(&merged.record);

        Some(MergeOutcome {
            load: merged.load,
            lock: merged.lock,
            persist: merged.persist,
            record: merged.record,
            applied,
        })
    }

    /// The locked read-modify-write half of `merge_and_apply`
    fn merge_and_persist(&self, incoming: &EnvMap) -> Merged {
        let (guard, lock) = self.lock();

        let loaded = self.load();
        let record = merge::merge(loaded.record, incoming);

        let persist = match self.persist(&record) {
            Ok(()) => PersistStatus::Written,
            Err(err) => {
                log::debug!("Error persisting envfile ({}): {}", err.kind(), err);
                PersistStatus::Failed(err)
            }
        };
        drop(guard);

        Merged {
            load: loaded.status,
            lock,
            persist,
            record,
        }
    }

    fn lock(&self) -> (Option<LockGuard>, LockStatus) {
        if !self.options.lock {
            return (None, LockStatus::Disabled);
        }

        match lock::acquire(&lock::lock_path(&self.path), self.options.lock_timeout) {
            Ok(guard) => (Some(guard), LockStatus::Held),
            Err(err) => {
                log::debug!("Proceeding without lock: {}", err);
                (None, LockStatus::Unavailable(err))
            }
        }
    }
}

fn write_atomic(target: &Path, dir: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o600))?;
    }

    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

fn write_in_place(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(target)?;

    // mode() only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(target, fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(bytes)?;
    file.sync_all()
}
