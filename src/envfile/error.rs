//! Failure kinds of the envfile store
//!
//! None of these ever reach the caller of `apply` / `merge_and_apply` as an
//! `Err`. They are logged and recorded in the returned outcome so callers and
//! tests can see which fallback was taken.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize envfile: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("timed out after {waited:?} waiting for lock {}", path.display())]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("invalid environment variable {key:?}: {reason}")]
    InvalidVariable { key: String, reason: &'static str },
}

impl EnvFileError {
    /// Short machine-readable name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            EnvFileError::Read { .. } => "read",
            EnvFileError::Parse { .. } => "parse",
            EnvFileError::Serialize(_) => "serialize",
            EnvFileError::Write { .. } => "write",
            EnvFileError::Lock { .. } => "lock",
            EnvFileError::LockTimeout { .. } => "lock-timeout",
            EnvFileError::InvalidVariable { .. } => "invalid-variable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let err = EnvFileError::InvalidVariable {
            key: "A=B".to_string(),
            reason: "name contains '='",
        };
        assert_eq!(err.kind(), "invalid-variable");

        let err = EnvFileError::LockTimeout {
            path: PathBuf::from("/tmp/envfile.json.lock"),
            waited: Duration::from_millis(10),
        };
        assert_eq!(err.kind(), "lock-timeout");
    }

    #[test]
    fn test_display_includes_path() {
        let err = EnvFileError::Read {
            path: PathBuf::from("/etc/envfile.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc/envfile.json"));
        assert!(msg.contains("denied"));
    }
}
