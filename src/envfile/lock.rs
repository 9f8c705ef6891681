//! Advisory cross-process lock around the read-modify-write cycle
//!
//! The lock lives in a sibling file (`<location>.lock`) so the record itself
//! can be replaced by rename while the lock is held.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use super::error::EnvFileError;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Held lock; released when dropped (closing the descriptor drops the flock)
#[derive(Debug)]
pub struct LockGuard {
    _file: File,
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        log::debug!("Released lock {}", self.path.display());
    }
}

/// Lock file path for a record location
pub fn lock_path(location: &Path) -> PathBuf {
    let mut name = OsString::from(location.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Poll for an exclusive lock until `timeout` elapses
pub fn acquire(path: &Path, timeout: Duration) -> Result<LockGuard, EnvFileError> {
    let lock_err = |source: io::Error| EnvFileError::Lock {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(lock_err)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(lock_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
            log::debug!("Failed to restrict permissions on {}: {}", path.display(), e);
        }
    }

    let start = Instant::now();
    loop {
        if try_flock_exclusive(&file).map_err(lock_err)? {
            log::debug!("Acquired lock {}", path.display());
            return Ok(LockGuard {
                _file: file,
                path: path.to_path_buf(),
            });
        }

        let waited = start.elapsed();
        if waited >= timeout {
            return Err(EnvFileError::LockTimeout {
                path: path.to_path_buf(),
                waited,
            });
        }
        thread::sleep(POLL_INTERVAL.min(timeout - waited));
    }
}

/// Non-blocking exclusive flock. `Ok(false)` when another holder has it.
fn try_flock_exclusive(file: &File) -> io::Result<bool> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        // SAFETY: fd is a valid descriptor owned by `file` for the duration of the call
        let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if result == 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock || err.raw_os_error() == Some(libc::EWOULDBLOCK) {
            return Ok(false);
        }
        Err(err)
    }
    #[cfg(not(unix))]
    {
        let _ = file;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_appends_suffix() {
        assert_eq!(
            lock_path(Path::new("/etc/envfile.json")),
            PathBuf::from("/etc/envfile.json.lock")
        );
    }

    #[test]
    fn test_acquire_creates_lock_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("envfile.json.lock");

        let guard = acquire(&path, Duration::from_millis(100)).unwrap();
        assert_eq!(guard.path, path);
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_second_holder_times_out() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("envfile.json.lock");

        let _held = acquire(&path, Duration::from_millis(100)).unwrap();
        // flock locks belong to the open file description, so a second open
        // in the same process contends like another process would
        let err = acquire(&path, Duration::from_millis(60)).unwrap_err();
        assert_eq!(err.kind(), "lock-timeout");
    }

    #[test]
    fn test_lock_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("envfile.json.lock");

        drop(acquire(&path, Duration::from_millis(100)).unwrap());
        assert!(acquire(&path, Duration::from_millis(100)).is_ok());
    }
}
