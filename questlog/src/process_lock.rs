//! Per-session run locks.
//!
//! Only one `questlog run` may drive a given session against a given
//! journal database. The lock is an advisory OS file lock (flock) held until
//! the run ends, in `$XDG_RUNTIME_DIR/questlog/` (or the temp dir).

use anyhow::{Context, Result};
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{self, Seek, SeekFrom, Write};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

/// Held while a session is being run. Unlocks on drop.
pub struct RunGuard {
    file: File,
    path: PathBuf,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let _ = unlock_file(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}

/// Lock `session_id` in the journal at `db_path`.
///
/// Fails if another process is already running the same session.
pub fn acquire_run_guard(db_path: &Path, session_id: &str) -> Result<RunGuard> {
    acquire_in(&lock_dir(), db_path, session_id)
}

fn acquire_in(dir: &Path, db_path: &Path, session_id: &str) -> Result<RunGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create runtime lock directory: {}", dir.display()))?;

    let path = dir.join(lock_filename(db_path, session_id));
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .with_context(|| format!("failed to open lock file: {}", path.display()))?;

    match lock_file_nonblocking(&file) {
        Ok(()) => {
            let _ = file.set_len(0);
            let _ = file.seek(SeekFrom::Start(0));
            let _ = writeln!(file, "pid={} session={}", std::process::id(), session_id);
            let _ = file.flush();
            tracing::debug!(lock = %path.display(), "Acquired run lock");

            Ok(RunGuard { file, path })
        }
        Err(e) if is_lock_busy(&e) => {
            anyhow::bail!("session {} is already being run by another questlog process", session_id)
        }
        Err(e) => Err(e).with_context(|| format!("failed to lock file: {}", path.display())),
    }
}

fn lock_dir() -> PathBuf {
    let mut dir = match std::env::var_os("XDG_RUNTIME_DIR") {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => std::env::temp_dir(),
    };
    dir.push("questlog");
    dir
}

fn lock_filename(db_path: &Path, session_id: &str) -> String {
    let mut hasher = DefaultHasher::new();
    db_path.to_string_lossy().hash(&mut hasher);
    session_id.hash(&mut hasher);
    format!("run.{:016x}.lock", hasher.finish())
}

fn is_lock_busy(error: &io::Error) -> bool {
    matches!(error.kind(), io::ErrorKind::WouldBlock)
        || matches!(error.raw_os_error(), Some(11) | Some(35))
}

#[cfg(unix)]
fn lock_file_nonblocking(file: &File) -> io::Result<()> {
    const LOCK_EX: i32 = 2;
    const LOCK_NB: i32 = 4;
    // SAFETY: flock is called with a valid file descriptor and constant flags.
    let rc = unsafe { flock(file.as_raw_fd(), LOCK_EX | LOCK_NB) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
fn unlock_file(file: &File) -> io::Result<()> {
    const LOCK_UN: i32 = 8;
    // SAFETY: flock is called with a valid file descriptor and constant flags.
    let rc = unsafe { flock(file.as_raw_fd(), LOCK_UN) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
unsafe extern "C" {
    fn flock(fd: i32, operation: i32) -> i32;
}

#[cfg(not(unix))]
compile_error!("questlog run locks currently require Unix (macOS/Linux)");

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_run_of_same_session_fails() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("journal.db");

        let guard = acquire_in(dir.path(), &db, "session-1").unwrap();
        let err = acquire_in(dir.path(), &db, "session-1").err().unwrap();
        assert!(err.to_string().contains("already being run"));

        drop(guard);
        assert!(acquire_in(dir.path(), &db, "session-1").is_ok());
    }

    #[test]
    fn test_locks_are_scoped_by_session_and_database() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("journal.db");
        let other_db = dir.path().join("other.db");

        let _a = acquire_in(dir.path(), &db, "session-1").unwrap();
        let _b = acquire_in(dir.path(), &db, "session-2").unwrap();
        let _c = acquire_in(dir.path(), &other_db, "session-1").unwrap();
    }
}
