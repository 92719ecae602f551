//! UUCP-style serial port lock
//!
//! The lock for `/dev/ttyS0` is the file `LCK..ttyS0` in the lock
//! directory, holding the owner's pid as ten right-aligned digits and a
//! newline. Devices below `/dev` in subdirectories have `/` replaced with
//! `_`. A lock whose owner no longer exists is stale and gets replaced.
//!
//! The pid is written to a temporary file first and then hard-linked to the
//! lock name, so a lock file is never seen half written. A lock file that
//! does not hold a pid belongs to someone else and is left alone.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use nix::errno::Errno;
use nix::sys::signal;
use nix::unistd::Pid;
use tracing::{debug, error, warn};

use blc_hal::{LockError, PortLock};

/// Default lock directory
pub const LOCK_DIR: &str = "/var/lock";

/// Distinguishes temporary files of instances in one process
static TEMP_SEQ: AtomicU32 = AtomicU32::new(0);

/// Lock file manager for serial ports
///
/// Each instance only ever releases locks it took itself.
#[derive(Debug)]
pub struct UucpLock {
    dir: PathBuf,
    pid: u32,
    held: Vec<PathBuf>,
}

impl Default for UucpLock {
    fn default() -> Self {
        Self::in_dir(LOCK_DIR)
    }
}

impl UucpLock {
    /// Locks in `dir`, owned by the current process
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pid: std::process::id(),
            held: Vec::new(),
        }
    }

    /// Path of the lock file for `port`
    pub fn lock_path(&self, port: &str) -> PathBuf {
        let name = port.strip_prefix("/dev/").unwrap_or(port).replace('/', "_");
        self.dir.join(format!("LCK..{name}"))
    }

    /// Whether this instance holds the lock for `port`
    pub fn holds(&self, port: &str) -> bool {
        self.held.contains(&self.lock_path(port))
    }

    /// Publish a complete lock file at `path`, failing if one exists
    fn create(&self, path: &Path) -> io::Result<()> {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let temp = self.dir.join(format!("LTMP.{}.{seq}", self.pid));

        fs::write(&temp, format!("{:>10}\n", self.pid))?;
        let linked = fs::hard_link(&temp, path);
        if let Err(e) = fs::remove_file(&temp) {
            warn!(file = %temp.display(), error = %e, "cannot remove temporary lock file");
        }
        linked
    }
}

/// Pid recorded in lock file contents, `None` if malformed
fn parse_owner(content: &str) -> Option<u32> {
    content.trim().parse().ok()
}

/// Pid recorded in a lock file, `None` if unreadable or malformed
fn owner(path: &Path) -> Option<u32> {
    parse_owner(&fs::read_to_string(path).ok()?)
}

/// Whether a process with this pid exists
fn alive(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }
    // EPERM: exists, owned by someone else
    !matches!(signal::kill(Pid::from_raw(raw), None), Err(Errno::ESRCH))
}

impl PortLock for UucpLock {
    fn acquire(&mut self, port: &str) -> Result<(), LockError> {
        let path = self.lock_path(port);
        if self.held.contains(&path) {
            return Ok(());
        }

        // Second attempt only after a stale or vanished lock
        for _ in 0..2 {
            match self.create(&path) {
                Ok(()) => {
                    debug!(lock = %path.display(), "port locked");
                    self.held.push(path);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => {
                    error!(lock = %path.display(), error = %e, "cannot create lock file");
                    return Err(LockError::Unavailable);
                }
            }

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                // Released in the meantime
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    error!(lock = %path.display(), error = %e, "cannot read lock file");
                    return Err(LockError::Unavailable);
                }
            };

            match parse_owner(&content) {
                Some(pid) if alive(pid) => {
                    warn!(port, pid, "port is locked");
                    return Err(LockError::Busy(Some(pid)));
                }
                Some(pid) => {
                    warn!(lock = %path.display(), pid, "removing stale lock");
                    if let Err(e) = fs::remove_file(&path) {
                        error!(lock = %path.display(), error = %e, "cannot remove stale lock");
                        return Err(LockError::Unavailable);
                    }
                }
                None => {
                    warn!(lock = %path.display(), "lock file has no readable owner");
                    return Err(LockError::Busy(None));
                }
            }
        }
        Err(LockError::Unavailable)
    }

    fn release(&mut self, port: &str) {
        let path = self.lock_path(port);
        let Some(index) = self.held.iter().position(|p| *p == path) else {
            return;
        };
        self.held.swap_remove(index);

        if owner(&path) != Some(self.pid) {
            warn!(lock = %path.display(), "lock file no longer ours, left in place");
            return;
        }
        match fs::remove_file(&path) {
            Ok(()) => debug!(lock = %path.display(), "port unlocked"),
            Err(e) => warn!(lock = %path.display(), error = %e, "cannot remove lock file"),
        }
    }
}
