//! Serial transport with port locking
//!
//! [`Transport`] owns both the open line and the port lock. The lock is
//! released when the transport is dropped, so every exit path out of init
//! (including failures after the lock was taken) leaves the port unlocked.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use blc_hal::{ErrorKind, LockError, OpenError, PortLock, UartConfig, UartError, UartOpen, UartTx};

use crate::error::{DriverError, WriteDropped};

/// Pause before the single retry of a would-block write
pub const RETRY_DELAY: Duration = Duration::from_millis(1);

/// Locked, configured serial line
pub struct Transport<P: UartTx, L: PortLock> {
    port: Option<P>,
    lock: Option<L>,
    path: String,
}

impl<P: UartTx, L: PortLock> Transport<P, L> {
    /// Lock `path`, open it and configure it for the terminal (9600 8N2)
    pub fn open<O>(opener: &mut O, mut lock: L, path: &str) -> Result<Self, DriverError>
    where
        O: UartOpen<Port = P>,
    {
        lock.acquire(path).map_err(|e| match e {
            LockError::Busy(pid) => DriverError::PortBusy {
                port: path.to_owned(),
                pid,
            },
            LockError::Unavailable => DriverError::PortUnavailable(path.to_owned()),
        })?;

        // Dropping this on the error path below releases the lock
        let mut transport = Self {
            port: None,
            lock: Some(lock),
            path: path.to_owned(),
        };

        let port = opener
            .open(path, &UartConfig::BLC)
            .map_err(|e| match e {
                OpenError::Device => DriverError::OpenFailed(path.to_owned()),
                OpenError::LineSettings => DriverError::TermiosFailed(path.to_owned()),
            })?;
        transport.port = Some(port);
        debug!(port = path, "transport open");
        Ok(transport)
    }

    /// Device path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Write all of `data`
    ///
    /// A would-block failure is retried once after [`RETRY_DELAY`]. Short
    /// writes continue with the remaining bytes.
    pub fn write(&mut self, data: &[u8]) -> Result<(), WriteDropped> {
        let Some(port) = self.port.as_mut() else {
            return Err(WriteDropped { len: data.len() });
        };

        let mut rest = data;
        let mut retried = false;
        while !rest.is_empty() {
            match port.write(rest) {
                Ok(n) if n > 0 => {
                    rest = &rest[n.min(rest.len())..];
                    continue;
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => {
                    warn!(port = %self.path, error = ?e, dropped = rest.len(), "write failed");
                    return Err(WriteDropped { len: rest.len() });
                }
            }

            if retried {
                warn!(port = %self.path, dropped = rest.len(), "write still blocked after retry");
                return Err(WriteDropped { len: rest.len() });
            }
            retried = true;
            thread::sleep(RETRY_DELAY);
        }
        Ok(())
    }

    /// Close the line and release the lock
    pub fn close(self) {}
}

impl<P: UartTx, L: PortLock> Drop for Transport<P, L> {
    fn drop(&mut self) {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.flush() {
                debug!(port = %self.path, error = ?e, "drain on close failed");
            }
            debug!(port = %self.path, "closing port");
        }
        if let Some(mut lock) = self.lock.take() {
            lock.release(&self.path);
        }
    }
}
