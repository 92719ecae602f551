//! Port lock abstraction
//!
//! Serial ports are shared system-wide, so the driver takes an advisory
//! lock keyed by the device path before opening it.

/// Errors from acquiring a port lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockError {
    /// Someone else holds the lock; the owner's pid when it can be read
    Busy(Option<u32>),
    /// The lock could not be taken for any other reason
    Unavailable,
}

/// Exclusive advisory lock manager
pub trait PortLock {
    /// Take the lock for `port`
    ///
    /// Taking a lock this instance already holds succeeds; a lock held by
    /// any other instance, even in the same process, is busy.
    fn acquire(&mut self, port: &str) -> Result<(), LockError>;

    /// Release the lock for `port`
    ///
    /// Releasing a lock that is not held is a no-op.
    fn release(&mut self, port: &str);
}
