//! Linux platform layer for BLC displays
//!
//! Implements the `blc-hal` traits on top of a POSIX serial device:
//!
//! - [`LinuxSerial`] opens and configures the tty (`UartOpen`)
//! - [`SerialPort`] writes to it (`UartTx`)
//! - [`UucpLock`] guards it with a `LCK..<device>` file (`PortLock`)
//!
//! The driver never sees a file descriptor; everything OS specific stays
//! in this crate.

pub mod lock;
pub mod serial;

pub use lock::UucpLock;
pub use serial::{LinuxSerial, SerialError, SerialPort};
