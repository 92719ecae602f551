//! Host driver for Beckmann+Egle BLC terminals
//!
//! The driver reads its settings from a [`ConfigSource`], locks and opens
//! the serial port through the `blc-hal` traits and keeps a [`Screen`]
//! in sync with the terminal.
//!
//! ```text
//!   TomlConfig ──► DriverConfig ──► Blc::open
//!                                      │
//!                  ┌───────────────────┼──────────────────┐
//!                  ▼                   ▼                  ▼
//!              Transport            Screen           layout::apply
//!          (lock + serial line)  (blc-display)
//! ```
//!
//! [`Screen`]: blc_display::Screen

pub mod config;
pub mod driver;
pub mod error;
pub mod layout;
pub mod transport;

#[cfg(test)]
mod mock;

pub use config::{ConfigSource, DriverConfig, LoadError, TomlConfig, DEFAULT_SECTION};
pub use driver::Blc;
pub use error::{DriverError, WriteDropped};
pub use layout::{IconPlacement, LayoutItem, PlacementError};
pub use transport::{Transport, RETRY_DELAY};

pub use blc_display::{BarKind, CharDisplay, ClearMode, FlushStats};
