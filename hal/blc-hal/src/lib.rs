//! BLC Hardware Abstraction Layer
//!
//! This crate defines the transport traits the display driver is written
//! against. Platform crates (`blc-hal-linux`, test mocks) implement them, so
//! the protocol and flush logic never touch a file descriptor directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Driver (blc-driver)                    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  blc-hal (this crate - traits)          │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ blc-hal-linux │       │  test mocks   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`] - Serial transmit
//! - [`uart::UartOpen`] - Opening and configuring a serial line
//! - [`lock::PortLock`] - Exclusive advisory lock keyed by port path

#![no_std]
#![deny(unsafe_code)]

pub mod lock;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use lock::{LockError, PortLock};
pub use uart::{ErrorKind, OpenError, UartConfig, UartError, UartOpen, UartTx};
