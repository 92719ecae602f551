//! Display state for BLC character terminals
//!
//! This crate provides:
//! - `CharDisplay` trait for the operations a front-end drives a display with
//! - `Screen`, the double-buffered image with bar and icon overlays
//! - `DirtyRuns`, the run detection behind differential flushing
//!
//! # Architecture
//!
//! Nothing here touches a serial port. A flush hands custom character
//! definitions and cursor-addressed byte runs to a `FlushSink`; the driver
//! crate turns those into escape sequences on the wire.
//!
//! ```text
//! put / draw_bar / draw_icon
//!            │
//!            ▼
//!   ┌─────────────────┐   process   ┌────────────┐
//!   │ current image   │◄────────────│ BarGraph   │ slots 0..8-icons
//!   │                 │◄────────────│ IconSet    │ slots 8-icons..8
//!   └────────┬────────┘             └────────────┘
//!            │ DirtyRuns vs committed
//!            ▼
//!        FlushSink
//! ```

#![no_std]

#[cfg(test)]
extern crate std;

pub mod backend;
pub mod bar;
pub mod flush;
pub mod framebuffer;
pub mod icon;
pub mod overlay;
pub mod screen;

// Re-export key types
pub use backend::{CharDisplay, ClearMode, DisplayError, FlushStats};
pub use bar::{BarGraph, BarKind, Direction, Segment, FULL};
pub use flush::{DirtyRuns, EQUAL_STREAK_LIMIT};
pub use framebuffer::{Framebuffer, Grid, BLANK};
pub use icon::{IconSet, MAX_FRAMES};
pub use overlay::{FlushSink, GlyphSink, Overlay};
pub use screen::{Screen, BLANK_CODE, BLOCK_CODE};
