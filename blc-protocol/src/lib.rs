//! BLC Display Escape-Sequence Protocol
//!
//! Beckmann+Egle mini terminals accept plain text plus a small set of
//! escape sequences over a 9600 baud 8N2 serial line:
//!
//! ```text
//! ┌──────────────┬───────────────────────────────────────────┐
//! │ select model │ ESC & s <code>                            │
//! │ cursor off   │ ESC & D                                   │
//! │ clear screen │ ESC & #                                   │
//! │ goto         │ ESC [ <row> ; <col> H    (raw byte values) │
//! │ define char  │ ESC & T 00 <cgram> {01 <row>}×8 FF        │
//! └──────────────┴───────────────────────────────────────────┘
//! ```
//!
//! The `define char` sequence switches the terminal into transparent mode,
//! which passes raw HD44780 instructions through to the controller.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod glyph;
pub mod model;

pub use command::{cgram_address, goto, Command, ESC, GOTO_LEN, MAX_COMMAND_SIZE};
pub use glyph::{Glyph, GlyphError, CHARS, XRES, YRES};
pub use model::{resolve, Geometry, Model, ModelError, MAX_CELLS, MODELS};
