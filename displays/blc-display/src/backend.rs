//! Display backend trait
//!
//! The operations a generic front-end (layouts, widgets, the CLI) uses to
//! drive a character display.

use crate::bar::BarKind;

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Invalid coordinates or dimensions
    InvalidCoordinates,
    /// Framebuffer does not fit the fixed capacity
    BufferOverflow,
    /// Icon id not reserved or without frames
    UnknownIcon,
    /// Icon frame list empty or too long
    InvalidIcon,
    /// More icons requested than there are CGRAM slots
    TooManyIcons,
    /// Fixed segment table is full
    TooManySegments,
}

/// How much of the display state a clear resets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClearMode {
    /// Reset the in-memory image, bars and icons only
    ///
    /// Used when swapping between pages of virtual rows: the next flush
    /// repaints only what differs from the device.
    Soft,
    /// Soft clear plus forgetting the device image and clearing the screen
    Full,
}

/// Counters describing one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushStats {
    /// Cursor-position + burst-write pairs emitted
    pub runs: usize,
    /// Character bytes sent in burst writes
    pub bytes: usize,
    /// Custom characters (re)defined
    pub glyphs: usize,
    /// Writes the transport gave up on
    pub dropped: usize,
}

/// Character display backend
///
/// Coordinates are zero-based; `row` counts from the top, `col` from the
/// left.
pub trait CharDisplay {
    /// Error type for display operations
    type Error;

    /// Clear the display
    fn clear(&mut self, mode: ClearMode) -> Result<(), Self::Error>;

    /// Place text at a position, clipped at the end of the row
    fn put(&mut self, row: u8, col: u8, text: &str) -> Result<(), Self::Error>;

    /// Draw a bar graph
    ///
    /// - `max`: bar extent in pixels
    /// - `len1`: filled length in pixels (upper half for dual bars)
    /// - `len2`: lower half length for dual bars, ignored otherwise
    fn draw_bar(
        &mut self,
        kind: BarKind,
        row: u8,
        col: u8,
        max: u16,
        len1: u16,
        len2: u16,
    ) -> Result<(), Self::Error>;

    /// Place frame `frame` of icon `id` at a position
    fn draw_icon(&mut self, id: u8, frame: usize, row: u8, col: u8) -> Result<(), Self::Error>;

    /// Send pending changes to the device
    fn flush(&mut self) -> Result<FlushStats, Self::Error>;

    /// Get the display dimensions
    ///
    /// Returns (columns, rows) in character units
    fn dimensions(&self) -> (u8, u8);
}
