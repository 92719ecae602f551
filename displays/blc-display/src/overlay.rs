//! Overlay compositor contract
//!
//! Bars and icons are drawn with custom characters. They keep their own
//! per-cell state and are merged into the framebuffer right before each
//! flush; the framebuffer never stores them between flushes.

use blc_protocol::Glyph;

/// Receives custom character definitions
pub trait GlyphSink {
    /// Program CGRAM `slot` with `glyph`
    fn define_char(&mut self, slot: u8, glyph: &Glyph);
}

/// Receives the output of a flush
pub trait FlushSink: GlyphSink {
    /// Position the cursor at (`row`, `col`) and write `data`
    fn write_run(&mut self, row: u8, col: u8, data: &[u8]);
}

/// A per-cell character override layered over the framebuffer
pub trait Overlay {
    /// Character code this overlay shows at a cell, if any
    fn peek(&self, row: u8, col: u8) -> Option<u8>;

    /// Define any custom characters the current state needs
    ///
    /// Returns the number of glyphs sent to `sink`.
    fn process<S: GlyphSink + ?Sized>(&mut self, sink: &mut S) -> usize;

    /// Remove everything drawn
    fn clear(&mut self);
}
