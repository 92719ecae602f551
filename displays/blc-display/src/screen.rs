//! Double-buffered character screen
//!
//! [`Screen`] holds what the application wants shown (`current`) and what
//! the device is believed to show (`committed`). A flush merges the bar and
//! icon overlays into `current`, sends only the dirty runs of each row, and
//! then copies `current` over `committed`.

use blc_protocol::CHARS;

use crate::backend::{ClearMode, DisplayError, FlushStats};
use crate::bar::{BarGraph, BarKind, FULL};
use crate::flush::DirtyRuns;
use crate::framebuffer::{Framebuffer, BLANK};
use crate::icon::IconSet;
use crate::overlay::{FlushSink, Overlay};

/// Built-in character shown for an empty bar cell
pub const BLANK_CODE: u8 = 32;

/// Built-in character shown for a full bar cell
pub const BLOCK_CODE: u8 = 255;

/// Screen state for one display
pub struct Screen {
    current: Framebuffer,
    committed: Framebuffer,
    bars: BarGraph,
    icons: IconSet,
}

impl Screen {
    /// Create a blank screen reserving `icons` CGRAM slots for icons
    ///
    /// The remaining slots go to bar segments.
    pub fn new(rows: u8, cols: u8, icons: u8) -> Result<Self, DisplayError> {
        if icons > CHARS {
            return Err(DisplayError::TooManyIcons);
        }
        let mut bars = BarGraph::new(rows, cols, CHARS - icons)?;
        bars.register_segment(0, 0, None, BLANK_CODE)?;
        bars.register_segment(FULL, FULL, None, BLOCK_CODE)?;

        Ok(Self {
            current: Framebuffer::new(rows, cols, BLANK)?,
            committed: Framebuffer::new(rows, cols, BLANK)?,
            bars,
            icons: IconSet::new(rows, cols, icons)?,
        })
    }

    /// Number of rows
    pub const fn rows(&self) -> u8 {
        self.current.rows()
    }

    /// Number of columns
    pub const fn cols(&self) -> u8 {
        self.current.cols()
    }

    /// Image the application wants shown
    pub fn current(&self) -> &Framebuffer {
        &self.current
    }

    /// Image last sent to the device
    pub fn committed(&self) -> &Framebuffer {
        &self.committed
    }

    /// Number of reserved icons
    pub fn icon_count(&self) -> u8 {
        self.icons.count()
    }

    /// Reset the screen state
    ///
    /// A full clear also forgets the device image; the caller is expected to
    /// clear the physical screen to match.
    pub fn clear(&mut self, mode: ClearMode) {
        self.current.fill(BLANK);
        self.bars.clear();
        self.icons.clear();
        if mode == ClearMode::Full {
            self.committed.fill(BLANK);
        }
    }

    /// Write text at a position, clipped at the end of the row
    pub fn put(&mut self, row: u8, col: u8, text: &[u8]) -> Result<usize, DisplayError> {
        self.current.write_bytes(row, col, text)
    }

    /// Draw a bar graph, see [`BarGraph::draw`]
    pub fn draw_bar(
        &mut self,
        kind: BarKind,
        row: u8,
        col: u8,
        max: u16,
        len1: u16,
        len2: u16,
    ) -> Result<(), DisplayError> {
        self.bars.draw(kind, row, col, max, len1, len2)
    }

    /// Set the frames of icon `id`
    pub fn define_icon(&mut self, id: u8, frames: &[blc_protocol::Glyph]) -> Result<(), DisplayError> {
        self.icons.define(id, frames)
    }

    /// Place icon `id` at a cell
    pub fn draw_icon(&mut self, id: u8, frame: usize, row: u8, col: u8) -> Result<(), DisplayError> {
        self.icons.draw(id, frame, row, col)
    }

    /// Send the difference between `current` and `committed` to `sink`
    pub fn flush<S: FlushSink + ?Sized>(&mut self, sink: &mut S) -> FlushStats {
        let mut stats = FlushStats {
            glyphs: self.bars.process(sink) + self.icons.process(sink),
            ..FlushStats::default()
        };

        for row in 0..self.rows() {
            let Some(cells) = self.current.row_mut(row) else {
                continue;
            };
            for (cell, col) in cells.iter_mut().zip(0u8..) {
                if let Some(code) = self.bars.peek(row, col).or_else(|| self.icons.peek(row, col)) {
                    *cell = code;
                }
            }

            let (Some(current), Some(committed)) = (self.current.row(row), self.committed.row(row))
            else {
                continue;
            };
            for run in DirtyRuns::new(current, committed) {
                sink.write_run(row, run.start as u8, &current[run.clone()]);
                stats.runs += 1;
                stats.bytes += run.len();
            }
        }

        let committed = self.committed.copy_from(&self.current);
        debug_assert!(committed.is_ok(), "screen buffers differ in shape");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::GlyphSink;
    use blc_protocol::Glyph;
    use proptest::prelude::*;
    use std::vec::Vec;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Define(u8),
        Run(u8, u8, Vec<u8>),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<Event>,
    }

    impl RecordingSink {
        fn runs(&self) -> Vec<(u8, u8, Vec<u8>)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Run(r, c, d) => Some((*r, *c, d.clone())),
                    Event::Define(_) => None,
                })
                .collect()
        }
    }

    impl GlyphSink for RecordingSink {
        fn define_char(&mut self, slot: u8, _glyph: &Glyph) {
            self.events.push(Event::Define(slot));
        }
    }

    impl FlushSink for RecordingSink {
        fn write_run(&mut self, row: u8, col: u8, data: &[u8]) {
            self.events.push(Event::Run(row, col, data.to_vec()));
        }
    }

    #[test]
    fn test_blank_screen_flushes_nothing() {
        let mut screen = Screen::new(4, 20, 0).unwrap();
        let mut sink = RecordingSink::default();
        assert_eq!(screen.flush(&mut sink), FlushStats::default());
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_second_flush_is_empty() {
        let mut screen = Screen::new(4, 20, 0).unwrap();
        let mut sink = RecordingSink::default();
        screen.put(1, 3, b"Hello").unwrap();
        let stats = screen.flush(&mut sink);
        assert_eq!(stats.runs, 1);
        assert_eq!(stats.bytes, 5);
        assert_eq!(sink.runs(), [(1, 3, b"Hello".to_vec())]);

        let mut sink = RecordingSink::default();
        assert_eq!(screen.flush(&mut sink).runs, 0);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_run_length_policy_through_flush() {
        let mut screen = Screen::new(2, 20, 0).unwrap();
        let mut sink = RecordingSink::default();
        screen.put(0, 2, b"a").unwrap();
        screen.put(0, 10, b"b").unwrap();
        screen.flush(&mut sink);
        assert_eq!(sink.runs(), [(0, 2, b"a".to_vec()), (0, 10, b"b".to_vec())]);

        let mut sink = RecordingSink::default();
        screen.put(0, 2, b"c").unwrap();
        screen.put(0, 8, b"d").unwrap();
        screen.flush(&mut sink);
        assert_eq!(sink.runs(), [(0, 2, b"c     d".to_vec())]);
    }

    #[test]
    fn test_overlay_cells_are_committed() {
        let mut screen = Screen::new(2, 16, 1).unwrap();
        screen.define_icon(0, &[Glyph::FULL]).unwrap();
        screen.draw_icon(0, 0, 1, 15).unwrap();
        screen.put(0, 0, b"up").unwrap();

        let mut sink = RecordingSink::default();
        screen.flush(&mut sink);
        assert_eq!(screen.current().get(1, 15), Some(7));
        assert_eq!(screen.committed(), screen.current());

        // Unchanged overlay, nothing resent
        let mut sink = RecordingSink::default();
        screen.draw_icon(0, 0, 1, 15).unwrap();
        screen.flush(&mut sink);
        assert!(sink.runs().is_empty());
    }

    #[test]
    fn test_only_changed_cells_are_resent() {
        let mut screen = Screen::new(2, 16, 0).unwrap();
        let mut sink = RecordingSink::default();
        screen.put(0, 0, b"CPU  12%").unwrap();
        screen.flush(&mut sink);

        let mut sink = RecordingSink::default();
        screen.put(0, 0, b"CPU  13%").unwrap();
        screen.flush(&mut sink);
        assert_eq!(sink.runs(), [(0, 6, b"3".to_vec())]);
    }

    #[test]
    fn test_bar_beats_icon() {
        let mut screen = Screen::new(2, 16, 1).unwrap();
        let mut sink = RecordingSink::default();
        screen.define_icon(0, &[Glyph::FULL]).unwrap();
        screen.draw_icon(0, 0, 0, 0).unwrap();
        screen.draw_bar(BarKind::Right, 0, 0, 5, 5, 0).unwrap();
        screen.draw_icon(0, 0, 0, 1).unwrap();
        screen.flush(&mut sink);

        assert_eq!(screen.current().get(0, 0), Some(BLOCK_CODE));
        assert_eq!(screen.current().get(0, 1), Some(7));
        assert!(sink.events.contains(&Event::Define(7)));
        assert_eq!(sink.runs(), [(0, 0, std::vec![BLOCK_CODE, 7])]);
    }

    #[test]
    fn test_glyphs_are_defined_before_runs() {
        let mut screen = Screen::new(2, 16, 0).unwrap();
        let mut sink = RecordingSink::default();
        screen.draw_bar(BarKind::Right, 1, 0, 10, 3, 0).unwrap();
        let stats = screen.flush(&mut sink);

        assert_eq!(stats.glyphs, 1);
        assert_eq!(sink.events[0], Event::Define(0));
        assert_eq!(sink.runs(), [(1, 0, std::vec![0])]);
    }

    #[test]
    fn test_soft_clear_keeps_device_image() {
        let mut screen = Screen::new(2, 16, 0).unwrap();
        let mut sink = RecordingSink::default();
        screen.put(0, 0, b"page one").unwrap();
        screen.flush(&mut sink);

        screen.clear(ClearMode::Soft);
        screen.put(0, 0, b"page two").unwrap();
        let mut sink = RecordingSink::default();
        screen.flush(&mut sink);
        assert_eq!(sink.runs(), [(0, 5, b"two".to_vec())]);
    }

    #[test]
    fn test_full_clear_forgets_device_image() {
        let mut screen = Screen::new(2, 16, 0).unwrap();
        let mut sink = RecordingSink::default();
        screen.put(0, 0, b"abc").unwrap();
        screen.flush(&mut sink);

        screen.clear(ClearMode::Full);
        assert!(screen.committed().as_slice().iter().all(|&c| c == BLANK));
        let mut sink = RecordingSink::default();
        screen.flush(&mut sink);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_put_out_of_bounds() {
        let mut screen = Screen::new(2, 16, 0).unwrap();
        assert_eq!(screen.put(2, 0, b"x"), Err(DisplayError::InvalidCoordinates));
        assert_eq!(screen.put(0, 16, b"x"), Err(DisplayError::InvalidCoordinates));
        assert_eq!(screen.put(0, 14, b"xyz"), Ok(2));
    }

    #[test]
    fn test_icon_reservation_bound() {
        assert!(matches!(
            Screen::new(2, 16, 9),
            Err(DisplayError::TooManyIcons)
        ));
    }

    proptest! {
        #[test]
        fn prop_flush_commits_current(
            puts in proptest::collection::vec((0u8..4, 0u8..20, "[ -~]{0,24}"), 0..12)
        ) {
            let mut screen = Screen::new(4, 20, 0).unwrap();
            let mut sink = RecordingSink::default();
            for (row, col, text) in &puts {
                screen.put(*row, *col, text.as_bytes()).unwrap();
            }
            screen.flush(&mut sink);
            prop_assert_eq!(screen.committed(), screen.current());

            // Replaying the runs onto a blank image reproduces the screen
            let mut device = std::vec![BLANK; 80];
            for (row, col, data) in sink.runs() {
                let start = usize::from(row) * 20 + usize::from(col);
                device[start..start + data.len()].copy_from_slice(&data);
            }
            prop_assert_eq!(&device[..], screen.current().as_slice());

            let mut sink = RecordingSink::default();
            prop_assert_eq!(screen.flush(&mut sink).runs, 0);
        }
    }
}
