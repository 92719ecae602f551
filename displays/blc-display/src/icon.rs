//! Icon compositor
//!
//! Icons are small animated bitmaps, each owning one CGRAM slot at the top
//! of the slot range. Drawing an icon selects which frame it shows; the
//! frame is programmed into its slot on the next flush, and only when it
//! changed.

use heapless::Vec;

use blc_protocol::{Glyph, CHARS};

use crate::backend::DisplayError;
use crate::framebuffer::Grid;
use crate::overlay::{GlyphSink, Overlay};

/// Maximum animation frames per icon
pub const MAX_FRAMES: usize = 8;

const SLOTS: usize = CHARS as usize;

#[derive(Debug, Clone, Default)]
struct Icon {
    frames: Vec<Glyph, MAX_FRAMES>,
    /// Frame selected by the last draw
    frame: Option<usize>,
    /// Frame currently programmed into the slot
    loaded: Option<usize>,
}

/// Icon compositor
pub struct IconSet {
    cells: Grid<Option<u8>>,
    icons: Vec<Icon, SLOTS>,
}

impl IconSet {
    /// Create a compositor reserving `count` icons
    pub fn new(rows: u8, cols: u8, count: u8) -> Result<Self, DisplayError> {
        if count > CHARS {
            return Err(DisplayError::TooManyIcons);
        }
        let mut icons = Vec::new();
        for _ in 0..count {
            let _ = icons.push(Icon::default());
        }
        Ok(Self {
            cells: Grid::new(rows, cols, None)?,
            icons,
        })
    }

    /// Number of reserved icons
    pub fn count(&self) -> u8 {
        self.icons.len() as u8
    }

    /// CGRAM slot owned by icon `id`
    pub fn slot(&self, id: u8) -> u8 {
        CHARS - self.count() + id
    }

    /// Set the animation frames of an icon
    pub fn define(&mut self, id: u8, frames: &[Glyph]) -> Result<(), DisplayError> {
        let icon = self
            .icons
            .get_mut(usize::from(id))
            .ok_or(DisplayError::UnknownIcon)?;
        if frames.is_empty() {
            return Err(DisplayError::InvalidIcon);
        }
        icon.frames.clear();
        icon.frames
            .extend_from_slice(frames)
            .map_err(|_| DisplayError::InvalidIcon)?;
        icon.loaded = None;
        Ok(())
    }

    /// Show `frame` (modulo the frame count) of icon `id` at a cell
    pub fn draw(&mut self, id: u8, frame: usize, row: u8, col: u8) -> Result<(), DisplayError> {
        if self.cells.get(row, col).is_none() {
            return Err(DisplayError::InvalidCoordinates);
        }
        let icon = self
            .icons
            .get_mut(usize::from(id))
            .filter(|icon| !icon.frames.is_empty())
            .ok_or(DisplayError::UnknownIcon)?;
        icon.frame = Some(frame % icon.frames.len());
        self.cells.set(row, col, Some(id))
    }
}

impl Overlay for IconSet {
    fn peek(&self, row: u8, col: u8) -> Option<u8> {
        self.cells.get(row, col).flatten().map(|id| self.slot(id))
    }

    fn process<S: GlyphSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let first_slot = CHARS - self.count();
        let mut defined = 0;
        for (id, icon) in self.icons.iter_mut().enumerate() {
            let Some(frame) = icon.frame else { continue };
            if icon.loaded != Some(frame) {
                sink.define_char(first_slot + id as u8, &icon.frames[frame]);
                icon.loaded = Some(frame);
                defined += 1;
            }
        }
        defined
    }

    fn clear(&mut self) {
        self.cells.fill(None);
    }
}
