//! Bar graph compositor
//!
//! Bars are built from per-cell segments. A segment describes how many
//! pixels of a cell are lit (separately for the upper and lower half, so
//! that two thin bars can share a row) and in which direction the bar grows.
//!
//! Fully blank and fully lit segments map to fixed character codes
//! registered at init. Every other distinct segment needs a CGRAM slot;
//! when there are more distinct segments than slots, the segment closest to
//! another one is folded into it until the rest fit.

use heapless::Vec;

use blc_protocol::{Glyph, CHARS, MAX_CELLS, XRES, YRES};

use crate::backend::DisplayError;
use crate::framebuffer::Grid;
use crate::overlay::{GlyphSink, Overlay};

/// Segment value meaning "all pixels of this half lit"
pub const FULL: u8 = 255;

const MAX_FIXED: usize = 4;
const SLOTS: usize = CHARS as usize;

/// Growth direction of a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Pixels per cell along this direction
    const fn scale(self) -> u8 {
        match self {
            Direction::Left | Direction::Right => XRES,
            Direction::Up | Direction::Down => YRES,
        }
    }
}

/// Bar styles supported by the terminal
///
/// Horizontal bars cover cells from `col` to the right; vertical bars
/// start at `row` and extend up (`Up`) or down (`Down`). The dual variants
/// draw two half-height bars in one row of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BarKind {
    Left,
    Right,
    Up,
    Down,
    DualLeft,
    DualRight,
}

impl BarKind {
    pub const fn direction(self) -> Direction {
        match self {
            BarKind::Left | BarKind::DualLeft => Direction::Left,
            BarKind::Right | BarKind::DualRight => Direction::Right,
            BarKind::Up => Direction::Up,
            BarKind::Down => Direction::Down,
        }
    }

    pub const fn is_dual(self) -> bool {
        matches!(self, BarKind::DualLeft | BarKind::DualRight)
    }
}

/// Fill state of one cell of a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Lit pixels in the upper half (or the whole cell for vertical bars)
    pub val1: u8,
    /// Lit pixels in the lower half
    pub val2: u8,
    pub dir: Direction,
}

impl Segment {
    /// Build a segment, normalizing a fully lit half to [`FULL`]
    pub fn new(val1: u8, val2: u8, dir: Direction) -> Self {
        let scale = dir.scale();
        let norm = |v: u8| if v >= scale { FULL } else { v };
        Self {
            val1: norm(val1),
            val2: norm(val2),
            dir,
        }
    }

    fn pixels(&self, v: u8) -> u8 {
        if v == FULL {
            self.dir.scale()
        } else {
            v
        }
    }

    /// Sum of pixel differences against another pair of values
    fn distance(&self, val1: u8, val2: u8) -> u16 {
        let d1 = self.pixels(self.val1).abs_diff(self.pixels(val1));
        let d2 = self.pixels(self.val2).abs_diff(self.pixels(val2));
        u16::from(d1) + u16::from(d2)
    }

    /// Bitmap for this segment
    pub fn glyph(&self) -> Glyph {
        let v1 = self.pixels(self.val1);
        let v2 = self.pixels(self.val2);
        let mut glyph = Glyph::BLANK;
        for r in 0..YRES {
            let bits = match self.dir {
                Direction::Right | Direction::Left => {
                    let v = if r < YRES / 2 { v1 } else { v2 };
                    let run = (1u8 << v) - 1;
                    if self.dir == Direction::Right {
                        run << (XRES - v)
                    } else {
                        run
                    }
                }
                Direction::Up if r >= YRES - v1 => 0x1F,
                Direction::Down if r < v1 => 0x1F,
                _ => 0,
            };
            glyph.set_row(usize::from(r), bits);
        }
        glyph
    }
}

/// Segment with a fixed character code
#[derive(Debug, Clone, Copy)]
struct FixedSegment {
    val1: u8,
    val2: u8,
    /// `None` matches every direction
    dir: Option<Direction>,
    code: u8,
}

impl FixedSegment {
    fn matches(&self, seg: &Segment) -> bool {
        self.val1 == seg.val1 && self.val2 == seg.val2 && self.accepts(seg.dir)
    }

    fn accepts(&self, dir: Direction) -> bool {
        self.dir.map_or(true, |d| d == dir)
    }
}

/// Where a segment that did not get its own slot is shown instead
#[derive(Debug, Clone, Copy)]
enum Target {
    Fixed(u8),
    Dynamic(usize),
}

/// Bar graph compositor
pub struct BarGraph {
    cells: Grid<Option<Segment>>,
    codes: Grid<Option<u8>>,
    fixed: Vec<FixedSegment, MAX_FIXED>,
    /// CGRAM slots `0..slots` belong to bars
    slots: u8,
    /// Segment currently programmed into each slot
    loaded: [Option<Segment>; SLOTS],
}

impl BarGraph {
    /// Create a compositor for a `rows × cols` display owning `slots` CGRAM slots
    pub fn new(rows: u8, cols: u8, slots: u8) -> Result<Self, DisplayError> {
        Ok(Self {
            cells: Grid::new(rows, cols, None)?,
            codes: Grid::new(rows, cols, None)?,
            fixed: Vec::new(),
            slots: slots.min(CHARS),
            loaded: [None; SLOTS],
        })
    }

    /// Number of CGRAM slots available to bars
    pub const fn slots(&self) -> u8 {
        self.slots
    }

    /// Map a segment to a built-in character instead of a CGRAM slot
    ///
    /// Values use [`FULL`] for a fully lit half; `dir = None` matches bars
    /// of any direction.
    pub fn register_segment(
        &mut self,
        val1: u8,
        val2: u8,
        dir: Option<Direction>,
        code: u8,
    ) -> Result<(), DisplayError> {
        self.fixed
            .push(FixedSegment {
                val1,
                val2,
                dir,
                code,
            })
            .map_err(|_| DisplayError::TooManySegments)
    }

    /// Draw a bar
    ///
    /// `max`, `len1` and `len2` are in pixels. The bar is clipped at the
    /// display edge.
    pub fn draw(
        &mut self,
        kind: BarKind,
        row: u8,
        col: u8,
        max: u16,
        len1: u16,
        len2: u16,
    ) -> Result<(), DisplayError> {
        let rows = self.cells.rows();
        let cols = self.cells.cols();
        if row >= rows || col >= cols {
            return Err(DisplayError::InvalidCoordinates);
        }

        let dir = kind.direction();
        let scale = u16::from(dir.scale());
        let len1 = len1.min(max);
        let len2 = if kind.is_dual() { len2.min(max) } else { len1 };
        let cells = max.div_ceil(scale);
        let fill = |len: u16, i: u16| len.saturating_sub(i * scale).min(scale) as u8;

        match dir {
            Direction::Right | Direction::Left => {
                let n = cells.min(u16::from(cols - col));
                for i in 0..n {
                    let c = if dir == Direction::Right {
                        col + i as u8
                    } else {
                        col + (n - 1 - i) as u8
                    };
                    let seg = Segment::new(fill(len1, i), fill(len2, i), dir);
                    self.cells.set(row, c, Some(seg))?;
                }
            }
            Direction::Up => {
                let n = cells.min(u16::from(row) + 1);
                for i in 0..n {
                    let v = fill(len1, i);
                    self.cells
                        .set(row - i as u8, col, Some(Segment::new(v, v, dir)))?;
                }
            }
            Direction::Down => {
                let n = cells.min(u16::from(rows - row));
                for i in 0..n {
                    let v = fill(len1, i);
                    self.cells
                        .set(row + i as u8, col, Some(Segment::new(v, v, dir)))?;
                }
            }
        }
        Ok(())
    }

    fn fixed_code(&self, seg: &Segment) -> Option<u8> {
        self.fixed.iter().find(|f| f.matches(seg)).map(|f| f.code)
    }

    /// Closest compatible replacement for `seg`, skipping `dynamic[skip]`
    fn nearest(&self, seg: &Segment, dynamic: &[Segment], skip: Option<usize>) -> Option<(u16, Target)> {
        let fixed = self
            .fixed
            .iter()
            .filter(|f| f.accepts(seg.dir))
            .map(|f| (seg.distance(f.val1, f.val2), Target::Fixed(f.code)));
        let others = dynamic
            .iter()
            .enumerate()
            .filter(|&(i, other)| Some(i) != skip && other.dir == seg.dir)
            .map(|(i, other)| (seg.distance(other.val1, other.val2), Target::Dynamic(i)));
        fixed.chain(others).min_by_key(|&(d, _)| d)
    }
}

impl Overlay for BarGraph {
    fn peek(&self, row: u8, col: u8) -> Option<u8> {
        self.codes.get(row, col).flatten()
    }

    fn process<S: GlyphSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        // Distinct segments that need a CGRAM slot, in scan order
        let mut dynamic: Vec<Segment, MAX_CELLS> = Vec::new();
        for seg in self.cells.as_slice().iter().flatten() {
            if self.fixed_code(seg).is_none() && !dynamic.contains(seg) {
                let _ = dynamic.push(*seg);
            }
        }

        // Fold the segment with the cheapest substitute until the rest fit
        while dynamic.len() > usize::from(self.slots) {
            let victim = (0..dynamic.len())
                .min_by_key(|&i| {
                    self.nearest(&dynamic[i], &dynamic, Some(i))
                        .map_or(u16::MAX, |(d, _)| d)
                })
                .unwrap_or(0);
            dynamic.swap_remove(victim);
        }

        // Segments already loaded keep their slot
        let slots = usize::from(self.slots);
        let mut slot_of = [0u8; SLOTS];
        let mut claimed = [false; SLOTS];
        let mut pending: Vec<usize, SLOTS> = Vec::new();
        for (i, seg) in dynamic.iter().enumerate() {
            match self.loaded[..slots].iter().position(|l| *l == Some(*seg)) {
                Some(s) => {
                    slot_of[i] = s as u8;
                    claimed[s] = true;
                }
                None => {
                    let _ = pending.push(i);
                }
            }
        }

        let mut defined = 0;
        for i in pending {
            if let Some(s) = (0..slots).find(|&s| !claimed[s]) {
                claimed[s] = true;
                slot_of[i] = s as u8;
                self.loaded[s] = Some(dynamic[i]);
                sink.define_char(s as u8, &dynamic[i].glyph());
                defined += 1;
            }
        }

        for row in 0..self.cells.rows() {
            for col in 0..self.cells.cols() {
                let code = self.cells.get(row, col).flatten().and_then(|seg| {
                    self.fixed_code(&seg)
                        .or_else(|| dynamic.iter().position(|d| *d == seg).map(|i| slot_of[i]))
                        .or_else(|| {
                            self.nearest(&seg, &dynamic, None).map(|(_, target)| match target {
                                Target::Fixed(code) => code,
                                Target::Dynamic(i) => slot_of[i],
                            })
                        })
                });
                let _ = self.codes.set(row, col, code);
            }
        }

        defined
    }

    fn clear(&mut self) {
        self.cells.fill(None);
        self.codes.fill(None);
    }
}
