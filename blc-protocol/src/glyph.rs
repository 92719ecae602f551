//! Custom character bitmaps
//!
//! A glyph is one 5x8 cell bitmap as stored in the controller's CGRAM.
//! Row 0 is the top row; bit 4 of each row is the leftmost pixel.

/// Cell width in pixels
pub const XRES: u8 = 5;

/// Cell height in pixels
pub const YRES: u8 = 8;

/// Number of user-definable character slots in CGRAM
pub const CHARS: u8 = 8;

/// Mask of the significant bits in a glyph row
const ROW_MASK: u8 = (1 << XRES) - 1;

/// Errors from building a glyph out of text rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GlyphError {
    /// Wrong number of rows (must be exactly `YRES`)
    RowCount,
    /// A row is wider than `XRES` pixels
    RowTooWide,
}

/// A 5x8 character bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph {
    rows: [u8; YRES as usize],
}

impl Glyph {
    /// All pixels dark
    pub const BLANK: Self = Self {
        rows: [0; YRES as usize],
    };

    /// All pixels lit
    pub const FULL: Self = Self {
        rows: [ROW_MASK; YRES as usize],
    };

    /// Create a glyph from raw row bytes, masking each to 5 bits
    pub const fn new(rows: [u8; YRES as usize]) -> Self {
        let mut masked = [0u8; YRES as usize];
        let mut i = 0;
        while i < rows.len() {
            masked[i] = rows[i] & ROW_MASK;
            i += 1;
        }
        Self { rows: masked }
    }

    /// Build a glyph from text rows
    ///
    /// `*` and `#` are lit pixels, anything else is dark. Rows shorter than
    /// five characters are padded with dark pixels on the right.
    pub fn from_text<S: AsRef<str>>(rows: &[S]) -> Result<Self, GlyphError> {
        if rows.len() != YRES as usize {
            return Err(GlyphError::RowCount);
        }

        let mut bitmap = [0u8; YRES as usize];
        for (dst, row) in bitmap.iter_mut().zip(rows) {
            let row = row.as_ref();
            if row.chars().count() > XRES as usize {
                return Err(GlyphError::RowTooWide);
            }
            for (x, ch) in row.chars().enumerate() {
                if ch == '*' || ch == '#' {
                    *dst |= 1 << (XRES as usize - 1 - x);
                }
            }
        }

        Ok(Self { rows: bitmap })
    }

    /// Row bytes, top to bottom
    pub const fn rows(&self) -> &[u8; YRES as usize] {
        &self.rows
    }

    /// Set a single row (masked to 5 bits)
    pub fn set_row(&mut self, row: usize, bits: u8) {
        if let Some(r) = self.rows.get_mut(row) {
            *r = bits & ROW_MASK;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_masks_high_bits() {
        let glyph = Glyph::new([0xFF; 8]);
        assert_eq!(glyph, Glyph::FULL);
        assert!(glyph.rows().iter().all(|&r| r == 0x1F));
    }

    #[test]
    fn test_from_text() {
        let glyph = Glyph::from_text(&[
            "*...*", ".*.*.", "..*..", "", "#", "....#", "*****", ".....",
        ])
        .unwrap();
        assert_eq!(
            glyph.rows(),
            &[0x11, 0x0A, 0x04, 0x00, 0x10, 0x01, 0x1F, 0x00]
        );
    }

    #[test]
    fn test_from_text_rejects_bad_shape() {
        assert_eq!(Glyph::from_text(&["*****"; 7]), Err(GlyphError::RowCount));
        let mut rows = [".."; 8];
        rows[3] = "******";
        assert_eq!(Glyph::from_text(&rows), Err(GlyphError::RowTooWide));
    }

    #[test]
    fn test_set_row_out_of_range_is_ignored() {
        let mut glyph = Glyph::BLANK;
        glyph.set_row(8, 0x1F);
        assert_eq!(glyph, Glyph::BLANK);
        glyph.set_row(7, 0xFF);
        assert_eq!(glyph.rows()[7], 0x1F);
    }
}
