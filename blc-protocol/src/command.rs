//! Command encoding for the BLC escape-sequence protocol
//!
//! Every command is a short fixed-layout byte sequence starting with ESC.
//! Row and column numbers in the goto command are sent as raw byte values,
//! not ASCII digits.

use heapless::Vec;

use crate::glyph::{Glyph, CHARS};

/// Escape byte introducing every command
pub const ESC: u8 = 0x1B;

/// Longest encoded command (define char: 3 + 2 + 2 × 8 + 1)
pub const MAX_COMMAND_SIZE: usize = 22;

/// Length of the goto command
pub const GOTO_LEN: usize = 6;

// Transparent mode markers used by the define char command
const TRANSPARENT_ENTER: [u8; 3] = [ESC, b'&', b'T'];
const TRANSPARENT_WRITE_CMD: u8 = 0x00;
const TRANSPARENT_WRITE_DATA: u8 = 0x01;
const TRANSPARENT_LEAVE: u8 = 0xFF;

/// HD44780 "set CGRAM address" instruction
const SET_CGRAM_ADDR: u8 = 0x40;

/// Commands understood by the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Select the display model (geometry) by table code
    SelectModel(u8),
    /// Hide the cursor
    CursorOff,
    /// Clear the screen
    Clear,
    /// Move the cursor to a zero-based position
    Goto { row: u8, col: u8 },
    /// Program a CGRAM slot with a glyph
    DefineChar { slot: u8, glyph: &'a Glyph },
}

impl Command<'_> {
    /// Encode this command into a byte buffer
    ///
    /// The define char slot is taken modulo `CHARS`, matching the 3-bit
    /// CGRAM character field.
    pub fn encode(&self) -> Vec<u8, MAX_COMMAND_SIZE> {
        let mut out = Vec::new();
        // Every command fits MAX_COMMAND_SIZE, pushes cannot fail
        match *self {
            Command::SelectModel(code) => {
                let _ = out.extend_from_slice(&[ESC, b'&', b's', code]);
            }
            Command::CursorOff => {
                let _ = out.extend_from_slice(&[ESC, b'&', b'D']);
            }
            Command::Clear => {
                let _ = out.extend_from_slice(&[ESC, b'&', b'#']);
            }
            Command::Goto { row, col } => {
                let _ = out.extend_from_slice(&goto(row, col));
            }
            Command::DefineChar { slot, glyph } => {
                let _ = out.extend_from_slice(&TRANSPARENT_ENTER);
                let _ = out.push(TRANSPARENT_WRITE_CMD);
                let _ = out.push(cgram_address(slot));
                for &row in glyph.rows() {
                    let _ = out.push(TRANSPARENT_WRITE_DATA);
                    let _ = out.push(row);
                }
                let _ = out.push(TRANSPARENT_LEAVE);
            }
        }
        out
    }
}

/// CGRAM address of the first row of `slot`
pub const fn cgram_address(slot: u8) -> u8 {
    SET_CGRAM_ADDR | (8 * (slot % CHARS))
}

/// Cursor positioning sequence `ESC [ row ; col H`
pub const fn goto(row: u8, col: u8) -> [u8; GOTO_LEN] {
    [ESC, b'[', row, b';', col, b'H']
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_model() {
        assert_eq!(
            Command::SelectModel(5).encode().as_slice(),
            &[0x1B, b'&', b's', 5]
        );
    }

    #[test]
    fn test_fixed_commands() {
        assert_eq!(Command::CursorOff.encode().as_slice(), b"\x1b&D");
        assert_eq!(Command::Clear.encode().as_slice(), b"\x1b&#");
    }

    #[test]
    fn test_goto_offsets() {
        let bytes = Command::Goto { row: 3, col: 39 }.encode();
        assert_eq!(bytes.len(), GOTO_LEN);
        assert_eq!(bytes[0], ESC);
        assert_eq!(bytes[1], b'[');
        assert_eq!(bytes[2], 3);
        assert_eq!(bytes[3], b';');
        assert_eq!(bytes[4], 39);
        assert_eq!(bytes[5], b'H');
    }

    #[test]
    fn test_define_char_layout() {
        let glyph = Glyph::new([0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        let bytes = Command::DefineChar {
            slot: 3,
            glyph: &glyph,
        }
        .encode();

        assert_eq!(bytes.len(), MAX_COMMAND_SIZE);
        assert_eq!(&bytes[..3], b"\x1b&T");
        assert_eq!(bytes[3], 0x00);
        assert_eq!(bytes[4], 0x58); // 0x40 | 8 * 3
        for row in 0..8 {
            assert_eq!(bytes[5 + 2 * row], 0x01);
            assert_eq!(bytes[6 + 2 * row], row as u8 + 1);
        }
        assert_eq!(bytes[21], 0xFF);
    }

    #[test]
    fn test_cgram_address_per_slot() {
        assert_eq!(cgram_address(0), 0x40);
        assert_eq!(cgram_address(1), 0x48);
        assert_eq!(cgram_address(7), 0x78);
    }
}
