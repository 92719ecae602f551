//! Text layouts
//!
//! A layout is a config section named `Layout:<name>` whose keys place text
//! on the screen: `row2.col5 = "CPU"` puts "CPU" at the second row, fifth
//! column. Positions are 1-based; keys of any other shape are ignored.

use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info, warn};

use blc_display::CharDisplay;

use crate::config::ConfigSource;

/// Text placed at a zero-based position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutItem {
    pub row: u8,
    pub col: u8,
    pub text: String,
}

/// Errors from parsing a command-line placement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("expected {0}")]
    Format(&'static str),
    #[error("rows and columns start at 1 and end at 255")]
    Position,
}

/// Config section holding layout `name`
pub fn section_name(name: &str) -> String {
    format!("Layout:{name}")
}

fn number(s: &str) -> Option<u16> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// 1-based position to zero-based, rejecting 0 and values past 255
fn position(row: u16, col: u16) -> Option<(u8, u8)> {
    let row = u8::try_from(row.checked_sub(1)?).ok()?;
    let col = u8::try_from(col.checked_sub(1)?).ok()?;
    Some((row, col))
}

/// Parse a `row<R>.col<C>` key (case-insensitive) into 1-based numbers
pub fn parse_key(key: &str) -> Option<(u16, u16)> {
    let key = key.to_ascii_lowercase();
    let (row, col) = key.strip_prefix("row")?.split_once(".col")?;
    Some((number(row)?, number(col)?))
}

/// Read the items of layout `name`
///
/// Items with empty text are skipped. The result is sorted by position.
pub fn load<C: ConfigSource + ?Sized>(config: &C, name: &str) -> Vec<LayoutItem> {
    info!(layout = name, "initializing layout");
    let section = section_name(name);

    let mut items = Vec::new();
    for key in config.keys(&section) {
        let Some((row, col)) = parse_key(&key) else {
            debug!(%key, "not a layout position");
            continue;
        };
        let Some(text) = config.get(&section, &key, None).filter(|t| !t.is_empty()) else {
            continue;
        };
        let Some((row, col)) = position(row, col) else {
            warn!(%key, "layout position out of range");
            continue;
        };
        items.push(LayoutItem { row, col, text });
    }

    items.sort_by_key(|item| (item.row, item.col));
    items
}

/// Put every item on `display`
///
/// Items that fall off the screen are logged and skipped. Returns the
/// number of items placed.
pub fn apply<D>(display: &mut D, items: &[LayoutItem]) -> usize
where
    D: CharDisplay + ?Sized,
    D::Error: core::fmt::Debug,
{
    let mut placed = 0;
    for item in items {
        match display.put(item.row, item.col, &item.text) {
            Ok(()) => placed += 1,
            Err(e) => warn!(
                row = u16::from(item.row) + 1,
                col = u16::from(item.col) + 1,
                error = ?e,
                "layout item not placed"
            ),
        }
    }
    placed
}

/// `ROW:COL:TEXT`, 1-based
impl FromStr for LayoutItem {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, PlacementError> {
        const SHAPE: &str = "ROW:COL:TEXT";
        let mut parts = s.splitn(3, ':');
        let (Some(row), Some(col), Some(text)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(PlacementError::Format(SHAPE));
        };
        let row = number(row).ok_or(PlacementError::Format(SHAPE))?;
        let col = number(col).ok_or(PlacementError::Format(SHAPE))?;
        let (row, col) = position(row, col).ok_or(PlacementError::Position)?;
        Ok(Self {
            row,
            col,
            text: text.to_owned(),
        })
    }
}

/// An icon shown at a zero-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconPlacement {
    pub id: u8,
    pub row: u8,
    pub col: u8,
}

/// `ID:ROW:COL`, id zero-based, position 1-based
impl FromStr for IconPlacement {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, PlacementError> {
        const SHAPE: &str = "ID:ROW:COL";
        let fields: Vec<u16> = s
            .split(':')
            .map(number)
            .collect::<Option<_>>()
            .ok_or(PlacementError::Format(SHAPE))?;
        let &[id, row, col] = fields.as_slice() else {
            return Err(PlacementError::Format(SHAPE));
        };
        let id = u8::try_from(id).map_err(|_| PlacementError::Format(SHAPE))?;
        let (row, col) = position(row, col).ok_or(PlacementError::Position)?;
        Ok(Self { id, row, col })
    }
}
