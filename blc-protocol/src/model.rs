//! Display models and geometry parsing
//!
//! The terminal firmware supports a fixed set of LCD geometries. The host
//! selects one with `ESC & s <code>` where `code` comes from [`MODELS`].

/// A supported display geometry and its model code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Model {
    pub cols: u8,
    pub rows: u8,
    pub code: u8,
}

const fn model(cols: u8, rows: u8, code: u8) -> Model {
    Model { cols, rows, code }
}

/// Supported models, scanned in order
pub const MODELS: &[Model] = &[
    model(16, 1, 0),
    model(16, 2, 1),
    model(16, 4, 2),
    model(20, 1, 3),
    model(20, 2, 4),
    model(20, 4, 5),
    model(24, 1, 6),
    model(24, 2, 7),
    model(32, 1, 8),
    model(32, 2, 9),
    model(40, 1, 10),
    model(40, 2, 11),
    model(40, 4, 12),
];

/// Largest cell count of any supported model
pub const MAX_CELLS: usize = 40 * 4;

/// Errors from resolving a geometry string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModelError {
    /// The string is not of the form `<cols>x<rows>`
    BadGeometry,
    /// Well-formed geometry that no model supports
    Unsupported { cols: u16, rows: u16 },
}

/// Display geometry in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    pub cols: u16,
    pub rows: u16,
}

impl Geometry {
    /// Parse `"<cols>x<rows>"`
    ///
    /// Both numbers must be positive decimal integers and nothing may
    /// follow the row count.
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        let (cols, rows) = s.split_once('x').ok_or(ModelError::BadGeometry)?;
        let cols = parse_dimension(cols)?;
        let rows = parse_dimension(rows)?;
        Ok(Self { cols, rows })
    }

    /// Look up the model for this geometry
    pub fn model(&self) -> Result<Model, ModelError> {
        MODELS
            .iter()
            .find(|m| u16::from(m.cols) == self.cols && u16::from(m.rows) == self.rows)
            .copied()
            .ok_or(ModelError::Unsupported {
                cols: self.cols,
                rows: self.rows,
            })
    }
}

fn parse_dimension(s: &str) -> Result<u16, ModelError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ModelError::BadGeometry);
    }
    match s.parse::<u16>() {
        Ok(0) | Err(_) => Err(ModelError::BadGeometry),
        Ok(n) => Ok(n),
    }
}

/// Parse a geometry string and resolve its model in one step
pub fn resolve(s: &str) -> Result<Model, ModelError> {
    Geometry::parse(s)?.model()
}
