//! Driver configuration
//!
//! Settings are read through [`ConfigSource`], a section/key lookup in the
//! style of LCD4Linux' `cfg_get` / `cfg_number`. [`TomlConfig`] implements it
//! over a TOML file:
//!
//! ```toml
//! [Display]
//! Port = "/dev/ttyS1"
//! Type = "20x4"
//! Icons = 1
//!
//! [[Icon]]
//! frames = [
//!     [0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00, 0x00],
//!     [".....", ".*.*.", "*.*.*", "*...*", ".*.*.", "..*..", ".....", "....."],
//! ]
//!
//! ["Layout:default"]
//! row1.col1 = "Hello"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use toml::{Table, Value};
use tracing::debug;

use blc_protocol::{resolve, Glyph, GlyphError, Model, ModelError, CHARS, YRES};

use crate::error::DriverError;

/// Section read by default
pub const DEFAULT_SECTION: &str = "Display";

/// Section/key configuration lookup
pub trait ConfigSource {
    /// String value of `key` in `section`, falling back to `default`
    fn get(&self, section: &str, key: &str, default: Option<&str>) -> Option<String>;

    /// Every key of `section`
    fn keys(&self, section: &str) -> Vec<String>;

    /// Integer value of `key` in `section`, checked against `min..=max`
    ///
    /// An absent key yields `default` unchecked.
    fn get_int(
        &self,
        section: &str,
        key: &str,
        default: i64,
        min: i64,
        max: i64,
    ) -> Result<i64, DriverError> {
        let Some(raw) = self.get(section, key, None) else {
            return Ok(default);
        };
        let value: i64 = raw.trim().parse().map_err(|_| DriverError::ConfigInvalid {
            section: section.to_owned(),
            key: key.to_owned(),
            value: raw.clone(),
        })?;
        if !(min..=max).contains(&value) {
            return Err(DriverError::ConfigOutOfRange {
                section: section.to_owned(),
                key: key.to_owned(),
                value,
                min,
                max,
            });
        }
        Ok(value)
    }
}

/// Errors from loading a configuration file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("icon {icon}, frame {frame}: {reason:?}")]
    Glyph {
        icon: usize,
        frame: usize,
        reason: GlyphError,
    },
}

/// One icon frame, as row bytes or as text rows
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FrameSpec {
    Bits([u8; YRES as usize]),
    Text(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct IconSpec {
    frames: Vec<FrameSpec>,
}

#[derive(Debug, Default, Deserialize)]
struct IconTables {
    #[serde(default, rename = "Icon")]
    icons: Vec<IconSpec>,
}

/// Configuration backed by a TOML document
///
/// Section and key names match case-insensitively. Keys may be dotted
/// (`row1.col1 = ...`), which TOML stores as nested tables.
#[derive(Debug, Clone, Default)]
pub struct TomlConfig {
    root: Table,
    icons: Vec<Vec<Glyph>>,
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let root: Table = text.parse()?;
        let tables: IconTables = toml::from_str(text)?;

        let mut icons = Vec::with_capacity(tables.icons.len());
        for (icon, spec) in tables.icons.into_iter().enumerate() {
            let frames = spec
                .frames
                .iter()
                .enumerate()
                .map(|(frame, f)| match f {
                    FrameSpec::Bits(rows) => Ok(Glyph::new(*rows)),
                    FrameSpec::Text(rows) => Glyph::from_text(rows.as_slice())
                        .map_err(|reason| LoadError::Glyph { icon, frame, reason }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            icons.push(frames);
        }

        Ok(Self { root, icons })
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::parse(&text)?;
        debug!(path = %path.display(), icons = config.icons.len(), "config loaded");
        Ok(config)
    }

    /// Icon bitmaps from `[[Icon]]` tables, in file order
    pub fn icons(&self) -> &[Vec<Glyph>] {
        &self.icons
    }

    fn section(&self, section: &str) -> Option<&Table> {
        find(&self.root, section)?.as_table()
    }
}

/// Case-insensitive lookup, descending into tables for dotted keys
///
/// An exact match wins over a case-insensitive one.
fn find<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    if let Some(value) = table.get(key) {
        return Some(value);
    }
    let mut similar = table.iter().filter(|(k, _)| k.eq_ignore_ascii_case(key));
    if let Some((_, value)) = similar.next() {
        return Some(value);
    }
    let (head, rest) = key.split_once('.')?;
    table
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case(head))
        .find_map(|(_, value)| find(value.as_table()?, rest))
}

/// Scalar values as strings; arrays and tables have no string form
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

fn flatten(prefix: &str, table: &Table, out: &mut Vec<String>) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(inner) => flatten(&path, inner, out),
            _ => out.push(path),
        }
    }
}

impl ConfigSource for TomlConfig {
    fn get(&self, section: &str, key: &str, default: Option<&str>) -> Option<String> {
        self.section(section)
            .and_then(|table| find(table, key))
            .and_then(scalar)
            .or_else(|| default.map(str::to_owned))
    }

    fn keys(&self, section: &str) -> Vec<String> {
        let mut keys = Vec::new();
        if let Some(table) = self.section(section) {
            flatten("", table, &mut keys);
        }
        keys
    }
}

/// Settings the driver needs before touching the port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Serial device path
    pub port: String,
    /// Display model resolved from `Type`
    pub model: Model,
    /// CGRAM slots reserved for icons
    pub icons: u8,
}

impl DriverConfig {
    /// Read `Port`, `Type` and `Icons` from `section`
    pub fn from_source<C: ConfigSource + ?Sized>(
        config: &C,
        section: &str,
    ) -> Result<Self, DriverError> {
        let missing = |key: &str| DriverError::ConfigMissing {
            section: section.to_owned(),
            key: key.to_owned(),
        };

        let port = config
            .get(section, "Port", None)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| missing("Port"))?;
        let kind = config
            .get(section, "Type", None)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| missing("Type"))?;
        let model = resolve(&kind).map_err(|e| match e {
            ModelError::BadGeometry => DriverError::BadGeometry(kind.clone()),
            ModelError::Unsupported { .. } => DriverError::UnsupportedModel(kind.clone()),
        })?;
        let icons = config.get_int(section, "Icons", 0, 0, i64::from(CHARS))?;

        Ok(Self {
            port,
            model,
            icons: icons as u8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [Display]
        Port = "/dev/ttyS1"
        Type = "20x4"
        Icons = 2

        [[Icon]]
        frames = [[0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00, 0xFF]]

        [[Icon]]
        frames = [["*...*", ".*.*.", "..*..", "", "", "", "", "*****"]]

        ["Layout:default"]
        row1.col1 = "Hello"
        "row2.col3" = "World"
    "#;

    #[test]
    fn test_get_is_case_insensitive() {
        let config = TomlConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.get("display", "port", None).as_deref(), Some("/dev/ttyS1"));
        assert_eq!(config.get("Display", "Icons", None).as_deref(), Some("2"));
        assert_eq!(config.get("Display", "Speed", Some("9600")).as_deref(), Some("9600"));
        assert_eq!(config.get("Nowhere", "Port", None), None);
    }

    #[test]
    fn test_dotted_keys() {
        let config = TomlConfig::parse(SAMPLE).unwrap();
        assert_eq!(
            config.get("Layout:default", "row1.col1", None).as_deref(),
            Some("Hello")
        );
        assert_eq!(
            config.get("Layout:default", "row2.col3", None).as_deref(),
            Some("World")
        );
        let mut keys = config.keys("Layout:default");
        keys.sort();
        assert_eq!(keys, ["row1.col1", "row2.col3"]);
    }

    #[test]
    fn test_get_int_range() {
        let config = TomlConfig::parse("[D]\nA = 3\nB = 12\nC = \"x\"").unwrap();
        assert_eq!(config.get_int("D", "A", 0, 0, 8), Ok(3));
        assert_eq!(config.get_int("D", "Z", 7, 0, 8), Ok(7));
        assert!(matches!(
            config.get_int("D", "B", 0, 0, 8),
            Err(DriverError::ConfigOutOfRange { value: 12, .. })
        ));
        assert!(matches!(
            config.get_int("D", "C", 0, 0, 8),
            Err(DriverError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_icon_frames() {
        let config = TomlConfig::parse(SAMPLE).unwrap();
        let icons = config.icons();
        assert_eq!(icons.len(), 2);
        // High bits are masked
        assert_eq!(icons[0][0].rows()[7], 0x1F);
        assert_eq!(icons[1][0].rows()[0], 0b10001);
        assert_eq!(icons[1][0].rows()[3], 0);
        assert_eq!(icons[1][0].rows()[7], 0x1F);
    }

    #[test]
    fn test_hash_rows_are_lit() {
        let text = "[[Icon]]\nframes = [[\"#...#\", \"\", \"\", \"\", \"\", \"\", \"\", \"#####\"]]";
        let config = TomlConfig::parse(text).unwrap();
        let rows = config.icons()[0][0].rows();
        assert_eq!(rows[0], 0b10001);
        assert_eq!(rows[7], 0x1F);
    }

    #[test]
    fn test_bad_icon_frame() {
        let text = "[[Icon]]\nframes = [[\"******\", \"\", \"\", \"\", \"\", \"\", \"\", \"\"]]";
        assert!(matches!(
            TomlConfig::parse(text),
            Err(LoadError::Glyph {
                icon: 0,
                frame: 0,
                reason: GlyphError::RowTooWide
            })
        ));
    }

    #[test]
    fn test_driver_config() {
        let config = TomlConfig::parse(SAMPLE).unwrap();
        let settings = DriverConfig::from_source(&config, DEFAULT_SECTION).unwrap();
        assert_eq!(settings.port, "/dev/ttyS1");
        assert_eq!(settings.model.code, 5);
        assert_eq!(settings.icons, 2);
    }

    #[test]
    fn test_driver_config_errors() {
        let parse = |text: &str| {
            DriverConfig::from_source(&TomlConfig::parse(text).unwrap(), DEFAULT_SECTION)
        };
        assert!(matches!(
            parse("[Display]\nType = \"20x4\""),
            Err(DriverError::ConfigMissing { .. })
        ));
        assert_eq!(
            parse("[Display]\nPort = \"/dev/ttyS0\"\nType = \"99x99\""),
            Err(DriverError::UnsupportedModel("99x99".into()))
        );
        assert_eq!(
            parse("[Display]\nPort = \"/dev/ttyS0\"\nType = \"20x\""),
            Err(DriverError::BadGeometry("20x".into()))
        );
        assert!(matches!(
            parse("[Display]\nPort = \"/dev/ttyS0\"\nType = \"20x4\"\nIcons = 9"),
            Err(DriverError::ConfigOutOfRange { value: 9, min: 0, max: 8, .. })
        ));
    }
}
