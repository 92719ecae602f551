//! Error types for the BLC driver

use thiserror::Error;

use blc_display::DisplayError;

/// Errors from initializing or driving a display
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Someone else holds the port lock
    #[error("port {port} is locked by {}", holder(.pid))]
    PortBusy { port: String, pid: Option<u32> },

    /// The port lock could not be taken
    #[error("port {0} could not be locked")]
    PortUnavailable(String),

    /// The serial device could not be opened
    #[error("open({0}) failed")]
    OpenFailed(String),

    /// The serial line could not be configured
    #[error("cannot configure serial line {0}")]
    TermiosFailed(String),

    /// Valid geometry that no model in the table matches
    #[error("unsupported display type '{0}'")]
    UnsupportedModel(String),

    /// Malformed geometry string
    #[error("bad display type '{0}', expected <cols>x<rows>")]
    BadGeometry(String),

    /// A required key is absent
    #[error("missing '{key}' in section '{section}'")]
    ConfigMissing { section: String, key: String },

    /// A numeric key is outside its allowed range
    #[error("'{section}.{key}' = {value} is out of range {min}..={max}")]
    ConfigOutOfRange {
        section: String,
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A numeric key does not hold a number
    #[error("'{section}.{key}' = '{value}' is not a number")]
    ConfigInvalid {
        section: String,
        key: String,
        value: String,
    },

    /// Framebuffers do not fit the fixed capacity
    #[error("framebuffer for {cols}x{rows} could not be allocated")]
    AllocationFailed { cols: u8, rows: u8 },

    /// Runtime display operation rejected
    #[error("display error: {0:?}")]
    Display(DisplayError),
}

fn holder(pid: &Option<u32>) -> String {
    match pid {
        Some(pid) => format!("process {pid}"),
        None => "an unknown owner".to_owned(),
    }
}

impl From<DisplayError> for DriverError {
    fn from(e: DisplayError) -> Self {
        DriverError::Display(e)
    }
}

/// A write the transport gave up on
///
/// Never fatal: the protocol layer counts these and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("write dropped, {len} bytes not sent")]
pub struct WriteDropped {
    /// Bytes that were not sent
    pub len: usize,
}
