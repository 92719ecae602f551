//! UART serial communication abstractions
//!
//! Provides traits for blocking serial output and for opening a serial
//! line with a given framing. Platform crates implement these.

/// Coarse classification of a transmit failure
///
/// The driver only needs to tell a transient "try again" condition apart
/// from everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// The line cannot accept data right now (EAGAIN on a non-blocking fd)
    WouldBlock,
    /// Any other failure
    Other,
}

/// Error returned by a [`UartTx`] implementation
pub trait UartError: core::fmt::Debug {
    /// Classify this error
    fn kind(&self) -> ErrorKind;
}

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error: UartError;

    /// Write data to the UART
    ///
    /// Returns the number of bytes accepted, which may be fewer than
    /// `data.len()`.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Errors from opening a serial line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpenError {
    /// The device node could not be opened
    Device,
    /// The line settings could not be read or applied
    LineSettings,
}

/// Opens serial lines
///
/// Separating the opener from the port lets the driver acquire the port
/// lock first and open the device second, releasing the lock if opening
/// fails.
pub trait UartOpen {
    /// Port type produced by this opener
    type Port: UartTx;

    /// Open `path` and configure it with `config`
    fn open(&mut self, path: &str, config: &UartConfig) -> Result<Self::Port, OpenError>;
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// Framing used by Beckmann+Egle terminals: 9600 baud, 8N2
    pub const BLC: Self = Self {
        baudrate: 9600,
        data_bits: DataBits::Eight,
        parity: Parity::None,
        stop_bits: StopBits::Two,
    };
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::BLC
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
