//! POSIX serial line

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;

use nix::fcntl::OFlag;
use nix::sys::termios::{self, BaudRate, ControlFlags, SetArg};
use thiserror::Error;
use tracing::{debug, error};

use blc_hal::uart::{DataBits, Parity, StopBits};
use blc_hal::{ErrorKind, OpenError, UartConfig, UartError, UartOpen, UartTx};

/// Error from a serial write
#[derive(Debug, Error)]
#[error("serial write failed: {0}")]
pub struct SerialError(#[from] pub io::Error);

impl UartError for SerialError {
    fn kind(&self) -> ErrorKind {
        match self.0.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => ErrorKind::WouldBlock,
            _ => ErrorKind::Other,
        }
    }
}

/// Map a numeric rate to a termios speed
fn baud_rate(baud: u32) -> Option<BaudRate> {
    Some(match baud {
        1200 => BaudRate::B1200,
        2400 => BaudRate::B2400,
        4800 => BaudRate::B4800,
        9600 => BaudRate::B9600,
        19200 => BaudRate::B19200,
        38400 => BaudRate::B38400,
        57600 => BaudRate::B57600,
        115200 => BaudRate::B115200,
        _ => return None,
    })
}

/// Put the line in raw mode with the requested framing
fn configure(file: &File, config: &UartConfig) -> Result<(), OpenError> {
    let speed = baud_rate(config.baudrate).ok_or(OpenError::LineSettings)?;
    let settings_error = |e: nix::Error| {
        error!(error = %e, "serial line settings rejected");
        OpenError::LineSettings
    };

    let mut tio = termios::tcgetattr(file).map_err(settings_error)?;
    // Raw mode leaves 8N1
    termios::cfmakeraw(&mut tio);

    if config.data_bits == DataBits::Seven {
        tio.control_flags.remove(ControlFlags::CSIZE);
        tio.control_flags.insert(ControlFlags::CS7);
    }
    match config.parity {
        Parity::None => {}
        Parity::Even => tio.control_flags.insert(ControlFlags::PARENB),
        Parity::Odd => tio
            .control_flags
            .insert(ControlFlags::PARENB | ControlFlags::PARODD),
    }
    if config.stop_bits == StopBits::Two {
        tio.control_flags.insert(ControlFlags::CSTOPB);
    }
    termios::cfsetospeed(&mut tio, speed).map_err(settings_error)?;
    termios::tcsetattr(file, SetArg::TCSANOW, &tio).map_err(settings_error)
}

/// Opens tty devices
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxSerial;

impl UartOpen for LinuxSerial {
    type Port = SerialPort;

    fn open(&mut self, path: &str, config: &UartConfig) -> Result<SerialPort, OpenError> {
        // Not our controlling terminal; never block on carrier detect
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags((OFlag::O_NOCTTY | OFlag::O_NONBLOCK).bits())
            .open(path)
            .map_err(|e| {
                error!(port = path, error = %e, "open failed");
                OpenError::Device
            })?;

        configure(&file, config)?;
        debug!(port = path, baud = config.baudrate, "serial line configured");
        Ok(SerialPort { file })
    }
}

/// An open, configured serial line
#[derive(Debug)]
pub struct SerialPort {
    file: File,
}

impl UartTx for SerialPort {
    type Error = SerialError;

    fn write(&mut self, data: &[u8]) -> Result<usize, SerialError> {
        Ok(self.file.write(data)?)
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        termios::tcdrain(&self.file).map_err(|e| SerialError(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baud_rate_table() {
        assert_eq!(baud_rate(9600), Some(BaudRate::B9600));
        assert_eq!(baud_rate(115200), Some(BaudRate::B115200));
        assert_eq!(baud_rate(9601), None);
    }

    #[test]
    fn test_error_kind_mapping() {
        let blocked = SerialError(io::Error::from(io::ErrorKind::WouldBlock));
        assert_eq!(blocked.kind(), ErrorKind::WouldBlock);
        let broken = SerialError(io::Error::from(io::ErrorKind::BrokenPipe));
        assert_eq!(broken.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_open_missing_device() {
        let result = LinuxSerial.open("/dev/blc-does-not-exist", &UartConfig::BLC);
        assert!(matches!(result, Err(OpenError::Device)));
    }

    #[test]
    fn test_open_regular_file_rejects_line_settings() {
        let path = std::env::temp_dir().join(format!("blc-serial-{}", std::process::id()));
        std::fs::write(&path, b"").unwrap();
        let result = LinuxSerial.open(path.to_str().unwrap(), &UartConfig::BLC);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(OpenError::LineSettings)));
    }
}
