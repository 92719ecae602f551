//! Beckmann+Egle BLC driver instance
//!
//! [`Blc`] ties a [`Screen`] to a [`Transport`]: drawing operations only
//! touch memory, and [`CharDisplay::flush`] sends the difference to the
//! terminal as custom character definitions followed by cursor-addressed
//! byte runs.

use tracing::{debug, info, warn};

use blc_display::{
    BarKind, CharDisplay, ClearMode, DisplayError, FlushSink, FlushStats, GlyphSink, Screen,
};
use blc_hal::{PortLock, UartOpen, UartTx};
use blc_protocol::{goto, Command, Glyph, Model, CHARS};

use crate::config::{ConfigSource, DriverConfig};
use crate::error::DriverError;
use crate::transport::Transport;

/// Flush output going straight to the transport
struct WireSink<'a, P: UartTx, L: PortLock> {
    transport: &'a mut Transport<P, L>,
    dropped: usize,
}

impl<P: UartTx, L: PortLock> WireSink<'_, P, L> {
    fn send(&mut self, bytes: &[u8]) {
        if self.transport.write(bytes).is_err() {
            self.dropped += 1;
        }
    }
}

impl<P: UartTx, L: PortLock> GlyphSink for WireSink<'_, P, L> {
    fn define_char(&mut self, slot: u8, glyph: &Glyph) {
        self.send(&Command::DefineChar { slot, glyph }.encode());
    }
}

impl<P: UartTx, L: PortLock> FlushSink for WireSink<'_, P, L> {
    fn write_run(&mut self, row: u8, col: u8, data: &[u8]) {
        self.send(&goto(row, col));
        self.send(data);
    }
}

/// An initialized BLC terminal
pub struct Blc<P: UartTx, L: PortLock> {
    transport: Transport<P, L>,
    screen: Screen,
    model: Model,
}

impl<P: UartTx, L: PortLock> Blc<P, L> {
    /// Read settings from `section` of `config` and bring up the display
    ///
    /// All settings are validated before the port is locked.
    pub fn init<C, O>(
        config: &C,
        section: &str,
        opener: &mut O,
        lock: L,
    ) -> Result<Self, DriverError>
    where
        C: ConfigSource + ?Sized,
        O: UartOpen<Port = P>,
    {
        let settings = DriverConfig::from_source(config, section)?;
        Self::open(&settings, opener, lock)
    }

    /// Bring up the display described by `settings`
    ///
    /// Selects the model, hides the cursor and clears the screen.
    pub fn open<O>(settings: &DriverConfig, opener: &mut O, lock: L) -> Result<Self, DriverError>
    where
        O: UartOpen<Port = P>,
    {
        let model = settings.model;
        let screen = Screen::new(model.rows, model.cols, settings.icons).map_err(|e| match e {
            DisplayError::BufferOverflow | DisplayError::InvalidCoordinates => {
                DriverError::AllocationFailed {
                    cols: model.cols,
                    rows: model.rows,
                }
            }
            other => DriverError::Display(other),
        })?;

        let transport = Transport::open(opener, lock, &settings.port)?;
        let mut blc = Self {
            transport,
            screen,
            model,
        };

        blc.send(Command::SelectModel(model.code));
        blc.send(Command::CursorOff);
        if settings.icons > 0 {
            debug!(
                icons = settings.icons,
                chars = CHARS,
                "reserving user-defined characters for icons"
            );
        }
        blc.clear(ClearMode::Full)?;

        info!(
            port = %settings.port,
            cols = model.cols,
            rows = model.rows,
            code = model.code,
            "display initialized"
        );
        Ok(blc)
    }

    /// Send a command outside of a flush; the transport logs drops
    fn send(&mut self, command: Command<'_>) {
        let _ = self.transport.write(&command.encode());
    }

    /// Resolved model
    pub fn model(&self) -> Model {
        self.model
    }

    /// In-memory screen state
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Number of icons reserved at init
    pub fn icon_count(&self) -> u8 {
        self.screen.icon_count()
    }

    /// Set the animation frames of icon `id`
    pub fn define_icon(&mut self, id: u8, frames: &[Glyph]) -> Result<(), DriverError> {
        Ok(self.screen.define_icon(id, frames)?)
    }

    /// Shut down, closing the port and releasing its lock
    pub fn quit(self) {
        let port = self.transport.path().to_owned();
        self.transport.close();
        info!(%port, "display shut down");
    }
}

impl<P: UartTx, L: PortLock> CharDisplay for Blc<P, L> {
    type Error = DriverError;

    fn clear(&mut self, mode: ClearMode) -> Result<(), DriverError> {
        self.screen.clear(mode);
        if mode == ClearMode::Full {
            self.send(Command::Clear);
        }
        Ok(())
    }

    fn put(&mut self, row: u8, col: u8, text: &str) -> Result<(), DriverError> {
        self.screen.put(row, col, text.as_bytes())?;
        Ok(())
    }

    fn draw_bar(
        &mut self,
        kind: BarKind,
        row: u8,
        col: u8,
        max: u16,
        len1: u16,
        len2: u16,
    ) -> Result<(), DriverError> {
        Ok(self.screen.draw_bar(kind, row, col, max, len1, len2)?)
    }

    fn draw_icon(&mut self, id: u8, frame: usize, row: u8, col: u8) -> Result<(), DriverError> {
        Ok(self.screen.draw_icon(id, frame, row, col)?)
    }

    fn flush(&mut self) -> Result<FlushStats, DriverError> {
        let mut sink = WireSink {
            transport: &mut self.transport,
            dropped: 0,
        };
        let mut stats = self.screen.flush(&mut sink);
        stats.dropped = sink.dropped;

        if stats.dropped > 0 {
            warn!(dropped = stats.dropped, "writes dropped during flush");
        }
        debug!(
            runs = stats.runs,
            bytes = stats.bytes,
            glyphs = stats.glyphs,
            "flush"
        );
        Ok(stats)
    }

    fn dimensions(&self) -> (u8, u8) {
        (self.model.cols, self.model.rows)
    }
}
