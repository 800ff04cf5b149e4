//! Byte transports a session can run over.

use std::io::{self, Read, Write};
use std::time::Duration;

use crate::error::Result;

/// Default serial baud rate for MicroPython boards.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default per-read timeout. A read that sees no byte within this window
/// fails with [`io::ErrorKind::TimedOut`].
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// A duplex byte stream with bounded reads.
///
/// Implemented for every `Read + Write` type; the protocol only ever moves
/// bytes through it and never interprets them at this layer.
pub trait Transport: Read + Write {}

impl<T: Read + Write + ?Sized> Transport for T {}

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct LinkConfig {
    /// Serial device path or name (e.g. `/dev/ttyUSB0`, `COM3`).
    pub device: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Per-read timeout.
    pub read_timeout: Duration,
}

impl LinkConfig {
    /// Settings for `device` with the default baud rate and timeout.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Sets the baud rate (default: 115200).
    #[must_use]
    pub const fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Sets the per-read timeout (default: 500 ms).
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// A serial port opened from a [`LinkConfig`].
pub struct SerialTransport {
    /// The open port.
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Opens the serial device described by `config`.
    pub fn open(config: &LinkConfig) -> Result<Self> {
        let port = serialport::new(&config.device, config.baud_rate)
            .timeout(config.read_timeout)
            .open()?;
        tracing::debug!(device = %config.device, baud = config.baud_rate, "serial port open");
        Ok(Self { port })
    }

    /// Returns a second handle to the same port.
    ///
    /// Used to read and write from separate threads when the link is
    /// handed over to an interactive terminal.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            port: self.port.try_clone()?,
        })
    }

    /// Name of the underlying device, if known.
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("name", &self.port.name())
            .finish_non_exhaustive()
    }
}

impl Read for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_config_defaults() {
        let cfg = LinkConfig::new("/dev/ttyUSB0");
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.read_timeout, Duration::from_millis(500));

        let cfg = cfg.baud_rate(9600).read_timeout(Duration::from_secs(2));
        assert_eq!(cfg.baud_rate, 9600);
        assert_eq!(cfg.read_timeout, Duration::from_secs(2));
    }

    #[test]
    fn missing_device_fails_to_open() {
        let cfg = LinkConfig::new("/dev/zap-does-not-exist");
        assert!(SerialTransport::open(&cfg).is_err());
    }
}
