//! REPL session: mode control and snippet execution.
//!
//! A [`Session`] owns the link to one board and tracks which REPL mode the
//! board is in. The conversation is strictly half-duplex: every method
//! writes a request and blocks until the matching response has been read,
//! so a session must not be shared between threads without external
//! locking.

use std::io::{Read, Write};

use zap_proto::{
    ACK, CONNECT, ENTER_RAW_SEQ, EOT, EXIT_RAW_SEQ, PROMPT, RAW_BANNER, SOFT_REBOOT_BANNER,
    chunk::DEFAULT_CHUNK_SIZE, read_until, read_until_into,
};

use crate::error::{Error, Result};
use crate::transport::{LinkConfig, SerialTransport, Transport};

/// REPL mode of the board, as far as the session knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Mode {
    /// The interactive `>>>` REPL. Initial mode after connecting.
    Friendly,
    /// The raw REPL, where snippets can be executed.
    Raw,
    /// A transition or execution failed part-way; the board may be in
    /// either mode or mid-output. Only reconnecting recovers.
    Unknown,
}

/// Session tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct SessionConfig {
    /// Raw bytes moved per round trip by file transfers.
    pub chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl SessionConfig {
    /// Sets the transfer chunk size (default: 256). Zero is raised to one.
    #[must_use]
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }
}

/// Streams captured from one snippet execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ExecOutput {
    /// Standard output, without its terminator. Empty when it was
    /// streamed to a sink instead.
    pub stdout: Vec<u8>,
    /// Error output, without its terminator.
    pub stderr: Vec<u8>,
}

/// A connection to one board.
#[derive(Debug)]
pub struct Session<T: Transport> {
    /// The link; owned for the session's lifetime.
    link: T,
    /// Current REPL mode.
    mode: Mode,
    /// Tuning applied to transfers.
    config: SessionConfig,
    /// A snippet was acknowledged and its output has not been read yet.
    awaiting_output: bool,
}

impl Session<SerialTransport> {
    /// Opens the serial device and connects to the board on it.
    pub fn open(link: &LinkConfig) -> Result<Self> {
        Self::connect(SerialTransport::open(link)?)
    }
}

impl<T: Transport> Session<T> {
    /// Connects over an already-open link with default tuning.
    ///
    /// Sends a double interrupt so that any running program stops before
    /// the first mode change.
    pub fn connect(link: T) -> Result<Self> {
        Self::connect_with(link, SessionConfig::default())
    }

    /// Connects over an already-open link.
    pub fn connect_with(mut link: T, config: SessionConfig) -> Result<Self> {
        link.write_all(CONNECT)?;
        link.flush()?;
        tracing::debug!("interrupt sent; board in friendly mode");
        Ok(Self {
            link,
            mode: Mode::Friendly,
            config,
            awaiting_output: false,
        })
    }

    /// Current REPL mode.
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Tuning in effect.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The underlying link.
    pub const fn transport(&self) -> &T {
        &self.link
    }

    /// The underlying link, for callers that bypass the protocol.
    ///
    /// Bytes written or read directly are invisible to the session's mode
    /// tracking.
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.link
    }

    /// Ends the session and returns the link.
    pub fn into_transport(self) -> T {
        self.link
    }

    /// Switches the board into raw REPL mode.
    ///
    /// Succeeds once the raw banner has been read. Also valid in raw mode,
    /// where the board simply reprints the banner.
    pub fn enter_raw(&mut self) -> Result<Mode> {
        if self.mode == Mode::Unknown {
            return Err(Error::Reconnect);
        }
        self.send(ENTER_RAW_SEQ)?;
        self.expect(RAW_BANNER)?;
        self.awaiting_output = false;
        self.mode = Mode::Raw;
        tracing::debug!("entered raw mode");
        Ok(self.mode)
    }

    /// Asks the board to return to the friendly REPL.
    ///
    /// Best effort: nothing is read back, so the board may still be
    /// printing its banner when this returns. From [`Mode::Unknown`] the
    /// request is still sent but the mode stays unknown.
    pub fn exit_raw(&mut self) -> Result<Mode> {
        self.send(EXIT_RAW_SEQ)?;
        self.awaiting_output = false;
        if self.mode != Mode::Unknown {
            self.mode = Mode::Friendly;
        }
        tracing::debug!(mode = ?self.mode, "left raw mode");
        Ok(self.mode)
    }

    /// Soft-reboots the interpreter and waits until raw mode is back.
    ///
    /// Interpreter globals, including open transfer handles, are lost.
    pub fn soft_reboot(&mut self) -> Result<Mode> {
        self.require_raw()?;
        self.send(&[EOT])?;
        self.expect(SOFT_REBOOT_BANNER)?;
        self.expect(RAW_BANNER)?;
        self.awaiting_output = false;
        tracing::debug!("soft reboot complete");
        Ok(self.mode)
    }

    /// Submits `code` for execution without reading its output.
    ///
    /// Waits for the raw prompt (discarding anything printed before it),
    /// writes the snippet and its EOT, then requires the `OK`
    /// acknowledgement. Follow with [`Self::follow`] or
    /// [`Self::follow_into`].
    pub fn exec_raw(&mut self, code: impl AsRef<[u8]>) -> Result<()> {
        let code = code.as_ref();
        self.require_raw()?;
        self.awaiting_output = false;
        self.expect(PROMPT)?;
        tracing::trace!(bytes = code.len(), "submitting snippet");
        self.send_parts(&[code, &[EOT]])?;

        let mut reply = [0u8; 2];
        if let Err(e) = self.link.read_exact(&mut reply) {
            return Err(self.poison(e));
        }
        if reply != ACK {
            tracing::trace!(?reply, "snippet not acknowledged");
            return Err(self.poison(Error::NotAcknowledged {
                reply: reply.to_vec(),
            }));
        }
        self.awaiting_output = true;
        Ok(())
    }

    /// Reads the output and error streams of the submitted snippet.
    pub fn follow(&mut self) -> Result<ExecOutput> {
        self.take_pending()?;
        let stdout = match read_until(&mut self.link, &[EOT]) {
            Ok(data) => strip_eot(data),
            Err(e) => return Err(self.poison(e)),
        };
        let stderr = self.read_stderr()?;
        Ok(ExecOutput { stdout, stderr })
    }

    /// Like [`Self::follow`], but writes standard output to `sink` as it
    /// arrives. The returned `stdout` is empty.
    pub fn follow_into(&mut self, sink: &mut impl Write) -> Result<ExecOutput> {
        self.take_pending()?;
        if let Err(e) = read_until_into(&mut self.link, &[EOT], sink) {
            return Err(self.poison(e));
        }
        let stderr = self.read_stderr()?;
        Ok(ExecOutput {
            stdout: Vec::new(),
            stderr,
        })
    }

    /// Executes `code` and returns its standard output.
    ///
    /// Fails with [`Error::Remote`] carrying the error stream verbatim if
    /// the snippet raised. The session stays in raw mode in that case.
    pub fn exec(&mut self, code: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        self.exec_raw(code)?;
        let out = self.follow()?;
        remote_result(out.stderr)?;
        Ok(out.stdout)
    }

    /// Executes `code`, streaming its standard output to `sink`.
    pub fn exec_into(&mut self, code: impl AsRef<[u8]>, sink: &mut impl Write) -> Result<()> {
        self.exec_raw(code)?;
        let out = self.follow_into(sink)?;
        remote_result(out.stderr)
    }

    /// Fails unless the session is in raw mode.
    fn require_raw(&self) -> Result<()> {
        match self.mode {
            Mode::Raw => Ok(()),
            Mode::Unknown => Err(Error::Reconnect),
            actual => Err(Error::Mode {
                expected: Mode::Raw,
                actual,
            }),
        }
    }

    /// Clears the pending-output flag, failing if nothing was pending.
    fn take_pending(&mut self) -> Result<()> {
        if self.mode == Mode::Unknown {
            return Err(Error::Reconnect);
        }
        if !std::mem::take(&mut self.awaiting_output) {
            return Err(Error::NothingToFollow);
        }
        Ok(())
    }

    /// Reads the error stream; always buffered.
    fn read_stderr(&mut self) -> Result<Vec<u8>> {
        match read_until(&mut self.link, &[EOT]) {
            Ok(data) => Ok(strip_eot(data)),
            Err(e) => Err(self.poison(e)),
        }
    }

    /// Writes `data` and flushes.
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.send_parts(&[data])
    }

    /// Writes each part in order, then flushes.
    fn send_parts(&mut self, parts: &[&[u8]]) -> Result<()> {
        let result = parts
            .iter()
            .try_for_each(|part| self.link.write_all(part))
            .and_then(|()| self.link.flush());
        result.map_err(|e| self.poison(e))
    }

    /// Reads up to and including `banner`.
    fn expect(&mut self, banner: &'static [u8]) -> Result<()> {
        match read_until(&mut self.link, banner) {
            Ok(_) => Ok(()),
            Err(source) => Err(self.poison(Error::Banner { banner, source })),
        }
    }

    /// Marks the session unknown and passes the error through.
    fn poison(&mut self, err: impl Into<Error>) -> Error {
        self.mode = Mode::Unknown;
        self.awaiting_output = false;
        let err = err.into();
        tracing::debug!(error = %err, "session state lost");
        err
    }
}

/// Drops the trailing EOT of a stream, if present.
fn strip_eot(mut data: Vec<u8>) -> Vec<u8> {
    if data.last() == Some(&EOT) {
        data.pop();
    }
    data
}

/// Turns a non-empty error stream into [`Error::Remote`].
fn remote_result(stderr: Vec<u8>) -> Result<()> {
    if stderr.is_empty() {
        Ok(())
    } else {
        Err(Error::Remote(String::from_utf8_lossy(&stderr).into_owned()))
    }
}
