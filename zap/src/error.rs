//! Error types for zap operations.

use std::path::PathBuf;

use crate::session::Mode;

/// Alias for `Result<T, zap::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by zap sessions and transfers.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The serial port could not be opened or configured.
    #[error("serial port: {0}")]
    Serial(#[from] serialport::Error),

    /// Reading from or writing to the link failed (including timeouts).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An expected banner or prompt never arrived.
    #[error("waiting for {:?}: {source}", String::from_utf8_lossy(.banner))]
    Banner {
        /// The banner that was expected.
        banner: &'static [u8],
        /// Why the read stopped.
        source: std::io::Error,
    },

    /// The board answered a snippet with something other than `OK`.
    #[error("could not exec command")]
    NotAcknowledged {
        /// The two bytes received instead.
        reply: Vec<u8>,
    },

    /// The snippet raised on the board; the message is the remote error
    /// text verbatim.
    #[error("{0}")]
    Remote(String),

    /// The operation is not valid in the session's current mode.
    #[error("operation requires {expected:?} mode, session is in {actual:?} mode")]
    Mode {
        /// Mode the operation needs.
        expected: Mode,
        /// Mode the session is in.
        actual: Mode,
    },

    /// Output was requested but no snippet is awaiting it.
    #[error("no executed snippet to follow")]
    NothingToFollow,

    /// An earlier failure left the board in an unknown state.
    #[error("session state is unknown after an earlier failure; reconnect")]
    Reconnect,

    /// A downloaded chunk was not valid base64.
    #[error("malformed chunk from board: {0}")]
    Decode(#[from] zap_proto::chunk::DecodeError),

    /// A local file could not be read or written.
    #[error("{}: {source}", path.display())]
    Local {
        /// The local path involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl Error {
    /// Wraps a local file I/O error with its path.
    pub(crate) fn local(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Local {
            path: path.to_path_buf(),
            source,
        }
    }
}
