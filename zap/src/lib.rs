//! Drive a MicroPython board's REPL and filesystem over a serial link.
//!
//! `zap` switches the board between its friendly and raw REPL modes, runs
//! snippets of interpreter code in raw mode and collects their output, and
//! builds file copy and filesystem commands on top of that.
//!
//! # Quick start
//!
//! ```no_run
//! use zap::{LinkConfig, Session};
//!
//! let mut session = Session::open(&LinkConfig::new("/dev/ttyUSB0"))?;
//! session.enter_raw()?;
//! let out = session.exec("import sys\nprint(sys.platform)")?;
//! println!("{}", String::from_utf8_lossy(&out));
//! session.put("main.py", "main.py")?;
//! session.exit_raw()?;
//! # Ok::<(), zap::Error>(())
//! ```

mod error;
mod fs;
mod session;
mod transfer;
mod transport;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use fs::DirEntry;
pub use session::{ExecOutput, Mode, Session, SessionConfig};
pub use transport::{
    DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT, LinkConfig, SerialTransport, Transport,
};
pub use zap_proto::chunk::DEFAULT_CHUNK_SIZE;
