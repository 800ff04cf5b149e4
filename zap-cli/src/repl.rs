//! `zap repl`: hands the local terminal over to the board's friendly REPL.
//!
//! Two independent copy loops run in opposite directions: board → stdout on
//! a background thread, stdin → board on the calling thread. Nothing is
//! framed or interpreted except the escape key.

use std::io::{self, Read, Write};

use anyhow::Result;

use crate::board::LinkArgs;

/// Ctrl-]: leaves the pass-through.
const ESCAPE: u8 = 0x1d;

#[cfg(unix)]
pub fn run(link: &LinkArgs) -> Result<()> {
    let session = link.connect()?;
    let mut to_board = session.into_transport();
    let mut from_board = to_board.try_clone()?;

    eprintln!("Connected. Press Ctrl-] to exit.");
    let _raw = RawModeGuard::enable()?;

    std::thread::spawn(move || pump(&mut from_board, &mut io::stdout()));
    forward(&mut io::stdin().lock(), &mut to_board)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn run(_link: &LinkArgs) -> Result<()> {
    anyhow::bail!("the interactive REPL requires a Unix terminal")
}

/// Copies board output to `out` until the link fails.
///
/// Read timeouts only mean the board is quiet and are ignored.
fn pump(board: &mut impl Read, out: &mut impl Write) -> io::Result<()> {
    let mut buf = [0u8; 256];
    loop {
        match board.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => {
                out.write_all(&buf[..n])?;
                out.flush()?;
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => {}
            Err(e) => return Err(e),
        }
    }
}

/// Copies `input` to the board until end of input or [`ESCAPE`].
fn forward(input: &mut impl Read, board: &mut impl Write) -> io::Result<()> {
    let mut buf = [0u8; 64];
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let chunk = &buf[..n];
        if let Some(pos) = chunk.iter().position(|&b| b == ESCAPE) {
            board.write_all(&chunk[..pos])?;
            return board.flush();
        }
        board.write_all(chunk)?;
        board.flush()?;
    }
}

/// Keeps stdin in raw mode until dropped.
#[cfg(unix)]
struct RawModeGuard {
    saved: nix::sys::termios::Termios,
}

#[cfg(unix)]
impl RawModeGuard {
    fn enable() -> Result<Self> {
        use nix::sys::termios::{SetArg, cfmakeraw, tcgetattr, tcsetattr};

        let stdin = io::stdin();
        let saved = tcgetattr(&stdin)?;
        let mut raw = saved.clone();
        cfmakeraw(&mut raw);
        tcsetattr(&stdin, SetArg::TCSANOW, &raw)?;
        Ok(Self { saved })
    }
}

#[cfg(unix)]
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        use nix::sys::termios::{SetArg, tcsetattr};

        let _ = tcsetattr(io::stdin(), SetArg::TCSANOW, &self.saved);
    }
}
