//! Terminator-delimited reads over any byte stream.
//!
//! Both readers pull one byte at a time so they never consume past the
//! terminator; whatever follows it stays in the stream for the next read.

use std::io::{self, Read, Write};

use crate::wire::EOT;

/// Reads from `r` until the accumulated bytes end with `terminator`.
///
/// Returns everything read, terminator included. An empty terminator
/// matches immediately without reading. End of stream before the
/// terminator is reported as [`io::ErrorKind::UnexpectedEof`]; any other
/// read error (including a transport timeout) is returned unchanged.
///
/// There is no upper bound on the amount buffered: callers must only use
/// this for responses whose size they control.
pub fn read_until(r: &mut impl Read, terminator: &[u8]) -> io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(1024);
    if terminator.is_empty() {
        return Ok(data);
    }
    let mut byte = [0u8; 1];
    loop {
        r.read_exact(&mut byte)?;
        data.push(byte[0]);
        if data.ends_with(terminator) {
            return Ok(data);
        }
    }
}

/// Reads from `r` until `terminator` is seen, forwarding bytes to `sink`.
///
/// Every byte except [`EOT`] is written to `sink` as soon as it arrives.
/// EOT bytes are withheld from the sink but still count towards matching
/// the terminator, so `read_until_into(r, &[EOT], sink)` streams one
/// board output stream without its end marker.
pub fn read_until_into(
    r: &mut impl Read,
    terminator: &[u8],
    sink: &mut impl Write,
) -> io::Result<()> {
    if terminator.is_empty() {
        return Ok(());
    }
    let mut window = Vec::with_capacity(terminator.len());
    let mut byte = [0u8; 1];
    loop {
        r.read_exact(&mut byte)?;
        if byte[0] != EOT {
            sink.write_all(&byte)?;
        }
        if window.len() == terminator.len() {
            window.remove(0);
        }
        window.push(byte[0]);
        if window == terminator {
            return sink.flush();
        }
    }
}
