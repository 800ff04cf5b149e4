//! Control bytes and banners exchanged with the board.

/// Ctrl-C: interrupts a running program.
pub const INTERRUPT: u8 = 0x03;

/// Ctrl-A: switches the board into raw REPL mode.
pub const ENTER_RAW: u8 = 0x01;

/// Ctrl-B: returns the board to the friendly REPL.
pub const EXIT_RAW: u8 = 0x02;

/// Ctrl-D: end of snippet (host → board), end of stream (board → host),
/// and soft reboot when sent with no pending snippet.
pub const EOT: u8 = 0x04;

/// Sequence written right after the link opens: stops any running program.
pub const CONNECT: &[u8] = b"\r\x03\x03";

/// Sequence that requests raw REPL mode.
pub const ENTER_RAW_SEQ: &[u8] = b"\r\x01";

/// Sequence that requests the friendly REPL.
pub const EXIT_RAW_SEQ: &[u8] = b"\r\x02";

/// Banner printed by the board once raw REPL mode is active.
pub const RAW_BANNER: &[u8] = b"raw REPL; CTRL-B to exit\r\n";

/// Banner printed by the board when a soft reboot starts.
pub const SOFT_REBOOT_BANNER: &[u8] = b"soft reboot\r\n";

/// Raw REPL prompt; the board is ready for the next snippet.
pub const PROMPT: &[u8] = b">";

/// Acknowledgement sent after the board has accepted a snippet.
pub const ACK: &[u8] = b"OK";

/// Bit set in the `ilistdir` type field for directories.
pub const DIR_FLAG: u32 = 0x4000;
