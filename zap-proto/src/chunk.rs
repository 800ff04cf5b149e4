//! Text-safe encoding of file chunks.
//!
//! Files cross the link as base64 text with the standard alphabet. The
//! alphabet contains neither quotes nor backslashes, so an encoded chunk can
//! be embedded in a string literal of a generated snippet as-is.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub use base64::DecodeError;

/// Raw bytes moved per round trip when no other size is configured.
///
/// Large enough to amortise the snippet overhead, small enough for the
/// board's input buffer once base64-expanded.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Encodes one chunk for embedding in a snippet.
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes one chunk printed by the board.
///
/// Surrounding ASCII whitespace (the board's `b2a_base64` appends a
/// newline) is ignored. An empty input decodes to an empty chunk, which
/// marks end of file.
pub fn decode(text: &[u8]) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(text.trim_ascii())
}
