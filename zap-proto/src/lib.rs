//! Wire protocol for driving a MicroPython raw REPL over a serial link.
//!
//! The raw REPL is a half-duplex, line-oriented conversation: the host
//! writes a snippet of interpreter source terminated by [`EOT`], the board
//! answers with a 2-byte [`ACK`] followed by two EOT-terminated streams
//! (stdout, then stderr). This crate holds the pieces of that conversation
//! that carry no session state: control bytes and banners, the framing
//! reader, snippet generation, and the base64 chunk codec used for file
//! transfer.

pub mod chunk;
mod framing;
pub mod snippet;
mod wire;

pub use framing::{read_until, read_until_into};
pub use wire::{
    ACK, CONNECT, DIR_FLAG, ENTER_RAW, ENTER_RAW_SEQ, EOT, EXIT_RAW, EXIT_RAW_SEQ, INTERRUPT,
    PROMPT, RAW_BANNER, SOFT_REBOOT_BANNER,
};
