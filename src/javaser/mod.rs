//! Decoder for Java-serialized TopCoder test arguments.
//!
//! The archive stores each system test's arguments as a base64-encoded
//! `Object[]` written with `ObjectOutputStream`. This module parses the
//! serialization stream and renders the arguments the way Java would print
//! them, e.g. `[5, "abc", [1, 2, 3]]`.

pub mod render;
pub mod stream;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

pub use stream::{Decoded, StreamReader, Value};

/// Errors raised while decoding a serialized argument blob.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Not a serialization stream (magic {magic:#06x}, version {version})")]
    BadHeader { magic: u16, version: u16 },

    #[error("Unexpected end of stream at byte {0}")]
    UnexpectedEof(usize),

    #[error("Unknown type tag {tag:#04x} at byte {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("Reference to unknown handle {0:#x}")]
    BadReference(u32),

    #[error("Invalid field type code {0:#04x}")]
    InvalidTypeCode(u8),

    #[error("Unsupported stream content: {0}")]
    Unsupported(&'static str),

    #[error("Malformed stream: {0}")]
    Malformed(String),

    #[error("Stream nesting too deep")]
    TooDeep,
}

/// Decodes a base64 argument blob into its textual form.
///
/// Whitespace inside the base64 text is ignored.
pub fn decode_args(encoded: &str) -> Result<String, DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact.as_bytes())?;
    decode_bytes(&bytes)
}

/// Decodes a raw serialization stream into its textual form.
pub fn decode_bytes(bytes: &[u8]) -> Result<String, DecodeError> {
    Ok(StreamReader::new(bytes).read_stream()?.render())
}

/// Like [`decode_args`], but falls back to the raw text with a warning.
pub fn decode_args_or_raw(encoded: &str) -> String {
    match decode_args(encoded) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Could not decode test arguments, keeping raw base64");
            encoded.to_string()
        }
    }
}
