use std::io;
use thiserror::Error;

/// Failures while reading a single frame off the wire.
///
/// Every variant is a protocol-level failure: the codec never panics on
/// malformed input.
#[derive(Debug, Error)]
pub enum FrameDecodeError {
    #[error("magic number error: expected {expected:#04x}, got {actual:#04x}")]
    BadMagicNumber { expected: u8, actual: u8 },

    /// The stream ended before the header or the announced body was complete.
    #[error("truncated frame: {0}")]
    Truncated(String),

    /// `full_length` does not describe the bytes that were supplied.
    #[error("frame length mismatch: header announces {announced} bytes, got {actual}")]
    LengthMismatch { announced: usize, actual: usize },

    #[error("frame body of {0} bytes exceeds the maximum frame size")]
    TooLarge(usize),

    #[error("unknown message type {0}")]
    UnknownMessageType(u8),

    #[error("unknown compress type {0}")]
    UnknownCompressType(u8),

    #[error("unknown serialize type {0}")]
    UnknownSerializeType(u8),

    #[error("i/o error while reading frame: {0}")]
    Io(io::Error),
}

impl From<io::Error> for FrameDecodeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => FrameDecodeError::Truncated(err.to_string()),
            _ => FrameDecodeError::Io(err),
        }
    }
}

/// Failures while building a frame for sending.
#[derive(Debug, Error)]
pub enum FrameEncodeError {
    #[error("frame body of {0} bytes exceeds the maximum frame size")]
    TooLarge(usize),
}

impl From<FrameEncodeError> for io::Error {
    fn from(err: FrameEncodeError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, err)
    }
}
