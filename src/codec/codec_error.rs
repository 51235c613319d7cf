use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("native encoding failed: {0}")]
    Native(#[from] bitcode::Error),

    #[error("protobuf decoding failed: {0}")]
    ProtobufDecode(#[from] prost::DecodeError),

    #[error("invalid field in decoded message: {0}")]
    InvalidField(String),

    #[error("encoded body of {0} bytes exceeds the maximum frame size")]
    TooLarge(usize),

    #[error("compression failed: {0}")]
    Compression(#[from] io::Error),
}
