use crate::{
    codec::CodecError,
    constants::MAX_FRAME_BODY_SIZE,
    frame::{CompressType, Frame, FrameDecodeError, FrameHeader, MessageType, SerializeType},
    rpc::{RpcRequest, RpcResponse},
};
use thiserror::Error;

/// The decoded body of a request or response frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcMessage {
    Request(RpcRequest),
    Response(RpcResponse),
}

impl RpcMessage {
    pub fn request_id(&self) -> u64 {
        match self {
            RpcMessage::Request(req) => req.request_id,
            RpcMessage::Response(res) => res.request_id,
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            RpcMessage::Request(_) => MessageType::Request,
            RpcMessage::Response(_) => MessageType::Response,
        }
    }
}

/// Anything that prevents a frame from becoming an [`RpcMessage`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Frame(#[from] FrameDecodeError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("unsupported message type {0:?}")]
    UnsupportedMessageType(MessageType),
}

/// Serializes then compresses `message`, returning the header to send it
/// with and the finished body.
///
/// A body that would not fit in one frame fails with
/// [`CodecError::TooLarge`].
pub fn encode_message(
    message: &RpcMessage,
    serialize_type: SerializeType,
    compress_type: CompressType,
) -> Result<(FrameHeader, Vec<u8>), CodecError> {
    let serialized = match message {
        RpcMessage::Request(req) => serialize_type.serialize(req)?,
        RpcMessage::Response(res) => serialize_type.serialize(res)?,
    };

    let body = compress_type.compressor().compress(&serialized)?;
    if body.len() > MAX_FRAME_BODY_SIZE {
        return Err(CodecError::TooLarge(body.len()));
    }

    let header = FrameHeader::new(
        message.message_type(),
        compress_type,
        serialize_type,
        message.request_id(),
    );

    Ok((header, body))
}

/// Uncompresses then deserializes a frame body, using the codecs named in
/// its header.
pub fn decode_message(frame: &Frame) -> Result<RpcMessage, ProtocolError> {
    let header = &frame.header;

    if !matches!(
        header.message_type,
        MessageType::Request | MessageType::Response
    ) {
        return Err(ProtocolError::UnsupportedMessageType(header.message_type));
    }

    let bytes = header
        .compress_type
        .compressor()
        .uncompress(&frame.body)
        .map_err(CodecError::from)?;

    tracing::trace!(
        "Frame {} body uncompressed {} -> {} bytes",
        header.request_id,
        frame.body.len(),
        bytes.len()
    );

    let message = match header.message_type {
        MessageType::Request => RpcMessage::Request(header.serialize_type.deserialize(&bytes)?),
        _ => RpcMessage::Response(header.serialize_type.deserialize(&bytes)?),
    };

    Ok(message)
}
