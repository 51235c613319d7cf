use crate::constants::{FRAME_HEADER_SIZE, MAGIC_NUMBER, VERSION};
use crate::frame::{CompressType, MessageType, SerializeType};

/// The fixed 17-byte header that precedes every frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Must equal [`MAGIC_NUMBER`]; anything else is rejected on decode.
    pub magic_number: u8,

    pub version: u8,

    /// Header plus body length in bytes.
    ///
    /// `FrameCodec::encode` recomputes this from the body it is given, so
    /// callers building a header for sending can leave it at zero.
    pub full_length: u32,

    pub message_type: MessageType,
    pub compress_type: CompressType,
    pub serialize_type: SerializeType,

    /// Correlates a response with the request that opened the connection.
    /// Allocated by the client, echoed verbatim by the server.
    pub request_id: u64,
}

impl FrameHeader {
    /// Creates a header for an outgoing frame. The length is filled in when
    /// the frame is encoded.
    pub fn new(
        message_type: MessageType,
        compress_type: CompressType,
        serialize_type: SerializeType,
        request_id: u64,
    ) -> Self {
        Self {
            magic_number: MAGIC_NUMBER,
            version: VERSION,
            full_length: 0,
            message_type,
            compress_type,
            serialize_type,
            request_id,
        }
    }

    /// Number of body bytes announced by `full_length`.
    ///
    /// Returns `None` if `full_length` is shorter than the header itself.
    pub fn body_length(&self) -> Option<usize> {
        (self.full_length as usize).checked_sub(FRAME_HEADER_SIZE)
    }
}

/// One complete message as it travels over a connection: a header followed
/// by an opaque body.
///
/// The body is still serialized and compressed; what it means is decided by
/// the header's message, serialize and compress types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub body: Vec<u8>,
}
