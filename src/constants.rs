// Frame related constants

/// Sentinel byte every frame must start with.
pub const MAGIC_NUMBER: u8 = 0x1d;

/// Protocol version written into outgoing frames.
pub const VERSION: u8 = 0x01;

/// Byte offset of the 1-byte magic number.
pub const FRAME_MAGIC_OFFSET: usize = 0;

/// Byte offset of the 1-byte protocol version.
pub const FRAME_VERSION_OFFSET: usize = 1;

/// Byte offset where the 4-byte full length (u32, big-endian) begins.
/// The value counts the header plus the body.
pub const FRAME_FULL_LENGTH_OFFSET: usize = 2;

/// Byte offset of the 1-byte message type.
/// Values correspond to enum `MessageType` variants.
pub const FRAME_MESSAGE_TYPE_OFFSET: usize = 6;

/// Byte offset of the 1-byte compression type.
pub const FRAME_COMPRESS_TYPE_OFFSET: usize = 7;

/// Byte offset of the 1-byte serialization type.
pub const FRAME_SERIALIZE_TYPE_OFFSET: usize = 8;

/// Byte offset where the 8-byte request ID (u64, big-endian) begins.
/// This is the sole request/response correlation key.
pub const FRAME_REQUEST_ID_OFFSET: usize = 9;

/// Total size of the fixed-length header.
/// Computed as: offset of the request ID + its size (9 + 8 = 17).
pub const FRAME_HEADER_SIZE: usize = FRAME_REQUEST_ID_OFFSET + 8;

/// Upper bound on a single frame body. A header announcing more than this is
/// rejected before any body bytes are read.
pub const MAX_FRAME_BODY_SIZE: usize = 64 * 1024 * 1024;

// Response codes

pub const CODE_SUCCESS: u16 = 200;
pub const CODE_ERROR: u16 = 500;
pub const CODE_THROTTLED: u16 = 700;
