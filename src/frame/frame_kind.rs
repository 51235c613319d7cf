use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// The kind of message carried by a frame.
///
/// `Ping` and `Pong` are reserved: they can be framed and decoded as header
/// values, but nothing in the dispatch path produces or consumes them.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum MessageType {
    Request = 0,
    Response = 1,
    Ping = 2,
    Pong = 3,
}

/// Compression applied to a frame body after serialization.
#[repr(u8)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
pub enum CompressType {
    #[default]
    Gzip = 0,
}

/// Serialization used for a frame body.
#[repr(u8)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
pub enum SerializeType {
    /// Compact native binary encoding (`bitcode`).
    #[default]
    Native = 0,

    /// Protocol-Buffers encoding through the structured-value adapter.
    Protobuf = 1,
}
