use crate::{
    codec::{CodecError, NativeSerializer, ProtobufSerializer},
    frame::SerializeType,
};

/// Turns a message into body bytes and back.
pub trait Serializer<M> {
    fn serialize(&self, message: &M) -> Result<Vec<u8>, CodecError>;
    fn deserialize(&self, bytes: &[u8]) -> Result<M, CodecError>;
}

impl SerializeType {
    /// Serializes `message` with the implementation this header byte names.
    pub fn serialize<M>(self, message: &M) -> Result<Vec<u8>, CodecError>
    where
        NativeSerializer: Serializer<M>,
        ProtobufSerializer: Serializer<M>,
    {
        match self {
            SerializeType::Native => NativeSerializer.serialize(message),
            SerializeType::Protobuf => ProtobufSerializer.serialize(message),
        }
    }

    pub fn deserialize<M>(self, bytes: &[u8]) -> Result<M, CodecError>
    where
        NativeSerializer: Serializer<M>,
        ProtobufSerializer: Serializer<M>,
    {
        match self {
            SerializeType::Native => NativeSerializer.deserialize(bytes),
            SerializeType::Protobuf => ProtobufSerializer.deserialize(bytes),
        }
    }
}
