use crate::codec::{CodecError, Serializer};
use serde::{Serialize, de::DeserializeOwned};

/// Compact binary encoding of the native request/response types, backed by
/// `bitcode`'s serde support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSerializer;

impl<M> Serializer<M> for NativeSerializer
where
    M: Serialize + DeserializeOwned,
{
    fn serialize(&self, message: &M) -> Result<Vec<u8>, CodecError> {
        Ok(bitcode::serialize(message)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<M, CodecError> {
        Ok(bitcode::deserialize(bytes)?)
    }
}
