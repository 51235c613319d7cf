mod codec_error;
mod compressor;
mod native;
pub mod proto;
mod serializer;

pub use codec_error::CodecError;
pub use compressor::{Compressor, GzipCompressor};
pub use native::NativeSerializer;
pub use proto::ProtobufSerializer;
pub use serializer::Serializer;
