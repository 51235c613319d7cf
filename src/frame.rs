mod frame_codec;
mod frame_error;
mod frame_kind;
mod frame_struct;

pub use frame_codec::{
    FrameCodec, read_frame, read_frame_body, read_frame_header, write_frame,
};
pub use frame_error::{FrameDecodeError, FrameEncodeError};
pub use frame_kind::{CompressType, MessageType, SerializeType};
pub use frame_struct::{Frame, FrameHeader};
