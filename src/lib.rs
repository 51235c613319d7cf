//! Wire layer of the qrpc transport.
//!
//! Every call travels on its own connection as exactly one request frame
//! followed by exactly one response frame. A frame is a fixed 17-byte header
//! and a body that has been serialized (native or protobuf) and then
//! compressed (gzip); both choices are recorded in the header so a receiver
//! can decode without being told out of band.

pub mod codec;
pub mod constants;
pub mod frame;
pub mod rpc;
pub mod utils;
