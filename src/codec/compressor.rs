use crate::{constants::MAX_FRAME_BODY_SIZE, frame::CompressType};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use std::io::{self, Read, Write};

/// Byte-stream compression applied after serialization.
pub trait Compressor: Send + Sync {
    fn compress(&self, bytes: &[u8]) -> io::Result<Vec<u8>>;

    /// Output larger than [`MAX_FRAME_BODY_SIZE`] is rejected with
    /// [`io::ErrorKind::InvalidData`].
    fn uncompress(&self, bytes: &[u8]) -> io::Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GzipCompressor;

impl Compressor for GzipCompressor {
    fn compress(&self, bytes: &[u8]) -> io::Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::default());
        encoder.write_all(bytes)?;
        encoder.finish()
    }

    fn uncompress(&self, bytes: &[u8]) -> io::Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(bytes).take(MAX_FRAME_BODY_SIZE as u64 + 1);
        let mut out = Vec::with_capacity(bytes.len().saturating_mul(2).min(MAX_FRAME_BODY_SIZE));
        decoder.read_to_end(&mut out)?;

        if out.len() > MAX_FRAME_BODY_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "uncompressed body exceeds the maximum of {} bytes",
                    MAX_FRAME_BODY_SIZE
                ),
            ));
        }

        Ok(out)
    }
}

impl CompressType {
    pub fn compressor(self) -> &'static dyn Compressor {
        match self {
            CompressType::Gzip => &GzipCompressor,
        }
    }
}
