use crate::{
    constants::{
        FRAME_COMPRESS_TYPE_OFFSET, FRAME_FULL_LENGTH_OFFSET, FRAME_HEADER_SIZE,
        FRAME_MAGIC_OFFSET, FRAME_MESSAGE_TYPE_OFFSET, FRAME_REQUEST_ID_OFFSET,
        FRAME_SERIALIZE_TYPE_OFFSET, FRAME_VERSION_OFFSET, MAGIC_NUMBER, MAX_FRAME_BODY_SIZE,
    },
    frame::{
        CompressType, Frame, FrameDecodeError, FrameEncodeError, FrameHeader, MessageType,
        SerializeType,
    },
};
use bytes::BufMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Provides encoding and decoding functionality for frames.
///
/// The `FrameCodec` is responsible for writing a `FrameHeader` and body into a
/// byte stream and reading them back. It only moves bytes: what the body means
/// is decided one layer up, by the message pipeline.
///
/// All multi-byte header fields are big-endian.
pub struct FrameCodec;

impl FrameCodec {
    /// Encodes a header and body into a byte vector.
    ///
    /// The header's `full_length` is ignored and recomputed as
    /// `FRAME_HEADER_SIZE + body.len()`, so the encoded frame always satisfies
    /// the length invariant. Bodies larger than [`MAX_FRAME_BODY_SIZE`] are
    /// refused, since no receiver would accept them.
    ///
    /// # Arguments
    ///
    /// * `header` - The header fields to write.
    /// * `body` - The already serialized and compressed body.
    pub fn encode(header: &FrameHeader, body: &[u8]) -> Result<Vec<u8>, FrameEncodeError> {
        if body.len() > MAX_FRAME_BODY_SIZE {
            return Err(FrameEncodeError::TooLarge(body.len()));
        }

        // Fits: MAX_FRAME_BODY_SIZE + 17 is well below u32::MAX.
        let full_length = (FRAME_HEADER_SIZE + body.len()) as u32;
        let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + body.len());

        buf.put_u8(header.magic_number);
        buf.put_u8(header.version);
        buf.put_u32(full_length);
        buf.put_u8(header.message_type.into());
        buf.put_u8(header.compress_type.into());
        buf.put_u8(header.serialize_type.into());
        buf.put_u64(header.request_id);
        buf.put_slice(body);

        Ok(buf)
    }

    /// Parses the fixed-size header.
    ///
    /// Validates the magic number and the enum bytes. The body length is not
    /// checked here; see [`FrameHeader::body_length`].
    pub fn decode_header(buf: &[u8; FRAME_HEADER_SIZE]) -> Result<FrameHeader, FrameDecodeError> {
        let magic_number = buf[FRAME_MAGIC_OFFSET];
        if magic_number != MAGIC_NUMBER {
            return Err(FrameDecodeError::BadMagicNumber {
                expected: MAGIC_NUMBER,
                actual: magic_number,
            });
        }

        let mut full_length = [0u8; 4];
        full_length.copy_from_slice(&buf[FRAME_FULL_LENGTH_OFFSET..FRAME_MESSAGE_TYPE_OFFSET]);

        let mut request_id = [0u8; 8];
        request_id.copy_from_slice(&buf[FRAME_REQUEST_ID_OFFSET..FRAME_HEADER_SIZE]);

        let message_type = buf[FRAME_MESSAGE_TYPE_OFFSET];
        let compress_type = buf[FRAME_COMPRESS_TYPE_OFFSET];
        let serialize_type = buf[FRAME_SERIALIZE_TYPE_OFFSET];

        Ok(FrameHeader {
            magic_number,
            version: buf[FRAME_VERSION_OFFSET],
            full_length: u32::from_be_bytes(full_length),
            message_type: MessageType::try_from(message_type)
                .map_err(|_| FrameDecodeError::UnknownMessageType(message_type))?,
            compress_type: CompressType::try_from(compress_type)
                .map_err(|_| FrameDecodeError::UnknownCompressType(compress_type))?,
            serialize_type: SerializeType::try_from(serialize_type)
                .map_err(|_| FrameDecodeError::UnknownSerializeType(serialize_type))?,
            request_id: u64::from_be_bytes(request_id),
        })
    }

    /// Recovers what a reply needs from a header that failed validation.
    ///
    /// Returns the request id and the codecs named by the header, or `None`
    /// when the magic number is wrong and nothing in `buf` can be trusted.
    /// An unknown codec byte falls back to native serialization or gzip.
    pub fn reply_fields(
        buf: &[u8; FRAME_HEADER_SIZE],
    ) -> Option<(u64, SerializeType, CompressType)> {
        if buf[FRAME_MAGIC_OFFSET] != MAGIC_NUMBER {
            return None;
        }

        let mut request_id = [0u8; 8];
        request_id.copy_from_slice(&buf[FRAME_REQUEST_ID_OFFSET..FRAME_HEADER_SIZE]);

        let serialize_type = SerializeType::try_from(buf[FRAME_SERIALIZE_TYPE_OFFSET])
            .unwrap_or(SerializeType::Native);
        let compress_type =
            CompressType::try_from(buf[FRAME_COMPRESS_TYPE_OFFSET]).unwrap_or(CompressType::Gzip);

        Some((u64::from_be_bytes(request_id), serialize_type, compress_type))
    }

    /// Decodes one complete frame held in memory.
    ///
    /// The buffer must contain exactly one frame: `full_length` has to match
    /// `buf.len()`, otherwise the frame is rejected with
    /// [`FrameDecodeError::LengthMismatch`].
    pub fn decode(buf: &[u8]) -> Result<Frame, FrameDecodeError> {
        let Some(header_bytes) = buf.first_chunk::<FRAME_HEADER_SIZE>() else {
            return Err(FrameDecodeError::Truncated(format!(
                "need {} header bytes, got {}",
                FRAME_HEADER_SIZE,
                buf.len()
            )));
        };

        let header = Self::decode_header(header_bytes)?;
        let announced = header.full_length as usize;

        if header.body_length().is_none() || announced != buf.len() {
            return Err(FrameDecodeError::LengthMismatch {
                announced,
                actual: buf.len(),
            });
        }

        Ok(Frame {
            header,
            body: buf[FRAME_HEADER_SIZE..].to_vec(),
        })
    }
}

/// Reads exactly one frame from an async byte stream.
///
/// Reads the 17 header bytes, validates them, then reads exactly
/// `full_length - 17` body bytes. Partial reads are retried until the exact
/// byte counts are met; an end-of-stream in the middle of a frame fails with
/// [`FrameDecodeError::Truncated`]. Nothing past the announced frame is
/// consumed.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame, FrameDecodeError>
where
    R: AsyncRead + Unpin,
{
    let header = read_frame_header(reader).await?;
    let body = read_frame_body(reader, &header).await?;

    Ok(Frame { header, body })
}

/// Reads and validates the fixed-size header of the next frame.
pub async fn read_frame_header<R>(reader: &mut R) -> Result<FrameHeader, FrameDecodeError>
where
    R: AsyncRead + Unpin,
{
    let mut header_bytes = [0u8; FRAME_HEADER_SIZE];
    reader.read_exact(&mut header_bytes).await?;

    FrameCodec::decode_header(&header_bytes)
}

/// Reads the body announced by `header`, which must have just been read
/// from the same stream.
pub async fn read_frame_body<R>(
    reader: &mut R,
    header: &FrameHeader,
) -> Result<Vec<u8>, FrameDecodeError>
where
    R: AsyncRead + Unpin,
{
    let body_length = header
        .body_length()
        .ok_or(FrameDecodeError::LengthMismatch {
            announced: header.full_length as usize,
            actual: FRAME_HEADER_SIZE,
        })?;

    if body_length > MAX_FRAME_BODY_SIZE {
        return Err(FrameDecodeError::TooLarge(body_length));
    }

    let mut body = vec![0u8; body_length];
    reader.read_exact(&mut body).await?;

    Ok(body)
}

/// Encodes a frame and writes it to an async byte stream, then flushes.
///
/// An oversized body fails with [`std::io::ErrorKind::InvalidInput`] before
/// anything is written.
pub async fn write_frame<W>(
    writer: &mut W,
    header: &FrameHeader,
    body: &[u8],
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = FrameCodec::encode(header, body)?;
    writer.write_all(&bytes).await?;
    writer.flush().await
}
