//! Stream framing over a receive buffer.
//!
//! TCP delivers Bancho packets in arbitrary chunks. [`FrameDecoder`] keeps
//! the header of a partially received packet between calls so the caller can
//! keep appending to one `BytesMut` and pull frames out as they complete.

use binary::{BinaryError, PacketHeader, PacketReader, HEADER_SIZE};
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, FrameResult, LimitKind};
use crate::ids::PacketId;
use crate::limits::Limits;

/// One complete packet taken off the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw packet id.
    pub id: u16,
    /// Payload bytes, without the header.
    pub payload: Bytes,
}

impl Frame {
    /// Creates a frame from an id and payload.
    pub fn new(id: impl Into<u16>, payload: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
        }
    }

    /// Resolves the packet id, if it is a known one.
    #[must_use]
    pub const fn kind(&self) -> Option<PacketId> {
        PacketId::from_raw(self.id)
    }

    /// Returns a reader over the payload.
    #[must_use]
    pub fn reader(&self) -> PacketReader<'_> {
        PacketReader::new(&self.payload)
    }

    /// Returns the number of payload bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[derive(Debug, Default)]
enum DecodeState {
    #[default]
    Header,
    Payload {
        id: u16,
        length: usize,
    },
}

/// Incremental decoder for a stream of Bancho packets.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    limits: Limits,
    state: DecodeState,
}

impl FrameDecoder {
    /// Creates a decoder enforcing the given limits.
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            state: DecodeState::Header,
        }
    }

    /// Returns the limits this decoder enforces.
    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Returns `true` if a header has been consumed but its payload has not
    /// fully arrived.
    #[must_use]
    pub const fn is_mid_frame(&self) -> bool {
        matches!(self.state, DecodeState::Payload { .. })
    }

    /// Attempts to take one frame off the front of `buf`.
    ///
    /// Returns `Ok(None)` when more data is needed. After an error the
    /// stream is desynchronized and the connection should be dropped.
    ///
    /// # Errors
    ///
    /// - [`BinaryError::ProtocolDesync`] if a header's padding byte is not zero
    /// - [`FrameError::LimitsExceeded`] if a header announces an oversized
    ///   payload or too much data is buffered without completing a frame
    pub fn decode(&mut self, buf: &mut BytesMut) -> FrameResult<Option<Frame>> {
        loop {
            match self.state {
                DecodeState::Header => {
                    if buf.len() < HEADER_SIZE {
                        return self.need_more(buf);
                    }
                    let header = PacketHeader::parse(&buf[..HEADER_SIZE])?;
                    let length = usize::try_from(header.payload_len).unwrap_or(usize::MAX);
                    if length > self.limits.max_payload_bytes {
                        return Err(FrameError::LimitsExceeded {
                            kind: LimitKind::PayloadBytes,
                            limit: self.limits.max_payload_bytes,
                            actual: length,
                        });
                    }
                    buf.advance(HEADER_SIZE);
                    self.state = DecodeState::Payload {
                        id: header.id,
                        length,
                    };
                }
                DecodeState::Payload { id, length } => {
                    if buf.len() < length {
                        return self.need_more(buf);
                    }
                    let payload = buf.split_to(length).freeze();
                    self.state = DecodeState::Header;
                    tracing::trace!(id, length, "framed packet");
                    return Ok(Some(Frame { id, payload }));
                }
            }
        }
    }

    /// Takes every complete frame off the front of `buf`.
    ///
    /// # Errors
    ///
    /// Returns the first error [`decode`](Self::decode) reports.
    pub fn decode_all(&mut self, buf: &mut BytesMut) -> FrameResult<Vec<Frame>> {
        let mut frames = Vec::new();
        while let Some(frame) = self.decode(buf)? {
            frames.push(frame);
        }
        Ok(frames)
    }

    fn need_more(&self, buf: &BytesMut) -> FrameResult<Option<Frame>> {
        if buf.len() > self.limits.max_buffered_bytes {
            return Err(FrameError::LimitsExceeded {
                kind: LimitKind::BufferedBytes,
                limit: self.limits.max_buffered_bytes,
                actual: buf.len(),
            });
        }
        Ok(None)
    }
}

/// Appends a framed packet to `out`.
///
/// # Errors
///
/// Returns [`BinaryError::LengthOverflow`] if the payload does not fit the
/// header's `u32` length field.
pub fn encode_frame(id: impl Into<u16>, payload: &[u8], out: &mut BytesMut) -> FrameResult<()> {
    let payload_len = u32::try_from(payload.len()).map_err(|_| BinaryError::LengthOverflow {
        length: payload.len(),
        max: u32::MAX as usize,
    })?;
    out.reserve(HEADER_SIZE + payload.len());
    out.put_slice(&PacketHeader::new(id.into(), payload_len).to_bytes());
    out.put_slice(payload);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use binary::PacketWriter;

    fn ping_and_message() -> Vec<u8> {
        let mut message = PacketWriter::new();
        message.write_str("peppy").write_str("hello").write_str("#osu").write_i32(0);
        let mut bytes = PacketWriter::new().finish(PacketId::OsuPing);
        bytes.extend(message.finish(PacketId::OsuSendPublicMessage));
        bytes
    }

    #[test]
    fn decodes_whole_buffer() {
        let mut buf = BytesMut::from(&ping_and_message()[..]);
        let mut decoder = FrameDecoder::default();
        let frames = decoder.decode_all(&mut buf).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].kind(), Some(PacketId::OsuPing));
        assert!(frames[0].is_empty());
        assert_eq!(frames[1].kind(), Some(PacketId::OsuSendPublicMessage));
        let mut reader = frames[1].reader();
        assert_eq!(reader.read_str().unwrap(), "peppy");
        assert!(buf.is_empty());
    }

    #[test]
    fn decodes_byte_at_a_time() {
        let bytes = ping_and_message();
        let mut buf = BytesMut::new();
        let mut decoder = FrameDecoder::default();
        let mut frames = Vec::new();
        for byte in bytes {
            buf.put_u8(byte);
            frames.extend(decoder.decode_all(&mut buf).unwrap());
        }
        let ids: Vec<_> = frames.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![4, 1]);
        assert!(!decoder.is_mid_frame());
    }

    #[test]
    fn partial_payload_keeps_header() {
        let mut buf = BytesMut::new();
        encode_frame(PacketId::ChoNotification, b"abcdef", &mut buf).unwrap();
        let mut head = buf.split_to(HEADER_SIZE + 2);

        let mut decoder = FrameDecoder::default();
        assert_eq!(decoder.decode(&mut head).unwrap(), None);
        assert!(decoder.is_mid_frame());

        head.unsplit(buf);
        let frame = decoder.decode(&mut head).unwrap().unwrap();
        assert_eq!(&frame.payload[..], b"abcdef");
    }

    #[test]
    fn nonzero_padding_is_desync() {
        let mut buf = BytesMut::from(&[0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00][..]);
        let err = FrameDecoder::default().decode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Binary(BinaryError::ProtocolDesync { padding: 0x01, .. })
        ));
    }

    #[test]
    fn oversized_payload_rejected_before_buffering() {
        let mut buf = BytesMut::new();
        buf.put_slice(&PacketHeader::new(4, 2048).to_bytes());
        let err = FrameDecoder::new(Limits::for_testing())
            .decode(&mut buf)
            .unwrap_err();
        assert_eq!(
            err,
            FrameError::LimitsExceeded {
                kind: LimitKind::PayloadBytes,
                limit: 1024,
                actual: 2048,
            }
        );
    }

    #[test]
    fn buffered_limit() {
        let limits = Limits {
            max_payload_bytes: usize::MAX,
            max_buffered_bytes: 16,
        };
        let mut buf = BytesMut::new();
        buf.put_slice(&PacketHeader::new(4, 64).to_bytes());
        buf.put_slice(&[0u8; 32]);
        let err = FrameDecoder::new(limits).decode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::LimitsExceeded {
                kind: LimitKind::BufferedBytes,
                ..
            }
        ));
    }

    #[test]
    fn encode_frame_layout() {
        let mut out = BytesMut::new();
        encode_frame(PacketId::ChoPong, &[], &mut out).unwrap();
        encode_frame(7u16, &[0xAA], &mut out).unwrap();
        assert_eq!(
            &out[..],
            &[8, 0, 0, 0, 0, 0, 0, 7, 0, 0, 1, 0, 0, 0, 0xAA]
        );
    }

    #[test]
    fn unknown_id_has_no_kind() {
        let frame = Frame::new(35u16, Bytes::new());
        assert_eq!(frame.kind(), None);
        assert_eq!(frame.len(), 0);
    }
}
