//! Packet header layout.
//!
//! ```text
//! [0..2]  packet id      u16 LE
//! [2]     padding        always 0x00
//! [3..7]  payload length u32 LE, bytes following the header
//! ```

use crate::error::{BinaryError, BinaryResult};

/// Header size in bytes.
pub const HEADER_SIZE: usize = 2 + 1 + 4;

/// A Bancho packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketHeader {
    /// Packet id.
    pub id: u16,
    /// Number of payload bytes following the header.
    pub payload_len: u32,
}

impl PacketHeader {
    /// Creates a new header.
    #[must_use]
    pub const fn new(id: u16, payload_len: u32) -> Self {
        Self { id, payload_len }
    }

    /// Encodes the header into its 7 wire bytes.
    #[must_use]
    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..2].copy_from_slice(&self.id.to_le_bytes());
        out[3..7].copy_from_slice(&self.payload_len.to_le_bytes());
        out
    }

    /// Strictly decodes a header from the start of `buf`.
    ///
    /// A non-zero padding byte is reported as [`BinaryError::ProtocolDesync`]
    /// with an offset of 0; [`PacketReader::read_osu_header`] reports the
    /// cursor offset instead.
    ///
    /// [`PacketReader::read_osu_header`]: crate::PacketReader::read_osu_header
    pub fn parse(buf: &[u8]) -> BinaryResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(BinaryError::OutOfData {
                requested: HEADER_SIZE,
                available: buf.len(),
            });
        }
        if buf[2] != 0 {
            return Err(BinaryError::ProtocolDesync {
                padding: buf[2],
                offset: 0,
            });
        }
        let id = u16::from_le_bytes([buf[0], buf[1]]);
        let payload_len = u32::from_le_bytes([buf[3], buf[4], buf[5], buf[6]]);
        Ok(Self { id, payload_len })
    }
}
