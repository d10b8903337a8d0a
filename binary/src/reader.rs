//! Byte-level reader for Bancho packets.

use crate::error::{BinaryError, BinaryResult};
use crate::header::{PacketHeader, HEADER_SIZE};
use crate::packets::{Packet, Packets};
use crate::types::{WireDecode, WireType, WireValue};

/// Marker byte announcing that a value follows.
pub const PRESENT_MARKER: u8 = 0x0B;

/// A cursor over an immutable packet buffer.
///
/// All read operations are bounds-checked and return errors on failure.
/// A failed read leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    /// Creates a new `PacketReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the total length of the underlying buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Returns the current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the whole underlying buffer.
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the unread part of the buffer without consuming it.
    #[must_use]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> BinaryResult<&'a [u8]> {
        self.ensure_bytes(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Skips `len` bytes, returning the new offset.
    pub fn skip(&mut self, len: usize) -> BinaryResult<usize> {
        self.ensure_bytes(len)?;
        self.pos += len;
        Ok(self.pos)
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> BinaryResult<u8> {
        self.ensure_bytes(1)?;
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Reads an `i8`.
    pub fn read_i8(&mut self) -> BinaryResult<i8> {
        Ok(i8::from_le_bytes(self.read_array::<1>()?))
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> BinaryResult<u16> {
        Ok(u16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Reads a little-endian `i16`.
    pub fn read_i16(&mut self) -> BinaryResult<i16> {
        Ok(i16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> BinaryResult<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> BinaryResult<i32> {
        Ok(i32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64(&mut self) -> BinaryResult<u64> {
        Ok(u64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Reads a little-endian `i64`.
    pub fn read_i64(&mut self) -> BinaryResult<i64> {
        Ok(i64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Reads a little-endian IEEE-754 `f32`.
    pub fn read_f32(&mut self) -> BinaryResult<f32> {
        Ok(f32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads an unsigned LEB128 integer.
    ///
    /// Groups of 7 bits, least significant first; the high bit of each byte
    /// is set while more groups follow.
    pub fn read_uleb128(&mut self) -> BinaryResult<u64> {
        self.rewind_on_error(|reader| {
            let start = reader.pos;
            let mut value = 0u64;
            let mut shift = 0u32;
            loop {
                let byte = reader.read_u8()?;
                let group = u64::from(byte & 0x7F);
                if shift >= 64 {
                    if group != 0 {
                        return Err(BinaryError::VarintOverflow { offset: start });
                    }
                } else {
                    if shift > 57 && group >> (64 - shift) != 0 {
                        return Err(BinaryError::VarintOverflow { offset: start });
                    }
                    value |= group << shift;
                }
                if byte & 0x80 == 0 {
                    return Ok(value);
                }
                shift += 7;
            }
        })
    }

    /// Reads a marker-gated LEB128 integer.
    ///
    /// Consumes one byte; unless it is [`PRESENT_MARKER`] the value is absent
    /// and `0` is returned. Otherwise an unsigned LEB128 follows.
    pub fn read_marked_uleb128(&mut self) -> BinaryResult<u64> {
        self.rewind_on_error(|reader| {
            if reader.read_u8()? != PRESENT_MARKER {
                return Ok(0);
            }
            reader.read_uleb128()
        })
    }

    /// Reads an osu! string without copying.
    ///
    /// `0x00` is the empty string. Any other existence byte is followed by a
    /// ULEB128 byte length and the UTF-8 bytes.
    pub fn read_str_ref(&mut self) -> BinaryResult<&'a str> {
        self.rewind_on_error(|reader| {
            if reader.read_u8()? == 0 {
                return Ok("");
            }
            let len = reader.read_uleb128()?;
            let len = usize::try_from(len).map_err(|_| BinaryError::OutOfData {
                requested: usize::MAX,
                available: reader.remaining(),
            })?;
            let bytes = reader.read_bytes(len)?;
            std::str::from_utf8(bytes).map_err(|err| BinaryError::InvalidEncoding {
                valid_up_to: err.valid_up_to(),
            })
        })
    }

    /// Reads an osu! string.
    pub fn read_str(&mut self) -> BinaryResult<String> {
        self.read_str_ref().map(str::to_owned)
    }

    /// Reads a `u16`-count prefixed list of `T`.
    pub fn read_list<T: WireDecode>(&mut self) -> BinaryResult<Vec<T>> {
        self.rewind_on_error(|reader| {
            let count = usize::from(reader.read_u16()?);
            let mut items = Vec::with_capacity(count.min(reader.remaining()));
            for _ in 0..count {
                items.push(T::decode(reader)?);
            }
            Ok(items)
        })
    }

    /// Reads the protocol's `u16`-count prefixed list of `i32`.
    pub fn read_i32_list(&mut self) -> BinaryResult<Vec<i32>> {
        self.read_list::<i32>()
    }

    /// Reads one value of a statically known wire type.
    pub fn read<T: WireDecode>(&mut self) -> BinaryResult<T> {
        T::decode(self)
    }

    /// Reads one value of the given wire type.
    pub fn read_type(&mut self, ty: WireType) -> BinaryResult<WireValue> {
        let value = match ty {
            WireType::U8 => WireValue::U8(self.read_u8()?),
            WireType::I8 => WireValue::I8(self.read_i8()?),
            WireType::U16 => WireValue::U16(self.read_u16()?),
            WireType::I16 => WireValue::I16(self.read_i16()?),
            WireType::U32 => WireValue::U32(self.read_u32()?),
            WireType::I32 => WireValue::I32(self.read_i32()?),
            WireType::U64 => WireValue::U64(self.read_u64()?),
            WireType::I64 => WireValue::I64(self.read_i64()?),
            WireType::F32 => WireValue::F32(self.read_f32()?),
            WireType::Str => WireValue::Str(self.read_str()?),
        };
        Ok(value)
    }

    /// Strictly reads a packet header.
    ///
    /// A non-zero padding byte means the reader is no longer aligned with
    /// packet boundaries and is reported as [`BinaryError::ProtocolDesync`].
    pub fn read_osu_header(&mut self) -> BinaryResult<PacketHeader> {
        self.rewind_on_error(|reader| {
            let offset = reader.pos;
            let bytes = reader.read_bytes(HEADER_SIZE)?;
            PacketHeader::parse(bytes).map_err(|err| match err {
                BinaryError::ProtocolDesync { padding, .. } => {
                    BinaryError::ProtocolDesync { padding, offset }
                }
                other => other,
            })
        })
    }

    /// Reads the next packet header, ignoring the padding byte.
    ///
    /// Returns `None` once the buffer is exhausted. The payload is NOT
    /// skipped: the caller must consume exactly `payload_len` bytes before
    /// asking for the next header. Use [`packets`](Self::packets) to have
    /// the boundary enforced instead.
    pub fn next_header(&mut self) -> Option<BinaryResult<PacketHeader>> {
        if self.is_empty() {
            return None;
        }
        Some(self.rewind_on_error(|reader| {
            let id = reader.read_u16()?;
            reader.skip(1)?;
            let payload_len = reader.read_u32()?;
            Ok(PacketHeader { id, payload_len })
        }))
    }

    /// Iterates over the remaining packets, each with a payload-bounded reader.
    pub fn packets(&mut self) -> Packets<'_, 'a> {
        Packets::new(self)
    }

    /// Reads one header and its payload as a bounded reader.
    pub(crate) fn read_packet(&mut self) -> BinaryResult<Packet<'a>> {
        self.rewind_on_error(|reader| {
            let id = reader.read_u16()?;
            reader.skip(1)?;
            let payload_len = reader.read_u32()? as usize;
            let payload = reader.read_bytes(payload_len)?;
            Ok(Packet {
                id,
                payload: PacketReader::new(payload),
            })
        })
    }

    fn ensure_bytes(&self, len: usize) -> BinaryResult<()> {
        let available = self.remaining();
        if len > available {
            return Err(BinaryError::OutOfData {
                requested: len,
                available,
            });
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> BinaryResult<[u8; N]> {
        self.ensure_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn rewind_on_error<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> BinaryResult<T>,
    ) -> BinaryResult<T> {
        let start = self.pos;
        let result = read(self);
        if result.is_err() {
            self.pos = start;
        }
        result
    }
}
