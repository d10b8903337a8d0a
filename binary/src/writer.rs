//! Byte-level writer for Bancho packets.

use crate::error::{BinaryError, BinaryResult};
use crate::header::{PacketHeader, HEADER_SIZE};
use crate::reader::PRESENT_MARKER;
use crate::types::{WireEncode, WireType, WireValue};

/// Largest element count a `u16` list prefix can carry.
pub const MAX_LIST_LEN: usize = u16::MAX as usize;

/// An append-only writer for one outbound packet.
///
/// By default the first [`HEADER_SIZE`] bytes are reserved for the header,
/// which [`finish`](Self::finish) fills in once the payload is complete.
#[derive(Debug, Clone)]
pub struct PacketWriter {
    /// The accumulated bytes, including the reserved header if any.
    bytes: Vec<u8>,
    /// Whether `bytes` starts with a reserved header.
    header_reserved: bool,
}

impl Default for PacketWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketWriter {
    /// Creates a writer with the header pre-reserved.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a writer with the header pre-reserved and room for `payload` bytes.
    #[must_use]
    pub fn with_capacity(payload: usize) -> Self {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + payload);
        bytes.extend_from_slice(&[0u8; HEADER_SIZE]);
        Self {
            bytes,
            header_reserved: true,
        }
    }

    /// Creates a writer without a reserved header, for raw payload fragments.
    #[must_use]
    pub const fn without_header() -> Self {
        Self {
            bytes: Vec::new(),
            header_reserved: false,
        }
    }

    /// Returns `true` if the header is reserved.
    #[must_use]
    pub const fn has_header(&self) -> bool {
        self.header_reserved
    }

    /// Returns the number of payload bytes written so far.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        if self.header_reserved {
            self.bytes.len() - HEADER_SIZE
        } else {
            self.bytes.len()
        }
    }

    /// Returns the payload written so far.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        if self.header_reserved {
            &self.bytes[HEADER_SIZE..]
        } else {
            &self.bytes
        }
    }

    /// Writes a `u8`.
    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    /// Writes an `i8`.
    pub fn write_i8(&mut self, value: i8) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    /// Writes a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    /// Writes a little-endian `i16`.
    pub fn write_i16(&mut self, value: i16) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    /// Writes a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    /// Writes a little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    /// Writes a little-endian `u64`.
    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    /// Writes a little-endian `i64`.
    pub fn write_i64(&mut self, value: i64) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    /// Writes a little-endian IEEE-754 `f32`.
    pub fn write_f32(&mut self, value: f32) -> &mut Self {
        self.write_raw(&value.to_le_bytes())
    }

    /// Writes an unsigned LEB128 integer. Zero is a single `0x00` byte.
    pub fn write_uleb128(&mut self, mut value: u64) -> &mut Self {
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.bytes.push(byte);
            if value == 0 {
                return self;
            }
        }
    }

    /// Writes an osu! string.
    ///
    /// Empty strings are a single `0x00`. Anything else is `0x0B`, the
    /// ULEB128 byte length and the UTF-8 bytes.
    pub fn write_str(&mut self, value: &str) -> &mut Self {
        if value.is_empty() {
            return self.write_u8(0);
        }
        self.write_u8(PRESENT_MARKER)
            .write_uleb128(value.len() as u64)
            .write_raw(value.as_bytes())
    }

    /// Appends raw bytes.
    pub fn write_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Writes a `u16`-count prefixed list.
    pub fn write_list<T: WireEncode>(&mut self, items: &[T]) -> BinaryResult<&mut Self> {
        self.write_list_len(items.len())?;
        for item in items {
            item.encode(self);
        }
        Ok(self)
    }

    /// Writes the protocol's `u16`-count prefixed list of `i32`.
    pub fn write_i32_list(&mut self, items: &[i32]) -> BinaryResult<&mut Self> {
        self.write_list(items)
    }

    /// Writes one dynamically typed value.
    pub fn write_value(&mut self, value: &WireValue) -> &mut Self {
        match value {
            WireValue::U8(v) => self.write_u8(*v),
            WireValue::I8(v) => self.write_i8(*v),
            WireValue::U16(v) => self.write_u16(*v),
            WireValue::I16(v) => self.write_i16(*v),
            WireValue::U32(v) => self.write_u32(*v),
            WireValue::I32(v) => self.write_i32(*v),
            WireValue::U64(v) => self.write_u64(*v),
            WireValue::I64(v) => self.write_i64(*v),
            WireValue::F32(v) => self.write_f32(*v),
            WireValue::Str(v) => self.write_str(v),
        }
    }

    /// Writes a `u16`-count prefixed list of dynamically typed values.
    ///
    /// Every element must carry the `element` tag. Nothing is written when
    /// validation fails.
    pub fn write_value_list(
        &mut self,
        values: &[WireValue],
        element: WireType,
    ) -> BinaryResult<&mut Self> {
        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, value)| value.wire_type() != element)
        {
            return Err(BinaryError::ListTypeMismatch {
                index,
                expected: element,
                found: value.wire_type(),
            });
        }
        self.write_list_len(values.len())?;
        for value in values {
            self.write_value(value);
        }
        Ok(self)
    }

    /// Completes the packet by writing its header and returns the bytes.
    ///
    /// The payload length is every byte written after the header. A writer
    /// created with [`without_header`](Self::without_header) gets the header
    /// prepended rather than overwriting payload bytes.
    ///
    /// Payloads longer than `u32::MAX` bytes cannot be framed; their length
    /// field is truncated.
    #[must_use]
    pub fn finish(mut self, packet_id: impl Into<u16>) -> Vec<u8> {
        #[allow(clippy::cast_possible_truncation)]
        let header = PacketHeader::new(packet_id.into(), self.payload_len() as u32).to_bytes();
        if self.header_reserved {
            self.bytes[..HEADER_SIZE].copy_from_slice(&header);
            return self.bytes;
        }
        let mut framed = Vec::with_capacity(HEADER_SIZE + self.bytes.len());
        framed.extend_from_slice(&header);
        framed.append(&mut self.bytes);
        framed
    }

    /// Returns the raw bytes without filling in a header.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    fn write_list_len(&mut self, len: usize) -> BinaryResult<()> {
        let count = u16::try_from(len).map_err(|_| BinaryError::LengthOverflow {
            length: len,
            max: MAX_LIST_LEN,
        })?;
        self.write_u16(count);
        Ok(())
    }
}
