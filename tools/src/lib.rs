//! Inspection and debugging tools for Bancho packet captures.
//!
//! This crate provides utilities for looking inside raw packet streams:
//!
//! - List the packets in a capture with their ids and sizes
//! - Decode payloads against a list of field types
//! - Build packets from typed field values
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what is on the wire.

use std::fmt::Write as _;

use anyhow::{anyhow, Context, Result};
use binary::{BinaryError, PacketReader, PacketWriter, WireType, WireValue, HEADER_SIZE};
use serde::{Serialize, Serializer};
use wire::PacketId;

/// One packet found by [`inspect_packets`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketSummary {
    /// Offset of the header within the capture.
    pub offset: usize,
    pub id: u16,
    /// Name of the id, if it is a known one.
    pub name: Option<&'static str>,
    pub payload_len: usize,
}

/// Packet layout of a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub total_bytes: usize,
    pub packets: Vec<PacketSummary>,
    /// Bytes after the last complete packet.
    pub trailing_bytes: usize,
    /// Why scanning stopped early, if it did.
    pub error: Option<String>,
}

/// A packet decoded by [`decode_packets`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedPacket {
    pub id: u16,
    pub name: Option<&'static str>,
    pub fields: Vec<DecodedField>,
    /// Payload bytes left after the requested fields.
    pub unread_bytes: usize,
}

/// One decoded payload field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedField {
    #[serde(rename = "type")]
    pub ty: &'static str,
    #[serde(serialize_with = "serialize_value")]
    pub value: WireValue,
}

/// Lists every packet in `bytes`.
///
/// Scanning stops at the first header or payload that does not fit; the
/// remaining bytes are reported as trailing.
pub fn inspect_packets(bytes: &[u8]) -> InspectReport {
    let mut reader = PacketReader::new(bytes);
    let mut packets = Vec::new();
    let mut offset = 0;
    let mut error = None;

    for packet in reader.packets() {
        match packet {
            Ok(packet) => {
                let payload_len = packet.payload.len();
                packets.push(PacketSummary {
                    offset,
                    id: packet.id,
                    name: PacketId::from_raw(packet.id).map(PacketId::name),
                    payload_len,
                });
                offset += HEADER_SIZE + payload_len;
            }
            Err(err) => error = Some(err.to_string()),
        }
    }

    InspectReport {
        total_bytes: bytes.len(),
        packets,
        trailing_bytes: bytes.len() - offset,
        error,
    }
}

/// Decodes the packets in `bytes`, reading `fields` from each payload.
///
/// When `only` is set, packets with a different id are skipped.
pub fn decode_packets(
    bytes: &[u8],
    only: Option<u16>,
    fields: &[WireType],
) -> Result<Vec<DecodedPacket>> {
    let mut reader = PacketReader::new(bytes);
    let mut decoded = Vec::new();

    for (index, packet) in reader.packets().enumerate() {
        let mut packet = packet.with_context(|| format!("packet {index}"))?;
        if only.is_some_and(|id| id != packet.id) {
            continue;
        }
        let mut values = Vec::with_capacity(fields.len());
        for (field, ty) in fields.iter().enumerate() {
            let value = packet
                .payload
                .read_type(*ty)
                .with_context(|| format!("packet {index} (id {}) field {field} ({ty})", packet.id))?;
            values.push(DecodedField {
                ty: ty.name(),
                value,
            });
        }
        decoded.push(DecodedPacket {
            id: packet.id,
            name: PacketId::from_raw(packet.id).map(PacketId::name),
            fields: values,
            unread_bytes: packet.remaining(),
        });
    }
    Ok(decoded)
}

/// Builds a framed packet from typed values.
pub fn build_packet(id: u16, values: &[WireValue]) -> Vec<u8> {
    let mut writer = PacketWriter::new();
    for value in values {
        writer.write_value(value);
    }
    writer.finish(id)
}

/// Parses a `type=value` field, such as `u16=5` or `str=hello`.
pub fn parse_field(text: &str) -> Result<WireValue, BinaryError> {
    let Some((ty, value)) = text.split_once('=') else {
        let ty: WireType = text.parse()?;
        return Err(BinaryError::InvalidValue {
            ty,
            text: String::new(),
        });
    };
    WireValue::parse(ty.parse()?, value)
}

/// Parses a packet id given as a number or a name such as `OsuPing`.
pub fn parse_packet_id(text: &str) -> Result<u16> {
    if let Ok(raw) = text.parse::<u16>() {
        return Ok(raw);
    }
    PacketId::ALL
        .iter()
        .find(|id| id.name().eq_ignore_ascii_case(text))
        .map(|id| id.raw())
        .ok_or_else(|| anyhow!("unknown packet id: {text}"))
}

/// Renders decoded packets one per line.
pub fn format_decode_pretty(packets: &[DecodedPacket]) -> String {
    let mut out = String::new();
    for packet in packets {
        let _ = write!(out, "{} ({})", packet.name.unwrap_or("Unknown"), packet.id);
        for field in &packet.fields {
            let _ = write!(out, " {}={}", field.ty, field.value);
        }
        if packet.unread_bytes > 0 {
            let _ = write!(out, " [+{} bytes]", packet.unread_bytes);
        }
        out.push('\n');
    }
    out
}

fn serialize_value<S: Serializer>(value: &WireValue, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        WireValue::U8(v) => serializer.serialize_u8(*v),
        WireValue::I8(v) => serializer.serialize_i8(*v),
        WireValue::U16(v) => serializer.serialize_u16(*v),
        WireValue::I16(v) => serializer.serialize_i16(*v),
        WireValue::U32(v) => serializer.serialize_u32(*v),
        WireValue::I32(v) => serializer.serialize_i32(*v),
        WireValue::U64(v) => serializer.serialize_u64(*v),
        WireValue::I64(v) => serializer.serialize_i64(*v),
        WireValue::F32(v) => serializer.serialize_f32(*v),
        WireValue::Str(v) => serializer.serialize_str(v),
    }
}
