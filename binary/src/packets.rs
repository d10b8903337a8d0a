//! Packet iteration with payload-bounded readers.

use std::iter::FusedIterator;

use crate::error::BinaryResult;
use crate::header::PacketHeader;
use crate::reader::PacketReader;

/// One packet taken from a stream of concatenated packets.
#[derive(Debug, Clone)]
pub struct Packet<'a> {
    /// Packet id.
    pub id: u16,
    /// Reader bounded to exactly this packet's payload.
    pub payload: PacketReader<'a>,
}

impl<'a> Packet<'a> {
    /// Returns the header this packet was framed with.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn header(&self) -> PacketHeader {
        PacketHeader::new(self.id, self.payload.len() as u32)
    }

    /// Returns the full payload bytes.
    #[must_use]
    pub const fn payload_bytes(&self) -> &'a [u8] {
        self.payload.as_bytes()
    }

    /// Returns the number of payload bytes not yet read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.payload.remaining()
    }
}

/// Iterator over the packets left in a [`PacketReader`].
///
/// Each step reads one header and hands out the payload as a separate
/// reader, advancing the parent past the whole payload. How much of a
/// payload the caller reads never affects where the next header is read.
///
/// A truncated header or payload is yielded once as an error, after which
/// the iterator is exhausted.
#[derive(Debug)]
pub struct Packets<'r, 'a> {
    reader: &'r mut PacketReader<'a>,
    failed: bool,
}

impl<'r, 'a> Packets<'r, 'a> {
    pub(crate) fn new(reader: &'r mut PacketReader<'a>) -> Self {
        Self {
            reader,
            failed: false,
        }
    }
}

impl<'a> Iterator for Packets<'_, 'a> {
    type Item = BinaryResult<Packet<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_empty() {
            return None;
        }
        let result = self.reader.read_packet();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

impl FusedIterator for Packets<'_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BinaryError;
    use crate::writer::PacketWriter;

    fn two_packets() -> Vec<u8> {
        let mut first = PacketWriter::new();
        first.write_u16(5).write_str("hi");
        let mut second = PacketWriter::new();
        second.write_i32(-1);
        let mut bytes = first.finish(3u16);
        bytes.extend(second.finish(4u16));
        bytes
    }

    #[test]
    fn yields_each_packet() {
        let bytes = two_packets();
        let mut reader = PacketReader::new(&bytes);
        let packets: Vec<_> = reader.packets().collect::<Result<_, _>>().unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].header(), PacketHeader::new(3, 6));
        assert_eq!(packets[1].header(), PacketHeader::new(4, 4));
        assert!(reader.is_empty());
    }

    #[test]
    fn unread_payload_does_not_desync() {
        let bytes = two_packets();
        let mut reader = PacketReader::new(&bytes);
        let mut ids = Vec::new();
        for packet in reader.packets() {
            let mut packet = packet.unwrap();
            // Only read part of the first payload.
            if packet.id == 3 {
                assert_eq!(packet.payload.read_u16().unwrap(), 5);
                assert_eq!(packet.remaining(), 4);
            }
            ids.push(packet.id);
        }
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn payload_reads_are_bounded() {
        let bytes = two_packets();
        let mut reader = PacketReader::new(&bytes);
        let mut second = reader.packets().nth(1).unwrap().unwrap();
        assert_eq!(second.payload.read_i32().unwrap(), -1);
        assert!(matches!(
            second.payload.read_u8(),
            Err(BinaryError::OutOfData { .. })
        ));
    }

    #[test]
    fn truncated_payload_errors_once() {
        let mut bytes = two_packets();
        bytes.truncate(bytes.len() - 1);
        let mut reader = PacketReader::new(&bytes);
        let mut packets = reader.packets();
        assert!(packets.next().unwrap().is_ok());
        assert!(matches!(
            packets.next(),
            Some(Err(BinaryError::OutOfData {
                requested: 4,
                available: 3
            }))
        ));
        assert!(packets.next().is_none());
        drop(packets);
        assert_eq!(reader.position(), 13);
    }

    #[test]
    fn trailing_partial_header_errors() {
        let mut bytes = two_packets();
        bytes.push(0x01);
        let mut reader = PacketReader::new(&bytes);
        let results: Vec<_> = reader.packets().collect();
        assert_eq!(results.len(), 3);
        assert!(results[2].is_err());
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        let mut reader = PacketReader::new(&[]);
        assert_eq!(reader.packets().count(), 0);
    }
}
