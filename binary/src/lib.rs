//! Little-endian packet reader and writer for the osu! Bancho protocol.
//!
//! This crate provides [`PacketWriter`] and [`PacketReader`] for building and
//! parsing Bancho packets: a 7-byte header followed by a payload of
//! fixed-width integers, floats, ULEB128 lengths and marker-prefixed strings.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked; a failed read never moves the cursor.
//! - **No domain knowledge** - This crate knows nothing about what a packet id means.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use binary::{PacketReader, PacketWriter};
//!
//! let mut writer = PacketWriter::new();
//! writer.write_u16(5).write_str("hi");
//! let bytes = writer.finish(3u16);
//!
//! let mut reader = PacketReader::new(&bytes);
//! for packet in reader.packets() {
//!     let mut packet = packet.unwrap();
//!     assert_eq!(packet.id, 3);
//!     assert_eq!(packet.payload.read_u16().unwrap(), 5);
//!     assert_eq!(packet.payload.read_str().unwrap(), "hi");
//! }
//! ```

#![warn(missing_docs)]

mod error;
mod header;
mod packets;
mod reader;
mod types;
mod writer;

pub use error::{BinaryError, BinaryResult};
pub use header::{PacketHeader, HEADER_SIZE};
pub use packets::{Packet, Packets};
pub use reader::{PacketReader, PRESENT_MARKER};
pub use types::{WireDecode, WireEncode, WireType, WireValue};
pub use writer::{PacketWriter, MAX_LIST_LEN};
