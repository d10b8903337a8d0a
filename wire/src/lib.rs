//! Protocol vocabulary and stream framing for osu! Bancho.
//!
//! This crate names the packet ids and login replies of the protocol and
//! splits a TCP byte stream into packets. Payload encoding lives in the
//! `binary` crate; what a payload means is left to the caller.
//!
//! # Design Principles
//!
//! - **Incremental framing** - Data may arrive in any chunking; partial packets are held, never misread.
//! - **Bounded decoding** - Declared lengths are validated against limits before buffering.
//! - **No domain knowledge** - This crate frames packets, it does not interpret them.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use wire::{encode_frame, FrameDecoder, PacketId};
//!
//! let mut buf = BytesMut::new();
//! encode_frame(PacketId::OsuPing, &[], &mut buf).unwrap();
//!
//! let mut decoder = FrameDecoder::default();
//! let frame = decoder.decode(&mut buf).unwrap().unwrap();
//! assert_eq!(frame.kind(), Some(PacketId::OsuPing));
//! ```

mod error;
mod frame;
mod ids;
mod limits;
mod login;

pub use error::{FrameError, FrameResult, LimitKind};
pub use frame::{encode_frame, Frame, FrameDecoder};
pub use ids::PacketId;
pub use limits::Limits;
pub use login::LoginReply;
