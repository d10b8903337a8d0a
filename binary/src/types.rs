//! Wire type tags and type-directed dispatch.
//!
//! The set of wire types is closed. Static code dispatches through the sealed
//! [`WireDecode`] / [`WireEncode`] traits; code that only learns the type at
//! runtime (tools, schemas read from files) goes through [`WireType`] and
//! [`WireValue`], which resolve with a `match`.

use std::fmt;
use std::str::FromStr;

use crate::error::{BinaryError, BinaryResult};
use crate::reader::PacketReader;
use crate::writer::PacketWriter;

/// A wire type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 16-bit little-endian integer.
    U16,
    /// Signed 16-bit little-endian integer.
    I16,
    /// Unsigned 32-bit little-endian integer.
    U32,
    /// Signed 32-bit little-endian integer.
    I32,
    /// Unsigned 64-bit little-endian integer.
    U64,
    /// Signed 64-bit little-endian integer.
    I64,
    /// 32-bit little-endian IEEE 754 float.
    F32,
    /// Marker-prefixed UTF-8 string.
    Str,
}

impl WireType {
    /// Every wire type, in tag order.
    pub const ALL: [Self; 10] = [
        Self::U8,
        Self::I8,
        Self::U16,
        Self::I16,
        Self::U32,
        Self::I32,
        Self::U64,
        Self::I64,
        Self::F32,
        Self::Str,
    ];

    /// Returns the lower-case tag name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::Str => "str",
        }
    }

    /// Returns the encoded width for fixed-width types, `None` for strings.
    #[must_use]
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 => Some(4),
            Self::U64 | Self::I64 => Some(8),
            Self::Str => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WireType {
    type Err = BinaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "u8" => Ok(Self::U8),
            "i8" => Ok(Self::I8),
            "u16" => Ok(Self::U16),
            "i16" => Ok(Self::I16),
            "u32" => Ok(Self::U32),
            "i32" => Ok(Self::I32),
            "u64" => Ok(Self::U64),
            "i64" => Ok(Self::I64),
            "f32" | "float" => Ok(Self::F32),
            "str" | "string" => Ok(Self::Str),
            _ => Err(BinaryError::UnsupportedType { tag: s.to_string() }),
        }
    }
}

/// A decoded value of any wire type.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// A `u8` value.
    U8(u8),
    /// An `i8` value.
    I8(i8),
    /// A `u16` value.
    U16(u16),
    /// An `i16` value.
    I16(i16),
    /// A `u32` value.
    U32(u32),
    /// An `i32` value.
    I32(i32),
    /// A `u64` value.
    U64(u64),
    /// An `i64` value.
    I64(i64),
    /// An `f32` value.
    F32(f32),
    /// A string value.
    Str(String),
}

impl WireValue {
    /// Returns the tag of this value.
    #[must_use]
    pub const fn wire_type(&self) -> WireType {
        match self {
            Self::U8(_) => WireType::U8,
            Self::I8(_) => WireType::I8,
            Self::U16(_) => WireType::U16,
            Self::I16(_) => WireType::I16,
            Self::U32(_) => WireType::U32,
            Self::I32(_) => WireType::I32,
            Self::U64(_) => WireType::U64,
            Self::I64(_) => WireType::I64,
            Self::F32(_) => WireType::F32,
            Self::Str(_) => WireType::Str,
        }
    }

    /// Parses a value of type `ty` from its textual form.
    pub fn parse(ty: WireType, text: &str) -> BinaryResult<Self> {
        let invalid = || BinaryError::InvalidValue {
            ty,
            text: text.to_string(),
        };
        let value = match ty {
            WireType::U8 => Self::U8(text.parse().map_err(|_| invalid())?),
            WireType::I8 => Self::I8(text.parse().map_err(|_| invalid())?),
            WireType::U16 => Self::U16(text.parse().map_err(|_| invalid())?),
            WireType::I16 => Self::I16(text.parse().map_err(|_| invalid())?),
            WireType::U32 => Self::U32(text.parse().map_err(|_| invalid())?),
            WireType::I32 => Self::I32(text.parse().map_err(|_| invalid())?),
            WireType::U64 => Self::U64(text.parse().map_err(|_| invalid())?),
            WireType::I64 => Self::I64(text.parse().map_err(|_| invalid())?),
            WireType::F32 => Self::F32(text.parse().map_err(|_| invalid())?),
            WireType::Str => Self::Str(text.to_string()),
        };
        Ok(value)
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Types that can be read from a packet.
///
/// Sealed: the wire type set is closed.
pub trait WireDecode: Sized + sealed::Sealed {
    /// The wire tag for this type.
    const TYPE: WireType;

    /// Reads one value from `reader`.
    fn decode(reader: &mut PacketReader<'_>) -> BinaryResult<Self>;
}

/// Types that can be appended to a packet.
///
/// Sealed: the wire type set is closed.
pub trait WireEncode: sealed::Sealed {
    /// The wire tag for this type.
    const TYPE: WireType;

    /// Appends this value to `writer`.
    fn encode(&self, writer: &mut PacketWriter);
}

macro_rules! impl_wire_primitive {
    ($($ty:ty => $variant:ident, $read:ident, $write:ident;)*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl WireDecode for $ty {
                const TYPE: WireType = WireType::$variant;

                fn decode(reader: &mut PacketReader<'_>) -> BinaryResult<Self> {
                    reader.$read()
                }
            }

            impl WireEncode for $ty {
                const TYPE: WireType = WireType::$variant;

                fn encode(&self, writer: &mut PacketWriter) {
                    writer.$write(*self);
                }
            }

            impl From<$ty> for WireValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_wire_primitive! {
    u8 => U8, read_u8, write_u8;
    i8 => I8, read_i8, write_i8;
    u16 => U16, read_u16, write_u16;
    i16 => I16, read_i16, write_i16;
    u32 => U32, read_u32, write_u32;
    i32 => I32, read_i32, write_i32;
    u64 => U64, read_u64, write_u64;
    i64 => I64, read_i64, write_i64;
    f32 => F32, read_f32, write_f32;
}

impl sealed::Sealed for String {}

impl WireDecode for String {
    const TYPE: WireType = WireType::Str;

    fn decode(reader: &mut PacketReader<'_>) -> BinaryResult<Self> {
        reader.read_str()
    }
}

impl WireEncode for String {
    const TYPE: WireType = WireType::Str;

    fn encode(&self, writer: &mut PacketWriter) {
        writer.write_str(self);
    }
}

impl sealed::Sealed for &str {}

impl WireEncode for &str {
    const TYPE: WireType = WireType::Str;

    fn encode(&self, writer: &mut PacketWriter) {
        writer.write_str(self);
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for ty in WireType::ALL {
            assert_eq!(ty.name().parse::<WireType>().unwrap(), ty);
        }
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("float".parse::<WireType>().unwrap(), WireType::F32);
        assert_eq!("String".parse::<WireType>().unwrap(), WireType::Str);
        assert_eq!(" U16 ".parse::<WireType>().unwrap(), WireType::U16);
    }

    #[test]
    fn parse_unknown_is_unsupported() {
        let err = "u128".parse::<WireType>().unwrap_err();
        assert_eq!(
            err,
            BinaryError::UnsupportedType {
                tag: "u128".to_string()
            }
        );
    }

    #[test]
    fn fixed_sizes() {
        assert_eq!(WireType::U8.fixed_size(), Some(1));
        assert_eq!(WireType::I16.fixed_size(), Some(2));
        assert_eq!(WireType::F32.fixed_size(), Some(4));
        assert_eq!(WireType::I64.fixed_size(), Some(8));
        assert_eq!(WireType::Str.fixed_size(), None);
    }

    #[test]
    fn value_tags() {
        assert_eq!(WireValue::from(5u16).wire_type(), WireType::U16);
        assert_eq!(WireValue::from(-1i8).wire_type(), WireType::I8);
        assert_eq!(WireValue::from("hi").wire_type(), WireType::Str);
        assert_eq!(WireValue::from(1.5f32).wire_type(), WireType::F32);
    }

    #[test]
    fn value_parse() {
        assert_eq!(
            WireValue::parse(WireType::I32, "-7").unwrap(),
            WireValue::I32(-7)
        );
        assert_eq!(
            WireValue::parse(WireType::Str, "hello").unwrap(),
            WireValue::Str("hello".to_string())
        );
        assert_eq!(
            WireValue::parse(WireType::U8, "256"),
            Err(BinaryError::InvalidValue {
                ty: WireType::U8,
                text: "256".to_string()
            })
        );
        assert!(matches!(
            WireValue::parse(WireType::I32, "abc"),
            Err(BinaryError::InvalidValue {
                ty: WireType::I32,
                ..
            })
        ));
    }

    #[test]
    fn trait_tags_match() {
        assert_eq!(<u8 as WireDecode>::TYPE, WireType::U8);
        assert_eq!(<i64 as WireEncode>::TYPE, WireType::I64);
        assert_eq!(<String as WireDecode>::TYPE, WireType::Str);
        assert_eq!(<&str as WireEncode>::TYPE, WireType::Str);
    }

    #[test]
    fn value_display() {
        assert_eq!(WireValue::I16(-3).to_string(), "-3");
        assert_eq!(WireValue::Str("hi".to_string()).to_string(), "\"hi\"");
    }
}
