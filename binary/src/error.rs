//! Error types for packet encoding and decoding.

use std::fmt;

use crate::types::WireType;

/// Result type for codec operations.
pub type BinaryResult<T> = Result<T, BinaryError>;

/// Errors that can occur while reading or writing Bancho packets.
///
/// All codec errors are local and non-retryable: retrying a read against the
/// same buffer fails the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// Attempted to read past the end of the buffer.
    OutOfData {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// String bytes are not valid UTF-8.
    InvalidEncoding {
        /// Length of the longest valid UTF-8 prefix.
        valid_up_to: usize,
    },

    /// A type tag has no codec.
    UnsupportedType {
        /// The tag that could not be resolved.
        tag: String,
    },

    /// Text could not be parsed as a value of a supported wire type.
    InvalidValue {
        /// The wire type the text was parsed as.
        ty: WireType,
        /// The rejected text.
        text: String,
    },

    /// A packet header carried a non-zero padding byte.
    ///
    /// This almost always means a previous payload was not fully consumed.
    ProtocolDesync {
        /// The padding byte found.
        padding: u8,
        /// Offset of the header that failed validation.
        offset: usize,
    },

    /// A ULEB128 value does not fit in 64 bits.
    VarintOverflow {
        /// Offset of the first byte of the varint.
        offset: usize,
    },

    /// A length does not fit in its wire prefix.
    LengthOverflow {
        /// The length that was too large.
        length: usize,
        /// Largest length the prefix can represent.
        max: usize,
    },

    /// A list element does not match the declared element type.
    ListTypeMismatch {
        /// Index of the offending element.
        index: usize,
        /// The declared element type.
        expected: WireType,
        /// The type of the offending element.
        found: WireType,
    },
}

impl fmt::Display for BinaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfData {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::InvalidEncoding { valid_up_to } => {
                write!(f, "invalid utf-8 in string after {valid_up_to} bytes")
            }
            Self::UnsupportedType { tag } => write!(f, "unsupported wire type: {tag:?}"),
            Self::InvalidValue { ty, text } => write!(f, "invalid {ty} value: {text:?}"),
            Self::ProtocolDesync { padding, offset } => {
                write!(
                    f,
                    "protocol desync: padding byte 0x{padding:02X} at header offset {offset}"
                )
            }
            Self::VarintOverflow { offset } => {
                write!(f, "uleb128 at offset {offset} overflows 64 bits")
            }
            Self::LengthOverflow { length, max } => {
                write!(f, "length {length} exceeds maximum {max}")
            }
            Self::ListTypeMismatch {
                index,
                expected,
                found,
            } => {
                write!(
                    f,
                    "list element {index} is {found}, expected {expected}"
                )
            }
        }
    }
}

impl std::error::Error for BinaryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_out_of_data() {
        let err = BinaryError::OutOfData {
            requested: 4,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("4 bytes"), "should mention requested bytes");
        assert!(msg.contains("1 bytes"), "should mention available bytes");
        assert!(msg.contains("read"), "should mention read operation");
    }

    #[test]
    fn error_display_protocol_desync() {
        let err = BinaryError::ProtocolDesync {
            padding: 0xAB,
            offset: 14,
        };
        let msg = err.to_string();
        assert!(msg.contains("0xAB"));
        assert!(msg.contains("14"));
    }

    #[test]
    fn error_display_unsupported_type() {
        let err = BinaryError::UnsupportedType {
            tag: "u128".to_string(),
        };
        assert!(err.to_string().contains("u128"));
    }

    #[test]
    fn error_display_invalid_value() {
        let err = BinaryError::InvalidValue {
            ty: WireType::U8,
            text: "300".to_string(),
        };
        let msg = err.to_string();
        assert_eq!(msg, "invalid u8 value: \"300\"");
        assert!(!msg.contains("unsupported"));
    }

    #[test]
    fn error_display_list_type_mismatch() {
        let err = BinaryError::ListTypeMismatch {
            index: 2,
            expected: WireType::I32,
            found: WireType::Str,
        };
        let msg = err.to_string();
        assert!(msg.contains("element 2"));
        assert!(msg.contains("i32"));
        assert!(msg.contains("str"));
    }

    #[test]
    fn error_equality() {
        let err1 = BinaryError::OutOfData {
            requested: 8,
            available: 3,
        };
        let err2 = BinaryError::OutOfData {
            requested: 8,
            available: 3,
        };
        let err3 = BinaryError::OutOfData {
            requested: 8,
            available: 4,
        };
        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<BinaryError>();
    }
}
