//! Error types for stream framing.

use std::fmt;

use binary::BinaryError;

/// Result type for framing operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors raised while splitting a byte stream into packets.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FrameError {
    /// The underlying header or payload could not be decoded.
    Binary(BinaryError),

    /// A configured limit was exceeded.
    LimitsExceeded {
        /// Which limit was hit.
        kind: LimitKind,
        /// The configured maximum.
        limit: usize,
        /// The size that exceeded it.
        actual: usize,
    },
}

/// Specific framing limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// Declared payload length of a single packet.
    PayloadBytes,
    /// Bytes held by the decoder while waiting for a packet to complete.
    BufferedBytes,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary(err) => write!(f, "framing error: {err}"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PayloadBytes => "payload bytes",
            Self::BufferedBytes => "buffered bytes",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Binary(err) => Some(err),
            Self::LimitsExceeded { .. } => None,
        }
    }
}

impl From<BinaryError> for FrameError {
    fn from(err: BinaryError) -> Self {
        Self::Binary(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_limits_exceeded() {
        let err = FrameError::LimitsExceeded {
            kind: LimitKind::PayloadBytes,
            limit: 1024,
            actual: 4096,
        };
        let msg = err.to_string();
        assert!(msg.contains("payload bytes"));
        assert!(msg.contains("4096"));
    }

    #[test]
    fn display_wraps_binary_error() {
        let err = FrameError::from(BinaryError::ProtocolDesync {
            padding: 0xFF,
            offset: 0,
        });
        assert!(err.to_string().contains("0xFF"));
        assert!(err.source().is_some());
    }
}
