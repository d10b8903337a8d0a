//! Configurable limits for bounded framing.

/// Limits enforced by [`FrameDecoder`](crate::FrameDecoder).
///
/// A header announcing a payload larger than `max_payload_bytes` is rejected
/// before any of the payload is buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum payload size announced by a single header.
    pub max_payload_bytes: usize,

    /// Maximum number of bytes held while waiting for a complete packet.
    pub max_buffered_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Replay frames are the largest client packets
            max_payload_bytes: 1024 * 1024,
            max_buffered_bytes: 4 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_payload_bytes: 1024,
            max_buffered_bytes: 4096,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_payload_bytes: usize::MAX,
            max_buffered_bytes: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_payload_bytes, 1024 * 1024);
        assert_eq!(limits.max_buffered_bytes, 4 * 1024 * 1024);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = Limits::for_testing();
        let default_limits = Limits::default();

        assert!(test_limits.max_payload_bytes < default_limits.max_payload_bytes);
        assert!(test_limits.max_buffered_bytes < default_limits.max_buffered_bytes);
    }

    #[test]
    fn unlimited_limits() {
        let limits = Limits::unlimited();
        assert_eq!(limits.max_payload_bytes, usize::MAX);
        assert_eq!(limits.max_buffered_bytes, usize::MAX);
    }

    #[test]
    fn limits_const_constructible() {
        const LIMITS: Limits = Limits::for_testing();
        assert_eq!(LIMITS.max_payload_bytes, 1024);
    }
}
