//! Login reply codes.
//!
//! A failed login is answered with a [`PacketId::ChoUserId`] packet whose
//! `i32` payload is one of these negative codes instead of a user id.
//!
//! [`PacketId::ChoUserId`]: crate::PacketId::ChoUserId

use std::fmt;

/// Negative user id sent to reject a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum LoginReply {
    Failed = -1,
    OutdatedClient = -2,
    Banned = -3,
    // The client handles -3 and -4 identically.
    BannedAlt = -4,
    BanchoError = -5,
    SupporterRequired = -6,
    PasswordReset = -7,
    VerificationRequired = -8,
}

impl LoginReply {
    /// Every reply code, from -1 down to -8.
    pub const ALL: [Self; 8] = [
        Self::Failed,
        Self::OutdatedClient,
        Self::Banned,
        Self::BannedAlt,
        Self::BanchoError,
        Self::SupporterRequired,
        Self::PasswordReset,
        Self::VerificationRequired,
    ];

    /// Returns the value written into the `ChoUserId` payload.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self as i32
    }

    /// Interprets a `ChoUserId` payload, returning `None` for user ids.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            -1 => Some(Self::Failed),
            -2 => Some(Self::OutdatedClient),
            -3 => Some(Self::Banned),
            -4 => Some(Self::BannedAlt),
            -5 => Some(Self::BanchoError),
            -6 => Some(Self::SupporterRequired),
            -7 => Some(Self::PasswordReset),
            -8 => Some(Self::VerificationRequired),
            _ => None,
        }
    }
}

impl From<LoginReply> for i32 {
    fn from(reply: LoginReply) -> Self {
        reply.raw()
    }
}

impl fmt::Display for LoginReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Failed => "login failed",
            Self::OutdatedClient => "outdated client",
            Self::Banned | Self::BannedAlt => "banned",
            Self::BanchoError => "bancho error",
            Self::SupporterRequired => "supporter required",
            Self::PasswordReset => "password reset",
            Self::VerificationRequired => "verification required",
        };
        write!(f, "{name}")
    }
}
