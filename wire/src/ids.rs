//! Packet ids of the Bancho protocol.
//!
//! Ids sent by the game client are prefixed `Osu`; ids sent by the server
//! are prefixed `Cho`. Ids 6 and 35 are unassigned, as is anything above 109;
//! [`PacketId::from_raw`] returns `None` for them.

use std::fmt;

macro_rules! packet_ids {
    (
        client { $($client:ident = $client_raw:literal,)* }
        server { $($server:ident = $server_raw:literal,)* }
    ) => {
        /// A known Bancho packet id.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum PacketId {
            $($client = $client_raw,)*
            $($server = $server_raw,)*
        }

        impl PacketId {
            /// Every known id, client ids first.
            pub const ALL: &'static [Self] = &[$(Self::$client,)* $(Self::$server,)*];

            /// Looks up a raw id, returning `None` for unassigned values.
            #[must_use]
            pub const fn from_raw(raw: u16) -> Option<Self> {
                match raw {
                    $($client_raw => Some(Self::$client),)*
                    $($server_raw => Some(Self::$server),)*
                    _ => None,
                }
            }

            /// Returns the id's name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$client => stringify!($client),)*
                    $(Self::$server => stringify!($server),)*
                }
            }

            /// Returns `true` if the game client sends this packet.
            #[must_use]
            pub const fn is_client(self) -> bool {
                matches!(self, $(Self::$client)|*)
            }
        }
    };
}

packet_ids! {
    client {
        OsuChangeAction = 0,
        OsuSendPublicMessage = 1,
        OsuLogout = 2,
        OsuRequestStatusUpdate = 3,
        OsuPing = 4,
        OsuStartSpectating = 16,
        OsuStopSpectating = 17,
        OsuSpectateFrames = 18,
        OsuErrorReport = 20,
        OsuCantSpectate = 21,
        OsuSendPrivateMessage = 25,
        OsuPartLobby = 29,
        OsuJoinLobby = 30,
        OsuCreateMatch = 31,
        OsuJoinMatch = 32,
        OsuPartMatch = 33,
        OsuMatchChangeSlot = 38,
        OsuMatchReady = 39,
        OsuMatchLock = 40,
        OsuMatchChangeSettings = 41,
        OsuMatchStart = 44,
        OsuMatchScoreUpdate = 47,
        OsuMatchComplete = 49,
        OsuMatchChangeMods = 51,
        OsuMatchLoadComplete = 52,
        OsuMatchNoBeatmap = 54,
        OsuMatchNotReady = 55,
        OsuMatchFailed = 56,
        OsuMatchHasBeatmap = 59,
        OsuMatchSkipRequest = 60,
        OsuChannelJoin = 63,
        OsuBeatmapInfoRequest = 68,
        OsuMatchTransferHost = 70,
        OsuFriendAdd = 73,
        OsuFriendRemove = 74,
        OsuMatchChangeTeam = 77,
        OsuChannelPart = 78,
        OsuReceiveUpdates = 79,
        OsuSetAwayMessage = 82,
        OsuIrcOnly = 84,
        OsuUserStatsRequest = 85,
        OsuMatchInvite = 87,
        OsuMatchChangePassword = 90,
        OsuTournamentMatchInfoRequest = 93,
        OsuUserPresenceRequest = 97,
        OsuUserPresenceRequestAll = 98,
        OsuToggleBlockNonFriendDms = 99,
        OsuTournamentJoinMatchChannel = 108,
        OsuTournamentLeaveMatchChannel = 109,
    }
    server {
        ChoUserId = 5,
        ChoSendMessage = 7,
        ChoPong = 8,
        ChoHandleIrcChangeUsername = 9,
        ChoHandleIrcQuit = 10,
        ChoUserStats = 11,
        ChoUserLogout = 12,
        ChoSpectatorJoined = 13,
        ChoSpectatorLeft = 14,
        ChoSpectateFrames = 15,
        ChoVersionUpdate = 19,
        ChoSpectatorCantSpectate = 22,
        ChoGetAttention = 23,
        ChoNotification = 24,
        ChoUpdateMatch = 26,
        ChoNewMatch = 27,
        ChoDisposeMatch = 28,
        ChoToggleBlockNonFriendDms = 34,
        ChoMatchJoinSuccess = 36,
        ChoMatchJoinFail = 37,
        ChoFellowSpectatorJoined = 42,
        ChoFellowSpectatorLeft = 43,
        ChoAllPlayersLoaded = 45,
        ChoMatchStart = 46,
        ChoMatchScoreUpdate = 48,
        ChoMatchTransferHost = 50,
        ChoMatchAllPlayersLoaded = 53,
        ChoMatchPlayerFailed = 57,
        ChoMatchComplete = 58,
        ChoMatchSkip = 61,
        ChoUnauthorized = 62,
        ChoChannelJoinSuccess = 64,
        ChoChannelInfo = 65,
        ChoChannelKick = 66,
        ChoChannelAutoJoin = 67,
        ChoBeatmapInfoReply = 69,
        ChoPrivileges = 71,
        ChoFriendsList = 72,
        ChoProtocolVersion = 75,
        ChoMainMenuIcon = 76,
        ChoMonitor = 80,
        ChoMatchPlayerSkipped = 81,
        ChoUserPresence = 83,
        ChoRestart = 86,
        ChoMatchInvite = 88,
        ChoChannelInfoEnd = 89,
        ChoMatchChangePassword = 91,
        ChoSilenceEnd = 92,
        ChoUserSilenced = 94,
        ChoUserPresenceSingle = 95,
        ChoUserPresenceBundle = 96,
        ChoUserDmBlocked = 100,
        ChoTargetIsSilenced = 101,
        ChoVersionUpdateForced = 102,
        ChoSwitchServer = 103,
        ChoAccountRestricted = 104,
        ChoRtx = 105,
        ChoMatchAbort = 106,
        ChoSwitchTournamentServer = 107,
    }
}

impl PacketId {
    /// Returns the raw wire value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self as u16
    }

    /// Returns `true` if the server sends this packet.
    #[must_use]
    pub const fn is_server(self) -> bool {
        !self.is_client()
    }
}

impl From<PacketId> for u16 {
    fn from(id: PacketId) -> Self {
        id.raw()
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.raw())
    }
}
