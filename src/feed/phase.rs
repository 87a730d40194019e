//! Observable lifecycle of one push connection.

use std::fmt;

/// Phase of a push connection. Moves forward only; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionPhase {
    /// Handshake in progress.
    Connecting,
    /// Frames are being received.
    Open,
    /// The connection ended (closed by either side, failed, or never
    /// opened). A new connection is needed to resume.
    Closed,
}

impl ConnectionPhase {
    /// Returns `true` once the connection can no longer deliver awards.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
