/// Lifecycle of the single logical session connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Waiting for the backoff timer before the next attempt.
    Reconnecting,
    /// Gave up; only a manual retry leaves this state.
    Exhausted,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// A socket is open or being opened.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}
