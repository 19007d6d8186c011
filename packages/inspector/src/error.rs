use thiserror::Error;

/// Inspector errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Packet too short for its declared structure
    #[error("Packet too short: {0} bytes")]
    PacketTooShort(usize),

    /// Packet structure violates RFC 6716
    #[error("Invalid packet structure: {0}")]
    InvalidPacket(String),

    /// Frame length exceeds the RFC 6716 maximum
    #[error("Invalid frame length: {0} bytes (max 1275)")]
    InvalidFrameLength(usize),

    /// Requested output rate is not an Opus API rate
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// Requested channel count is not mono or stereo
    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(u8),

    /// Decoder state could not be created
    #[error("Decoder initialization failed: {0}")]
    InitFailed(String),

    /// Underlying decoder rejected the packet
    #[error("Decode operation failed: {0}")]
    DecodeFailed(String),

    /// Inspector used after `destroy`
    #[error("Inspector used after destroy")]
    UseAfterDestroy,
}

impl Error {
    /// Whether this error came from packet structure validation.
    #[must_use]
    pub const fn is_malformed_packet(&self) -> bool {
        matches!(
            self,
            Self::PacketTooShort(_) | Self::InvalidPacket(_) | Self::InvalidFrameLength(_)
        )
    }

    /// Whether the caller may keep feeding packets to the same inspector.
    ///
    /// Malformed packets and per-packet decode failures are recoverable;
    /// initialization failures and lifecycle violations are not.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        self.is_malformed_packet() || matches!(self, Self::DecodeFailed(_))
    }
}

/// Result type for inspector operations.
pub type Result<T> = std::result::Result<T, Error>;
