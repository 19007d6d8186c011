//! Per-packet diagnostic output.

use std::fmt;

use crate::{
    Channels,
    toc::{Bandwidth, OpusMode},
};

/// Diagnostics extracted from one packet.
///
/// Produced by [`StreamInspector::process`](crate::StreamInspector::process);
/// immutable once returned. A packet that could not be classified yields the
/// [`skipped`](Self::skipped) shape: `Invalid` bandwidth, zero sample rate,
/// and every decode-derived field absent or zero.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticRecord {
    /// Audio bandwidth classification
    pub bandwidth: Bandwidth,
    /// Sample rate implied by the bandwidth, 0 when classification failed
    pub sample_rate: u32,
    /// Coding mode, absent when classification failed
    pub mode: Option<OpusMode>,
    /// Channel configuration from the TOC stereo bit
    pub channels: Option<Channels>,
    /// Number of elementary frames in the packet
    pub frame_count: usize,
    /// Elementary frame duration in tenths of milliseconds
    pub frame_duration_tenths_ms: Option<u16>,
    /// Samples per channel produced by the decode
    pub decoded_samples: usize,
    /// Pitch estimate from the previous pitch lag, absent when the lag is
    /// zero or the backend exposes no pitch state
    pub pitch_hz: Option<f32>,
}

impl DiagnosticRecord {
    /// Record for a packet whose bandwidth could not be classified.
    #[must_use]
    pub const fn skipped() -> Self {
        Self {
            bandwidth: Bandwidth::Invalid,
            sample_rate: 0,
            mode: None,
            channels: None,
            frame_count: 0,
            frame_duration_tenths_ms: None,
            decoded_samples: 0,
            pitch_hz: None,
        }
    }
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bandwidth == Bandwidth::Invalid {
            return write!(f, "unclassifiable packet, decode skipped");
        }

        write!(
            f,
            "{:?} ({} Hz)",
            self.bandwidth, self.sample_rate
        )?;

        if let Some(mode) = self.mode {
            write!(f, ", {mode:?}")?;
        }
        if let Some(channels) = self.channels {
            write!(f, ", {channels:?}")?;
        }

        write!(
            f,
            ", {} frame(s), {} sample(s)",
            self.frame_count, self.decoded_samples
        )?;

        match self.pitch_hz {
            Some(pitch) => write!(f, ", pitch {pitch:.1} Hz"),
            None => write!(f, ", no pitch"),
        }
    }
}
