#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! # Opuscope
//!
//! Standalone Opus packet inspector.
//!
//! Feeds demuxed Opus packets through a long-lived decoder state and reports
//! per-packet diagnostics: audio bandwidth, implied sample rate, coding mode,
//! elementary frame count, decoded sample count, and a pitch estimate derived
//! from the SILK sub-decoder's previous pitch lag when the backend exposes it.
//!
//! The crate performs no I/O; records are plain values for the caller to
//! display, log, or export.

pub mod error;
pub mod inspector;
pub mod packet;
pub mod record;
pub mod toc;

pub use error::{Error, Result};
pub use inspector::{DecodeBackend, LibopusBackend, StreamInspector};
pub use packet::{OpusFrame, OpusPacket, count_frames, decode_frame_length};
pub use record::DiagnosticRecord;
pub use toc::{Bandwidth, OpusMode, Toc, classify_bandwidth, classify_mode};

/// Output channel configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channels {
    Mono = 1,
    Stereo = 2,
}

impl Channels {
    /// Converts a raw channel count.
    ///
    /// # Errors
    ///
    /// * `InvalidChannelCount` - If `count` is not 1 or 2
    pub const fn from_count(count: u8) -> Result<Self> {
        match count {
            1 => Ok(Self::Mono),
            2 => Ok(Self::Stereo),
            _ => Err(Error::InvalidChannelCount(count)),
        }
    }

    /// Number of interleaved channels.
    #[must_use]
    pub const fn count(self) -> usize {
        self as usize
    }
}

/// Output sample rates supported by the Opus decoder API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleRate {
    Hz8000 = 8000,
    Hz12000 = 12000,
    Hz16000 = 16000,
    Hz24000 = 24000,
    Hz48000 = 48000,
}

impl SampleRate {
    /// Converts a raw rate in Hz.
    ///
    /// # Errors
    ///
    /// * `InvalidSampleRate` - If `hz` is not one of 8000, 12000, 16000,
    ///   24000, or 48000
    pub const fn from_hz(hz: u32) -> Result<Self> {
        match hz {
            8000 => Ok(Self::Hz8000),
            12000 => Ok(Self::Hz12000),
            16000 => Ok(Self::Hz16000),
            24000 => Ok(Self::Hz24000),
            48000 => Ok(Self::Hz48000),
            _ => Err(Error::InvalidSampleRate(hz)),
        }
    }

    /// Rate in Hz.
    #[must_use]
    pub const fn hz(self) -> u32 {
        self as u32
    }
}
