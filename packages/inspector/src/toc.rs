//! TOC byte classification (RFC 6716 Section 3.1).
//!
//! The TOC byte is the first byte of every Opus packet. Its top five bits
//! select one of 32 configurations (mode + bandwidth + frame duration), bit 2
//! selects mono/stereo, and the low two bits encode the frame count code.
//! Everything in this module is a pure function of the input bytes.

use crate::{Channels, SampleRate};

/// Audio bandwidth classification.
///
/// `Invalid` is not an error: it marks input too short to carry a TOC byte
/// and maps to a sample rate of 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bandwidth {
    /// 4 kHz audio bandwidth, 8 kHz sample rate
    Narrowband,
    /// 6 kHz audio bandwidth, 12 kHz sample rate
    Mediumband,
    /// 8 kHz audio bandwidth, 16 kHz sample rate
    Wideband,
    /// 12 kHz audio bandwidth, 24 kHz sample rate
    SuperWideband,
    /// 20 kHz audio bandwidth, 48 kHz sample rate
    Fullband,
    /// Unclassifiable input
    Invalid,
}

impl Bandwidth {
    /// Nominal sample rate implied by the bandwidth, in Hz.
    #[must_use]
    pub const fn sample_rate(self) -> u32 {
        match self {
            Self::Narrowband => 8000,
            Self::Mediumband => 12000,
            Self::Wideband => 16000,
            Self::SuperWideband => 24000,
            Self::Fullband => 48000,
            Self::Invalid => 0,
        }
    }
}

/// Opus coding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpusMode {
    /// SILK-only mode (voice-optimized, NB/MB/WB)
    SilkOnly,
    /// Hybrid mode (SILK low frequencies + CELT high frequencies)
    Hybrid,
    /// CELT-only mode (full-spectrum, all bandwidths)
    CeltOnly,
}

/// Parsed TOC byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toc {
    config: u8,
    stereo: bool,
    frame_count_code: u8,
}

impl Toc {
    /// Parses a TOC byte. Every byte value is a valid TOC.
    #[must_use]
    pub const fn parse(toc_byte: u8) -> Self {
        Self {
            config: toc_byte >> 3,
            stereo: (toc_byte >> 2) & 0x1 == 1,
            frame_count_code: toc_byte & 0x3,
        }
    }

    /// Configuration index (0-31).
    #[must_use]
    pub const fn config(self) -> u8 {
        self.config
    }

    /// Channel configuration encoded in the packet.
    #[must_use]
    pub const fn channels(self) -> Channels {
        if self.stereo {
            Channels::Stereo
        } else {
            Channels::Mono
        }
    }

    /// Frame count code (0-3).
    #[must_use]
    pub const fn frame_count_code(self) -> u8 {
        self.frame_count_code
    }

    /// Coding mode per RFC 6716 Table 2.
    #[must_use]
    pub const fn mode(self) -> OpusMode {
        match self.config {
            0..=11 => OpusMode::SilkOnly,
            12..=15 => OpusMode::Hybrid,
            _ => OpusMode::CeltOnly,
        }
    }

    /// Audio bandwidth per RFC 6716 Table 2.
    #[must_use]
    pub const fn bandwidth(self) -> Bandwidth {
        match self.config {
            0..=3 | 16..=19 => Bandwidth::Narrowband,
            4..=7 => Bandwidth::Mediumband,
            8..=11 | 20..=23 => Bandwidth::Wideband,
            12..=13 | 24..=27 => Bandwidth::SuperWideband,
            _ => Bandwidth::Fullband,
        }
    }

    /// Frame duration in tenths of milliseconds (25 = 2.5 ms).
    #[must_use]
    pub const fn frame_duration_tenths_ms(self) -> u16 {
        let index = (self.config % 4) as usize;
        match self.config {
            0..=11 => [100, 200, 400, 600][index],
            12..=15 => [100, 200, 100, 200][index],
            _ => [25, 50, 100, 200][index],
        }
    }

    /// Samples per elementary frame at the given output rate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn samples_per_frame(self, rate: SampleRate) -> usize {
        (rate.hz() as usize * self.frame_duration_tenths_ms() as usize) / 10_000
    }
}

/// Classifies the audio bandwidth of a raw packet.
///
/// Returns [`Bandwidth::Invalid`] for input too short to carry a TOC byte.
#[must_use]
pub fn classify_bandwidth(packet: &[u8]) -> Bandwidth {
    packet
        .first()
        .map_or(Bandwidth::Invalid, |&toc| Toc::parse(toc).bandwidth())
}

/// Classifies the coding mode of a raw packet, if it carries a TOC byte.
#[must_use]
pub fn classify_mode(packet: &[u8]) -> Option<OpusMode> {
    packet.first().map(|&toc| Toc::parse(toc).mode())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toc_parsing_silk_nb() {
        let toc = Toc::parse(0b0000_0000);
        assert_eq!(toc.config(), 0);
        assert_eq!(toc.channels(), Channels::Mono);
        assert_eq!(toc.frame_count_code(), 0);
        assert_eq!(toc.mode(), OpusMode::SilkOnly);
        assert_eq!(toc.bandwidth(), Bandwidth::Narrowband);
        assert_eq!(toc.frame_duration_tenths_ms(), 100);
    }

    #[test]
    fn test_toc_parsing_hybrid_swb_stereo() {
        let toc = Toc::parse(0b0110_0101);
        assert_eq!(toc.config(), 12);
        assert_eq!(toc.channels(), Channels::Stereo);
        assert_eq!(toc.mode(), OpusMode::Hybrid);
        assert_eq!(toc.bandwidth(), Bandwidth::SuperWideband);
    }

    #[test]
    fn test_all_configurations_match_rfc_table_2() {
        for config in 0..32_u8 {
            let toc = Toc::parse(config << 3);

            match config {
                0..=11 => assert_eq!(toc.mode(), OpusMode::SilkOnly),
                12..=15 => assert_eq!(toc.mode(), OpusMode::Hybrid),
                16..=31 => assert_eq!(toc.mode(), OpusMode::CeltOnly),
                _ => unreachable!(),
            }

            match config {
                0..=3 | 16..=19 => assert_eq!(toc.bandwidth(), Bandwidth::Narrowband),
                4..=7 => assert_eq!(toc.bandwidth(), Bandwidth::Mediumband),
                8..=11 | 20..=23 => assert_eq!(toc.bandwidth(), Bandwidth::Wideband),
                12..=13 | 24..=27 => assert_eq!(toc.bandwidth(), Bandwidth::SuperWideband),
                14..=15 | 28..=31 => assert_eq!(toc.bandwidth(), Bandwidth::Fullband),
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn test_bandwidth_sample_rate_table() {
        assert_eq!(Bandwidth::Narrowband.sample_rate(), 8000);
        assert_eq!(Bandwidth::Mediumband.sample_rate(), 12000);
        assert_eq!(Bandwidth::Wideband.sample_rate(), 16000);
        assert_eq!(Bandwidth::SuperWideband.sample_rate(), 24000);
        assert_eq!(Bandwidth::Fullband.sample_rate(), 48000);
        assert_eq!(Bandwidth::Invalid.sample_rate(), 0);
    }

    #[test]
    fn test_frame_duration_all_configs() {
        assert_eq!(Toc::parse(0 << 3).frame_duration_tenths_ms(), 100);
        assert_eq!(Toc::parse(3 << 3).frame_duration_tenths_ms(), 600);
        assert_eq!(Toc::parse(12 << 3).frame_duration_tenths_ms(), 100);
        assert_eq!(Toc::parse(15 << 3).frame_duration_tenths_ms(), 200);
        assert_eq!(Toc::parse(16 << 3).frame_duration_tenths_ms(), 25);
        assert_eq!(Toc::parse(31 << 3).frame_duration_tenths_ms(), 200);
    }

    #[test]
    fn test_samples_per_frame() {
        // Config 1: SILK NB 20ms
        let toc = Toc::parse(1 << 3);
        assert_eq!(toc.samples_per_frame(SampleRate::Hz48000), 960);
        assert_eq!(toc.samples_per_frame(SampleRate::Hz8000), 160);

        // Config 16: CELT NB 2.5ms
        let toc = Toc::parse(16 << 3);
        assert_eq!(toc.samples_per_frame(SampleRate::Hz48000), 120);
    }

    #[test]
    fn test_classify_empty_input() {
        assert_eq!(classify_bandwidth(&[]), Bandwidth::Invalid);
        assert_eq!(classify_mode(&[]), None);
    }

    #[test]
    fn test_classify_ignores_payload() {
        let short = [0b1111_1000];
        let long = [0b1111_1000, 0xAA, 0xBB, 0xCC];
        assert_eq!(classify_bandwidth(&short), classify_bandwidth(&long));
        assert_eq!(classify_mode(&short), classify_mode(&long));
        assert_eq!(classify_bandwidth(&long), Bandwidth::Fullband);
        assert_eq!(classify_mode(&long), Some(OpusMode::CeltOnly));
    }
}
