//! Stateful stream inspection.
//!
//! A [`StreamInspector`] owns one decoder state for the lifetime of a
//! logical stream. Each packet is classified, decoded through that state,
//! and summarized as a [`DiagnosticRecord`]; the decoded audio itself is
//! discarded. The decoder is reached through the [`DecodeBackend`] seam so
//! the pitch-lag capability stays an explicit, replaceable contract.

use audiopus::coder::GenericCtl;
use log::{debug, trace};

use crate::{
    Channels, SampleRate,
    error::{Error, Result},
    packet::OpusPacket,
    record::DiagnosticRecord,
    toc::{self, Bandwidth},
};

/// Decoder capability surface the inspector relies on.
///
/// `previous_pitch_lag` is the side-channel the pitch estimate is derived
/// from. A backend without access to that state returns `None`
/// unconditionally, which degrades the pitch feature to always-absent
/// without affecting any other diagnostic.
pub trait DecodeBackend {
    /// Decodes one packet into `output`, returning samples per channel.
    ///
    /// # Errors
    ///
    /// * `DecodeFailed` - If the underlying decoder rejects the packet
    fn decode(&mut self, packet: &[u8], output: &mut [i16]) -> Result<usize>;

    /// Pitch lag of the most recent frame, in samples at the output rate.
    ///
    /// `None` when the last frame was unvoiced, no frame has been decoded
    /// yet, or the backend exposes no pitch state.
    fn previous_pitch_lag(&mut self) -> Option<u32>;

    /// Clears adaptive decoder state (gain, bandwidth memory, pitch
    /// history).
    ///
    /// # Errors
    ///
    /// * `InitFailed` - If the decoder state could not be reinitialized
    fn reset(&mut self) -> Result<()>;
}

/// [`DecodeBackend`] over the libopus reference decoder.
pub struct LibopusBackend {
    decoder: audiopus::coder::Decoder,
}

impl LibopusBackend {
    /// Creates a libopus decoder state.
    ///
    /// # Errors
    ///
    /// * `InitFailed` - If libopus rejects the configuration
    pub fn new(sample_rate: SampleRate, channels: Channels) -> Result<Self> {
        let decoder = audiopus::coder::Decoder::new(sample_rate.into(), channels.into())
            .map_err(|e| Error::InitFailed(e.to_string()))?;

        Ok(Self { decoder })
    }
}

impl DecodeBackend for LibopusBackend {
    fn decode(&mut self, packet: &[u8], output: &mut [i16]) -> Result<usize> {
        self.decoder
            .decode(Some(packet), output, false)
            .map_err(|e| Error::DecodeFailed(e.to_string()))
    }

    fn previous_pitch_lag(&mut self) -> Option<u32> {
        // OPUS_GET_PITCH reports the SILK sub-decoder's previous pitch lag
        // (or the CELT postfilter period); zero means unvoiced/unknown.
        self.decoder
            .pitch()
            .ok()
            .and_then(|lag| u32::try_from(lag).ok())
            .filter(|&lag| lag != 0)
    }

    fn reset(&mut self) -> Result<()> {
        self.decoder
            .reset_state()
            .map_err(|e| Error::InitFailed(e.to_string()))
    }
}

impl From<SampleRate> for audiopus::SampleRate {
    fn from(rate: SampleRate) -> Self {
        match rate {
            SampleRate::Hz8000 => Self::Hz8000,
            SampleRate::Hz12000 => Self::Hz12000,
            SampleRate::Hz16000 => Self::Hz16000,
            SampleRate::Hz24000 => Self::Hz24000,
            SampleRate::Hz48000 => Self::Hz48000,
        }
    }
}

impl From<Channels> for audiopus::Channels {
    fn from(channels: Channels) -> Self {
        match channels {
            Channels::Mono => Self::Mono,
            Channels::Stereo => Self::Stereo,
        }
    }
}

/// Per-stream packet inspector.
///
/// Owns one decoder state and a scratch buffer sized for a 20 ms frame at
/// the configured output rate; packets carrying more audio than that fail
/// decode recoverably. Not safe for concurrent use; run one inspector per
/// stream and independent inspectors on independent threads.
pub struct StreamInspector<B = LibopusBackend> {
    backend: Option<B>,
    sample_rate: SampleRate,
    channels: Channels,
    scratch: Vec<i16>,
}

impl StreamInspector<LibopusBackend> {
    /// Creates an inspector backed by a fresh libopus decoder state.
    ///
    /// # Errors
    ///
    /// * `InitFailed` - If the decoder state could not be created
    pub fn new(sample_rate: SampleRate, channels: Channels) -> Result<Self> {
        let backend = LibopusBackend::new(sample_rate, channels)?;
        Ok(Self::with_backend(backend, sample_rate, channels))
    }

    /// Creates an inspector from raw configuration values.
    ///
    /// # Errors
    ///
    /// * `InvalidSampleRate` - If `sample_rate` is not an Opus API rate
    /// * `InvalidChannelCount` - If `channels` is not 1 or 2
    /// * `InitFailed` - If the decoder state could not be created
    pub fn with_config(sample_rate: u32, channels: u8) -> Result<Self> {
        Self::new(
            SampleRate::from_hz(sample_rate)?,
            Channels::from_count(channels)?,
        )
    }
}

impl<B: DecodeBackend> StreamInspector<B> {
    /// Creates an inspector over an existing backend.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_backend(backend: B, sample_rate: SampleRate, channels: Channels) -> Self {
        let scratch_len = (sample_rate.hz() / 50) as usize * channels.count();

        debug!(
            "creating inspector: {} Hz, {channels:?}, {scratch_len} sample scratch",
            sample_rate.hz()
        );

        Self {
            backend: Some(backend),
            sample_rate,
            channels,
            scratch: vec![0; scratch_len],
        }
    }

    /// Inspects one packet.
    ///
    /// Unclassifiable packets return the skipped record without touching
    /// the decoder. Otherwise the packet is framed, decoded, and the pitch
    /// lag read back from the state the decode left behind; the decoded
    /// audio is discarded.
    ///
    /// # Errors
    ///
    /// * `PacketTooShort` / `InvalidPacket` / `InvalidFrameLength` - If the
    ///   packet structure is inconsistent (recoverable; decoder untouched)
    /// * `DecodeFailed` - If the decoder rejects the packet (recoverable;
    ///   decoder state stays usable for subsequent packets)
    /// * `UseAfterDestroy` - If the inspector was destroyed
    #[allow(clippy::cast_precision_loss)]
    pub fn process(&mut self, packet: &[u8]) -> Result<DiagnosticRecord> {
        let backend = self.backend.as_mut().ok_or(Error::UseAfterDestroy)?;

        let bandwidth = toc::classify_bandwidth(packet);
        if bandwidth == Bandwidth::Invalid {
            debug!("unclassifiable packet ({} bytes), skipping", packet.len());
            return Ok(DiagnosticRecord::skipped());
        }

        let parsed = OpusPacket::parse(packet)?;
        let decoded_samples = backend.decode(packet, &mut self.scratch)?;

        let pitch_hz = backend
            .previous_pitch_lag()
            .map(|lag| self.sample_rate.hz() as f32 / lag as f32);

        trace!("decoded {decoded_samples} sample(s), pitch {pitch_hz:?}");

        Ok(DiagnosticRecord {
            bandwidth,
            sample_rate: bandwidth.sample_rate(),
            mode: Some(parsed.toc.mode()),
            channels: Some(parsed.toc.channels()),
            frame_count: parsed.frame_count(),
            frame_duration_tenths_ms: Some(parsed.toc.frame_duration_tenths_ms()),
            decoded_samples,
            pitch_hz,
        })
    }

    /// Clears adaptive decoder state without recreating the inspector.
    ///
    /// # Errors
    ///
    /// * `UseAfterDestroy` - If the inspector was destroyed
    /// * `InitFailed` - If the decoder state could not be reinitialized
    pub fn reset(&mut self) -> Result<()> {
        self.backend
            .as_mut()
            .ok_or(Error::UseAfterDestroy)?
            .reset()
    }

    /// Releases the decoder state.
    ///
    /// Must be called at most once; any use of the inspector afterwards
    /// fails with `UseAfterDestroy`. Dropping the inspector releases the
    /// state implicitly if `destroy` was never called.
    ///
    /// # Errors
    ///
    /// * `UseAfterDestroy` - If the inspector was already destroyed
    pub fn destroy(&mut self) -> Result<()> {
        if self.backend.take().is_none() {
            return Err(Error::UseAfterDestroy);
        }

        debug!("inspector destroyed");
        Ok(())
    }

    /// Configured output sample rate.
    #[must_use]
    pub const fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Configured output channel count.
    #[must_use]
    pub const fn channels(&self) -> Channels {
        self.channels
    }

    /// Whether `destroy` has been called.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.backend.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullBackend;

    impl DecodeBackend for NullBackend {
        fn decode(&mut self, _packet: &[u8], output: &mut [i16]) -> Result<usize> {
            Ok(output.len())
        }

        fn previous_pitch_lag(&mut self) -> Option<u32> {
            None
        }

        fn reset(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn inspector() -> StreamInspector<NullBackend> {
        StreamInspector::with_backend(NullBackend, SampleRate::Hz48000, Channels::Mono)
    }

    #[test]
    fn test_empty_packet_short_circuits() {
        let mut inspector = inspector();
        let record = inspector.process(&[]).unwrap();
        assert_eq!(record, DiagnosticRecord::skipped());
    }

    #[test]
    fn test_destroy_then_process_fails() {
        let mut inspector = inspector();
        inspector.destroy().unwrap();
        assert!(inspector.is_destroyed());
        assert!(matches!(
            inspector.process(&[0b0000_0000]),
            Err(Error::UseAfterDestroy)
        ));
    }

    #[test]
    fn test_double_destroy_fails() {
        let mut inspector = inspector();
        inspector.destroy().unwrap();
        assert!(matches!(inspector.destroy(), Err(Error::UseAfterDestroy)));
        assert!(matches!(inspector.reset(), Err(Error::UseAfterDestroy)));
    }

    #[test]
    fn test_pitchless_backend_yields_absent_estimate() {
        let mut inspector = inspector();
        let record = inspector.process(&[0b0000_1000, 0x01]).unwrap();
        assert_eq!(record.pitch_hz, None);
        assert_eq!(record.bandwidth, Bandwidth::Narrowband);
    }

    #[test]
    fn test_configuration_accessors() {
        let inspector = inspector();
        assert_eq!(inspector.sample_rate(), SampleRate::Hz48000);
        assert_eq!(inspector.channels(), Channels::Mono);
        assert!(!inspector.is_destroyed());
    }
}
