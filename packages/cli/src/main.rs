#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Opus stream inspector command-line tool.
//!
//! Demuxes an Ogg/Opus file, feeds every Opus packet through a
//! [`StreamInspector`], and prints one diagnostic line per packet: audio
//! bandwidth, implied sample rate, coding mode, elementary frame count,
//! decoded sample count, and the pitch estimate when the decoder reports a
//! pitch lag. Recoverable per-packet failures are counted and reported
//! without aborting the run.
//!
//! # Usage
//!
//! ```text
//! opuscope <FILE> [--sample-rate <HZ>] [--channels <N>] [--json] [--limit <N>]
//! ```
//!
//! # Examples
//!
//! Inspect a file with the default 48 kHz mono decoder state:
//! ```text
//! opuscope speech.opus
//! ```
//!
//! Emit machine-readable records:
//! ```text
//! opuscope speech.opus --json | jq .pitch_hz
//! ```

use std::{fs::File, path::PathBuf};

use clap::Parser;
use log::debug;
use opuscope::{Bandwidth, StreamInspector};
use symphonia::core::{
    codecs::CODEC_TYPE_OPUS,
    formats::{FormatOptions, FormatReader},
    io::{MediaSourceStream, MediaSourceStreamOptions},
    meta::MetadataOptions,
    probe::Hint,
};

/// Command-line arguments for the stream inspector.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file containing an Opus stream (Ogg/Opus).
    #[arg(index = 1)]
    file: PathBuf,

    /// Output sample rate the decoder state is created with.
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    /// Output channel count the decoder state is created with.
    #[arg(long, default_value_t = 1)]
    channels: u8,

    /// Emit one JSON object per packet instead of text lines.
    #[arg(long)]
    json: bool,

    /// Stop after this many packets.
    #[arg(long)]
    limit: Option<u64>,
}

/// Inspects every Opus packet in the given file.
///
/// # Errors
///
/// * If the input file cannot be opened or probed
/// * If the file contains no Opus track
/// * If the decoder state cannot be created for the requested configuration
fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let args = Args::parse();

    let file = Box::new(File::open(&args.file)?);
    let mss = MediaSourceStream::new(file, MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(extension) = args.file.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format: Box<dyn FormatReader> = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec == CODEC_TYPE_OPUS)
        .ok_or("No Opus audio track found")?;
    let track_id = track.id;

    debug!(
        "inspecting track {track_id} at {} Hz, {} channel(s)",
        args.sample_rate, args.channels
    );

    let mut inspector = StreamInspector::with_config(args.sample_rate, args.channels)?;

    let mut packet_count = 0_u64;
    let mut skipped_count = 0_u64;
    let mut error_count = 0_u64;
    let mut pitched_count = 0_u64;
    let mut pitch_min = f32::MAX;
    let mut pitch_max = f32::MIN;

    loop {
        if args.limit.is_some_and(|limit| packet_count >= limit) {
            break;
        }

        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        packet_count += 1;

        match inspector.process(packet.buf()) {
            Ok(record) => {
                if record.bandwidth == Bandwidth::Invalid {
                    skipped_count += 1;
                }

                if let Some(pitch) = record.pitch_hz {
                    pitched_count += 1;
                    pitch_min = pitch_min.min(pitch);
                    pitch_max = pitch_max.max(pitch);
                }

                if args.json {
                    println!("{}", serde_json::to_string(&record)?);
                } else {
                    println!("packet {packet_count}: {record}");
                }
            }
            Err(e) if e.is_recoverable() => {
                error_count += 1;
                eprintln!("packet {packet_count}: {e}");
            }
            Err(e) => return Err(e.into()),
        }
    }

    inspector.destroy()?;

    eprintln!();
    eprintln!("Inspection complete:");
    eprintln!("  Packets: {packet_count}");
    eprintln!("  Skipped (unclassifiable): {skipped_count}");
    eprintln!("  Errors: {error_count}");
    eprintln!("  With pitch estimate: {pitched_count}");

    if pitched_count > 0 {
        eprintln!("  Pitch range: {pitch_min:.1} - {pitch_max:.1} Hz");
    }

    Ok(())
}
