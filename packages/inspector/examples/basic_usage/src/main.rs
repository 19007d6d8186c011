#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Basic Opuscope Usage Example
//!
//! Demonstrates the two halves of the crate:
//! - the pure packet classifier (bandwidth, mode, frame counting)
//! - the stateful stream inspector producing per-packet diagnostics

use opuscope::{Channels, SampleRate, StreamInspector, classify_bandwidth, classify_mode, count_frames};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Opuscope - Basic Usage Example ===\n");

    // Example 1: classify packets without any decoder state
    println!("Example 1: Pure classification");
    println!("---------------------------------------------------");

    // TOC byte 0xF8 = config 31: CELT-only, fullband, 20ms, mono, code 0
    let celt_packet = [0xF8, 0x01, 0x02, 0x03];
    // TOC byte 0x08 = config 1: SILK-only, narrowband, 20ms, mono, code 0
    let silk_packet = [0x08, 0x2A];

    for packet in [&celt_packet[..], &silk_packet[..]] {
        let bandwidth = classify_bandwidth(packet);
        println!(
            "  TOC {:#04x}: {bandwidth:?} ({} Hz), mode {:?}, {} frame(s)",
            packet[0],
            bandwidth.sample_rate(),
            classify_mode(packet),
            count_frames(packet)?
        );
    }
    println!();

    // Example 2: inspect a stream through a live decoder state
    println!("Example 2: Stream inspection");
    println!("---------------------------------------------------");

    let mut inspector = StreamInspector::new(SampleRate::Hz48000, Channels::Mono)?;

    // DTX packets (a lone TOC byte) decode deterministically without a
    // real encoded payload, which makes them handy for a demo
    let stream: [&[u8]; 3] = [&[0xF8], &[0x00], &[0xF8]];

    for (i, packet) in stream.iter().enumerate() {
        let record = inspector.process(packet)?;
        println!("  packet {i}: {record}");
    }

    // Example 3: recoverable errors leave the inspector usable
    println!("\nExample 3: Error recovery");
    println!("---------------------------------------------------");

    // Code 1 with an odd payload cannot split into two equal frames
    match inspector.process(&[0x09, 0x01, 0x02, 0x03]) {
        Err(e) if e.is_recoverable() => println!("  recoverable: {e}"),
        other => println!("  unexpected outcome: {other:?}"),
    }

    let record = inspector.process(&[0xF8])?;
    println!("  next packet still decodes: {record}");

    inspector.destroy()?;
    println!("\n=== Example Complete ===");

    Ok(())
}
