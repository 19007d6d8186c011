//! Opus packet framing (RFC 6716 Section 3.2).
//!
//! Splits a packet into its elementary frames according to the TOC frame
//! count code: a single frame (code 0), two equal frames (code 1), two
//! variable frames (code 2), or an explicit frame count with optional
//! padding (code 3). Declared frame sizes are validated against the packet
//! length before any frame is produced.

use bytes::Bytes;
use log::debug;

use crate::{
    error::{Error, Result},
    toc::Toc,
};

/// One elementary frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusFrame {
    /// Frame data bytes
    pub data: Vec<u8>,
    /// Zero-length (DTX) frame
    pub is_dtx: bool,
}

/// Parsed Opus packet.
#[derive(Debug, Clone)]
pub struct OpusPacket {
    /// Table of contents byte
    pub toc: Toc,
    /// Elementary frames in packet order
    pub frames: Vec<OpusFrame>,
    /// Trailing padding, if the packet declared any
    pub padding: Bytes,
}

impl OpusPacket {
    /// Parses an Opus packet from bytes.
    ///
    /// # Errors
    ///
    /// * `PacketTooShort` - If the packet is empty or shorter than its
    ///   declared structure requires
    /// * `InvalidPacket` - If the structure violates RFC 6716
    /// * `InvalidFrameLength` - If a declared frame length exceeds 1275
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::PacketTooShort(0));
        }

        let toc = Toc::parse(data[0]);
        let payload = &data[1..];

        let (frames, padding) = match toc.frame_count_code() {
            0 => (parse_code_0(payload), Vec::new()),
            1 => (parse_code_1(payload)?, Vec::new()),
            2 => (parse_code_2(payload)?, Vec::new()),
            3 => parse_code_3(payload)?,
            _ => unreachable!("frame count code is two bits"),
        };

        debug!(
            "parsed packet: {} bytes, config {}, {} frame(s), {} padding byte(s)",
            data.len(),
            toc.config(),
            frames.len(),
            padding.len()
        );

        Ok(Self {
            toc,
            frames,
            padding: Bytes::from(padding),
        })
    }

    /// Number of elementary frames in the packet.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Counts the elementary frames a packet declares, validating the declared
/// sizes against the packet length.
///
/// # Errors
///
/// Same conditions as [`OpusPacket::parse`].
pub fn count_frames(data: &[u8]) -> Result<usize> {
    OpusPacket::parse(data).map(|packet| packet.frame_count())
}

/// Decodes one frame length prefix, returning `(length, bytes_read)`.
///
/// # Errors
///
/// * `PacketTooShort` - If the encoding needs a second byte that is missing
/// * `InvalidFrameLength` - If the decoded length exceeds 1275
pub fn decode_frame_length(data: &[u8]) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::PacketTooShort(0));
    };

    match first {
        0 => Ok((0, 1)),
        1..=251 => Ok((first as usize, 1)),
        _ => {
            let Some(&second) = data.get(1) else {
                return Err(Error::PacketTooShort(data.len()));
            };

            let length = 4 * (second as usize) + (first as usize);
            if length > 1275 {
                return Err(Error::InvalidFrameLength(length));
            }

            Ok((length, 2))
        }
    }
}

fn frame(data: &[u8]) -> OpusFrame {
    OpusFrame {
        data: data.to_vec(),
        is_dtx: data.is_empty(),
    }
}

// Code 0: single frame, possibly zero-length (DTX).
fn parse_code_0(payload: &[u8]) -> Vec<OpusFrame> {
    vec![frame(payload)]
}

// Code 1: two frames of identical size.
fn parse_code_1(payload: &[u8]) -> Result<Vec<OpusFrame>> {
    if !payload.len().is_multiple_of(2) {
        return Err(Error::InvalidPacket(
            "code 1 payload must split into two equal frames".into(),
        ));
    }

    let half = payload.len() / 2;
    Ok(vec![frame(&payload[..half]), frame(&payload[half..])])
}

// Code 2: explicit first frame length, second frame takes the rest.
fn parse_code_2(payload: &[u8]) -> Result<Vec<OpusFrame>> {
    let (len1, offset) = decode_frame_length(payload)?;

    if offset + len1 > payload.len() {
        return Err(Error::PacketTooShort(payload.len()));
    }

    Ok(vec![
        frame(&payload[offset..offset + len1]),
        frame(&payload[offset + len1..]),
    ])
}

struct FrameCountByte {
    vbr: bool,
    padding: bool,
    count: u8,
}

impl FrameCountByte {
    fn parse(byte: u8) -> Result<Self> {
        let count = byte & 0x3F;

        if count == 0 || count > 48 {
            return Err(Error::InvalidPacket(format!(
                "frame count {count} outside 1-48"
            )));
        }

        Ok(Self {
            vbr: (byte & 0x80) != 0,
            padding: (byte & 0x40) != 0,
            count,
        })
    }
}

// Padding length chain: each 255 contributes 254 more padding bytes and the
// chain continues; any other value terminates it.
fn decode_padding_length(data: &[u8]) -> Result<(usize, usize)> {
    let mut indicator_len = 0;
    let mut padding_len = 0_usize;

    loop {
        let Some(&byte) = data.get(indicator_len) else {
            return Err(Error::PacketTooShort(data.len()));
        };
        indicator_len += 1;

        if byte == 255 {
            padding_len += 254;
        } else {
            padding_len += byte as usize;
            return Ok((indicator_len, padding_len));
        }
    }
}

// Code 3: explicit frame count byte, optional padding, CBR or VBR frames.
fn parse_code_3(payload: &[u8]) -> Result<(Vec<OpusFrame>, Vec<u8>)> {
    let Some(&fc_byte) = payload.first() else {
        return Err(Error::PacketTooShort(0));
    };
    let fc = FrameCountByte::parse(fc_byte)?;

    let mut offset = 1;
    let padding_len = if fc.padding {
        let (indicator_len, padding_len) = decode_padding_length(&payload[offset..])?;
        offset += indicator_len;
        padding_len
    } else {
        0
    };

    // Padding occupies the tail of the packet; frames live between the
    // header bytes and the padding data.
    let end = payload
        .len()
        .checked_sub(padding_len)
        .filter(|&end| end >= offset)
        .ok_or(Error::PacketTooShort(payload.len()))?;

    let region = &payload[offset..end];
    let padding = payload[end..].to_vec();

    let frames = if fc.vbr {
        parse_code_3_vbr(region, fc.count)?
    } else {
        parse_code_3_cbr(region, fc.count)?
    };

    Ok((frames, padding))
}

fn parse_code_3_cbr(region: &[u8], count: u8) -> Result<Vec<OpusFrame>> {
    let count = count as usize;

    if !region.len().is_multiple_of(count) {
        return Err(Error::InvalidPacket(
            "CBR payload must split evenly across frames".into(),
        ));
    }

    let frame_len = region.len() / count;
    Ok((0..count)
        .map(|i| frame(&region[i * frame_len..(i + 1) * frame_len]))
        .collect())
}

fn parse_code_3_vbr(region: &[u8], count: u8) -> Result<Vec<OpusFrame>> {
    let mut frames = Vec::with_capacity(count as usize);
    let mut offset = 0;

    for _ in 0..count - 1 {
        let (len, len_bytes) = decode_frame_length(&region[offset..])?;
        offset += len_bytes;

        if offset + len > region.len() {
            return Err(Error::PacketTooShort(region.len()));
        }

        frames.push(frame(&region[offset..offset + len]));
        offset += len;
    }

    frames.push(frame(&region[offset..]));

    Ok(frames)
}
