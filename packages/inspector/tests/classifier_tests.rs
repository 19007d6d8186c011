#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

use opuscope::{Bandwidth, OpusMode, classify_bandwidth, classify_mode, count_frames};
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test_case(0, Bandwidth::Narrowband; "config_0_silk_nb")]
#[test_case(3, Bandwidth::Narrowband; "config_3_silk_nb")]
#[test_case(4, Bandwidth::Mediumband; "config_4_silk_mb")]
#[test_case(7, Bandwidth::Mediumband; "config_7_silk_mb")]
#[test_case(8, Bandwidth::Wideband; "config_8_silk_wb")]
#[test_case(11, Bandwidth::Wideband; "config_11_silk_wb")]
#[test_case(12, Bandwidth::SuperWideband; "config_12_hybrid_swb")]
#[test_case(13, Bandwidth::SuperWideband; "config_13_hybrid_swb")]
#[test_case(14, Bandwidth::Fullband; "config_14_hybrid_fb")]
#[test_case(15, Bandwidth::Fullband; "config_15_hybrid_fb")]
#[test_case(16, Bandwidth::Narrowband; "config_16_celt_nb")]
#[test_case(19, Bandwidth::Narrowband; "config_19_celt_nb")]
#[test_case(20, Bandwidth::Wideband; "config_20_celt_wb")]
#[test_case(23, Bandwidth::Wideband; "config_23_celt_wb")]
#[test_case(24, Bandwidth::SuperWideband; "config_24_celt_swb")]
#[test_case(27, Bandwidth::SuperWideband; "config_27_celt_swb")]
#[test_case(28, Bandwidth::Fullband; "config_28_celt_fb")]
#[test_case(31, Bandwidth::Fullband; "config_31_celt_fb")]
fn test_bandwidth_per_config(config: u8, expected: Bandwidth) {
    assert_eq!(classify_bandwidth(&[config << 3]), expected);
}

#[test_case(0, OpusMode::SilkOnly; "config_0_silk")]
#[test_case(11, OpusMode::SilkOnly; "config_11_silk")]
#[test_case(12, OpusMode::Hybrid; "config_12_hybrid")]
#[test_case(15, OpusMode::Hybrid; "config_15_hybrid")]
#[test_case(16, OpusMode::CeltOnly; "config_16_celt")]
#[test_case(31, OpusMode::CeltOnly; "config_31_celt")]
fn test_mode_per_config(config: u8, expected: OpusMode) {
    assert_eq!(classify_mode(&[config << 3]), Some(expected));
}

#[test_log::test]
fn test_sample_rate_codomain_over_all_toc_bytes() {
    for byte in 0..=255_u8 {
        let rate = classify_bandwidth(&[byte]).sample_rate();
        assert!(
            [8000, 12000, 16000, 24000, 48000].contains(&rate),
            "TOC byte {byte:#04x} mapped to {rate} Hz"
        );
    }

    assert_eq!(classify_bandwidth(&[]).sample_rate(), 0);
}

#[test_log::test]
fn test_classification_is_deterministic() {
    for byte in 0..=255_u8 {
        let packet = [byte, 0x55, 0xAA];
        assert_eq!(classify_bandwidth(&packet), classify_bandwidth(&packet));
        assert_eq!(classify_mode(&packet), classify_mode(&packet));
    }
}

#[test_log::test]
fn test_classification_depends_only_on_toc_byte() {
    for byte in 0..=255_u8 {
        assert_eq!(classify_bandwidth(&[byte]), classify_bandwidth(&[byte, 0xFF, 0x00, 0x42]));
    }
}

#[test_case(&[0b0000_0010, 10, 0x01]; "code_2_first_frame_overruns")]
#[test_case(&[0b0000_0011, 0b0000_0011, 0x01, 0x02]; "code_3_cbr_non_divisible")]
#[test_case(&[0b0000_0011, 0b0000_0000]; "code_3_zero_frames")]
#[test_case(&[0b0000_0011, 49]; "code_3_frame_count_over_48")]
#[test_case(&[0b0000_0011, 0b1000_0010, 100]; "code_3_vbr_length_overruns")]
#[test_case(&[0b0000_0011, 0b0100_0001, 250, 0x01]; "code_3_padding_overruns")]
#[test_case(&[]; "empty_packet")]
fn test_count_frames_rejects_inconsistent_declarations(packet: &[u8]) {
    let err = count_frames(packet).unwrap_err();
    assert!(err.is_malformed_packet(), "unexpected error kind: {err}");
}

#[test_case(&[0b0000_0000], 1; "code_0_dtx")]
#[test_case(&[0b0000_0000, 1, 2, 3], 1; "code_0_single")]
#[test_case(&[0b0000_0001, 1, 2, 3, 4], 2; "code_1_pair")]
#[test_case(&[0b0000_0010, 1, 9, 8, 7], 2; "code_2_pair")]
#[test_case(&[0b0000_0011, 0b0000_0100, 1, 2, 3, 4], 4; "code_3_cbr_four")]
fn test_count_frames_accepts_consistent_declarations(packet: &[u8], expected: usize) {
    assert_eq!(count_frames(packet).unwrap(), expected);
    // Classifier operations are idempotent
    assert_eq!(count_frames(packet).unwrap(), expected);
}
