//! Custom string-formatted property codecs (spec §4.8/§8).
//!
//! Unlike the base scalar codecs, these map a raw numeric wire value
//! straight to (and from) the human-readable string a camera property is
//! conventionally displayed as — aperture f-stops, shutter fractions, ISO.
//! Follows the same one-small-`Codec`-impl-per-wire-shape pattern as
//! `base.rs`'s `scalar_codec!` family, generalized from raw numerics to
//! the PTP convention of exposing these three properties as display
//! strings.

use crate::codec::base::Codec;
use crate::codec::buf::{Endian, PtpCursor, PtpWriter};
use crate::errors::CodecError;

/// `FNumber` (spec property `0x5007`): wire value is `round(f_stop * 100)`
/// as `u16`, e.g. f/2.8 ⇔ 280.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApertureCodec;

impl Codec<String> for ApertureCodec {
    fn encode(&self, value: &String, endian: Endian) -> Vec<u8> {
        let f_stop: f64 = value
            .strip_prefix("f/")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);
        let raw = (f_stop * 100.0).round() as u16;
        let mut w = PtpWriter::new(endian);
        w.write_u16(raw);
        w.into_bytes()
    }

    fn decode(&self, bytes: &[u8], endian: Endian) -> Result<(String, usize), CodecError> {
        let mut c = PtpCursor::new(bytes, endian);
        let raw = c.read_u16()?;
        let f_stop = raw as f64 / 100.0;
        let formatted = if (f_stop.fract()).abs() < 1e-9 {
            format!("f/{f_stop:.0}")
        } else {
            format!("f/{f_stop}")
        };
        Ok((formatted, 2))
    }
}

/// `ExposureTime` (spec property `0x500D`): wire value packs a numerator in
/// the upper 16 bits and a denominator in the lower 16 bits of a `u32`;
/// `0xFFFFFFFF` means bulb mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShutterSpeedCodec;

const BULB_SENTINEL: u32 = 0xFFFF_FFFF;

impl Codec<String> for ShutterSpeedCodec {
    fn encode(&self, value: &String, endian: Endian) -> Vec<u8> {
        let raw = if value == "BULB" {
            BULB_SENTINEL
        } else if let Some((numerator, denominator)) = value.split_once('/') {
            let numerator: u32 = numerator.parse().unwrap_or(1);
            let denominator: u32 = denominator.parse().unwrap_or(1);
            (numerator << 16) | denominator
        } else {
            0
        };
        let mut w = PtpWriter::new(endian);
        w.write_u32(raw);
        w.into_bytes()
    }

    fn decode(&self, bytes: &[u8], endian: Endian) -> Result<(String, usize), CodecError> {
        let mut c = PtpCursor::new(bytes, endian);
        let raw = c.read_u32()?;
        if raw == BULB_SENTINEL {
            return Ok(("BULB".to_string(), 4));
        }
        let numerator = raw >> 16;
        let denominator = raw & 0xFFFF;
        Ok((format!("{numerator}/{denominator}"), 4))
    }
}

/// `ExposureIndex` (spec property `0x500F`): `u32`, `0x00FFFFFF` meaning
/// auto ISO.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoCodec;

const ISO_AUTO_SENTINEL: u32 = 0x00FF_FFFF;

impl Codec<String> for IsoCodec {
    fn encode(&self, value: &String, endian: Endian) -> Vec<u8> {
        let raw = if value == "ISO AUTO" {
            ISO_AUTO_SENTINEL
        } else {
            value
                .strip_prefix("ISO ")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0)
        };
        let mut w = PtpWriter::new(endian);
        w.write_u32(raw);
        w.into_bytes()
    }

    fn decode(&self, bytes: &[u8], endian: Endian) -> Result<(String, usize), CodecError> {
        let mut c = PtpCursor::new(bytes, endian);
        let raw = c.read_u32()?;
        if raw == ISO_AUTO_SENTINEL {
            return Ok(("ISO AUTO".to_string(), 4));
        }
        Ok((format!("ISO {raw}"), 4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aperture_round_trips_known_values() {
        let codec = ApertureCodec;
        assert_eq!(
            codec.encode(&"f/2.8".to_string(), Endian::Little),
            vec![0x18, 0x01]
        );
        let (decoded, n) = codec.decode(&[0x18, 0x01], Endian::Little).unwrap();
        assert_eq!(decoded, "f/2.8");
        assert_eq!(n, 2);

        let bytes = codec.encode(&"f/3.5".to_string(), Endian::Little);
        let (decoded, _) = codec.decode(&bytes, Endian::Little).unwrap();
        assert_eq!(decoded, "f/3.5");
        assert_eq!(u16::from_le_bytes([bytes[0], bytes[1]]), 350);
    }

    #[test]
    fn shutter_speed_decodes_bulb_and_fraction() {
        let codec = ShutterSpeedCodec;
        let (bulb, _) = codec
            .decode(&0xFFFF_FFFFu32.to_le_bytes(), Endian::Little)
            .unwrap();
        assert_eq!(bulb, "BULB");

        let (fraction, _) = codec
            .decode(&0x0001_0FA0u32.to_le_bytes(), Endian::Little)
            .unwrap();
        assert_eq!(fraction, "1/4000");
    }

    #[test]
    fn iso_decodes_auto_and_fixed_values() {
        let codec = IsoCodec;
        let (auto, _) = codec
            .decode(&0x00FF_FFFFu32.to_le_bytes(), Endian::Little)
            .unwrap();
        assert_eq!(auto, "ISO AUTO");

        let (fixed, _) = codec.decode(&100u32.to_le_bytes(), Endian::Little).unwrap();
        assert_eq!(fixed, "ISO 100");
    }
}
