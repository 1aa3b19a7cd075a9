//! PCM sample model.
//!
//! The engine works on interleaved integer PCM. Each supported sample type
//! knows its bit width and peak magnitude; bit-plane access goes through the
//! raw two's-complement representation so sign bits are never disturbed.

use crate::error::{Result, StegoError};

/// Integer PCM sample that can carry data in its low-order bits
pub trait Sample: Copy + Send + Sync + PartialEq + std::fmt::Debug + 'static {
    /// Bit width of the sample representation
    const BITS: u32;
    /// Largest representable magnitude, used as MAX for PSNR
    const PEAK: f64;

    /// Raw two's-complement bits, zero-extended
    fn to_raw(self) -> u32;

    /// Rebuild a sample from raw bits; bits above `BITS` are ignored
    fn from_raw(raw: u32) -> Self;

    fn to_f64(self) -> f64;
}

impl Sample for i8 {
    const BITS: u32 = 8;
    const PEAK: f64 = i8::MAX as f64;

    fn to_raw(self) -> u32 {
        self as u8 as u32
    }

    fn from_raw(raw: u32) -> Self {
        raw as u8 as i8
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for i16 {
    const BITS: u32 = 16;
    const PEAK: f64 = i16::MAX as f64;

    fn to_raw(self) -> u32 {
        self as u16 as u32
    }

    fn from_raw(raw: u32) -> Self {
        raw as u16 as i16
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for i32 {
    const BITS: u32 = 32;
    const PEAK: f64 = i32::MAX as f64;

    fn to_raw(self) -> u32 {
        self as u32
    }

    fn from_raw(raw: u32) -> Self {
        raw as i32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Check that an interleaved buffer of `len` samples splits evenly into
/// `channels` channels. Returns the per-channel frame count.
pub fn validate_layout(len: usize, channels: usize) -> Result<usize> {
    if channels == 0 {
        return Err(StegoError::UnsupportedSampleFormat(
            "channel count must be at least 1".into(),
        ));
    }
    if len % channels != 0 {
        return Err(StegoError::UnsupportedSampleFormat(format!(
            "{} samples do not divide into {} interleaved channels",
            len, channels
        )));
    }
    Ok(len / channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip_keeps_sign() {
        for v in [i16::MIN, -1, 0, 1, 12345, i16::MAX] {
            assert_eq!(i16::from_raw(v.to_raw()), v);
        }
        for v in [i8::MIN, -1, 0, i8::MAX] {
            assert_eq!(i8::from_raw(v.to_raw()), v);
        }
        for v in [i32::MIN, -7, 0, i32::MAX] {
            assert_eq!(i32::from_raw(v.to_raw()), v);
        }
    }

    #[test]
    fn test_raw_is_zero_extended() {
        assert_eq!((-1i16).to_raw(), 0xFFFF);
        assert_eq!((-1i8).to_raw(), 0xFF);
    }

    #[test]
    fn test_validate_layout() {
        assert_eq!(validate_layout(10, 2).unwrap(), 5);
        assert_eq!(validate_layout(0, 1).unwrap(), 0);
        assert!(matches!(
            validate_layout(9, 2),
            Err(StegoError::UnsupportedSampleFormat(_))
        ));
        assert!(matches!(
            validate_layout(8, 0),
            Err(StegoError::UnsupportedSampleFormat(_))
        ));
    }
}
