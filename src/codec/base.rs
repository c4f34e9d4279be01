//! Base Codecs
//!
//! Primitive codecs for the PTP scalar datatypes. Each exposes
//! `encode(value) -> bytes` and `decode(bytes, offset) -> {value, bytesRead}`
//! per spec. `Codec<T>` is the typed trait; `DynCodec` (in `composite.rs`) is
//! the object-safe erased form the registry stores.

use crate::codec::buf::{Endian, PtpCursor, PtpWriter};
use crate::errors::CodecError;

/// A bidirectional map between a typed value and its PTP byte layout.
pub trait Codec<T> {
    fn encode(&self, value: &T, endian: Endian) -> Vec<u8>;
    /// Returns the decoded value and the number of bytes consumed.
    fn decode(&self, bytes: &[u8], endian: Endian) -> Result<(T, usize), CodecError>;
}

macro_rules! scalar_codec {
    ($name:ident, $ty:ty, $read:ident, $write:ident, $width:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Codec<$ty> for $name {
            fn encode(&self, value: &$ty, endian: Endian) -> Vec<u8> {
                let mut w = PtpWriter::new(endian);
                w.$write(*value);
                w.into_bytes()
            }

            fn decode(&self, bytes: &[u8], endian: Endian) -> Result<($ty, usize), CodecError> {
                let mut c = PtpCursor::new(bytes, endian);
                let value = c.$read()?;
                Ok((value, $width))
            }
        }
    };
}

scalar_codec!(UInt8Codec, u8, read_u8, write_u8, 1);
scalar_codec!(Int8Codec, i8, read_i8, write_i8, 1);
scalar_codec!(UInt16Codec, u16, read_u16, write_u16, 2);
scalar_codec!(Int16Codec, i16, read_i16, write_i16, 2);
scalar_codec!(UInt32Codec, u32, read_u32, write_u32, 4);
scalar_codec!(Int32Codec, i32, read_i32, write_i32, 4);
scalar_codec!(UInt64Codec, u64, read_u64, write_u64, 8);
scalar_codec!(Int64Codec, i64, read_i64, write_i64, 8);

/// A fixed, opaque 16-byte blob (PTP UINT128).
#[derive(Debug, Clone, Copy, Default)]
pub struct UInt128Codec;

impl Codec<[u8; 16]> for UInt128Codec {
    fn encode(&self, value: &[u8; 16], _endian: Endian) -> Vec<u8> {
        let mut w = PtpWriter::new(Endian::Little);
        w.write_u128_fixed(value);
        w.into_bytes()
    }

    fn decode(&self, bytes: &[u8], endian: Endian) -> Result<([u8; 16], usize), CodecError> {
        let mut c = PtpCursor::new(bytes, endian);
        Ok((c.read_u128_fixed()?, 16))
    }
}

/// PTP length-prefixed UTF-16 string.
#[derive(Debug, Clone, Copy, Default)]
pub struct PtpStringCodec;

impl Codec<String> for PtpStringCodec {
    fn encode(&self, value: &String, endian: Endian) -> Vec<u8> {
        let mut w = PtpWriter::new(endian);
        w.write_ptp_string(value);
        w.into_bytes()
    }

    fn decode(&self, bytes: &[u8], endian: Endian) -> Result<(String, usize), CodecError> {
        let mut c = PtpCursor::new(bytes, endian);
        let value = c.read_ptp_string()?;
        Ok((value, c.position()))
    }
}

/// `array<T>` = `count: u32` then `count` elements of `T`, delegating each
/// element to an inner codec.
pub struct ArrayCodec<'a, T, C: Codec<T>> {
    pub elem: &'a C,
    _marker: std::marker::PhantomData<T>,
}

impl<'a, T, C: Codec<T>> ArrayCodec<'a, T, C> {
    pub fn new(elem: &'a C) -> Self {
        Self {
            elem,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<'a, T, C: Codec<T>> Codec<Vec<T>> for ArrayCodec<'a, T, C> {
    fn encode(&self, value: &Vec<T>, endian: Endian) -> Vec<u8> {
        let mut w = PtpWriter::new(endian);
        w.write_u32(value.len() as u32);
        for item in value {
            w.write_bytes(&self.elem.encode(item, endian));
        }
        w.into_bytes()
    }

    fn decode(&self, bytes: &[u8], endian: Endian) -> Result<(Vec<T>, usize), CodecError> {
        let mut cursor = PtpCursor::new(bytes, endian);
        let count = cursor.read_u32()? as usize;
        let mut consumed = 4;
        let mut out = Vec::with_capacity(count.min(1 << 20));
        for _ in 0..count {
            let (value, used) = self.elem.decode(&bytes[consumed..], endian)?;
            consumed += used;
            out.push(value);
        }
        Ok((out, consumed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint16_round_trips() {
        let codec = UInt16Codec;
        let bytes = codec.encode(&350u16, Endian::Little);
        assert_eq!(bytes, vec![0x5E, 0x01]);
        let (v, n) = codec.decode(&bytes, Endian::Little).unwrap();
        assert_eq!(v, 350);
        assert_eq!(n, 2);
    }

    #[test]
    fn uint64_does_not_truncate() {
        let codec = UInt64Codec;
        let v: u64 = 0xFFFF_FFFF_FFFF_FFFF;
        let bytes = codec.encode(&v, Endian::Little);
        let (decoded, n) = codec.decode(&bytes, Endian::Little).unwrap();
        assert_eq!(decoded, v);
        assert_eq!(n, 8);
    }

    #[test]
    fn string_codec_empty() {
        let codec = PtpStringCodec;
        assert_eq!(codec.encode(&String::new(), Endian::Little), vec![0x00]);
        let (v, n) = codec.decode(&[0x00], Endian::Little).unwrap();
        assert_eq!(v, "");
        assert_eq!(n, 1);
    }

    #[test]
    fn array_codec_round_trips() {
        let elem = UInt16Codec;
        let array = ArrayCodec::new(&elem);
        let values = vec![1u16, 2, 3];
        let bytes = array.encode(&values, Endian::Little);
        let (decoded, n) = array.decode(&bytes, Endian::Little).unwrap();
        assert_eq!(decoded, values);
        assert_eq!(n, bytes.len());
    }
}
