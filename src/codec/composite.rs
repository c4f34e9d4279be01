//! Composite Codecs
//!
//! Enum-over-primitive, the runtime-dispatched `VariableValueCodec`, and the
//! dataset codecs (DeviceInfo, ObjectInfo, StorageInfo, DevicePropDesc and
//! its Nikon/Sony variants, Canon event-data array, Sony live-view).
//!
//! Grounded in `DeviceInfo::decode` / `ObjectInfo::decode` / `StorageInfo::decode`
//! / `PropInfo::decode` from the retrieval pack's `a1ien-libptp` and
//! `CUAir-rust-ptp`, generalized to a runtime-selected endianness instead of
//! a fixed `byteorder::LittleEndian`.

use std::collections::HashMap;

use crate::codec::buf::{Endian, PtpCursor, PtpWriter};
use crate::codec::value::{datatype, Value};
use crate::errors::CodecError;

/// Wraps a primitive codec with a bijection `value <-> name`.
///
/// Decoding a value outside the enum fails with `CodecError::UnknownEnum`
/// unless the enum is declared `open` (vendor format codes, for example,
/// where unrecognized values pass through rather than error).
pub struct EnumCodec<V: Copy + Eq + std::hash::Hash + Into<u32>> {
    by_value: HashMap<V, &'static str>,
    by_name: HashMap<&'static str, V>,
    open: bool,
}

impl<V: Copy + Eq + std::hash::Hash + Into<u32>> EnumCodec<V> {
    pub fn new(entries: &[(V, &'static str)]) -> Self {
        Self::with_openness(entries, false)
    }

    pub fn open(entries: &[(V, &'static str)]) -> Self {
        Self::with_openness(entries, true)
    }

    fn with_openness(entries: &[(V, &'static str)], open: bool) -> Self {
        let mut by_value = HashMap::new();
        let mut by_name = HashMap::new();
        for &(v, name) in entries {
            by_value.insert(v, name);
            by_name.insert(name, v);
        }
        Self {
            by_value,
            by_name,
            open,
        }
    }

    pub fn name_of(&self, value: V) -> Result<Option<&'static str>, CodecError> {
        match self.by_value.get(&value) {
            Some(&name) => Ok(Some(name)),
            None if self.open => Ok(None),
            None => Err(CodecError::UnknownEnum { code: value.into() }),
        }
    }

    pub fn value_of(&self, name: &str) -> Option<V> {
        self.by_name.get(name).copied()
    }
}

/// Looks up the base codec for a runtime datatype code, decodes into an
/// erased [`Value`], and reports the raw bytes consumed — property codecs
/// that prefer to re-decode with semantic formatting need the raw slice,
/// not just the typed value.
///
/// This is also `Registry::codecs` (spec §3 "Registry"): the base codec
/// table dispatched by datatype code rather than a `CodeTable` of its own,
/// since the dispatch key (datatype code) and the decode logic already
/// live here.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableValueCodec;

impl VariableValueCodec {
    pub fn decode(
        &self,
        dtype: u16,
        bytes: &[u8],
        endian: Endian,
    ) -> Result<(Value, usize), CodecError> {
        let mut c = PtpCursor::new(bytes, endian);
        let value = match dtype {
            datatype::INT8 => Value::I8(c.read_i8()?),
            datatype::UINT8 => Value::U8(c.read_u8()?),
            datatype::INT16 => Value::I16(c.read_i16()?),
            datatype::UINT16 => Value::U16(c.read_u16()?),
            datatype::INT32 => Value::I32(c.read_i32()?),
            datatype::UINT32 => Value::U32(c.read_u32()?),
            datatype::INT64 => Value::I64(c.read_i64()?),
            datatype::UINT64 => Value::U64(c.read_u64()?),
            datatype::UINT128 | datatype::INT128 => Value::U128(c.read_u128_fixed()?),
            datatype::STRING => Value::Str(c.read_ptp_string()?),
            datatype::ARRAY_INT8 => Value::ArrayI8(c.read_array(|c| c.read_i8())?),
            datatype::ARRAY_UINT8 => Value::ArrayU8(c.read_array(|c| c.read_u8())?),
            datatype::ARRAY_INT16 => Value::ArrayI16(c.read_array(|c| c.read_i16())?),
            datatype::ARRAY_UINT16 => Value::ArrayU16(c.read_u16_array()?),
            datatype::ARRAY_INT32 => Value::ArrayI32(c.read_array(|c| c.read_i32())?),
            datatype::ARRAY_UINT32 => Value::ArrayU32(c.read_u32_array()?),
            datatype::ARRAY_INT64 => Value::ArrayI64(c.read_array(|c| c.read_i64())?),
            datatype::ARRAY_UINT64 => Value::ArrayU64(c.read_array(|c| c.read_u64())?),
            other => return Err(CodecError::UnknownDatatype { code: other }),
        };
        Ok((value, c.position()))
    }

    pub fn encode(&self, value: &Value, endian: Endian) -> Result<Vec<u8>, CodecError> {
        let mut w = PtpWriter::new(endian);
        match value {
            Value::I8(v) => w.write_i8(*v),
            Value::U8(v) => w.write_u8(*v),
            Value::I16(v) => w.write_i16(*v),
            Value::U16(v) => w.write_u16(*v),
            Value::I32(v) => w.write_i32(*v),
            Value::U32(v) => w.write_u32(*v),
            Value::I64(v) => w.write_i64(*v),
            Value::U64(v) => w.write_u64(*v),
            Value::U128(v) => w.write_u128_fixed(v),
            Value::Str(v) => w.write_ptp_string(v),
            Value::ArrayI8(v) => w.write_array(v, |w, x| w.write_i8(*x)),
            Value::ArrayU8(v) => w.write_array(v, |w, x| w.write_u8(*x)),
            Value::ArrayI16(v) => w.write_array(v, |w, x| w.write_i16(*x)),
            Value::ArrayU16(v) => w.write_u16_array(v),
            Value::ArrayI32(v) => w.write_array(v, |w, x| w.write_i32(*x)),
            Value::ArrayU32(v) => w.write_u32_array(v),
            Value::ArrayI64(v) => w.write_array(v, |w, x| w.write_i64(*x)),
            Value::ArrayU64(v) => w.write_array(v, |w, x| w.write_u64(*x)),
        }
        Ok(w.into_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub standard_version: u16,
    pub vendor_extension_id: u32,
    pub vendor_extension_version: u16,
    pub vendor_extension_desc: String,
    pub functional_mode: u16,
    pub operations_supported: Vec<u16>,
    pub events_supported: Vec<u16>,
    pub device_properties_supported: Vec<u16>,
    pub capture_formats: Vec<u16>,
    pub image_formats: Vec<u16>,
    pub manufacturer: String,
    pub model: String,
    pub device_version: String,
    pub serial_number: String,
}

impl DeviceInfo {
    pub fn decode(bytes: &[u8], endian: Endian) -> Result<Self, CodecError> {
        let mut c = PtpCursor::new(bytes, endian);
        Ok(Self {
            standard_version: c.read_u16()?,
            vendor_extension_id: c.read_u32()?,
            vendor_extension_version: c.read_u16()?,
            vendor_extension_desc: c.read_ptp_string()?,
            functional_mode: c.read_u16()?,
            operations_supported: c.read_u16_array()?,
            events_supported: c.read_u16_array()?,
            device_properties_supported: c.read_u16_array()?,
            capture_formats: c.read_u16_array()?,
            image_formats: c.read_u16_array()?,
            manufacturer: c.read_ptp_string()?,
            model: c.read_ptp_string()?,
            device_version: c.read_ptp_string()?,
            serial_number: c.read_ptp_string()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub storage_id: u32,
    pub object_format: u16,
    pub protection_status: u16,
    pub object_compressed_size: u32,
    pub thumb_format: u16,
    pub thumb_compressed_size: u32,
    pub thumb_pix_width: u32,
    pub thumb_pix_height: u32,
    pub image_pix_width: u32,
    pub image_pix_height: u32,
    pub image_bit_depth: u32,
    pub parent_object: u32,
    pub association_type: u16,
    pub association_desc: u32,
    pub sequence_number: u32,
    pub filename: String,
    pub capture_date: String,
    pub modification_date: String,
    pub keywords: String,
}

impl ObjectInfo {
    pub fn decode(bytes: &[u8], endian: Endian) -> Result<Self, CodecError> {
        let mut c = PtpCursor::new(bytes, endian);
        Ok(Self {
            storage_id: c.read_u32()?,
            object_format: c.read_u16()?,
            protection_status: c.read_u16()?,
            object_compressed_size: c.read_u32()?,
            thumb_format: c.read_u16()?,
            thumb_compressed_size: c.read_u32()?,
            thumb_pix_width: c.read_u32()?,
            thumb_pix_height: c.read_u32()?,
            image_pix_width: c.read_u32()?,
            image_pix_height: c.read_u32()?,
            image_bit_depth: c.read_u32()?,
            parent_object: c.read_u32()?,
            association_type: c.read_u16()?,
            association_desc: c.read_u32()?,
            sequence_number: c.read_u32()?,
            filename: c.read_ptp_string()?,
            capture_date: c.read_ptp_string()?,
            modification_date: c.read_ptp_string()?,
            keywords: c.read_ptp_string()?,
        })
    }

    pub fn encode(&self, endian: Endian) -> Vec<u8> {
        let mut w = PtpWriter::new(endian);
        w.write_u32(self.storage_id);
        w.write_u16(self.object_format);
        w.write_u16(self.protection_status);
        w.write_u32(self.object_compressed_size);
        w.write_u16(self.thumb_format);
        w.write_u32(self.thumb_compressed_size);
        w.write_u32(self.thumb_pix_width);
        w.write_u32(self.thumb_pix_height);
        w.write_u32(self.image_pix_width);
        w.write_u32(self.image_pix_height);
        w.write_u32(self.image_bit_depth);
        w.write_u32(self.parent_object);
        w.write_u16(self.association_type);
        w.write_u32(self.association_desc);
        w.write_u32(self.sequence_number);
        w.write_ptp_string(&self.filename);
        w.write_ptp_string(&self.capture_date);
        w.write_ptp_string(&self.modification_date);
        w.write_ptp_string(&self.keywords);
        w.into_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct StorageInfo {
    pub storage_type: u16,
    pub filesystem_type: u16,
    pub access_capability: u16,
    pub max_capacity: u64,
    pub free_space_in_bytes: u64,
    pub free_space_in_images: u32,
    pub storage_description: String,
    pub volume_label: String,
}

impl StorageInfo {
    pub fn decode(bytes: &[u8], endian: Endian) -> Result<Self, CodecError> {
        let mut c = PtpCursor::new(bytes, endian);
        Ok(Self {
            storage_type: c.read_u16()?,
            filesystem_type: c.read_u16()?,
            access_capability: c.read_u16()?,
            max_capacity: c.read_u64()?,
            free_space_in_bytes: c.read_u64()?,
            free_space_in_images: c.read_u32()?,
            storage_description: c.read_ptp_string()?,
            volume_label: c.read_ptp_string()?,
        })
    }
}

/// `formFlag` byte of a `DevicePropDesc`.
#[derive(Debug, Clone)]
pub enum PropForm {
    None,
    Range {
        min: Value,
        max: Value,
        step: Value,
    },
    Enum {
        values: Vec<Value>,
    },
}

#[derive(Debug, Clone)]
pub struct DevicePropDesc {
    pub device_prop_code: u32,
    pub datatype: u16,
    pub get_set: u8,
    pub factory_default: Value,
    pub current_value: Value,
    pub form: PropForm,
}

impl DevicePropDesc {
    /// Standard, 2-byte `DevicePropCode` layout.
    pub fn decode(bytes: &[u8], endian: Endian) -> Result<(Self, usize), CodecError> {
        Self::decode_with_code_width(bytes, endian, false)
    }

    /// Nikon `GetDevicePropDescEx` 4-byte `DevicePropCode` layout.
    pub fn decode_ex(bytes: &[u8], endian: Endian) -> Result<(Self, usize), CodecError> {
        Self::decode_with_code_width(bytes, endian, true)
    }

    fn decode_with_code_width(
        bytes: &[u8],
        endian: Endian,
        wide_code: bool,
    ) -> Result<(Self, usize), CodecError> {
        let mut c = PtpCursor::new(bytes, endian);
        let device_prop_code = if wide_code {
            c.read_u32()?
        } else {
            c.read_u16()? as u32
        };
        let datatype = c.read_u16()?;
        let get_set = c.read_u8()?;

        let var = VariableValueCodec;
        let mut consumed = c.position();
        let (factory_default, n) = var.decode(datatype, &bytes[consumed..], endian)?;
        consumed += n;
        let (current_value, n) = var.decode(datatype, &bytes[consumed..], endian)?;
        consumed += n;

        let mut c2 = PtpCursor::new(&bytes[consumed..], endian);
        let form_flag = c2.read_u8()?;
        consumed += 1;

        let form = match form_flag {
            0x01 => {
                let (min, n) = var.decode(datatype, &bytes[consumed..], endian)?;
                consumed += n;
                let (max, n) = var.decode(datatype, &bytes[consumed..], endian)?;
                consumed += n;
                let (step, n) = var.decode(datatype, &bytes[consumed..], endian)?;
                consumed += n;
                PropForm::Range { min, max, step }
            }
            0x02 => {
                let mut c3 = PtpCursor::new(&bytes[consumed..], endian);
                let count = c3.read_u16()?;
                consumed += 2;
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let (v, n) = var.decode(datatype, &bytes[consumed..], endian)?;
                    consumed += n;
                    values.push(v);
                }
                PropForm::Enum { values }
            }
            _ => PropForm::None,
        };

        Ok((
            Self {
                device_prop_code,
                datatype,
                get_set,
                factory_default,
                current_value,
                form,
            },
            consumed,
        ))
    }
}

/// Sony SDIO extended `DevicePropDesc` layout: adds `isEnabled`, and an
/// enum form with two parallel value sets (`set` for display, `getset` for
/// the values actually legal to write).
#[derive(Debug, Clone)]
pub struct SonySdiPropDesc {
    pub device_prop_code: u16,
    pub datatype: u16,
    pub get_set: u8,
    pub is_enabled: u8,
    pub factory_default: Value,
    pub current_value: Value,
    pub form_flag: u8,
    pub values_set: Vec<Value>,
    pub values_getset: Vec<Value>,
}

impl SonySdiPropDesc {
    pub fn decode(bytes: &[u8], endian: Endian) -> Result<(Self, usize), CodecError> {
        let mut c = PtpCursor::new(bytes, endian);
        let device_prop_code = c.read_u16()?;
        let datatype = c.read_u16()?;
        let get_set = c.read_u8()?;
        let is_enabled = c.read_u8()?;

        let var = VariableValueCodec;
        let mut consumed = c.position();
        let (factory_default, n) = var.decode(datatype, &bytes[consumed..], endian)?;
        consumed += n;
        let (current_value, n) = var.decode(datatype, &bytes[consumed..], endian)?;
        consumed += n;

        let mut c2 = PtpCursor::new(&bytes[consumed..], endian);
        let form_flag = c2.read_u8()?;
        consumed += 1;

        let mut values_set = Vec::new();
        let mut values_getset = Vec::new();
        if form_flag == 0x02 {
            let mut c3 = PtpCursor::new(&bytes[consumed..], endian);
            let n_set = c3.read_u16()?;
            consumed += 2;
            for _ in 0..n_set {
                let (v, n) = var.decode(datatype, &bytes[consumed..], endian)?;
                consumed += n;
                values_set.push(v);
            }
            let mut c4 = PtpCursor::new(&bytes[consumed..], endian);
            let n_getset = c4.read_u16()?;
            consumed += 2;
            for _ in 0..n_getset {
                let (v, n) = var.decode(datatype, &bytes[consumed..], endian)?;
                consumed += n;
                values_getset.push(v);
            }
        }

        Ok((
            Self {
                device_prop_code,
                datatype,
                get_set,
                is_enabled,
                factory_default,
                current_value,
                form_flag,
                values_set,
                values_getset,
            },
            consumed,
        ))
    }
}

/// Canon `CanonGetEventData` recognized record codes.
pub mod canon_event_code {
    pub const PROPERTY_CHANGED: u16 = 0xC189;
    pub const PROPERTY_ALLOWED_VALUES: u16 = 0xC18A;
}

#[derive(Debug, Clone)]
pub enum CanonEventRecord {
    PropertyChanged { prop_code: u32, value: u32 },
    AllowedValues { prop_code: u32, values: Vec<u32> },
    Unknown { code: u16, payload_len: usize },
}

/// Tokenizes the chunked Canon event-data stream. Terminates when
/// `size==0`, `size==8` (empty payload), `code==0`, or a declared size
/// would overflow the buffer. Unknown codes skip `size-8` bytes.
pub struct CanonEventDataCodec;

impl CanonEventDataCodec {
    pub fn decode(&self, bytes: &[u8], endian: Endian) -> Result<Vec<CanonEventRecord>, CodecError> {
        let mut records = Vec::new();
        let mut offset = 0usize;

        while offset + 8 <= bytes.len() {
            let mut c = PtpCursor::new(&bytes[offset..], endian);
            let size = c.read_u32()? as usize;
            let code = c.read_u16()?;
            let _reserved = c.read_u16()?;

            if size <= 8 || code == 0 {
                break;
            }
            if offset + size > bytes.len() {
                break;
            }

            let payload = &bytes[offset + 8..offset + size];
            let record = match code {
                canon_event_code::PROPERTY_CHANGED => {
                    let mut pc = PtpCursor::new(payload, endian);
                    let prop_code = pc.read_u16()? as u32;
                    let _pad = pc.read_u16()?;
                    let value = pc.read_u32()?;
                    CanonEventRecord::PropertyChanged { prop_code, value }
                }
                canon_event_code::PROPERTY_ALLOWED_VALUES => {
                    let mut pc = PtpCursor::new(payload, endian);
                    let prop_code = pc.read_u16()? as u32;
                    let _pad = pc.read_u16()?;
                    let _dtype = pc.read_u32()?;
                    let count = pc.read_u32()?;
                    let mut values = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        values.push(pc.read_u32()?);
                    }
                    CanonEventRecord::AllowedValues { prop_code, values }
                }
                other => CanonEventRecord::Unknown {
                    code: other,
                    payload_len: payload.len(),
                },
            };

            records.push(record);
            offset += size;
        }

        Ok(records)
    }
}

/// Sony live-view object (handle `0xFFFFC002`): a fixed-offset header table
/// followed by an embedded JPEG. We locate the JPEG via its SOI/EOI markers
/// after skipping the documented header, rather than hard-coding an offset
/// the vendor may change between firmware revisions.
#[derive(Debug, Clone)]
pub struct SonyLiveViewFrame {
    pub live_view_image: Vec<u8>,
}

pub struct SonyLiveViewCodec;

impl SonyLiveViewCodec {
    const HEADER_LEN: usize = 8;

    pub fn decode(&self, bytes: &[u8]) -> Result<SonyLiveViewFrame, CodecError> {
        if bytes.len() < Self::HEADER_LEN {
            return Err(CodecError::Truncated {
                need: Self::HEADER_LEN,
                have: bytes.len(),
            });
        }
        let search_from = Self::HEADER_LEN;
        let jpeg_start = find_subsequence(&bytes[search_from..], &[0xFF, 0xD8])
            .map(|i| i + search_from)
            .ok_or(CodecError::InvalidString)?;
        let jpeg_end = find_subsequence(&bytes[jpeg_start..], &[0xFF, 0xD9])
            .map(|i| jpeg_start + i + 2)
            .unwrap_or(bytes.len());

        Ok(SonyLiveViewFrame {
            live_view_image: bytes[jpeg_start..jpeg_end].to_vec(),
        })
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_info_round_trips_sony_sample() {
        let mut w = PtpWriter::new(Endian::Little);
        w.write_u16(100);
        w.write_u32(0x0000_0006);
        w.write_u16(100);
        w.write_ptp_string("Sony & Co.");
        w.write_u16(1);
        w.write_u16_array(&[0x1001, 0x1002]);
        w.write_u16_array(&[0x4002]);
        w.write_u16_array(&[0x5007]);
        w.write_u16_array(&[0x3801]);
        w.write_u16_array(&[0x3801]);
        w.write_ptp_string("Sony");
        w.write_ptp_string("ILCE-7M4");
        w.write_ptp_string("1.00");
        w.write_ptp_string("0123456789");
        let bytes = w.into_bytes();

        let info = DeviceInfo::decode(&bytes, Endian::Little).unwrap();
        assert_eq!(info.manufacturer, "Sony");
        assert_eq!(info.model, "ILCE-7M4");
        assert_eq!(info.operations_supported, vec![0x1001, 0x1002]);
    }

    #[test]
    fn object_info_is_symmetric() {
        let info = ObjectInfo {
            storage_id: 0x0001_0001,
            object_format: 0x3801,
            protection_status: 0,
            object_compressed_size: 1_048_576,
            thumb_format: 0x3801,
            thumb_compressed_size: 4096,
            thumb_pix_width: 160,
            thumb_pix_height: 120,
            image_pix_width: 6000,
            image_pix_height: 4000,
            image_bit_depth: 24,
            parent_object: 0,
            association_type: 0,
            association_desc: 0,
            sequence_number: 0,
            filename: "DSC00001.JPG".into(),
            capture_date: "20260101T120000".into(),
            modification_date: "20260101T120000".into(),
            keywords: "".into(),
        };
        let bytes = info.encode(Endian::Little);
        let decoded = ObjectInfo::decode(&bytes, Endian::Little).unwrap();
        assert_eq!(decoded.filename, "DSC00001.JPG");
        assert_eq!(decoded.object_compressed_size, 1_048_576);
    }

    #[test]
    fn device_prop_desc_range_form() {
        let mut w = PtpWriter::new(Endian::Little);
        w.write_u16(0x5007); // F-Number
        w.write_u16(datatype::UINT16);
        w.write_u8(0x01); // GetSet
        w.write_u16(280); // factory default
        w.write_u16(280); // current
        w.write_u8(0x01); // range form
        w.write_u16(100); // min
        w.write_u16(900); // max
        w.write_u16(10); // step
        let bytes = w.into_bytes();

        let (desc, consumed) = DevicePropDesc::decode(&bytes, Endian::Little).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(desc.device_prop_code, 0x5007);
        match desc.form {
            PropForm::Range { min, max, .. } => {
                assert_eq!(min, Value::U16(100));
                assert_eq!(max, Value::U16(900));
            }
            _ => panic!("expected range form"),
        }
    }

    #[test]
    fn device_prop_desc_ex_uses_four_byte_code() {
        let mut w = PtpWriter::new(Endian::Little);
        w.write_u32(0x0005_0007);
        w.write_u16(datatype::UINT16);
        w.write_u8(0x01);
        w.write_u16(280);
        w.write_u16(280);
        w.write_u8(0x00);
        let bytes = w.into_bytes();

        let (desc, _) = DevicePropDesc::decode_ex(&bytes, Endian::Little).unwrap();
        assert_eq!(desc.device_prop_code, 0x0005_0007);
    }

    #[test]
    fn canon_event_cache_parses_property_changed_and_allowed_values() {
        let mut bytes = Vec::new();

        // Record 1: property changed, propCode=0xD101, value=0x01F4
        let mut w1 = PtpWriter::new(Endian::Little);
        w1.write_u32(8 + 8); // size
        w1.write_u16(canon_event_code::PROPERTY_CHANGED);
        w1.write_u16(0); // reserved
        w1.write_u16(0xD101);
        w1.write_u16(0); // pad
        w1.write_u32(0x01F4);
        bytes.extend(w1.into_bytes());

        // Record 2: allowed values, propCode=0xD101, type=3, values=[0x64,0xC8,0x1F4]
        let mut w2 = PtpWriter::new(Endian::Little);
        let payload_len = 2 + 2 + 4 + 4 + 4 * 3;
        w2.write_u32((8 + payload_len) as u32);
        w2.write_u16(canon_event_code::PROPERTY_ALLOWED_VALUES);
        w2.write_u16(0);
        w2.write_u16(0xD101);
        w2.write_u16(0);
        w2.write_u32(3);
        w2.write_u32(3);
        w2.write_u32(0x0064);
        w2.write_u32(0x00C8);
        w2.write_u32(0x01F4);
        bytes.extend(w2.into_bytes());

        let records = CanonEventDataCodec.decode(&bytes, Endian::Little).unwrap();
        assert_eq!(records.len(), 2);
        match &records[0] {
            CanonEventRecord::PropertyChanged { prop_code, value } => {
                assert_eq!(*prop_code, 0xD101);
                assert_eq!(*value, 0x01F4);
            }
            _ => panic!("expected property changed"),
        }
        match &records[1] {
            CanonEventRecord::AllowedValues { prop_code, values } => {
                assert_eq!(*prop_code, 0xD101);
                assert_eq!(values, &vec![0x64, 0xC8, 0x1F4]);
            }
            _ => panic!("expected allowed values"),
        }
    }

    #[test]
    fn canon_event_stream_stops_on_empty_record() {
        let bytes = vec![0u8; 8]; // size=0
        let records = CanonEventDataCodec.decode(&bytes, Endian::Little).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn sony_live_view_extracts_jpeg_range() {
        let mut bytes = vec![0u8; SonyLiveViewCodec::HEADER_LEN];
        bytes.extend_from_slice(&[0xFF, 0xD8, 0xAA, 0xBB, 0xFF, 0xD9]);
        bytes.extend_from_slice(b"trailer-junk");

        let frame = SonyLiveViewCodec.decode(&bytes).unwrap();
        assert_eq!(frame.live_view_image, vec![0xFF, 0xD8, 0xAA, 0xBB, 0xFF, 0xD9]);
    }
}
