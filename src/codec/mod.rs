//! The wire codec layer: byte cursors, base primitive codecs, the erased
//! runtime `Value`, and composite/dataset codecs built on top of them.

pub mod base;
pub mod buf;
pub mod composite;
pub mod properties;
pub mod value;

pub use base::{ArrayCodec, Codec, Int16Codec, Int32Codec, Int64Codec, Int8Codec, PtpStringCodec,
    UInt128Codec, UInt16Codec, UInt32Codec, UInt64Codec, UInt8Codec};
pub use buf::{Endian, PtpCursor, PtpWriter};
pub use composite::{
    CanonEventDataCodec, CanonEventRecord, DeviceInfo, DevicePropDesc, EnumCodec, ObjectInfo,
    PropForm, SonyLiveViewCodec, SonyLiveViewFrame, SonySdiPropDesc, StorageInfo,
    VariableValueCodec,
};
pub use properties::{ApertureCodec, IsoCodec, ShutterSpeedCodec};
pub use value::{datatype, Value};
