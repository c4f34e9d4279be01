//! Sony SDIO vendor overlay (spec §6 "Sony SDIO").
//!
//! Operation codes follow the widely-documented Sony Alpha/SDIO extension
//! range (the same codes used by `libgphoto2`'s `ptp-sony.c` and the
//! `sonyalpha`/`sony-camera-api` reverse-engineering projects); spec §6 names
//! these operations but does not enumerate their numeric codes, so they are
//! taken from that established convention rather than invented.

use crate::codec::datatype;
use crate::registry::{
    CodeTable, DataCodec, DataDirection, ParamCodec, PropertyAccess, PropertyCodec, PropertyDef,
    VendorOverlay,
};

pub fn overlay() -> VendorOverlay {
    VendorOverlay {
        operations: operations(),
        properties: properties(),
        ..VendorOverlay::default()
    }
}

fn operations() -> CodeTable<crate::registry::OperationDef> {
    use crate::registry::{OperationDef, OperationParam};
    use DataDirection::{In, None as NoData, Out};
    use ParamCodec::U32;

    let mut t = CodeTable::new();
    let mut op = |code: u16,
                  name: &'static str,
                  description: &'static str,
                  direction,
                  data_codec: Option<DataCodec>,
                  operation_params: &[(&'static str, &'static str, ParamCodec, bool)]| {
        t.insert(
            code as u32,
            name,
            OperationDef {
                code,
                name,
                description,
                data_direction: direction,
                data_codec,
                operation_params: operation_params
                    .iter()
                    .map(|&(n, d, c, r)| OperationParam {
                        name: n,
                        description: d,
                        codec: c,
                        required: r,
                    })
                    .collect(),
                response_params: Vec::new(),
            },
        );
    };

    op(
        0x9201,
        "SDIO_Connect",
        "Advances the Sony SDIO auth handshake by one phase.",
        NoData,
        None,
        &[("phase", "Handshake phase (1, 2, or 3).", U32, true)],
    );
    op(
        0x9202,
        "SDIO_GetExtDeviceInfo",
        "Reads the SDIO extended device descriptor.",
        Out,
        Some(DataCodec::Raw),
        &[
            ("initiator_version", "Host SDIO protocol version.", U32, true),
            ("option", "Device-property option flags.", U32, true),
        ],
    );
    op(
        0x9205,
        "SDIO_OpenSession",
        "Opens a session with a Sony-specific function mode.",
        NoData,
        None,
        &[
            ("session_id", "Session ID to open.", U32, true),
            ("function_mode", "Remote/content-transfer mode flags.", U32, true),
        ],
    );
    op(
        0x9209,
        "SDIO_GetPartialLargeObject",
        "Reads a 64-bit-offset byte range of a large object (e.g. a still image).",
        Out,
        Some(DataCodec::Raw),
        &[
            ("object_handle", "Object handle to read.", U32, true),
            ("offset_lower", "Lower 32 bits of the byte offset.", U32, true),
            ("offset_upper", "Upper 32 bits of the byte offset.", U32, true),
            ("max_length", "Maximum number of bytes to read.", U32, true),
        ],
    );
    op(
        0x9214,
        "SDIO_GetExtDevicePropValue",
        "Reads a Sony extended property's full descriptor and current value.",
        Out,
        Some(DataCodec::Raw),
        &[("property_code", "Sony extended property code to read.", U32, true)],
    );
    op(
        0x9215,
        "SDIO_SetExtDevicePropValue",
        "Writes a Sony extended property's value.",
        In,
        Some(DataCodec::VariableValue),
        &[("property_code", "Sony extended property code to write.", U32, true)],
    );
    op(
        0x9281,
        "SDIO_ControlDevice",
        "Writes a button-like property (shutter, live view enable, etc).",
        In,
        Some(DataCodec::VariableValue),
        &[("property_code", "Control-device property code to write.", U32, true)],
    );

    t
}

/// Sony extended device-property codes in the vendor `0xD2xx` block, as used
/// by `SDIO_GetExtDevicePropValue`/`SDIO_SetExtDevicePropValue`.
fn properties() -> CodeTable<PropertyDef> {
    let mut t = CodeTable::new();
    let mut prop = |code: u32,
                    name: &'static str,
                    description: &'static str,
                    dtype: u16,
                    access,
                    codec: Option<PropertyCodec>| {
        t.insert(
            code,
            name,
            PropertyDef {
                code,
                name,
                description,
                datatype: dtype,
                access,
                codec,
            },
        );
    };

    prop(
        0xD200,
        "SonyDpcCompensation",
        "Exposure compensation, in 1/3-stop units.",
        datatype::INT16,
        PropertyAccess::GetSet,
        None,
    );
    prop(
        0xD20D,
        "SonyDpcShutterSpeed",
        "Shutter speed, displayed as a fraction or \"BULB\".",
        datatype::UINT32,
        PropertyAccess::GetSet,
        Some(PropertyCodec::ShutterSpeed),
    );
    prop(
        0xD21E,
        "SonyDpcIso",
        "ISO sensitivity, displayed as \"ISO N\" or \"ISO AUTO\".",
        datatype::UINT32,
        PropertyAccess::GetSet,
        Some(PropertyCodec::Iso),
    );
    prop(
        0xD215,
        "SonyDpcFNumber",
        "Lens aperture, displayed as \"f/N\".",
        datatype::UINT16,
        PropertyAccess::GetSet,
        Some(PropertyCodec::Aperture),
    );
    prop(
        0xD2C1,
        "SonyDpcLiveViewUrl",
        "Pseudo-property carrying the live-view stream URL.",
        datatype::STRING,
        PropertyAccess::Get,
        None,
    );

    // Aliases under the vendor-neutral names `Camera::get_aperture`/
    // `get_iso`/`get_shutter_speed` look up, so the generic accessors
    // resolve to Sony's own extended property codes instead of the
    // standard (and, on Sony bodies, unsupported) `GetDevicePropValue`
    // codes of the same name. Carries the same display codec as its
    // `SonyDpc*` counterpart so `SonyHooks::get` decodes it identically
    // regardless of which name resolved it.
    prop(
        0xD215,
        "FNumber",
        "Lens aperture, displayed as \"f/N\".",
        datatype::UINT16,
        PropertyAccess::GetSet,
        Some(PropertyCodec::Aperture),
    );
    prop(
        0xD21E,
        "ExposureIndex",
        "ISO sensitivity, displayed as \"ISO N\" or \"ISO AUTO\".",
        datatype::UINT32,
        PropertyAccess::GetSet,
        Some(PropertyCodec::Iso),
    );
    prop(
        0xD20D,
        "ExposureTime",
        "Shutter speed, displayed as a fraction or \"BULB\".",
        datatype::UINT32,
        PropertyAccess::GetSet,
        Some(PropertyCodec::ShutterSpeed),
    );

    // Session-setup and control-device properties used by `SonyHooks`
    // (spec §6 "Sony SDIO"); taken from the same established SDIO
    // numbering convention as the operation codes above.
    prop(
        0xD21B,
        "PositionKeySetting",
        "Whether GPS position metadata is attached to captures.",
        datatype::UINT8,
        PropertyAccess::GetSet,
        None,
    );
    prop(
        0xD222,
        "StillImageSaveDestination",
        "Where captured stills are saved (camera/host/both).",
        datatype::UINT8,
        PropertyAccess::GetSet,
        None,
    );
    prop(
        0xD2C2,
        "S1S2Button",
        "Shutter half/full-press button state.",
        datatype::UINT8,
        PropertyAccess::GetSet,
        None,
    );
    prop(
        0xD2C3,
        "SetLiveViewEnable",
        "Enables the live-view stream.",
        datatype::UINT8,
        PropertyAccess::GetSet,
        None,
    );
    prop(
        0xD2C4,
        "SetPostViewEnable",
        "Enables the post-capture review image.",
        datatype::UINT8,
        PropertyAccess::GetSet,
        None,
    );
    prop(
        0xD2C5,
        "ShutterReleaseButton",
        "Shutter release button state.",
        datatype::UINT8,
        PropertyAccess::GetSet,
        None,
    );
    prop(
        0xD2C6,
        "ShutterHalfReleaseButton",
        "Shutter half-press (focus) button state.",
        datatype::UINT8,
        PropertyAccess::GetSet,
        None,
    );
    prop(
        0xD2C7,
        "MovieRecButton",
        "Movie record start/stop button state.",
        datatype::UINT8,
        PropertyAccess::GetSet,
        None,
    );

    t
}

/// Live view is delivered via a pseudo object handle rather than a normal
/// storage-backed object (spec §6, §9 Open Question "Sony live view").
pub const LIVE_VIEW_OBJECT_HANDLE: u32 = 0xFFFF_C002;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_registers_sdio_connect_and_sony_properties() {
        let overlay = overlay();
        assert_eq!(
            overlay.operations.by_code(0x9201).unwrap().name,
            "SDIO_Connect"
        );
        assert!(overlay.properties.by_code(0xD21E).is_some());
    }
}
