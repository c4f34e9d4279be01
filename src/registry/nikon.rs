//! Nikon vendor overlay (spec §6 "Nikon").
//!
//! Nikon's extended property operations use a 4-byte `DevicePropCode` where
//! the standard operations use 2 bytes (`DevicePropDesc::decode_ex` in
//! `codec::composite` handles the wire-format difference); the operation
//! codes themselves are the documented Nikon PTP extension codes.

use crate::registry::{
    CodeTable, DataCodec, DataDirection, OperationDef, OperationParam, ParamCodec, VendorOverlay,
};

pub fn overlay() -> VendorOverlay {
    VendorOverlay {
        operations: operations(),
        ..VendorOverlay::default()
    }
}

fn operations() -> CodeTable<OperationDef> {
    use DataDirection::{In, Out};
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
        0x9431,
        "GetPartialObjectEx",
        "Reads a 64-bit-offset byte range of an object.",
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
        0x943A,
        "GetDevicePropDescEx",
        "Reads a property's extended descriptor, keyed by a 4-byte property code.",
        Out,
        Some(DataCodec::DevicePropDesc),
        &[("property_code", "Property code to describe.", U32, true)],
    );
    op(
        0x943C,
        "SetDevicePropValueEx",
        "Writes a property's value, keyed by a 4-byte property code.",
        In,
        Some(DataCodec::VariableValue),
        &[("property_code", "Property code to write.", U32, true)],
    );

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_registers_ex_property_operations() {
        let overlay = overlay();
        assert_eq!(
            overlay.operations.by_code(0x943A).unwrap().name,
            "GetDevicePropDescEx"
        );
        assert_eq!(
            overlay.operations.by_code(0x943C).unwrap().data_direction,
            DataDirection::In
        );
    }
}
