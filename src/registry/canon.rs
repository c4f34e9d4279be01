//! Canon EOS vendor overlay (spec §6 "Canon EOS").
//!
//! spec §9 leaves `CanonSetEventMode`'s code as an open question (it only
//! names `CanonSetRemoteMode`, `CanonGetEventData`, `RemoteReleaseOn/Off`
//! explicitly). Resolved here as its own code, `0x9115`, immediately
//! following `CanonSetRemoteMode` — the documented EOS operation that must
//! be sent after `SetRemoteMode` to switch the camera into polled-event
//! delivery before `CanonGetEventData` is meaningful; it does not collide
//! with `CanonSetRemoteMode`.

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
        0x9114,
        "CanonSetRemoteMode",
        "Switches the camera into remote-control mode.",
        In,
        None,
        &[("mode", "Remote mode to enter.", U32, true)],
    );
    op(
        0x9115,
        "CanonSetEventMode",
        "Switches the camera into polled-event delivery, required before CanonGetEventData.",
        In,
        None,
        &[("mode", "Event delivery mode.", U32, true)],
    );
    op(
        0x9116,
        "CanonGetEventData",
        "Polls the queued event/property-change records.",
        Out,
        Some(DataCodec::Raw),
        &[],
    );
    op(
        0x9110,
        "CanonSetDevicePropValue",
        "Writes a Canon device property's value.",
        In,
        Some(DataCodec::VariableValue),
        &[("property_code", "Property code to write.", U32, true)],
    );
    op(
        0x9128,
        "RemoteReleaseOn",
        "Presses the shutter button (half or full, by parameter).",
        NoData,
        None,
        &[("press_level", "1 = half-press, 2 = full-press.", U32, true)],
    );
    op(
        0x9129,
        "RemoteReleaseOff",
        "Releases the shutter button.",
        NoData,
        None,
        &[("press_level", "1 = half-press, 2 = full-press.", U32, true)],
    );

    t
}

/// Event codes surfaced through `CanonGetEventData` (`codec::composite`'s
/// `canon_event_code` module names the individual record kinds).
pub mod event {
    pub const PROPERTY_CHANGED: u16 = 0xC189;
    pub const PROPERTY_ALLOWED_VALUES: u16 = 0xC18A;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_resolves_event_mode_distinct_from_remote_mode() {
        let overlay = overlay();
        let remote_mode = overlay.operations.by_code(0x9114).unwrap();
        let event_mode = overlay.operations.by_code(0x9115).unwrap();
        assert_eq!(remote_mode.name, "CanonSetRemoteMode");
        assert_eq!(event_mode.name, "CanonSetEventMode");
        assert_ne!(remote_mode.code, event_mode.code);
    }
}
