//! Sony SDIO vendor camera (spec §4.9 "Sony").
//!
//! Builds on `registry::sony`'s operation table and the same
//! property-access shape used by the generic camera, generalized with the
//! three-phase `SDIO_Connect` auth handshake and the button-property
//! routing rule the spec documents.

use rand::Rng;

use crate::codec::{ObjectInfo, SonyLiveViewCodec, SonySdiPropDesc, Value, VariableValueCodec};
use crate::errors::{CameraError, VendorError};
use crate::registry::Registry;
use crate::session::{Connection, QueuedEvent};

use super::generic;
use super::generic::{check_response, operation_code, RESPONSE_OK, RESPONSE_SESSION_ALREADY_OPEN};
use super::{CaptureResult, VendorHooks};

const LIVE_VIEW_OBJECT_HANDLE: u32 = crate::registry::sony::LIVE_VIEW_OBJECT_HANDLE;
const OBJECT_ADDED_EVENT: u16 = 0x4002;
const FUNCTION_MODE_REMOTE_AND_CONTENT_TRANSFER: u32 = 0x0000_0002;
const INITIATOR_VERSION: u32 = 0x012C;
const DEVICE_PROPERTY_OPTION_ENABLE: u32 = 0x0000_0001;

const PHASE_1: u32 = 1;
const PHASE_2: u32 = 2;
const PHASE_3: u32 = 3;

/// Property names that must be set via `SDIO_ControlDevice` rather than
/// `SDIO_SetExtDevicePropValue` (spec §4.9 "the property name matches the
/// pattern...").
const CONTROL_DEVICE_PROPERTIES: &[&str] = &[
    "ShutterReleaseButton",
    "ShutterHalfReleaseButton",
    "S1S2Button",
    "SetLiveViewEnable",
    "SetPostViewEnable",
    "MovieRecButton",
];

#[derive(Debug, Default)]
pub struct SonyHooks {
    live_view_armed: bool,
}

impl SonyHooks {
    fn sdio_connect(
        &self,
        conn: &mut Connection,
        registry: &Registry,
        phase: u32,
    ) -> Result<(), CameraError> {
        let code = operation_code(registry, "SDIO_Connect")?;
        let outcome =
            conn.session
                .send_operation(&mut conn.transport, code, &[phase, 0, 0], None, false, 0)?;
        if outcome.response_code != RESPONSE_OK {
            return Err(CameraError::Vendor(VendorError::AuthFailed {
                phase: phase as u8,
                code: outcome.response_code,
            }));
        }
        Ok(())
    }

    /// Enables live view and post-view once per session (spec §9: "follow
    /// the variant that explicitly enables both before any capture").
    fn ensure_live_view_armed(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
    ) -> Result<(), CameraError> {
        if self.live_view_armed {
            return Ok(());
        }
        self.set(conn, registry, "SetLiveViewEnable", Value::U8(1))?;
        self.set(conn, registry, "SetPostViewEnable", Value::U8(1))?;
        self.live_view_armed = true;
        Ok(())
    }
}

impl VendorHooks for SonyHooks {
    fn open_session(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
    ) -> Result<u32, CameraError> {
        let session_id: u32 = rand::thread_rng().gen_range(1..u32::MAX);
        let open_code = operation_code(registry, "SDIO_OpenSession")?;
        let close_code = operation_code(registry, "CloseSession")?;

        conn.session.open_with_params(
            &mut conn.transport,
            open_code,
            close_code,
            session_id,
            &[session_id, FUNCTION_MODE_REMOTE_AND_CONTENT_TRANSFER],
            RESPONSE_OK,
            RESPONSE_SESSION_ALREADY_OPEN,
        )?;

        self.sdio_connect(conn, registry, PHASE_1)?;
        self.sdio_connect(conn, registry, PHASE_2)?;

        let info_code = operation_code(registry, "SDIO_GetExtDeviceInfo")?;
        let outcome = conn.session.send_operation(
            &mut conn.transport,
            info_code,
            &[INITIATOR_VERSION, DEVICE_PROPERTY_OPTION_ENABLE],
            None,
            true,
            4096,
        )?;
        check_response(&outcome, registry, "SDIO_GetExtDeviceInfo")?;

        self.sdio_connect(conn, registry, PHASE_3)?;

        self.set(conn, registry, "PositionKeySetting", Value::U8(1))?;
        self.set(conn, registry, "StillImageSaveDestination", Value::U8(1))?;

        Ok(session_id)
    }

    fn get(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        property_name: &str,
    ) -> Result<Value, CameraError> {
        let property = registry.property_by_name(property_name).ok_or_else(|| {
            CameraError::Unsupported(format!("property {property_name} not in registry"))
        })?;
        let code = operation_code(registry, "SDIO_GetExtDevicePropValue")?;

        let outcome = conn.session.send_operation(
            &mut conn.transport,
            code,
            &[property.code],
            None,
            true,
            4096,
        )?;
        check_response(&outcome, registry, "SDIO_GetExtDevicePropValue")?;

        let (desc, _) =
            SonySdiPropDesc::decode(&outcome.data.unwrap_or_default(), registry.endian())?;
        match property.codec {
            Some(display_codec) => Ok(display_codec.display(&desc.current_value, registry.endian())?),
            None => Ok(desc.current_value),
        }
    }

    fn set(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        property_name: &str,
        value: Value,
    ) -> Result<(), CameraError> {
        let property = registry.property_by_name(property_name).ok_or_else(|| {
            CameraError::Unsupported(format!("property {property_name} not in registry"))
        })?;

        let uses_control_device = CONTROL_DEVICE_PROPERTIES.contains(&property_name);
        let code = operation_code(
            registry,
            if uses_control_device {
                "SDIO_ControlDevice"
            } else {
                "SDIO_SetExtDevicePropValue"
            },
        )?;

        let bytes = VariableValueCodec.encode(&value, registry.endian())?;

        let outcome = conn.session.send_operation(
            &mut conn.transport,
            code,
            &[property.code],
            Some(&bytes),
            false,
            0,
        )?;
        check_response(
            &outcome,
            registry,
            if uses_control_device {
                "SDIO_ControlDevice"
            } else {
                "SDIO_SetExtDevicePropValue"
            },
        )
    }

    fn capture_image(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
    ) -> Result<CaptureResult, CameraError> {
        self.ensure_live_view_armed(conn, registry)?;

        self.set(conn, registry, "S1S2Button", Value::U8(1))?; // DOWN

        let _focused = conn.wait_for_event(|e| e.code == af_status_event_code());

        self.set(conn, registry, "S1S2Button", Value::U8(0))?; // UP

        let added = conn.wait_for_event(|e| e.code == OBJECT_ADDED_EVENT);

        let handle = match added {
            Some(event) => event.parameters.first().copied(),
            None => None,
        };

        let Some(handle) = handle else {
            return Ok(CaptureResult::default());
        };

        let info_code = operation_code(registry, "GetObjectInfo")?;
        let info_outcome = conn.session.send_operation(
            &mut conn.transport,
            info_code,
            &[handle],
            None,
            true,
            4096,
        )?;
        check_response(&info_outcome, registry, "GetObjectInfo")?;
        let info = ObjectInfo::decode(&info_outcome.data.unwrap_or_default(), registry.endian())?;

        let max_size = info.object_compressed_size + 10 * 1024 * 1024;
        let data = generic::get_object(conn, registry, handle, max_size)?;

        Ok(CaptureResult {
            object_handle: Some(handle),
            info: Some(info),
            data: Some(data),
        })
    }

    fn capture_live_view(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
    ) -> Result<Vec<u8>, CameraError> {
        self.ensure_live_view_armed(conn, registry)?;
        let raw = generic::get_object(conn, registry, LIVE_VIEW_OBJECT_HANDLE, 4 * 1024 * 1024)?;
        let frame = SonyLiveViewCodec.decode(&raw)?;
        Ok(frame.live_view_image)
    }

    /// Large-object read via `SDIO_GetPartialLargeObject` with a 64-bit
    /// offset split into two u32s (spec §4.9 "Large-object read"); chunks at
    /// 1 MiB.
    fn get_object(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        handle: u32,
        max_size: u32,
    ) -> Result<Vec<u8>, CameraError> {
        const CHUNK: u32 = 1024 * 1024;
        let code = operation_code(registry, "SDIO_GetPartialLargeObject")?;
        let mut out = Vec::with_capacity(max_size as usize);
        let mut offset: u64 = 0;

        loop {
            let this_chunk = CHUNK.min(max_size.saturating_sub(offset as u32));
            if this_chunk == 0 {
                break;
            }
            let offset_lower = (offset & 0xFFFF_FFFF) as u32;
            let offset_upper = (offset >> 32) as u32;

            let outcome = conn.session.send_operation(
                &mut conn.transport,
                code,
                &[handle, offset_lower, offset_upper, this_chunk],
                None,
                true,
                this_chunk as usize + 12,
            )?;
            check_response(&outcome, registry, "SDIO_GetPartialLargeObject")?;

            let chunk_data = outcome.data.unwrap_or_default();
            if chunk_data.is_empty() {
                break;
            }
            let sent = chunk_data.len() as u64;
            out.extend(chunk_data);
            offset += sent;
            if sent < this_chunk as u64 {
                break;
            }
        }

        Ok(out)
    }

    fn on_event(&mut self, _event: &QueuedEvent) {}
}

/// `AFStatus` is a Sony property-change event (0xC200 in the SDIO vendor
/// event range) carrying the focus state; not one of the fixed codes the
/// registry tables enumerate, so it's read directly here rather than looked
/// up by name.
fn af_status_event_code() -> u16 {
    0xC200
}
