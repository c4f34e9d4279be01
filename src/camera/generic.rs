//! The plain-PTP fallback camera (spec §4.9 "Generic fallback").
//!
//! Also hosts the shared helpers (`get_property`/`set_property`/
//! `list_objects`/`get_object`) that the Sony/Nikon/Canon hooks reuse for
//! the parts of §4.8 they don't override, built the same way a direct PTP
//! client method would be but going through the `Registry`/`Session`
//! instead of hard-coded operation codes.

use crate::codec::{DeviceInfo, Endian, ObjectInfo, StorageInfo, Value, VariableValueCodec};
use crate::errors::{CameraError, PtpError};
use crate::registry::{PropertyAccess, Registry};
use crate::session::{Connection, OperationOutcome, QueuedEvent};

use super::{CaptureResult, StorageListing, VendorHooks};

pub(crate) const RESPONSE_OK: u16 = 0x2001;
pub(crate) const RESPONSE_SESSION_ALREADY_OPEN: u16 = 0x201E;
const OBJECT_ADDED_EVENT: u16 = 0x4002;

/// Looks up an operation's code by name, shared by the generic camera and
/// every vendor hooks implementation so the registry-miss error message is
/// worded consistently across all four.
pub(crate) fn operation_code(registry: &Registry, name: &str) -> Result<u16, CameraError> {
    registry
        .operations
        .by_name(name)
        .map(|o| o.code)
        .ok_or_else(|| CameraError::Unsupported(format!("operation {name} not in registry")))
}

/// Raises `Ok(())` for `OK`, a [`CameraError::Ptp`] otherwise, shared by the
/// generic camera and every vendor hooks implementation.
pub(crate) fn check_response(
    outcome: &OperationOutcome,
    registry: &Registry,
    operation: &'static str,
) -> Result<(), CameraError> {
    if outcome.response_code == RESPONSE_OK {
        return Ok(());
    }
    let message = registry
        .response_name(outcome.response_code)
        .unwrap_or("unknown response")
        .to_string();
    Err(CameraError::Ptp(PtpError::new(
        outcome.response_code,
        operation,
        message,
    )))
}

fn decode_u32_array(bytes: &[u8], endian: Endian) -> Result<Vec<u32>, CameraError> {
    use crate::codec::PtpCursor;
    let mut c = PtpCursor::new(bytes, endian);
    Ok(c.read_u32_array()?)
}

/// Default `GetDevicePropValue`/`SetDevicePropValue` implementation shared
/// by the generic camera and any vendor that doesn't override property
/// access (spec §4.8 "`get`/`set` are thin wrappers...").
pub fn get_property(
    conn: &mut Connection,
    registry: &Registry,
    property_name: &str,
) -> Result<Value, CameraError> {
    let property = registry.property_by_name(property_name).ok_or_else(|| {
        CameraError::Unsupported(format!("property {property_name} not in registry"))
    })?;
    let code = operation_code(registry, "GetDevicePropValue")?;

    let outcome = conn.session.send_operation(
        &mut conn.transport,
        code,
        &[property.code],
        None,
        true,
        4096,
    )?;
    check_response(&outcome, registry, "GetDevicePropValue")?;

    let bytes = outcome.data.unwrap_or_default();
    let codec = VariableValueCodec;
    let (value, _) = codec.decode(property.datatype, &bytes, registry.endian())?;
    match property.codec {
        Some(display_codec) => Ok(display_codec.display(&value, registry.endian())?),
        None => Ok(value),
    }
}

pub fn set_property(
    conn: &mut Connection,
    registry: &Registry,
    property_name: &str,
    value: Value,
) -> Result<(), CameraError> {
    let property = registry.property_by_name(property_name).ok_or_else(|| {
        CameraError::Unsupported(format!("property {property_name} not in registry"))
    })?;
    if property.access != PropertyAccess::GetSet {
        return Err(CameraError::Unsupported(format!(
            "property {property_name} is read-only"
        )));
    }
    let code = operation_code(registry, "SetDevicePropValue")?;
    let codec = VariableValueCodec;
    let bytes = codec.encode(&value, registry.endian())?;

    let outcome = conn.session.send_operation(
        &mut conn.transport,
        code,
        &[property.code],
        Some(&bytes),
        false,
        0,
    )?;
    check_response(&outcome, registry, "SetDevicePropValue")
}

/// `GetStorageIDs` → for each storage: `GetStorageInfo`, `GetObjectHandles`
/// → for each handle: `GetObjectInfo` (spec §4.8 `listObjects`).
pub fn list_objects(
    conn: &mut Connection,
    registry: &Registry,
) -> Result<Vec<(u32, StorageListing)>, CameraError> {
    let storage_ids_code = operation_code(registry, "GetStorageIDs")?;
    let storage_info_code = operation_code(registry, "GetStorageInfo")?;
    let object_handles_code = operation_code(registry, "GetObjectHandles")?;
    let object_info_code = operation_code(registry, "GetObjectInfo")?;

    let storage_ids_outcome = conn.session.send_operation(
        &mut conn.transport,
        storage_ids_code,
        &[],
        None,
        true,
        4096,
    )?;
    check_response(&storage_ids_outcome, registry, "GetStorageIDs")?;
    let storage_ids =
        decode_u32_array(&storage_ids_outcome.data.unwrap_or_default(), registry.endian())?;

    let mut listings = Vec::new();
    for storage_id in storage_ids {
        let info_outcome = conn.session.send_operation(
            &mut conn.transport,
            storage_info_code,
            &[storage_id],
            None,
            true,
            4096,
        )?;
        check_response(&info_outcome, registry, "GetStorageInfo")?;
        let storage_info =
            StorageInfo::decode(&info_outcome.data.unwrap_or_default(), registry.endian())?;

        let handles_outcome = conn.session.send_operation(
            &mut conn.transport,
            object_handles_code,
            &[storage_id, 0, 0],
            None,
            true,
            1 << 20,
        )?;
        check_response(&handles_outcome, registry, "GetObjectHandles")?;
        let handles =
            decode_u32_array(&handles_outcome.data.unwrap_or_default(), registry.endian())?;

        let mut objects = Vec::with_capacity(handles.len());
        for handle in handles {
            let object_info_outcome = conn.session.send_operation(
                &mut conn.transport,
                object_info_code,
                &[handle],
                None,
                true,
                4096,
            )?;
            check_response(&object_info_outcome, registry, "GetObjectInfo")?;
            let object_info = ObjectInfo::decode(
                &object_info_outcome.data.unwrap_or_default(),
                registry.endian(),
            )?;
            objects.push((handle, object_info));
        }

        listings.push((
            storage_id,
            StorageListing {
                info: storage_info,
                objects,
            },
        ));
    }

    Ok(listings)
}

/// Default single-shot `GetObject` (spec §4.8 `getObject`): vendor overrides
/// chunk through partial-object operations instead.
pub fn get_object(
    conn: &mut Connection,
    registry: &Registry,
    handle: u32,
    max_size: u32,
) -> Result<Vec<u8>, CameraError> {
    let code = operation_code(registry, "GetObject")?;
    let outcome = conn.session.send_operation(
        &mut conn.transport,
        code,
        &[handle],
        None,
        true,
        max_size as usize + 12,
    )?;
    check_response(&outcome, registry, "GetObject")?;
    Ok(outcome.data.unwrap_or_default())
}

/// The plain-PTP fallback, used when the USB vendor ID matches none of the
/// specialized vendors (spec §4.9 "Generic fallback"): `OpenSession(1)`,
/// `GetDeviceInfo`, standard property get/set.
#[derive(Debug, Default)]
pub struct GenericHooks {
    pub device_info: Option<DeviceInfo>,
}

impl VendorHooks for GenericHooks {
    fn open_session(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
    ) -> Result<u32, CameraError> {
        let open_code = operation_code(registry, "OpenSession")?;
        let close_code = operation_code(registry, "CloseSession")?;
        conn.session.open(
            &mut conn.transport,
            open_code,
            close_code,
            1,
            RESPONSE_OK,
            RESPONSE_SESSION_ALREADY_OPEN,
        )?;

        let info_code = operation_code(registry, "GetDeviceInfo")?;
        let outcome =
            conn.session
                .send_operation(&mut conn.transport, info_code, &[], None, true, 4096)?;
        check_response(&outcome, registry, "GetDeviceInfo")?;
        if let Ok(info) = DeviceInfo::decode(&outcome.data.unwrap_or_default(), registry.endian())
        {
            self.device_info = Some(info);
        }

        Ok(1)
    }

    fn get(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        property_name: &str,
    ) -> Result<Value, CameraError> {
        get_property(conn, registry, property_name)
    }

    fn set(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        property_name: &str,
        value: Value,
    ) -> Result<(), CameraError> {
        set_property(conn, registry, property_name, value)
    }

    fn capture_image(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
    ) -> Result<CaptureResult, CameraError> {
        let code = operation_code(registry, "InitiateCapture")?;
        let outcome =
            conn.session
                .send_operation(&mut conn.transport, code, &[0, 0], None, false, 0)?;
        check_response(&outcome, registry, "InitiateCapture")?;

        let handle = conn
            .wait_for_event(|e| e.code == OBJECT_ADDED_EVENT)
            .map(|e| e.parameters.first().copied().unwrap_or(0));

        Ok(CaptureResult {
            object_handle: handle,
            info: None,
            data: None,
        })
    }

    fn get_object(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        handle: u32,
        max_size: u32,
    ) -> Result<Vec<u8>, CameraError> {
        get_object(conn, registry, handle, max_size)
    }

    fn on_event(&mut self, _event: &QueuedEvent) {}
}
