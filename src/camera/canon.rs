//! Canon EOS vendor camera (spec §4.9 "Canon EOS").
//!
//! Properties are event-cached rather than queried on demand: Canon EOS
//! bodies push current values and allowed-value sets through
//! `CanonGetEventData` instead of answering `GetDevicePropValue`, so `get`
//! reads from a cache populated by draining that event stream (grounded in
//! `codec::composite::CanonEventDataCodec`, built earlier this session).

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use crate::codec::{CanonEventDataCodec, CanonEventRecord, Value};
use crate::errors::{CameraError, VendorError};
use crate::registry::Registry;
use crate::session::{Connection, QueuedEvent};

use super::generic::{check_response, operation_code, RESPONSE_OK, RESPONSE_SESSION_ALREADY_OPEN};
use super::{CaptureResult, VendorHooks};

const RESPONSE_DEVICE_BUSY: u16 = 0x2019;
const ENABLE: u32 = 1;

/// `RemoteReleaseOn`/`Off` button identifiers (spec §4.9 Canon capture
/// sequence: focus half-press, then shutter, then release in reverse).
const BUTTON_FOCUS: u32 = 1;
const BUTTON_SHUTTER: u32 = 2;

const SET_PROP_RETRY_ATTEMPTS: u32 = 5;
const SET_PROP_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Canon EOS camera: event-cached property access plus the
/// `RemoteReleaseOn`/`Off` capture sequence (spec §4.9 "Canon EOS").
#[derive(Debug, Default)]
pub struct CanonHooks {
    property_cache: HashMap<u32, u32>,
    allowed_values_cache: HashMap<u32, Vec<u32>>,
}

impl CanonHooks {
    /// Drains `CanonGetEventData` until it reports no more records,
    /// applying each to the property/allowed-values caches.
    fn drain_event_data(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
    ) -> Result<(), CameraError> {
        let code = operation_code(registry, "CanonGetEventData")?;
        loop {
            let outcome =
                conn.session
                    .send_operation(&mut conn.transport, code, &[], None, true, 1 << 16)?;
            check_response(&outcome, registry, "CanonGetEventData")?;

            let bytes = outcome.data.unwrap_or_default();
            if bytes.is_empty() {
                return Ok(());
            }

            let records = CanonEventDataCodec.decode(&bytes, registry.endian())?;
            if records.is_empty() {
                return Ok(());
            }
            for record in &records {
                self.apply_event_record(record);
            }
        }
    }

    fn apply_event_record(&mut self, record: &CanonEventRecord) {
        match record {
            CanonEventRecord::PropertyChanged { prop_code, value } => {
                self.property_cache.insert(*prop_code, *value);
            }
            CanonEventRecord::AllowedValues { prop_code, values } => {
                self.allowed_values_cache.insert(*prop_code, values.clone());
            }
            CanonEventRecord::Unknown { .. } => {}
        }
    }

    fn remote_release(
        &self,
        conn: &mut Connection,
        registry: &Registry,
        operation: &'static str,
        button: u32,
    ) -> Result<(), CameraError> {
        let code = operation_code(registry, operation)?;
        let outcome = conn
            .session
            .send_operation(&mut conn.transport, code, &[button], None, false, 0)?;
        check_response(&outcome, registry, operation)
    }
}

impl VendorHooks for CanonHooks {
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

        let remote_mode_code = operation_code(registry, "CanonSetRemoteMode")?;
        let outcome = conn.session.send_operation(
            &mut conn.transport,
            remote_mode_code,
            &[ENABLE],
            None,
            false,
            0,
        )?;
        check_response(&outcome, registry, "CanonSetRemoteMode")?;

        let event_mode_code = operation_code(registry, "CanonSetEventMode")?;
        let outcome = conn.session.send_operation(
            &mut conn.transport,
            event_mode_code,
            &[ENABLE],
            None,
            false,
            0,
        )?;
        check_response(&outcome, registry, "CanonSetEventMode")?;

        self.drain_event_data(conn, registry)?;

        Ok(1)
    }

    /// Read-only from the event cache (spec §4.9 "Canon properties are
    /// event-only"): a property absent from the cache has not yet been
    /// pushed by the camera, not merely "unknown".
    fn get(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        property_name: &str,
    ) -> Result<Value, CameraError> {
        let property = registry.property_by_name(property_name).ok_or_else(|| {
            CameraError::Unsupported(format!("property {property_name} not in registry"))
        })?;
        let _ = conn;
        let raw = self
            .property_cache
            .get(&property.code)
            .map(|&v| Value::U32(v))
            .ok_or(CameraError::Vendor(VendorError::PropertyNotCached {
                code: property.code as u16,
            }))?;
        match property.codec {
            Some(display_codec) => Ok(display_codec.display(&raw, registry.endian())?),
            None => Ok(raw),
        }
    }

    /// `CanonSetDevicePropValue` with a fixed `{size=12, propCode, value}`
    /// payload, retried on `DeviceBusy` (spec §4.9 "retry up to 5 times with
    /// a 100ms backoff"), then a single event-data drain to pick up the
    /// camera's own confirmation.
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
        let code = operation_code(registry, "CanonSetDevicePropValue")?;

        let raw_value = match value {
            Value::U8(v) => v as u32,
            Value::U16(v) => v as u32,
            Value::U32(v) => v,
            Value::I8(v) => v as u32,
            Value::I16(v) => v as u32,
            Value::I32(v) => v as u32,
            _ => {
                return Err(CameraError::Unsupported(
                    "Canon property values must fit a u32".to_string(),
                ))
            }
        };

        let mut payload = crate::codec::PtpWriter::new(registry.endian());
        payload.write_u32(12);
        payload.write_u32(property.code);
        payload.write_u32(raw_value);
        let bytes = payload.into_bytes();

        let mut attempt = 0;
        loop {
            let outcome = conn.session.send_operation(
                &mut conn.transport,
                code,
                &[],
                Some(&bytes),
                false,
                0,
            )?;

            if outcome.response_code == RESPONSE_OK {
                break;
            }
            if outcome.response_code == RESPONSE_DEVICE_BUSY && attempt < SET_PROP_RETRY_ATTEMPTS {
                attempt += 1;
                thread::sleep(SET_PROP_RETRY_BACKOFF);
                continue;
            }
            check_response(&outcome, registry, "CanonSetDevicePropValue")?;
            break;
        }

        self.drain_event_data(conn, registry)
    }

    /// Four-step focus/shutter sequence (spec §9: "Canon `captureImage`
    /// returns an empty `{}`" — the object itself arrives later via
    /// `ObjectAdded`, not from this call).
    fn capture_image(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
    ) -> Result<CaptureResult, CameraError> {
        self.remote_release(conn, registry, "RemoteReleaseOn", BUTTON_FOCUS)?;
        self.remote_release(conn, registry, "RemoteReleaseOn", BUTTON_SHUTTER)?;
        self.remote_release(conn, registry, "RemoteReleaseOff", BUTTON_SHUTTER)?;
        self.remote_release(conn, registry, "RemoteReleaseOff", BUTTON_FOCUS)?;

        Ok(CaptureResult::default())
    }

    fn get_object(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        handle: u32,
        max_size: u32,
    ) -> Result<Vec<u8>, CameraError> {
        super::generic::get_object(conn, registry, handle, max_size)
    }

    fn on_event(&mut self, event: &QueuedEvent) {
        // Canon delivers property updates over the interrupt endpoint too,
        // in addition to the polled `CanonGetEventData` stream; keep the
        // cache current either way.
        if event.code == crate::registry::canon::event::PROPERTY_CHANGED {
            if let (Some(&prop_code), Some(&value)) =
                (event.parameters.first(), event.parameters.get(1))
            {
                self.property_cache.insert(prop_code, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_cache_starts_empty_and_get_reports_not_cached() {
        let hooks = CanonHooks::default();
        assert!(hooks.property_cache.is_empty());
        assert!(hooks.allowed_values_cache.is_empty());
    }

    #[test]
    fn apply_event_record_populates_both_caches() {
        let mut hooks = CanonHooks::default();
        hooks.apply_event_record(&CanonEventRecord::PropertyChanged {
            prop_code: 0xD101,
            value: 0x01F4,
        });
        hooks.apply_event_record(&CanonEventRecord::AllowedValues {
            prop_code: 0xD101,
            values: vec![0x64, 0xC8, 0x1F4],
        });
        assert_eq!(hooks.property_cache.get(&0xD101), Some(&0x01F4));
        assert_eq!(
            hooks.allowed_values_cache.get(&0xD101),
            Some(&vec![0x64, 0xC8, 0x1F4])
        );
    }
}
