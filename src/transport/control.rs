//! PTP class control requests (§4.6 "Class requests").
//!
//! Follows the same request-type/request constant module and
//! `ControlTransfer` builder shape used elsewhere in this crate,
//! specialized to the four PIMA 15740 still-image class requests instead
//! of generic standard/HID descriptor fetches.

use std::time::Duration;

use crate::codec::buf::{Endian, PtpCursor};
use crate::errors::TransportError;
use crate::transport::device_handle::BulkTransportOps;

/// `bmRequestType` components for class + interface requests.
pub mod request_type {
    pub const DIR_IN: u8 = 0x80;
    pub const DIR_OUT: u8 = 0x00;
    pub const TYPE_CLASS: u8 = 0x20;
    pub const RECIP_INTERFACE: u8 = 0x01;

    pub const fn build(direction: u8) -> u8 {
        direction | TYPE_CLASS | RECIP_INTERFACE
    }
}

/// PTP still-image class requests.
pub mod request {
    pub const CANCEL: u8 = 0x64;
    pub const GET_EXTENDED_EVENT_DATA: u8 = 0x65;
    pub const DEVICE_RESET: u8 = 0x66;
    pub const GET_DEVICE_STATUS: u8 = 0x67;
}

pub const CANCELLATION_CODE: u16 = 0x4001;

/// Parsed response to `GetDeviceStatus`: `{length: u16, code: u16, params: u32[]}`.
#[derive(Debug, Clone)]
pub struct DeviceStatus {
    pub code: u16,
    pub params: Vec<u32>,
}

impl DeviceStatus {
    fn parse(bytes: &[u8]) -> Result<Self, TransportError> {
        let mut c = PtpCursor::new(bytes, Endian::Little);
        let _length = c.read_u16().map_err(|_| TransportError::Timeout)?;
        let code = c.read_u16().map_err(|_| TransportError::Timeout)?;
        let mut params = Vec::new();
        while !c.is_empty() {
            match c.read_u32() {
                Ok(p) => params.push(p),
                Err(_) => break,
            }
        }
        Ok(Self { code, params })
    }
}

pub const STATUS_OK: u16 = 0x2001;

pub struct ClassControl<'a, H: BulkTransportOps> {
    handle: &'a H,
    timeout: Duration,
}

impl<'a, H: BulkTransportOps> ClassControl<'a, H> {
    pub fn new(handle: &'a H) -> Self {
        Self {
            handle,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `Cancel Request (0x64)`: 6-byte payload `{CancellationCode u16, TransactionID u32}`.
    pub fn cancel(&self, transaction_id: u32) -> Result<(), TransportError> {
        let mut payload = Vec::with_capacity(6);
        payload.extend_from_slice(&CANCELLATION_CODE.to_le_bytes());
        payload.extend_from_slice(&transaction_id.to_le_bytes());

        self.handle.control_write(
            request_type::build(request_type::DIR_OUT),
            request::CANCEL,
            0,
            self.handle.interface() as u16,
            &payload,
            self.timeout,
        )?;
        Ok(())
    }

    pub fn get_extended_event_data(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.handle.control_read(
            request_type::build(request_type::DIR_IN),
            request::GET_EXTENDED_EVENT_DATA,
            0,
            self.handle.interface() as u16,
            buf,
            self.timeout,
        )
    }

    pub fn device_reset(&self) -> Result<(), TransportError> {
        self.handle.control_write(
            request_type::build(request_type::DIR_OUT),
            request::DEVICE_RESET,
            0,
            self.handle.interface() as u16,
            &[],
            self.timeout,
        )?;
        Ok(())
    }

    pub fn get_device_status(&self) -> Result<DeviceStatus, TransportError> {
        let mut buf = [0u8; 32];
        let n = self.handle.control_read(
            request_type::build(request_type::DIR_IN),
            request::GET_DEVICE_STATUS,
            0,
            self.handle.interface() as u16,
            &mut buf,
            self.timeout,
        )?;
        DeviceStatus::parse(&buf[..n])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_type_matches_class_interface_in() {
        assert_eq!(request_type::build(request_type::DIR_IN), 0xA1);
        assert_eq!(request_type::build(request_type::DIR_OUT), 0x21);
    }

    #[test]
    fn device_status_parses_ok_code() {
        let bytes = [0x04, 0x00, 0x01, 0x20];
        let status = DeviceStatus::parse(&bytes).unwrap();
        assert_eq!(status.code, STATUS_OK);
        assert!(status.params.is_empty());
    }
}
