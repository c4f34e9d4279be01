//! A thin wrapper over `rusb::DeviceHandle<rusb::Context>`.
//!
//! `transport::usb`, `transport::control`, and `transport::interrupt`
//! each assume a `DeviceHandle` type with `bulk_read`/`bulk_write`/
//! `control_read`/`control_write`/`interrupt_read`/`interrupt_write`
//! methods; this is that type.

use std::time::Duration;

use crate::errors::TransportError;

pub struct DeviceHandle {
    inner: rusb::DeviceHandle<rusb::Context>,
    interface: u8,
}

impl DeviceHandle {
    pub fn new(inner: rusb::DeviceHandle<rusb::Context>, interface: u8) -> Self {
        Self { inner, interface }
    }

    pub fn interface(&self) -> u8 {
        self.interface
    }

    pub fn bulk_read(
        &self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        Ok(self.inner.read_bulk(endpoint, buf, timeout)?)
    }

    pub fn bulk_write(
        &self,
        endpoint: u8,
        buf: &[u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        Ok(self.inner.write_bulk(endpoint, buf, timeout)?)
    }

    pub fn interrupt_read(
        &self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        Ok(self.inner.read_interrupt(endpoint, buf, timeout)?)
    }

    pub fn interrupt_write(
        &self,
        endpoint: u8,
        buf: &[u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        Ok(self.inner.write_interrupt(endpoint, buf, timeout)?)
    }

    pub fn control_read(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        Ok(self
            .inner
            .read_control(request_type, request, value, index, buf, timeout)?)
    }

    pub fn control_write(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &[u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        Ok(self
            .inner
            .write_control(request_type, request, value, index, buf, timeout)?)
    }

    pub fn clear_halt(&self, endpoint: u8) -> Result<(), TransportError> {
        Ok(self.inner.clear_halt(endpoint)?)
    }

    pub fn release(&self) -> Result<(), TransportError> {
        Ok(self.inner.release_interface(self.interface)?)
    }
}

/// The device-handle operations the STALL-recovery sequence
/// (`transport::stall::recover`) and the interrupt loop
/// (`transport::interrupt::InterruptLoop::run`) depend on, factored out so
/// tests can script both against a mock instead of a real `rusb` handle.
/// `DeviceHandle`'s own inherent methods above still take priority at
/// ordinary call sites; this is only consulted through a generic `H:
/// BulkTransportOps` bound.
pub trait BulkTransportOps {
    fn bulk_read(&self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError>;
    fn bulk_write(&self, endpoint: u8, buf: &[u8], timeout: Duration) -> Result<usize, TransportError>;
    fn interrupt_read(&self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError>;
    fn control_read(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError>;
    fn control_write(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &[u8],
        timeout: Duration,
    ) -> Result<usize, TransportError>;
    fn clear_halt(&self, endpoint: u8) -> Result<(), TransportError>;
    fn interface(&self) -> u8;
}

impl BulkTransportOps for DeviceHandle {
    fn bulk_read(&self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        self.bulk_read(endpoint, buf, timeout)
    }

    fn bulk_write(&self, endpoint: u8, buf: &[u8], timeout: Duration) -> Result<usize, TransportError> {
        self.bulk_write(endpoint, buf, timeout)
    }

    fn interrupt_read(&self, endpoint: u8, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        self.interrupt_read(endpoint, buf, timeout)
    }

    fn control_read(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        self.control_read(request_type, request, value, index, buf, timeout)
    }

    fn control_write(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &[u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        self.control_write(request_type, request, value, index, buf, timeout)
    }

    fn clear_halt(&self, endpoint: u8) -> Result<(), TransportError> {
        self.clear_halt(endpoint)
    }

    fn interface(&self) -> u8 {
        self.interface()
    }
}
