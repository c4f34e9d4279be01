//! Scripted transport mocks for exercising STALL recovery and the
//! three-phase transaction engine without a real USB device. Used only from
//! `#[cfg(test)]` modules in `stall.rs` and `session::tests`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use crate::errors::TransportError;
use crate::transport::device_handle::BulkTransportOps;
use crate::transport::usb::PtpTransport;

/// One scripted device-handle call and its canned result. Calls must arrive
/// in the order scripted; a call that doesn't match the next step, or a
/// script that runs out, panics with the method name so a failing test
/// points straight at the mismatch.
pub enum MockStep {
    BulkRead(Result<Vec<u8>, TransportError>),
    BulkWrite(Result<usize, TransportError>),
    InterruptRead(Result<Vec<u8>, TransportError>),
    ControlRead(Result<Vec<u8>, TransportError>),
    ControlWrite(Result<usize, TransportError>),
    ClearHalt(Result<(), TransportError>),
}

pub struct MockDeviceHandle {
    steps: RefCell<VecDeque<MockStep>>,
    interface: u8,
}

impl MockDeviceHandle {
    pub fn new(steps: Vec<MockStep>) -> Self {
        Self {
            steps: RefCell::new(steps.into_iter().collect()),
            interface: 0,
        }
    }

    fn next_step(&self, what: &str) -> MockStep {
        self.steps
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("MockDeviceHandle: no scripted step left for {what}"))
    }
}

impl BulkTransportOps for MockDeviceHandle {
    fn bulk_read(&self, _endpoint: u8, buf: &mut [u8], _timeout: Duration) -> Result<usize, TransportError> {
        match self.next_step("bulk_read") {
            MockStep::BulkRead(Ok(bytes)) => {
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
            MockStep::BulkRead(Err(e)) => Err(e),
            _ => panic!("MockDeviceHandle: expected bulk_read next"),
        }
    }

    fn bulk_write(&self, _endpoint: u8, _buf: &[u8], _timeout: Duration) -> Result<usize, TransportError> {
        match self.next_step("bulk_write") {
            MockStep::BulkWrite(result) => result,
            _ => panic!("MockDeviceHandle: expected bulk_write next"),
        }
    }

    fn interrupt_read(&self, _endpoint: u8, buf: &mut [u8], _timeout: Duration) -> Result<usize, TransportError> {
        match self.next_step("interrupt_read") {
            MockStep::InterruptRead(Ok(bytes)) => {
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
            MockStep::InterruptRead(Err(e)) => Err(e),
            _ => panic!("MockDeviceHandle: expected interrupt_read next"),
        }
    }

    fn control_read(
        &self,
        _request_type: u8,
        _request: u8,
        _value: u16,
        _index: u16,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> Result<usize, TransportError> {
        match self.next_step("control_read") {
            MockStep::ControlRead(Ok(bytes)) => {
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
            MockStep::ControlRead(Err(e)) => Err(e),
            _ => panic!("MockDeviceHandle: expected control_read next"),
        }
    }

    fn control_write(
        &self,
        _request_type: u8,
        _request: u8,
        _value: u16,
        _index: u16,
        _buf: &[u8],
        _timeout: Duration,
    ) -> Result<usize, TransportError> {
        match self.next_step("control_write") {
            MockStep::ControlWrite(result) => result,
            _ => panic!("MockDeviceHandle: expected control_write next"),
        }
    }

    fn clear_halt(&self, _endpoint: u8) -> Result<(), TransportError> {
        match self.next_step("clear_halt") {
            MockStep::ClearHalt(result) => result,
            _ => panic!("MockDeviceHandle: expected clear_halt next"),
        }
    }

    fn interface(&self) -> u8 {
        self.interface
    }
}

/// A scripted `PtpTransport`: records every container written with `send`,
/// and hands back queued containers on `receive` in order.
pub struct MockPtpTransport {
    sent: RefCell<Vec<Vec<u8>>>,
    reads: RefCell<VecDeque<Result<Vec<u8>, TransportError>>>,
}

impl MockPtpTransport {
    pub fn new(reads: Vec<Result<Vec<u8>, TransportError>>) -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            reads: RefCell::new(reads.into_iter().collect()),
        }
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.borrow().clone()
    }
}

impl PtpTransport for MockPtpTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.sent.borrow_mut().push(bytes.to_vec());
        Ok(())
    }

    fn receive(&self, _max_length: usize) -> Result<Vec<u8>, TransportError> {
        self.reads
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("MockPtpTransport: no scripted read left"))
    }

    fn interrupt_packet_len(&self) -> usize {
        64
    }
}
