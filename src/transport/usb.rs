//! USB Transport
//!
//! Device discovery, interface claim (still-image class 0x06/subclass 0x01),
//! endpoint triad acquisition, and bulk send/receive with STALL recovery.
//!
//! Follows the same device-scan-plus-descriptor-probing shape and
//! retry-on-stall send/receive pattern used throughout this crate's
//! transport layer, generalized from generic USB classification to the
//! PTP still-image interface contract in spec §4.6.

use std::sync::Arc;
use std::time::Duration;

use rusb::UsbContext;
use serde::{Deserialize, Serialize};

use crate::errors::TransportError;
use crate::transport::device_handle::DeviceHandle;
use crate::transport::stall::{self, StalledEndpoints};

/// Still-image (PTP) USB class/subclass, per spec §4.6/§6.
pub const STILL_IMAGE_CLASS: u8 = 0x06;
pub const STILL_IMAGE_SUBCLASS: u8 = 0x01;

const BULK_TIMEOUT: Duration = Duration::from_secs(5);
const INTERRUPT_PACKET_LEN: usize = 64;

/// A discovered still-image-class USB device, prior to claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsbDeviceDescriptor {
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub bus_number: u8,
    pub device_address: u8,
}

/// Enumerates USB devices exposing a still-image class 0x06/subclass 0x01
/// interface, per spec §4.6 "Discovery".
pub fn discover() -> Result<Vec<UsbDeviceDescriptor>, TransportError> {
    let context = rusb::Context::new()?;
    let mut out = Vec::new();

    for device in context.devices()?.iter() {
        let config = match device.active_config_descriptor() {
            Ok(c) => c,
            Err(_) => continue,
        };
        let has_still_image = config.interfaces().any(|iface| {
            iface.descriptors().any(|d| {
                d.class_code() == STILL_IMAGE_CLASS && d.sub_class_code() == STILL_IMAGE_SUBCLASS
            })
        });
        if !has_still_image {
            continue;
        }

        let device_desc = match device.device_descriptor() {
            Ok(d) => d,
            Err(_) => continue,
        };

        let mut descriptor = UsbDeviceDescriptor {
            vendor_id: device_desc.vendor_id(),
            product_id: device_desc.product_id(),
            manufacturer: None,
            model: None,
            serial_number: None,
            bus_number: device.bus_number(),
            device_address: device.address(),
        };

        if let Ok(handle) = device.open() {
            let timeout = Duration::from_secs(1);
            if let Ok(languages) = handle.read_languages(timeout) {
                if let Some(lang) = languages.first() {
                    descriptor.manufacturer = handle
                        .read_manufacturer_string(*lang, &device_desc, timeout)
                        .ok();
                    descriptor.model =
                        handle.read_product_string(*lang, &device_desc, timeout).ok();
                    descriptor.serial_number = handle
                        .read_serial_number_string(*lang, &device_desc, timeout)
                        .ok();
                }
            }
        }

        out.push(descriptor);
    }

    Ok(out)
}

struct Endpoints {
    bulk_in: u8,
    bulk_out: u8,
    interrupt_in: Option<u8>,
    interface_number: u8,
}

fn find_still_image_endpoints(
    config: &rusb::ConfigDescriptor,
) -> Result<Endpoints, TransportError> {
    for iface in config.interfaces() {
        for descriptor in iface.descriptors() {
            if descriptor.class_code() != STILL_IMAGE_CLASS
                || descriptor.sub_class_code() != STILL_IMAGE_SUBCLASS
            {
                continue;
            }

            let mut bulk_in = None;
            let mut bulk_out = None;
            let mut interrupt_in = None;

            for ep in descriptor.endpoint_descriptors() {
                use rusb::{Direction, TransferType};
                match (ep.transfer_type(), ep.direction()) {
                    (TransferType::Bulk, Direction::In) => bulk_in = Some(ep.address()),
                    (TransferType::Bulk, Direction::Out) => bulk_out = Some(ep.address()),
                    (TransferType::Interrupt, Direction::In) => interrupt_in = Some(ep.address()),
                    _ => {}
                }
            }

            if let (Some(bulk_in), Some(bulk_out)) = (bulk_in, bulk_out) {
                return Ok(Endpoints {
                    bulk_in,
                    bulk_out,
                    interrupt_in,
                    interface_number: iface.number(),
                });
            }
        }
    }
    Err(TransportError::NoPtpInterface)
}

/// An open connection to a single PTP still-image device: the claimed
/// interface, its endpoint triad, and bulk/stall-aware send/receive.
///
/// `handle` is `Arc`-wrapped so the interrupt loop (spec §4.6) can run on a
/// background thread against the same claimed interface while bulk
/// transfers continue on the connection-owning thread.
pub struct UsbTransport {
    handle: Arc<DeviceHandle>,
    ep_in: u8,
    ep_out: u8,
    ep_int: Option<u8>,
}

impl UsbTransport {
    pub fn connect(descriptor: &UsbDeviceDescriptor) -> Result<Self, TransportError> {
        let context = rusb::Context::new()?;
        let device = context
            .devices()?
            .iter()
            .find(|d| {
                d.bus_number() == descriptor.bus_number && d.address() == descriptor.device_address
            })
            .ok_or(TransportError::NotConnected)?;

        let config = device.active_config_descriptor()?;
        let endpoints = find_still_image_endpoints(&config)?;

        let mut rusb_handle = device.open()?;
        rusb_handle.set_active_configuration(0).ok();
        rusb_handle.claim_interface(endpoints.interface_number)?;

        let handle = Arc::new(DeviceHandle::new(rusb_handle, endpoints.interface_number));

        Ok(Self {
            handle,
            ep_in: endpoints.bulk_in,
            ep_out: endpoints.bulk_out,
            ep_int: endpoints.interrupt_in,
        })
    }

    pub fn interrupt_endpoint(&self) -> Option<u8> {
        self.ep_int
    }

    pub fn bulk_endpoints(&self) -> (u8, u8) {
        (self.ep_in, self.ep_out)
    }

    pub fn handle(&self) -> &DeviceHandle {
        &self.handle
    }

    /// A cloned handle to the same claimed interface, for the interrupt
    /// loop's background thread (spec §4.6).
    pub fn handle_arc(&self) -> Arc<DeviceHandle> {
        Arc::clone(&self.handle)
    }

    /// Writes the whole container to bulk-OUT. A STALL is recovered per
    /// §4.6 and retried exactly once; any other error surfaces.
    pub fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        match self.handle.bulk_write(self.ep_out, bytes, BULK_TIMEOUT) {
            Ok(_) => Ok(()),
            Err(e) if stall::is_stall(&e) => {
                stall::recover(
                    self.handle.as_ref(),
                    StalledEndpoints::Bulk {
                        ep_in: self.ep_in,
                        ep_out: self.ep_out,
                    },
                )?;
                self.handle.bulk_write(self.ep_out, bytes, BULK_TIMEOUT)?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Reads up to `max_length` bytes from bulk-IN, performing multiple
    /// underlying reads if needed. A STALL is recovered and retried once.
    pub fn receive(&self, max_length: usize) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; max_length];
        let n = match self.handle.bulk_read(self.ep_in, &mut buf, BULK_TIMEOUT) {
            Ok(n) => n,
            Err(e) if stall::is_stall(&e) => {
                stall::recover(
                    self.handle.as_ref(),
                    StalledEndpoints::Bulk {
                        ep_in: self.ep_in,
                        ep_out: self.ep_out,
                    },
                )?;
                self.handle.bulk_read(self.ep_in, &mut buf, BULK_TIMEOUT)?
            }
            Err(e) => return Err(e),
        };
        buf.truncate(n);
        Ok(buf)
    }

    pub fn interrupt_packet_len(&self) -> usize {
        INTERRUPT_PACKET_LEN
    }

    pub fn disconnect(&self) -> Result<(), TransportError> {
        self.handle.release()
    }
}

/// The session-level transport operations `Session`'s transaction methods
/// depend on: write a container, read one back, and the interrupt packet
/// size used to size that read. Factored out so the transaction engine can
/// be exercised against a scripted mock instead of a real USB connection.
pub trait PtpTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError>;
    fn receive(&self, max_length: usize) -> Result<Vec<u8>, TransportError>;
    fn interrupt_packet_len(&self) -> usize;
}

impl PtpTransport for UsbTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.send(bytes)
    }

    fn receive(&self, max_length: usize) -> Result<Vec<u8>, TransportError> {
        self.receive(max_length)
    }

    fn interrupt_packet_len(&self) -> usize {
        self.interrupt_packet_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_serializes_to_json() {
        let descriptor = UsbDeviceDescriptor {
            vendor_id: 0x054C,
            product_id: 0x0994,
            manufacturer: Some("Sony".into()),
            model: Some("ILCE-7M4".into()),
            serial_number: None,
            bus_number: 1,
            device_address: 2,
        };
        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.contains("\"vendor_id\":1356"));
    }
}
