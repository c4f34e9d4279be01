//! Library-facing discovery API (spec §6 "Discovery API"): `listCameras`
//! filtered by vendor/model/serial/USB IDs, and a poll-based `watchCameras`
//! that reports added/removed cameras as the device list changes.
//!
//! `watchCameras`'s cancellation handle reuses the same
//! `transport::interrupt::{InterruptLoop, Cancellable}` `Arc<AtomicBool>`
//! cooperative-stop shape, generalized from "stop an interrupt-IN read
//! loop" to "stop a background poll-and-diff loop" (spec §6: "poll-based;
//! 1 s default interval").

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::debug;

use crate::errors::TransportError;
use crate::transport::{discover, UsbDeviceDescriptor};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A discovered camera (spec §4.6 "Discovery"): the USB identity plus
/// whatever descriptor strings the device exposed.
#[derive(Debug, Clone)]
pub struct CameraDescriptor {
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub device: UsbDeviceDescriptor,
}

impl From<UsbDeviceDescriptor> for CameraDescriptor {
    fn from(device: UsbDeviceDescriptor) -> Self {
        Self {
            vendor_id: device.vendor_id,
            product_id: device.product_id,
            manufacturer: device.manufacturer.clone(),
            model: device.model.clone(),
            serial_number: device.serial_number.clone(),
            device,
        }
    }
}

impl fmt::Display for CameraDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (vid=0x{:04X} pid=0x{:04X})",
            self.manufacturer.as_deref().unwrap_or("unknown"),
            self.model.as_deref().unwrap_or("unknown"),
            self.vendor_id,
            self.product_id
        )
    }
}

/// Narrows [`list_cameras`]/[`watch_cameras`] results (spec §6 "Discovery
/// API... filter fields: `vendor`, `model`, `serialNumber`,
/// `usb.{vendorId, productId}`").
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub usb_vendor_id: Option<u16>,
    pub usb_product_id: Option<u16>,
}

impl DeviceFilter {
    fn matches(&self, descriptor: &CameraDescriptor) -> bool {
        if let Some(vendor) = &self.vendor {
            if descriptor.manufacturer.as_deref() != Some(vendor.as_str()) {
                return false;
            }
        }
        if let Some(model) = &self.model {
            if descriptor.model.as_deref() != Some(model.as_str()) {
                return false;
            }
        }
        if let Some(serial) = &self.serial_number {
            if descriptor.serial_number.as_deref() != Some(serial.as_str()) {
                return false;
            }
        }
        if let Some(vid) = self.usb_vendor_id {
            if descriptor.vendor_id != vid {
                return false;
            }
        }
        if let Some(pid) = self.usb_product_id {
            if descriptor.product_id != pid {
                return false;
            }
        }
        true
    }
}

/// Enumerates still-image-class USB devices and narrows by `filter` (spec
/// §6 `listCameras(filter?) → [CameraDescriptor]`).
pub fn list_cameras(filter: &DeviceFilter) -> Result<Vec<CameraDescriptor>, TransportError> {
    let devices = discover()?;
    Ok(devices
        .into_iter()
        .map(CameraDescriptor::from)
        .filter(|d| filter.matches(d))
        .collect())
}

/// A change in the matched device set since the previous poll.
#[derive(Debug, Clone)]
pub enum DeviceChange {
    Added(CameraDescriptor),
    Removed(CameraDescriptor),
}

fn device_identity(descriptor: &CameraDescriptor) -> (u8, u8) {
    (descriptor.device.bus_number, descriptor.device.device_address)
}

/// A cooperative stop switch for [`watch_cameras`]'s background poll
/// thread.
#[derive(Clone)]
pub struct WatchHandle {
    running: Arc<AtomicBool>,
}

impl WatchHandle {
    pub fn cancel(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Polls [`list_cameras`] at `interval` (spec §6 default 1 s) on a
/// background thread, invoking `callback` with the set of changes whenever
/// the matched device identities differ from the previous poll. Returns a
/// [`WatchHandle`] whose `cancel` stops the thread.
pub fn watch_cameras(
    callback: impl FnMut(Vec<DeviceChange>) + Send + 'static,
    filter: DeviceFilter,
) -> WatchHandle {
    watch_cameras_with_interval(callback, filter, DEFAULT_POLL_INTERVAL)
}

/// As [`watch_cameras`], but with an explicit poll interval (used by tests
/// to avoid a real 1-second wait).
pub fn watch_cameras_with_interval(
    mut callback: impl FnMut(Vec<DeviceChange>) + Send + 'static,
    filter: DeviceFilter,
    interval: Duration,
) -> WatchHandle {
    let running = Arc::new(AtomicBool::new(true));
    let thread_running = Arc::clone(&running);

    thread::spawn(move || {
        let mut known: Vec<CameraDescriptor> = Vec::new();

        while thread_running.load(Ordering::SeqCst) {
            match list_cameras(&filter) {
                Ok(current) => {
                    let changes = diff(&known, &current);
                    if !changes.is_empty() {
                        callback(changes);
                    }
                    known = current;
                }
                Err(e) => debug!("watch_cameras poll failed, will retry: {e}"),
            }
            thread::sleep(interval);
        }
    });

    WatchHandle { running }
}

fn diff(previous: &[CameraDescriptor], current: &[CameraDescriptor]) -> Vec<DeviceChange> {
    let mut changes = Vec::new();

    for c in current {
        if !previous.iter().any(|p| device_identity(p) == device_identity(c)) {
            changes.push(DeviceChange::Added(c.clone()));
        }
    }
    for p in previous {
        if !current.iter().any(|c| device_identity(c) == device_identity(p)) {
            changes.push(DeviceChange::Removed(p.clone()));
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(bus: u8, address: u8, vendor_id: u16) -> CameraDescriptor {
        CameraDescriptor::from(UsbDeviceDescriptor {
            vendor_id,
            product_id: 0x1234,
            manufacturer: Some("Acme".to_string()),
            model: Some("CamOne".to_string()),
            serial_number: None,
            bus_number: bus,
            device_address: address,
        })
    }

    #[test]
    fn filter_matches_on_usb_vendor_id() {
        let filter = DeviceFilter {
            usb_vendor_id: Some(0x054C),
            ..DeviceFilter::default()
        };
        assert!(filter.matches(&descriptor(1, 2, 0x054C)));
        assert!(!filter.matches(&descriptor(1, 2, 0x04A9)));
    }

    #[test]
    fn diff_reports_added_and_removed() {
        let previous = vec![descriptor(1, 2, 0x054C)];
        let current = vec![descriptor(1, 3, 0x054C)];
        let changes = diff(&previous, &current);
        assert_eq!(changes.len(), 2);
        assert!(matches!(changes[0], DeviceChange::Added(_)));
        assert!(matches!(changes[1], DeviceChange::Removed(_)));
    }

    #[test]
    fn diff_is_empty_when_identities_are_unchanged() {
        let snapshot = vec![descriptor(1, 2, 0x054C)];
        assert!(diff(&snapshot, &snapshot).is_empty());
    }
}
