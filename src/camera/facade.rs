//! Connects to a camera and picks its vendor hooks by USB vendor ID (spec
//! §4.9 "Generic fallback": anything not Sony/Nikon/Canon gets
//! [`GenericHooks`]).
//!
//! Dispatches by descriptor fields before opening a full session, the
//! same way device handling is chosen elsewhere in this crate, but
//! generalized from protocol-variant dispatch to vendor-hooks dispatch.

use crate::errors::CameraError;
use crate::registry::Registry;
use crate::transport::UsbDeviceDescriptor;

use super::canon::CanonHooks;
use super::generic::GenericHooks;
use super::nikon::NikonHooks;
use super::sony::SonyHooks;
use super::Camera;

/// Sony's USB vendor ID (Alpha/Cyber-shot bodies).
const VENDOR_SONY: u16 = 0x054C;
/// Nikon's USB vendor ID.
const VENDOR_NIKON: u16 = 0x04B0;
/// Canon's USB vendor ID.
const VENDOR_CANON: u16 = 0x04A9;

/// A connected camera of whichever vendor matched the device's USB vendor
/// ID, or the generic PTP fallback (spec §4.9 "Generic fallback").
pub enum AnyCamera {
    Sony(Camera<SonyHooks>),
    Nikon(Camera<NikonHooks>),
    Canon(Camera<CanonHooks>),
    Generic(Camera<GenericHooks>),
}

impl AnyCamera {
    pub fn get(&mut self, property_name: &str) -> Result<crate::codec::Value, CameraError> {
        match self {
            AnyCamera::Sony(c) => c.get(property_name),
            AnyCamera::Nikon(c) => c.get(property_name),
            AnyCamera::Canon(c) => c.get(property_name),
            AnyCamera::Generic(c) => c.get(property_name),
        }
    }

    pub fn set(
        &mut self,
        property_name: &str,
        value: crate::codec::Value,
    ) -> Result<(), CameraError> {
        match self {
            AnyCamera::Sony(c) => c.set(property_name, value),
            AnyCamera::Nikon(c) => c.set(property_name, value),
            AnyCamera::Canon(c) => c.set(property_name, value),
            AnyCamera::Generic(c) => c.set(property_name, value),
        }
    }

    pub fn capture_image(&mut self) -> Result<super::CaptureResult, CameraError> {
        match self {
            AnyCamera::Sony(c) => c.capture_image(),
            AnyCamera::Nikon(c) => c.capture_image(),
            AnyCamera::Canon(c) => c.capture_image(),
            AnyCamera::Generic(c) => c.capture_image(),
        }
    }

    pub fn capture_live_view(&mut self) -> Result<Vec<u8>, CameraError> {
        match self {
            AnyCamera::Sony(c) => c.capture_live_view(),
            AnyCamera::Nikon(c) => c.capture_live_view(),
            AnyCamera::Canon(c) => c.capture_live_view(),
            AnyCamera::Generic(c) => c.capture_live_view(),
        }
    }

    pub fn get_object(&mut self, handle: u32, max_size: u32) -> Result<Vec<u8>, CameraError> {
        match self {
            AnyCamera::Sony(c) => c.get_object(handle, max_size),
            AnyCamera::Nikon(c) => c.get_object(handle, max_size),
            AnyCamera::Canon(c) => c.get_object(handle, max_size),
            AnyCamera::Generic(c) => c.get_object(handle, max_size),
        }
    }

    pub fn list_objects(
        &mut self,
    ) -> Result<Vec<(u32, super::StorageListing)>, CameraError> {
        match self {
            AnyCamera::Sony(c) => c.list_objects(),
            AnyCamera::Nikon(c) => c.list_objects(),
            AnyCamera::Canon(c) => c.list_objects(),
            AnyCamera::Generic(c) => c.list_objects(),
        }
    }

    pub fn pump_events(&mut self) {
        match self {
            AnyCamera::Sony(c) => c.pump_events(),
            AnyCamera::Nikon(c) => c.pump_events(),
            AnyCamera::Canon(c) => c.pump_events(),
            AnyCamera::Generic(c) => c.pump_events(),
        }
    }

    pub fn disconnect(&mut self) {
        match self {
            AnyCamera::Sony(c) => c.disconnect(),
            AnyCamera::Nikon(c) => c.disconnect(),
            AnyCamera::Canon(c) => c.disconnect(),
            AnyCamera::Generic(c) => c.disconnect(),
        }
    }
}

/// Builds the standard registry plus whichever vendor overlay matches
/// `descriptor.vendor_id`, connects, and returns the matching [`AnyCamera`]
/// variant (spec §4.9).
pub fn connect_camera(descriptor: &UsbDeviceDescriptor) -> Result<AnyCamera, CameraError> {
    let standard = Registry::standard();

    match descriptor.vendor_id {
        VENDOR_SONY => {
            let registry = standard.merge(&crate::registry::sony::overlay());
            let camera = Camera::connect(descriptor, registry, SonyHooks::default())?;
            Ok(AnyCamera::Sony(camera))
        }
        VENDOR_NIKON => {
            let registry = standard.merge(&crate::registry::nikon::overlay());
            let camera = Camera::connect(descriptor, registry, NikonHooks::default())?;
            Ok(AnyCamera::Nikon(camera))
        }
        VENDOR_CANON => {
            let registry = standard.merge(&crate::registry::canon::overlay());
            let camera = Camera::connect(descriptor, registry, CanonHooks::default())?;
            Ok(AnyCamera::Canon(camera))
        }
        _ => {
            let camera = Camera::connect(descriptor, standard, GenericHooks::default())?;
            Ok(AnyCamera::Generic(camera))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_ids_match_spec_named_vendors() {
        assert_eq!(VENDOR_SONY, 0x054C);
        assert_eq!(VENDOR_NIKON, 0x04B0);
        assert_eq!(VENDOR_CANON, 0x04A9);
    }
}
