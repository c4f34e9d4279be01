//! The generic camera API (spec §4.8) plus vendor specializations (§4.9).
//!
//! "Dynamic dispatch via interfaces, not inheritance" (spec §9): a camera is
//! one `Camera<H>` struct holding a `Registry` and a `Connection`, generic
//! over a `VendorHooks` implementation that overrides the handful of points
//! (session open, property get/set, capture, large-object read) where a
//! vendor diverges from plain PTP. Uses a tagged-struct style — the
//! struct holds its state directly rather than sitting behind a trait
//! object hierarchy — generalized with a hooks trait so the four vendor
//! variants and the generic fallback share one driving loop.

pub mod canon;
pub mod facade;
pub mod generic;
pub mod nikon;
pub mod sony;

use crate::codec::Value;
use crate::errors::CameraError;
use crate::registry::Registry;
use crate::session::{Connection, QueuedEvent};
use crate::transport::UsbDeviceDescriptor;

pub use facade::{connect_camera, AnyCamera};
pub use generic::GenericHooks;

/// The outcome of an image capture (spec §4.8 `captureImage`): the object's
/// descriptor and raw bytes when the vendor flow fetches them directly, or
/// both `None` when (as with Canon) the image must be retrieved separately
/// via events (spec §9 "Canon `captureImage`... returns an empty `{}`").
#[derive(Debug, Clone, Default)]
pub struct CaptureResult {
    pub object_handle: Option<u32>,
    pub info: Option<crate::codec::ObjectInfo>,
    pub data: Option<Vec<u8>>,
}

/// The vendor-specific behavior a `Camera` plugs in at the points where PTP
/// vendors diverge from plain PIMA 15740 (spec §4.9).
pub trait VendorHooks {
    /// Opens the session, including any vendor auth handshake, and returns
    /// the session ID actually used.
    fn open_session(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
    ) -> Result<u32, CameraError>;

    /// Reads a named property's current value.
    fn get(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        property_name: &str,
    ) -> Result<Value, CameraError>;

    /// Writes a named property's value.
    fn set(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        property_name: &str,
        value: Value,
    ) -> Result<(), CameraError>;

    /// Drives a full still-image capture (spec §4.9 per-vendor sequences).
    fn capture_image(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
    ) -> Result<CaptureResult, CameraError>;

    /// Reads an object's bytes, chunking through vendor partial-object
    /// operations when the vendor overrides the default single `GetObject`.
    fn get_object(
        &mut self,
        conn: &mut Connection,
        registry: &Registry,
        handle: u32,
        max_size: u32,
    ) -> Result<Vec<u8>, CameraError>;

    /// Reads a live-view frame, if the vendor supports one.
    fn capture_live_view(
        &mut self,
        _conn: &mut Connection,
        _registry: &Registry,
    ) -> Result<Vec<u8>, CameraError> {
        Err(CameraError::Unsupported("live view".to_string()))
    }

    /// Notified of every interrupt event after the session records it, so a
    /// vendor can maintain caches (e.g. Canon's property-value cache).
    fn on_event(&mut self, _event: &QueuedEvent) {}
}

/// A single storage's nested object tree (spec §4.8 `listObjects`).
#[derive(Debug, Clone)]
pub struct StorageListing {
    pub info: crate::codec::StorageInfo,
    pub objects: Vec<(u32, crate::codec::ObjectInfo)>,
}

/// A camera bound to one USB connection, driving operations through a
/// `Registry` (standard + vendor overlay) and a `VendorHooks` for the points
/// where a vendor diverges from plain PTP.
pub struct Camera<H: VendorHooks> {
    pub registry: Registry,
    pub connection: Connection,
    pub hooks: H,
}

impl<H: VendorHooks> Camera<H> {
    pub fn new(registry: Registry, connection: Connection, hooks: H) -> Self {
        Self {
            registry,
            connection,
            hooks,
        }
    }

    pub fn connect(
        descriptor: &UsbDeviceDescriptor,
        registry: Registry,
        mut hooks: H,
    ) -> Result<Self, CameraError> {
        let transport = crate::transport::UsbTransport::connect(descriptor)?;
        let mut connection = Connection::new(transport);
        connection.start_interrupt_loop();
        if let Err(e) = hooks.open_session(&mut connection, &registry) {
            connection.stop_interrupt_loop();
            let _ = connection.transport.disconnect();
            return Err(e);
        }
        Ok(Self {
            registry,
            connection,
            hooks,
        })
    }

    pub fn disconnect(&mut self) {
        self.connection.session.close(
            &mut self.connection.transport,
            self.registry
                .operations
                .by_name("CloseSession")
                .map(|o| o.code)
                .unwrap_or(0x1003),
            0x2003,
        );
        self.connection.stop_interrupt_loop();
        let _ = self.connection.transport.disconnect();
    }

    pub fn get(&mut self, property_name: &str) -> Result<Value, CameraError> {
        self.hooks
            .get(&mut self.connection, &self.registry, property_name)
    }

    pub fn set(&mut self, property_name: &str, value: Value) -> Result<(), CameraError> {
        self.hooks
            .set(&mut self.connection, &self.registry, property_name, value)
    }

    pub fn get_aperture(&mut self) -> Result<Value, CameraError> {
        self.get("FNumber")
    }

    pub fn get_iso(&mut self) -> Result<Value, CameraError> {
        self.get("ExposureIndex")
    }

    pub fn get_shutter_speed(&mut self) -> Result<Value, CameraError> {
        self.get("ExposureTime")
    }

    pub fn capture_image(&mut self) -> Result<CaptureResult, CameraError> {
        self.hooks
            .capture_image(&mut self.connection, &self.registry)
    }

    pub fn capture_live_view(&mut self) -> Result<Vec<u8>, CameraError> {
        self.hooks
            .capture_live_view(&mut self.connection, &self.registry)
    }

    pub fn get_object(&mut self, handle: u32, max_size: u32) -> Result<Vec<u8>, CameraError> {
        self.hooks
            .get_object(&mut self.connection, &self.registry, handle, max_size)
    }

    /// `GetStorageIDs` → for each storage: `GetStorageInfo`,
    /// `GetObjectHandles` → for each handle: `GetObjectInfo` (spec §4.8
    /// `listObjects`).
    pub fn list_objects(&mut self) -> Result<Vec<(u32, StorageListing)>, CameraError> {
        generic::list_objects(&mut self.connection, &self.registry)
    }

    /// Drains and fans out any events currently queued from the interrupt
    /// loop, notifying `self.hooks` of each so vendor caches stay current.
    pub fn pump_events(&mut self) {
        self.connection.drain_interrupt_channel();
        while let Some(event) = self.connection.session.poll_event() {
            self.hooks.on_event(&event);
        }
    }
}
