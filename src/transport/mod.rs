//! USB transport: container framing, endpoint discovery/connect, bulk
//! send/receive with STALL recovery, class control requests, and the
//! interrupt-endpoint event loop.

pub mod container;
pub mod control;
pub mod device_handle;
pub mod interrupt;
#[cfg(test)]
pub(crate) mod mock;
pub mod stall;
pub mod usb;

pub use container::{Container, ContainerKind};
pub use device_handle::{BulkTransportOps, DeviceHandle};
pub use interrupt::{Cancellable, EventFrame, InterruptLoop};
pub use usb::{discover, PtpTransport, UsbDeviceDescriptor, UsbTransport};
