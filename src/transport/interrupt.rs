//! Interrupt-endpoint event loop (§4.6 "Interrupt loop").
//!
//! Same `Arc<AtomicBool>` running-flag shape for cooperative stop, same
//! blocking poll-with-callback design used elsewhere in this crate's
//! transport layer, generalized to parse PTP Event containers and run
//! STALL recovery inline instead of treating the read endpoint
//! generically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::TransportError;
use crate::transport::container::{Container, ContainerKind};
use crate::transport::device_handle::BulkTransportOps;
use crate::transport::stall::{self, StalledEndpoints};

#[derive(Debug, Clone)]
pub struct EventFrame {
    pub code: u16,
    pub transaction_id: u32,
    pub parameters: Vec<u32>,
}

/// A cooperative stop switch for the interrupt loop, shared with whatever
/// owns the polling thread. Cloning shares the same underlying flag.
#[derive(Clone)]
pub struct Cancellable {
    running: Arc<AtomicBool>,
}

impl Cancellable {
    pub fn cancel(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

pub struct InterruptLoop {
    ep_int: u8,
    ep_bulk_in: u8,
    ep_bulk_out: u8,
    buffer_len: usize,
    running: Arc<AtomicBool>,
}

impl InterruptLoop {
    pub fn new(ep_int: u8, ep_bulk_in: u8, ep_bulk_out: u8, buffer_len: usize) -> Self {
        Self {
            ep_int,
            ep_bulk_in,
            ep_bulk_out,
            buffer_len,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> Cancellable {
        Cancellable {
            running: Arc::clone(&self.running),
        }
    }

    /// Blocking poll loop: reads interrupt-IN, parses each non-empty
    /// completion as an Event container, and invokes `on_event`. A STALL
    /// triggers recovery then re-arms; any other transfer error terminates
    /// the loop and propagates. `Cancellable::cancel` terminates cleanly.
    pub fn run<H: BulkTransportOps>(
        &self,
        handle: &H,
        mut on_event: impl FnMut(EventFrame),
    ) -> Result<(), TransportError> {
        self.running.store(true, Ordering::SeqCst);
        let mut buf = vec![0u8; self.buffer_len];
        let poll_timeout = Duration::from_millis(100);

        while self.running.load(Ordering::SeqCst) {
            match handle.interrupt_read(self.ep_int, &mut buf, poll_timeout) {
                Ok(n) if n > 0 => {
                    if let Ok(container) = Container::parse(&buf[..n]) {
                        if container.kind == ContainerKind::Event {
                            if let Ok(parameters) = container.params() {
                                on_event(EventFrame {
                                    code: container.code,
                                    transaction_id: container.transaction_id,
                                    parameters,
                                });
                            }
                        }
                    }
                }
                Ok(_) => continue,
                Err(TransportError::Io(rusb::Error::Timeout)) => continue,
                Err(e) if stall::is_stall(&e) => {
                    stall::recover(handle, StalledEndpoints::Interrupt { ep_int: self.ep_int })?;
                }
                Err(TransportError::Cancelled) => {
                    self.running.store(false, Ordering::SeqCst);
                    return Ok(());
                }
                Err(e) => {
                    self.running.store(false, Ordering::SeqCst);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn bulk_endpoints(&self) -> (u8, u8) {
        (self.ep_bulk_in, self.ep_bulk_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellable_reports_not_running_before_start() {
        let interrupt_loop = InterruptLoop::new(0x83, 0x81, 0x02, 64);
        let cancellable = interrupt_loop.handle();
        assert!(!cancellable.is_running());
    }

    #[test]
    fn cancel_stops_reported_running_state() {
        let interrupt_loop = InterruptLoop::new(0x83, 0x81, 0x02, 64);
        interrupt_loop.running.store(true, Ordering::SeqCst);
        let cancellable = interrupt_loop.handle();
        assert!(cancellable.is_running());
        cancellable.cancel();
        assert!(!interrupt_loop.running.load(Ordering::SeqCst));
    }
}
