//! STALL recovery, PIMA 15740 §D.7.2.1 / spec §4.6.
//!
//! On any endpoint STALL: issue `GetDeviceStatus`, clear halt on the
//! endpoint(s) implicated by the stalled transfer direction, then poll
//! `GetDeviceStatus` until it reports OK or a retry budget is exhausted.

use std::thread;
use std::time::Duration;

use crate::errors::TransportError;
use crate::transport::control::{ClassControl, STATUS_OK};
use crate::transport::device_handle::BulkTransportOps;

const MAX_STATUS_POLLS: u32 = 10;
const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Which endpoints to clear after a stall, per §4.6: both bulk endpoints if
/// a bulk endpoint stalled, or the interrupt endpoint if that one stalled.
pub enum StalledEndpoints {
    Bulk { ep_in: u8, ep_out: u8 },
    Interrupt { ep_int: u8 },
}

pub fn recover<H: BulkTransportOps>(
    handle: &H,
    stalled: StalledEndpoints,
) -> Result<(), TransportError> {
    let control = ClassControl::new(handle);
    let _ = control.get_device_status()?;

    match stalled {
        StalledEndpoints::Bulk { ep_in, ep_out } => {
            handle.clear_halt(ep_in)?;
            handle.clear_halt(ep_out)?;
        }
        StalledEndpoints::Interrupt { ep_int } => {
            handle.clear_halt(ep_int)?;
        }
    }

    for _ in 0..MAX_STATUS_POLLS {
        let status = control.get_device_status()?;
        if status.code == STATUS_OK {
            return Ok(());
        }
        thread::sleep(STATUS_POLL_INTERVAL);
    }

    let endpoint = match stalled {
        StalledEndpoints::Bulk { ep_out, .. } => ep_out,
        StalledEndpoints::Interrupt { ep_int } => ep_int,
    };
    Err(TransportError::StallRecoveryFailed { endpoint })
}

pub fn is_stall(err: &TransportError) -> bool {
    matches!(err, TransportError::Io(rusb::Error::Pipe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::control::STATUS_OK;
    use crate::transport::mock::{MockDeviceHandle, MockStep};

    fn device_status_bytes(code: u16) -> Vec<u8> {
        let mut bytes = vec![4, 0];
        bytes.extend_from_slice(&code.to_le_bytes());
        bytes
    }

    #[test]
    fn detects_stall_from_pipe_error() {
        assert!(is_stall(&TransportError::Io(rusb::Error::Pipe)));
        assert!(!is_stall(&TransportError::Io(rusb::Error::Timeout)));
    }

    #[test]
    fn recovers_bulk_stall_once_status_reports_ok() {
        let handle = MockDeviceHandle::new(vec![
            MockStep::ControlRead(Ok(device_status_bytes(0x2019))),
            MockStep::ClearHalt(Ok(())),
            MockStep::ClearHalt(Ok(())),
            MockStep::ControlRead(Ok(device_status_bytes(STATUS_OK))),
        ]);

        let result = recover(
            &handle,
            StalledEndpoints::Bulk {
                ep_in: 0x81,
                ep_out: 0x02,
            },
        );

        assert!(result.is_ok());
    }

    #[test]
    fn gives_up_after_exhausting_status_polls() {
        let mut steps = vec![
            MockStep::ControlRead(Ok(device_status_bytes(0x2019))),
            MockStep::ClearHalt(Ok(())),
        ];
        for _ in 0..MAX_STATUS_POLLS {
            steps.push(MockStep::ControlRead(Ok(device_status_bytes(0x2019))));
        }
        let handle = MockDeviceHandle::new(steps);

        let result = recover(&handle, StalledEndpoints::Interrupt { ep_int: 0x83 });

        assert!(matches!(
            result,
            Err(TransportError::StallRecoveryFailed { endpoint: 0x83 })
        ));
    }
}
