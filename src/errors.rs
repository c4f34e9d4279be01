use thiserror::Error;

/// Errors raised while encoding or decoding a PTP wire value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("truncated buffer: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    #[error("unknown datatype code: 0x{code:04X}")]
    UnknownDatatype { code: u16 },

    #[error("unknown enum value: 0x{code:08X}")]
    UnknownEnum { code: u32 },

    #[error("invalid string encoding")]
    InvalidString,

    #[error("value out of range for target type")]
    ValueOutOfRange,
}

/// Errors raised by the USB transport layer.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,

    #[error("no still-image (PTP) interface found on device")]
    NoPtpInterface,

    #[error("endpoint 0x{endpoint:02X} stalled")]
    Stalled { endpoint: u8 },

    #[error("STALL recovery failed on endpoint 0x{endpoint:02X}")]
    StallRecoveryFailed { endpoint: u8 },

    #[error("operation timed out")]
    Timeout,

    #[error("operation was cancelled")]
    Cancelled,

    #[error("USB I/O error: {0}")]
    Io(#[from] rusb::Error),
}

/// Errors raised by the session/transaction engine.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session is not open")]
    NotOpen,

    #[error("session is already open")]
    AlreadyOpen,

    #[error("failed to open session: response code 0x{code:04X}")]
    SessionOpenFailed { code: u16 },
}

/// A PTP response code other than `OK`, carrying enough context for
/// diagnosis without swallowing the raw code.
#[derive(Error, Debug, Clone)]
#[error("PTP operation {operation} failed: {message} (code 0x{code:04X})")]
pub struct PtpError {
    pub code: u16,
    pub operation: &'static str,
    pub message: String,
}

impl PtpError {
    pub fn new(code: u16, operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            operation,
            message: message.into(),
        }
    }
}

/// Vendor-specific failure modes that don't fit the generic taxonomy.
#[derive(Error, Debug, Clone)]
pub enum VendorError {
    #[error("vendor authentication failed in phase {phase}: code 0x{code:04X}")]
    AuthFailed { phase: u8, code: u16 },

    #[error("property 0x{code:04X} has not been cached by the event stream yet")]
    PropertyNotCached { code: u16 },

    #[error("vendor device state did not converge: {what}")]
    VendorStateStuck { what: String },
}

/// The single user-visible error type surfaced by the high-level camera API.
///
/// Every underlying variant is carried verbatim, plus an `operation`
/// breadcrumb naming the PTP operation in flight (if any) when the error
/// occurred.
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error(transparent)]
    Ptp(#[from] PtpError),

    #[error("vendor error: {0}")]
    Vendor(#[from] VendorError),

    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptp_error_carries_raw_code() {
        let e = PtpError::new(0x2019, "SetDevicePropValue", "device busy");
        let msg = e.to_string();
        assert!(msg.contains("0x2019"));
        assert!(msg.contains("SetDevicePropValue"));
    }

    #[test]
    fn camera_error_wraps_underlying_variants() {
        let e: CameraError = CodecError::Truncated { need: 4, have: 2 }.into();
        assert!(matches!(e, CameraError::Codec(_)));
    }
}
