//! USB Container Builder
//!
//! Frames PTP commands/data/responses/events into PIMA 15740 §D containers:
//! `length: u32 LE (incl. header) | type: u16 LE | code: u16 LE | transaction_id: u32 LE | payload`.
//!
//! Grounded in `ContainerInfo::parse` from `CUAir-rust-ptp`, generalized into
//! a standalone, symmetric builder (the original is embedded directly in
//! `Device::command`).

use crate::codec::buf::{Endian, PtpCursor, PtpWriter};
use crate::errors::CodecError;

pub const HEADER_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Command,
    Data,
    Response,
    Event,
}

impl ContainerKind {
    fn wire_value(self) -> u16 {
        match self {
            ContainerKind::Command => 1,
            ContainerKind::Data => 2,
            ContainerKind::Response => 3,
            ContainerKind::Event => 4,
        }
    }

    fn from_wire(value: u16) -> Result<Self, CodecError> {
        match value {
            1 => Ok(ContainerKind::Command),
            2 => Ok(ContainerKind::Data),
            3 => Ok(ContainerKind::Response),
            4 => Ok(ContainerKind::Event),
            other => Err(CodecError::UnknownEnum {
                code: other as u32,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Container {
    pub kind: ContainerKind,
    pub code: u16,
    pub transaction_id: u32,
    pub payload: Vec<u8>,
}

impl Container {
    pub fn new(kind: ContainerKind, code: u16, transaction_id: u32, payload: Vec<u8>) -> Self {
        Self {
            kind,
            code,
            transaction_id,
            payload,
        }
    }

    pub fn command(code: u16, transaction_id: u32, params: &[u32]) -> Self {
        let mut w = PtpWriter::new(Endian::Little);
        for p in params {
            w.write_u32(*p);
        }
        Self::new(ContainerKind::Command, code, transaction_id, w.into_bytes())
    }

    pub fn response(code: u16, transaction_id: u32, params: &[u32]) -> Self {
        let mut w = PtpWriter::new(Endian::Little);
        for p in params {
            w.write_u32(*p);
        }
        Self::new(
            ContainerKind::Response,
            code,
            transaction_id,
            w.into_bytes(),
        )
    }

    pub fn data(code: u16, transaction_id: u32, payload: Vec<u8>) -> Self {
        Self::new(ContainerKind::Data, code, transaction_id, payload)
    }

    /// Scans up to five leading `u32` parameters out of this container's
    /// payload, per §4.6/§4.7 ("Command/Response parameters" and "Event
    /// parameters: u32[] up to 5 scanned from the payload").
    pub fn params(&self) -> Result<Vec<u32>, CodecError> {
        let mut c = PtpCursor::new(&self.payload, Endian::Little);
        let mut out = Vec::new();
        for _ in 0..5 {
            if c.is_empty() {
                break;
            }
            out.push(c.read_u32()?);
        }
        Ok(out)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = PtpWriter::new(Endian::Little);
        let length = (HEADER_LEN + self.payload.len()) as u32;
        w.write_u32(length);
        w.write_u16(self.kind.wire_value());
        w.write_u16(self.code);
        w.write_u32(self.transaction_id);
        w.write_bytes(&self.payload);
        w.into_bytes()
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::Truncated {
                need: HEADER_LEN,
                have: bytes.len(),
            });
        }
        let mut c = PtpCursor::new(bytes, Endian::Little);
        let length = c.read_u32()? as usize;
        let kind = ContainerKind::from_wire(c.read_u16()?)?;
        let code = c.read_u16()?;
        let transaction_id = c.read_u32()?;

        if length < HEADER_LEN || length > bytes.len() {
            return Err(CodecError::Truncated {
                need: length,
                have: bytes.len(),
            });
        }
        let payload = bytes[HEADER_LEN..length].to_vec();

        Ok(Self {
            kind,
            code,
            transaction_id,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_session_container_matches_spec_example() {
        // §8 scenario 1: OpenSession(sessionId=1), tid=1.
        let container = Container::command(0x1002, 1, &[1]);
        let bytes = container.to_bytes();
        assert_eq!(
            bytes,
            vec![
                0x0C, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x10, 0x01, 0x00, 0x00, 0x00, 0x01,
                0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn response_ok_container_matches_spec_example() {
        let bytes = vec![
            0x0C, 0x00, 0x00, 0x00, 0x03, 0x00, 0x01, 0x20, 0x01, 0x00, 0x00, 0x00,
        ];
        let container = Container::parse(&bytes).unwrap();
        assert_eq!(container.kind, ContainerKind::Response);
        assert_eq!(container.code, 0x2001);
        assert_eq!(container.transaction_id, 1);
        assert!(container.payload.is_empty());
    }

    #[test]
    fn header_round_trips() {
        let container = Container::data(0x1001, 7, vec![1, 2, 3, 4, 5]);
        let bytes = container.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + 5);
        let parsed = Container::parse(&bytes).unwrap();
        assert_eq!(parsed.code, 0x1001);
        assert_eq!(parsed.transaction_id, 7);
        assert_eq!(parsed.payload, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn truncated_header_fails() {
        assert!(Container::parse(&[0x01, 0x02]).is_err());
    }

    #[test]
    fn command_params_scan_up_to_five() {
        let container = Container::command(0x1002, 1, &[10, 20, 30]);
        assert_eq!(container.params().unwrap(), vec![10, 20, 30]);
    }
}
