// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reply framing: what the port writes back for every command frame.
//!
//! ```text
//! ok:    0x00 <payload...>
//! error: 0x01 <u32 tag len> <tag> <u32 message len> <message>
//! ```

use crate::{ParamDecoder, ResultEncoder};
use thiserror::Error;
use xdrv_error::{DriverResult, ErrorKind, ErrorReport, TaggedError};

const STATUS_OK: u8 = 0;
const STATUS_ERROR: u8 = 1;

/// Outcome of one command, as sent back over the port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The command succeeded; the payload is command specific.
    Ok(Vec<u8>),
    /// The command failed with a tagged error.
    Error(ErrorReport),
}

impl Reply {
    /// Error reply for any failure, read through its [`TaggedError`] capability.
    pub fn error<E: TaggedError + ?Sized>(err: &E) -> Self {
        Self::Error(ErrorReport::from_tagged(err))
    }

    /// `true` for [`Reply::Ok`].
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// The catalog kind of an error reply, if it names a known one.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Ok(_) => None,
            Self::Error(report) => report.kind(),
        }
    }

    /// Serialize to the wire layout.
    ///
    /// Tag or message text longer than `u32::MAX` bytes cannot be
    /// length-prefixed and fails with `MemoryAllocationError`.
    pub fn encode(&self) -> DriverResult<Vec<u8>> {
        let mut out = ResultEncoder::with_limit(usize::MAX);
        match self {
            Self::Ok(payload) => {
                out.write_u8(STATUS_OK)?;
                out.write_raw(payload)?;
            }
            Self::Error(report) => {
                out.write_u8(STATUS_ERROR)?;
                out.write_bytes(report.tag.as_bytes())?;
                out.write_bytes(report.message.as_bytes())?;
            }
        }
        Ok(out.finish())
    }

    /// Parse a reply produced by [`Reply::encode`].
    ///
    /// This is the caller's side of the port, so failures here are
    /// [`ReplyError`]s rather than catalog errors.
    pub fn decode(bytes: &[u8]) -> Result<Self, ReplyError> {
        let mut dec = ParamDecoder::new(bytes);
        match dec.read_u8().map_err(|_| ReplyError::Truncated)? {
            STATUS_OK => Ok(Self::Ok(dec.rest().to_vec())),
            STATUS_ERROR => {
                let tag = read_text(&mut dec)?;
                let message = read_text(&mut dec)?;
                Ok(Self::Error(ErrorReport { tag, message }))
            }
            other => Err(ReplyError::UnknownStatus(other)),
        }
    }
}

impl From<DriverResult<Vec<u8>>> for Reply {
    fn from(result: DriverResult<Vec<u8>>) -> Self {
        match result {
            Ok(payload) => Self::Ok(payload),
            Err(err) => Self::error(&err),
        }
    }
}

/// A reply frame that could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReplyError {
    /// The frame ended before the reply was complete.
    #[error("reply frame is truncated")]
    Truncated,

    /// The status byte is neither ok nor error.
    #[error("unknown reply status byte {0:#04x}")]
    UnknownStatus(u8),
}

fn read_text(dec: &mut ParamDecoder<'_>) -> Result<String, ReplyError> {
    let bytes = dec.read_bytes().map_err(|_| ReplyError::Truncated)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xdrv_error::DriverError;

    #[test]
    fn ok_layout() {
        let reply = Reply::Ok(vec![9, 8]);
        assert_eq!(reply.encode().unwrap(), vec![0, 9, 8]);
        assert!(reply.is_ok());
        assert_eq!(reply.error_kind(), None);
    }

    #[test]
    fn error_layout() {
        let reply = Reply::error(&DriverError::overflow());
        let bytes = reply.encode().unwrap();
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..5], &13u32.to_le_bytes());
        assert_eq!(&bytes[5..18], b"OverflowError");
        assert_eq!(&bytes[18..22], &17u32.to_le_bytes());
        assert_eq!(&bytes[22..], b"Too short binary.");
    }

    #[test]
    fn error_reply_decodes_to_report() {
        let err = DriverError::element_not_found(3);
        let decoded = Reply::decode(&Reply::error(&err).encode().unwrap()).unwrap();
        assert_eq!(decoded.error_kind(), Some(ErrorKind::ElementNotFound));
        match decoded {
            Reply::Error(report) => {
                assert_eq!(report.tag, "ElementNotFoundError");
                assert_eq!(report.message, "Element with number = 3 is not found.");
            }
            Reply::Ok(_) => panic!("expected error reply"),
        }
    }

    #[test]
    fn empty_ok_payload() {
        assert_eq!(Reply::decode(&[0]).unwrap(), Reply::Ok(Vec::new()));
    }

    #[test]
    fn empty_reply_is_truncated() {
        assert_eq!(Reply::decode(&[]).unwrap_err(), ReplyError::Truncated);
    }

    #[test]
    fn truncated_error_reply_is_truncated() {
        let mut bytes = Reply::error(&DriverError::db_not_ready()).encode().unwrap();
        bytes.truncate(bytes.len() - 1);
        assert_eq!(Reply::decode(&bytes).unwrap_err(), ReplyError::Truncated);
    }

    #[test]
    fn unknown_status_is_not_a_catalog_error() {
        let err = Reply::decode(&[7, 0]).unwrap_err();
        assert_eq!(err, ReplyError::UnknownStatus(7));
        assert_eq!(err.to_string(), "unknown reply status byte 0x07");
    }

    #[test]
    fn from_result() {
        let ok: DriverResult<Vec<u8>> = Ok(vec![1]);
        assert_eq!(Reply::from(ok), Reply::Ok(vec![1]));
        let err: DriverResult<Vec<u8>> = Err(DriverError::db_already_opened());
        assert_eq!(
            Reply::from(err).error_kind(),
            Some(ErrorKind::DbAlreadyOpened)
        );
    }
}
