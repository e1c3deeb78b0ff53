// SPDX-License-Identifier: MIT OR Apache-2.0
//! Caller-side command frame builder.

use crate::{Command, OpenMode};
use xdrv_codec::ResultEncoder;
use xdrv_error::DriverResult;

/// A command as the caller on the other side of the port would send it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    /// See [`Command::Open`].
    Open {
        /// Requested mode.
        mode: OpenMode,
        /// Database path; informational for [`crate::MemoryStore`].
        path: &'a str,
    },
    /// See [`Command::AddDocument`].
    AddDocument {
        /// Document body.
        data: &'a [u8],
    },
    /// See [`Command::GetDocument`].
    GetDocument {
        /// Document id.
        docid: u32,
    },
    /// See [`Command::DeleteDocument`].
    DeleteDocument {
        /// Document id.
        docid: u32,
    },
    /// See [`Command::DocumentCount`].
    DocumentCount,
}

impl Request<'_> {
    /// The command this request encodes.
    #[must_use]
    pub fn command(&self) -> Command {
        match self {
            Self::Open { .. } => Command::Open,
            Self::AddDocument { .. } => Command::AddDocument,
            Self::GetDocument { .. } => Command::GetDocument,
            Self::DeleteDocument { .. } => Command::DeleteDocument,
            Self::DocumentCount => Command::DocumentCount,
        }
    }

    /// Encode as a command frame body.
    ///
    /// A path or document longer than `u32::MAX` bytes cannot be
    /// length-prefixed and fails with `MemoryAllocationError`.
    pub fn encode(&self) -> DriverResult<Vec<u8>> {
        let mut out = ResultEncoder::with_limit(usize::MAX);
        out.write_i32(self.command().id())?;
        match self {
            Self::Open { mode, path } => {
                out.write_u8(mode.flags())?;
                out.write_bytes(path.as_bytes())?;
            }
            Self::AddDocument { data } => out.write_bytes(data)?,
            Self::GetDocument { docid } | Self::DeleteDocument { docid } => {
                out.write_u32(*docid)?;
            }
            Self::DocumentCount => {}
        }
        Ok(out.finish())
    }
}

/// Frame body with an arbitrary command id and raw parameter bytes.
#[must_use]
pub fn raw_frame(command_id: i32, params: &[u8]) -> Vec<u8> {
    let mut out = command_id.to_le_bytes().to_vec();
    out.extend_from_slice(params);
    out
}
