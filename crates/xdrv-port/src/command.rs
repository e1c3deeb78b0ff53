// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command ids understood by the port, and the open mode flags.

use xdrv_error::{DriverError, DriverResult};

/// Operation selected by the leading `i32` of a command frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Bind a database to the port. Params: `u8` mode flags, `bytes` path.
    Open = 0,
    /// Store a document. Params: `bytes` data. Returns the `u32` docid.
    AddDocument = 1,
    /// Fetch a document. Params: `u32` docid. Returns `bytes` data.
    GetDocument = 2,
    /// Remove a document. Params: `u32` docid.
    DeleteDocument = 3,
    /// Number of stored documents. Returns `u32`.
    DocumentCount = 4,
}

impl Command {
    /// Every known command.
    pub const ALL: [Command; 5] = [
        Self::Open,
        Self::AddDocument,
        Self::GetDocument,
        Self::DeleteDocument,
        Self::DocumentCount,
    ];

    /// Wire id of this command.
    #[must_use]
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Look up a command by wire id; unknown ids are a bad command.
    pub fn from_id(id: i32) -> DriverResult<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.id() == id)
            .ok_or_else(|| DriverError::bad_command(id))
    }

    /// `true` for commands that modify the database.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::AddDocument | Self::DeleteDocument)
    }
}

impl TryFrom<i32> for Command {
    type Error = DriverError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

/// How a database is bound to the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OpenMode {
    /// Queries only; mutations fail with `NotWritableDatabaseError`.
    #[default]
    ReadOnly,
    /// Queries and mutations.
    ReadWrite,
}

impl OpenMode {
    /// Bit 0 of the open flags selects read-write.
    pub const WRITABLE_FLAG: u8 = 0b1;

    /// Decode the open flags byte. Unknown bits are ignored.
    #[must_use]
    pub fn from_flags(flags: u8) -> Self {
        if flags & Self::WRITABLE_FLAG != 0 {
            Self::ReadWrite
        } else {
            Self::ReadOnly
        }
    }

    /// Encode as an open flags byte.
    #[must_use]
    pub fn flags(self) -> u8 {
        match self {
            Self::ReadOnly => 0,
            Self::ReadWrite => Self::WRITABLE_FLAG,
        }
    }

    /// `true` for [`OpenMode::ReadWrite`].
    #[must_use]
    pub fn is_writable(self) -> bool {
        self == Self::ReadWrite
    }
}
