// SPDX-License-Identifier: MIT OR Apache-2.0
//! Closed error catalog with stable kind tags for the Xapian port driver.
//!
//! Every failure the driver reports across the port boundary is one
//! [`DriverError`]. Each value carries a rendered, human-readable message and
//! a static kind tag ([`ErrorKind::as_str`]) that callers on the other side
//! of the port branch on. The boundary handler only ever looks at a failure
//! through the [`TaggedError`] capability, so it needs no per-kind code path.
//!
//! ```
//! use xdrv_error::{DriverError, ErrorReport, TaggedError};
//!
//! let err = DriverError::memory_allocation(4096);
//! assert_eq!(err.kind_tag(), "MemoryAllocationError");
//! assert_eq!(err.message(), "Cannot allocate 4096 bytes.");
//!
//! let report = ErrorReport::from_tagged(&err);
//! assert_eq!(report.to_string(), "[MemoryAllocationError] Cannot allocate 4096 bytes.");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Root-cause family that an [`ErrorKind`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Resource exhaustion (allocation failures).
    Resource,
    /// Inbound payload could not be decoded or dispatched.
    Protocol,
    /// Database write-mode violations.
    Database,
    /// Port/database binding and ordering violations.
    Session,
    /// A requested indexed element does not exist.
    Lookup,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Resource => "resource",
            Self::Protocol => "protocol",
            Self::Database => "database",
            Self::Session => "session",
            Self::Lookup => "lookup",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Identifies one member of the error catalog.
///
/// The serialised form of each variant is its wire tag. Tags are part of the
/// port protocol and must not change without a protocol version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// An allocation of a known size could not be satisfied.
    #[serde(rename = "MemoryAllocationError")]
    MemoryAllocation,
    /// The command id of an inbound frame matched no operation.
    #[serde(rename = "BadCommandError")]
    BadCommand,
    /// A binary payload ended before the next expected field.
    #[serde(rename = "OverflowError")]
    Overflow,
    /// A mutating operation hit a read-only database.
    #[serde(rename = "NotWritableDatabaseError")]
    NotWritableDatabase,
    /// The port already has a database bound to it.
    #[serde(rename = "DbAlreadyOpenedError")]
    DbAlreadyOpened,
    /// A database operation arrived before the database was opened.
    #[serde(rename = "DbNotReadyError")]
    DbNotReady,
    /// The requested element number does not exist.
    #[serde(rename = "ElementNotFoundError")]
    ElementNotFound,
}

impl ErrorKind {
    /// Every kind in the catalog, in catalog order.
    pub const ALL: [ErrorKind; 7] = [
        Self::MemoryAllocation,
        Self::BadCommand,
        Self::Overflow,
        Self::NotWritableDatabase,
        Self::DbAlreadyOpened,
        Self::DbNotReady,
        Self::ElementNotFound,
    ];

    /// Stable wire tag of this kind (e.g. `"OverflowError"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MemoryAllocation => "MemoryAllocationError",
            Self::BadCommand => "BadCommandError",
            Self::Overflow => "OverflowError",
            Self::NotWritableDatabase => "NotWritableDatabaseError",
            Self::DbAlreadyOpened => "DbAlreadyOpenedError",
            Self::DbNotReady => "DbNotReadyError",
            Self::ElementNotFound => "ElementNotFoundError",
        }
    }

    /// Resolve a wire tag back to its kind. Unknown tags give `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Returns the [`ErrorCategory`] this kind belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MemoryAllocation => ErrorCategory::Resource,
            Self::BadCommand | Self::Overflow => ErrorCategory::Protocol,
            Self::NotWritableDatabase => ErrorCategory::Database,
            Self::DbAlreadyOpened | Self::DbNotReady => ErrorCategory::Session,
            Self::ElementNotFound => ErrorCategory::Lookup,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaggedError
// ---------------------------------------------------------------------------

/// The capability every reportable failure exposes: a kind tag and a message.
///
/// Object safe, so a boundary handler can take `&dyn TaggedError` and
/// service every kind the same way.
pub trait TaggedError: std::error::Error + Send + Sync + 'static {
    /// Ready-to-display message. Not meant to be parsed.
    fn message(&self) -> &str;

    /// Stable, non-empty tag identifying the kind of failure.
    fn kind_tag(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// DriverError
// ---------------------------------------------------------------------------

/// A rendered error message.
///
/// Only this crate can build one, so a [`DriverError`] always carries the
/// message its constructor rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message(String);

impl Message {
    /// The message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Message {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const OVERFLOW_MESSAGE: &str = "Too short binary.";
const NOT_WRITABLE_DATABASE_MESSAGE: &str = "The database is open as read only.";
const DB_ALREADY_OPENED_MESSAGE: &str = "This port cannot open second DB. Use another port.";
const DB_NOT_READY_MESSAGE: &str = "Call the port-open operation first.";

fn render_memory_allocation(size: usize) -> Message {
    Message(format!("Cannot allocate {size} bytes."))
}

fn render_bad_command(command_id: i32) -> Message {
    Message(format!("Unknown command with id = {command_id}."))
}

fn render_element_not_found(num: u32) -> Message {
    Message(format!("Element with number = {num} is not found."))
}

fn fixed(text: &'static str) -> Message {
    Message(text.to_owned())
}

/// Every failure the driver can report across the port boundary.
///
/// Use the constructor functions; each renders its diagnostic input into the
/// message and keeps nothing else.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// See [`DriverError::memory_allocation`].
    #[error("{0}")]
    MemoryAllocation(Message),
    /// See [`DriverError::bad_command`].
    #[error("{0}")]
    BadCommand(Message),
    /// See [`DriverError::overflow`].
    #[error("{0}")]
    Overflow(Message),
    /// See [`DriverError::not_writable_database`].
    #[error("{0}")]
    NotWritableDatabase(Message),
    /// See [`DriverError::db_already_opened`].
    #[error("{0}")]
    DbAlreadyOpened(Message),
    /// See [`DriverError::db_not_ready`].
    #[error("{0}")]
    DbNotReady(Message),
    /// See [`DriverError::element_not_found`].
    #[error("{0}")]
    ElementNotFound(Message),
}

/// Shorthand for results whose failure is a [`DriverError`].
pub type DriverResult<T> = Result<T, DriverError>;

impl DriverError {
    /// An allocation of `size` bytes could not be satisfied.
    ///
    /// Any size is accepted, including zero.
    pub fn memory_allocation(size: usize) -> Self {
        Self::MemoryAllocation(render_memory_allocation(size))
    }

    /// The inbound command id matched no known operation.
    ///
    /// Negative ids come from malformed upstream decoding and are rendered
    /// as-is.
    pub fn bad_command(command_id: i32) -> Self {
        Self::BadCommand(render_bad_command(command_id))
    }

    /// A binary payload is shorter than the next field it should contain.
    pub fn overflow() -> Self {
        Self::Overflow(fixed(OVERFLOW_MESSAGE))
    }

    /// A mutating operation was attempted on a read-only database.
    pub fn not_writable_database() -> Self {
        Self::NotWritableDatabase(fixed(NOT_WRITABLE_DATABASE_MESSAGE))
    }

    /// The port already has a database bound; one database per port.
    pub fn db_already_opened() -> Self {
        Self::DbAlreadyOpened(fixed(DB_ALREADY_OPENED_MESSAGE))
    }

    /// A database operation arrived before the port opened a database.
    pub fn db_not_ready() -> Self {
        Self::DbNotReady(fixed(DB_NOT_READY_MESSAGE))
    }

    /// No element with number `num` exists in the queried collection.
    pub fn element_not_found(num: u32) -> Self {
        Self::ElementNotFound(render_element_not_found(num))
    }

    /// The catalog kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MemoryAllocation(_) => ErrorKind::MemoryAllocation,
            Self::BadCommand(_) => ErrorKind::BadCommand,
            Self::Overflow(_) => ErrorKind::Overflow,
            Self::NotWritableDatabase(_) => ErrorKind::NotWritableDatabase,
            Self::DbAlreadyOpened(_) => ErrorKind::DbAlreadyOpened,
            Self::DbNotReady(_) => ErrorKind::DbNotReady,
            Self::ElementNotFound(_) => ErrorKind::ElementNotFound,
        }
    }

    /// Shorthand for `self.kind().category()`.
    pub fn category(&self) -> ErrorCategory {
        self.kind().category()
    }

    fn rendered(&self) -> &Message {
        match self {
            Self::MemoryAllocation(m)
            | Self::BadCommand(m)
            | Self::Overflow(m)
            | Self::NotWritableDatabase(m)
            | Self::DbAlreadyOpened(m)
            | Self::DbNotReady(m)
            | Self::ElementNotFound(m) => m,
        }
    }
}

impl TaggedError for DriverError {
    fn message(&self) -> &str {
        self.rendered().as_str()
    }

    fn kind_tag(&self) -> &'static str {
        self.kind().as_str()
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of a reported failure: the tag and the message.
///
/// This is what crosses the port. The tag is kept as a string so a report
/// from a newer peer with an unknown tag still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Wire tag of the failure kind.
    pub tag: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorReport {
    /// Snapshot any failure through its [`TaggedError`] capability.
    pub fn from_tagged<E: TaggedError + ?Sized>(err: &E) -> Self {
        Self {
            tag: err.kind_tag().to_owned(),
            message: err.message().to_owned(),
        }
    }

    /// The catalog kind named by the tag, if it is a known one.
    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_tag(&self.tag)
    }
}

impl From<&DriverError> for ErrorReport {
    fn from(err: &DriverError) -> Self {
        Self::from_tagged(err)
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag, self.message)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
