// SPDX-License-Identifier: MIT OR Apache-2.0
//! xdrv-port
//!
//! Port side of the Xapian driver. A [`Port`] binds at most one database and
//! runs command frames against it; [`Port::handle`] is the boundary handler
//! that turns every `DriverError` into a tagged error [`Reply`].
//! [`PortServer`] drives a port over a length-prefixed byte stream.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod request;
pub mod server;
pub mod session;
pub mod store;

pub use command::{Command, OpenMode};
pub use request::Request;
pub use server::{DEFAULT_FRAME_LIMIT, PortServer};
pub use session::Port;
pub use store::{DocumentStore, MemoryStore};
pub use xdrv_codec::Reply;

use thiserror::Error;

/// Transport failures of the frame loop.
///
/// These sit below the port protocol and are not reported to the caller as
/// tagged errors; they end the loop.
#[derive(Debug, Error)]
pub enum PortError {
    /// Underlying I/O error, including end of input inside a frame.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A reply, or the report of its own encoding failure, could not be
    /// encoded.
    #[error("reply could not be encoded: {0}")]
    Encode(#[from] xdrv_error::DriverError),

    /// A reply body does not fit the 4-byte length prefix.
    #[error("reply of {len} bytes does not fit a frame")]
    ReplyTooLarge {
        /// Encoded reply length.
        len: usize,
    },
}
