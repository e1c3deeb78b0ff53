// SPDX-License-Identifier: MIT OR Apache-2.0
//! xdrv-codec
//!
//! Binary layer of the Xapian port driver: decoding command parameters,
//! encoding results under a size cap, and framing replies.
//!
//! Integers are little-endian. Byte strings carry a `u32` length prefix.
//! Short input is reported as `OverflowError`; a result that outgrows its
//! cap, or a byte string too long for its prefix, is reported as
//! `MemoryAllocationError`.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod decode;
pub mod encode;
pub mod reply;

pub use decode::ParamDecoder;
pub use encode::{DEFAULT_REPLY_LIMIT, ResultEncoder};
pub use reply::{Reply, ReplyError};
