// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cursor over an inbound command payload.

use xdrv_error::{DriverError, DriverResult};

/// Reads little-endian fields from a borrowed command payload.
///
/// A read that needs more bytes than remain fails with
/// [`DriverError::overflow`] and leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct ParamDecoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ParamDecoder<'a> {
    /// Start decoding at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// `true` once every byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> DriverResult<u8> {
        let [b] = self.take_array::<1>()?;
        Ok(b)
    }

    /// Read a little-endian `i32`.
    pub fn read_i32(&mut self) -> DriverResult<i32> {
        self.take_array().map(i32::from_le_bytes)
    }

    /// Read a little-endian `u32`.
    pub fn read_u32(&mut self) -> DriverResult<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    /// Read a `u32` length prefix followed by that many bytes.
    pub fn read_bytes(&mut self) -> DriverResult<&'a [u8]> {
        let start = self.pos;
        let len = self.read_u32()? as usize;
        self.take(len).inspect_err(|_| self.pos = start)
    }

    /// Consume and return everything left.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        rest
    }

    fn take(&mut self, n: usize) -> DriverResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(DriverError::overflow)?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> DriverResult<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}
