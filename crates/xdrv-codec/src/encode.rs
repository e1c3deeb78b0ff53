// SPDX-License-Identifier: MIT OR Apache-2.0
//! Capped output buffer for command results.

use xdrv_error::{DriverError, DriverResult};

/// Default cap on a single result payload (16 MiB).
pub const DEFAULT_REPLY_LIMIT: usize = 16 * 1024 * 1024;

/// Growable result buffer with a hard byte limit.
///
/// Growth past the limit, or an allocation the allocator refuses, fails with
/// [`DriverError::memory_allocation`] carrying the number of bytes requested.
#[derive(Debug, Clone)]
pub struct ResultEncoder {
    buf: Vec<u8>,
    limit: usize,
}

impl Default for ResultEncoder {
    fn default() -> Self {
        Self::with_limit(DEFAULT_REPLY_LIMIT)
    }
}

impl ResultEncoder {
    /// Encoder with [`DEFAULT_REPLY_LIMIT`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder that refuses to grow beyond `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
        }
    }

    /// The configured byte limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Make room for `additional` more bytes.
    pub fn reserve(&mut self, additional: usize) -> DriverResult<()> {
        let fits = self
            .buf
            .len()
            .checked_add(additional)
            .is_some_and(|total| total <= self.limit);
        if !fits {
            return Err(DriverError::memory_allocation(additional));
        }
        self.buf
            .try_reserve(additional)
            .map_err(|_| DriverError::memory_allocation(additional))
    }

    /// Append one byte.
    pub fn write_u8(&mut self, value: u8) -> DriverResult<()> {
        self.reserve(1)?;
        self.buf.push(value);
        Ok(())
    }

    /// Append a little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> DriverResult<()> {
        self.write_raw(&value.to_le_bytes())
    }

    /// Append a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> DriverResult<()> {
        self.write_raw(&value.to_le_bytes())
    }

    /// Append a `u32` length prefix followed by `data`.
    pub fn write_bytes(&mut self, data: &[u8]) -> DriverResult<()> {
        let len =
            u32::try_from(data.len()).map_err(|_| DriverError::memory_allocation(data.len()))?;
        let total = data
            .len()
            .checked_add(4)
            .ok_or_else(|| DriverError::memory_allocation(data.len()))?;
        self.reserve(total)?;
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Append `data` with no length prefix.
    pub fn write_raw(&mut self, data: &[u8]) -> DriverResult<()> {
        self.reserve(data.len())?;
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Take the encoded bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
