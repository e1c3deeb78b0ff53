// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame loop: read length-prefixed command frames, write replies.

use crate::PortError;
use crate::session::{Port, report};
use crate::store::{DocumentStore, MemoryStore};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;
use xdrv_error::DriverError;

/// Default cap on an inbound frame body (16 MiB).
pub const DEFAULT_FRAME_LIMIT: usize = 16 * 1024 * 1024;

/// Serves one [`Port`] over a byte stream.
///
/// Frames in both directions are a 4-byte big-endian length followed by the
/// body. Every inbound frame gets exactly one reply, in order.
///
/// ```no_run
/// use xdrv_port::{Port, PortServer};
///
/// #[tokio::main]
/// async fn main() {
///     let mut server: PortServer = PortServer::new(Port::new());
///     server.run().await.unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct PortServer<S = MemoryStore> {
    port: Port<S>,
    max_frame_bytes: usize,
}

impl<S: DocumentStore + Default> PortServer<S> {
    /// Serve `port` with [`DEFAULT_FRAME_LIMIT`].
    pub fn new(port: Port<S>) -> Self {
        Self {
            port,
            max_frame_bytes: DEFAULT_FRAME_LIMIT,
        }
    }

    /// Refuse inbound frames longer than `limit` bytes.
    #[must_use]
    pub fn with_max_frame_bytes(mut self, limit: usize) -> Self {
        self.max_frame_bytes = limit;
        self
    }

    /// The served port.
    pub fn port(&self) -> &Port<S> {
        &self.port
    }

    /// Serve frames from stdin, replying on stdout, until stdin closes.
    pub async fn run(&mut self) -> Result<(), PortError> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        self.run_with_io(stdin, &mut stdout).await
    }

    /// Serve frames with injectable I/O.
    ///
    /// Returns `Ok` on end of input at a frame boundary. End of input inside
    /// a frame is an I/O error.
    pub async fn run_with_io<R, W>(
        &mut self,
        mut reader: R,
        writer: &mut W,
    ) -> Result<(), PortError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        while let Some(len) = read_header(&mut reader).await? {
            let len = len as usize;
            debug!(target: "xdrv.port", len, "frame received");
            let reply = if len > self.max_frame_bytes {
                drain(&mut reader, len).await?;
                report(&DriverError::memory_allocation(len))
            } else {
                let mut frame = Vec::new();
                if frame.try_reserve_exact(len).is_err() {
                    drain(&mut reader, len).await?;
                    report(&DriverError::memory_allocation(len))
                } else {
                    frame.resize(len, 0);
                    reader.read_exact(&mut frame).await?;
                    self.port.handle(&frame)
                }
            };
            let body = match reply.encode() {
                Ok(body) => body,
                Err(err) => report(&err).encode()?,
            };
            write_frame(writer, &body).await?;
        }
        debug!(target: "xdrv.port", "input closed");
        Ok(())
    }
}

async fn read_header<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<u32>, PortError> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        filled += n;
    }
    Ok(Some(u32::from_be_bytes(header)))
}

async fn drain<R: AsyncRead + Unpin>(reader: &mut R, len: usize) -> Result<(), PortError> {
    let mut body = (&mut *reader).take(len as u64);
    let copied = tokio::io::copy(&mut body, &mut tokio::io::sink()).await?;
    if copied < len as u64 {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    Ok(())
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, body: &[u8]) -> Result<(), PortError> {
    let len = u32::try_from(body.len())
        .map_err(|_| PortError::ReplyTooLarge { len: body.len() })?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}
