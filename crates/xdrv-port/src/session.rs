// SPDX-License-Identifier: MIT OR Apache-2.0
//! One port, at most one database, and the boundary handler.

use crate::store::{DocumentStore, MemoryStore};
use crate::{Command, OpenMode};
use tracing::{debug, info, warn};
use xdrv_codec::{DEFAULT_REPLY_LIMIT, ParamDecoder, Reply, ResultEncoder};
use xdrv_error::{DriverError, DriverResult, ErrorKind, TaggedError};

#[derive(Debug)]
struct OpenDatabase<S> {
    mode: OpenMode,
    path: String,
    store: S,
}

/// A port session.
///
/// Binds at most one database for its whole lifetime. Every command frame
/// goes through [`Port::handle`], which turns failures into error replies.
#[derive(Debug)]
pub struct Port<S = MemoryStore> {
    db: Option<OpenDatabase<S>>,
    reply_limit: usize,
}

impl<S: DocumentStore + Default> Default for Port<S> {
    fn default() -> Self {
        Self::with_reply_limit(DEFAULT_REPLY_LIMIT)
    }
}

impl<S: DocumentStore + Default> Port<S> {
    /// Port with the default reply size cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Port whose replies may not exceed `limit` bytes of payload.
    pub fn with_reply_limit(limit: usize) -> Self {
        Self {
            db: None,
            reply_limit: limit,
        }
    }

    /// `true` once a database has been opened.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.db.is_some()
    }

    /// Mode of the open database, if any.
    #[must_use]
    pub fn mode(&self) -> Option<OpenMode> {
        self.db.as_ref().map(|db| db.mode)
    }

    /// Path the open database was bound with, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.db.as_ref().map(|db| db.path.as_str())
    }

    /// Run one command frame and produce the reply for the caller.
    ///
    /// This is the boundary handler: every failure raised while executing
    /// the frame ends up here and is reported, never dropped.
    pub fn handle(&mut self, frame: &[u8]) -> Reply {
        match self.execute(frame) {
            Ok(payload) => Reply::Ok(payload),
            Err(err) => report(&err),
        }
    }

    /// Decode and run one command frame, returning the reply payload.
    pub fn execute(&mut self, frame: &[u8]) -> DriverResult<Vec<u8>> {
        let mut params = ParamDecoder::new(frame);
        let command = Command::from_id(params.read_i32()?)?;
        debug!(target: "xdrv.port", ?command, len = frame.len(), "dispatch");

        let mut out = ResultEncoder::with_limit(self.reply_limit);
        match command {
            Command::Open => self.open(&mut params)?,
            Command::AddDocument => {
                let store = self.writable()?;
                let data = copy_payload(params.read_bytes()?)?;
                // Reserve the docid before storing so a stored document always gets its reply.
                out.reserve(4)?;
                let docid = store.add(data)?;
                out.write_u32(docid)?;
            }
            Command::GetDocument => {
                let store = self.readable()?;
                let docid = params.read_u32()?;
                let doc = store
                    .get(docid)
                    .ok_or_else(|| DriverError::element_not_found(docid))?;
                out.write_bytes(doc)?;
            }
            Command::DeleteDocument => {
                let store = self.writable()?;
                let docid = params.read_u32()?;
                store
                    .remove(docid)
                    .ok_or_else(|| DriverError::element_not_found(docid))?;
            }
            Command::DocumentCount => {
                let count = self.readable()?.len();
                out.write_u32(count)?;
            }
        }
        Ok(out.finish())
    }

    fn open(&mut self, params: &mut ParamDecoder<'_>) -> DriverResult<()> {
        if self.db.is_some() {
            return Err(DriverError::db_already_opened());
        }
        let mode = OpenMode::from_flags(params.read_u8()?);
        let path = String::from_utf8_lossy(params.read_bytes()?).into_owned();
        info!(target: "xdrv.port", %path, ?mode, "database opened");
        self.db = Some(OpenDatabase {
            mode,
            path,
            store: S::default(),
        });
        Ok(())
    }

    fn readable(&self) -> DriverResult<&S> {
        self.db
            .as_ref()
            .map(|db| &db.store)
            .ok_or_else(DriverError::db_not_ready)
    }

    fn writable(&mut self) -> DriverResult<&mut S> {
        let db = self.db.as_mut().ok_or_else(DriverError::db_not_ready)?;
        if !db.mode.is_writable() {
            return Err(DriverError::not_writable_database());
        }
        Ok(&mut db.store)
    }
}

fn copy_payload(data: &[u8]) -> DriverResult<Vec<u8>> {
    let mut owned = Vec::new();
    owned
        .try_reserve_exact(data.len())
        .map_err(|_| DriverError::memory_allocation(data.len()))?;
    owned.extend_from_slice(data);
    Ok(owned)
}

/// Log a failure and turn it into an error reply.
///
/// Only the [`TaggedError`] capability is used, so any kind goes through the
/// same path.
pub(crate) fn report(err: &dyn TaggedError) -> Reply {
    let tag = err.kind_tag();
    warn!(
        target: "xdrv.port",
        tag,
        category = ?ErrorKind::from_tag(tag).map(|kind| kind.category()),
        error = err.message(),
        "command failed"
    );
    Reply::error(err)
}
