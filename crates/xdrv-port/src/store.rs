// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document storage behind an open port.

use std::collections::BTreeMap;
use xdrv_error::{DriverError, DriverResult};

/// Storage backend the port forwards document operations to.
///
/// Docids are assigned by the store and are never zero.
pub trait DocumentStore: Send {
    /// Store `data` and return its new docid.
    fn add(&mut self, data: Vec<u8>) -> DriverResult<u32>;

    /// The document stored under `docid`.
    fn get(&self, docid: u32) -> Option<&[u8]>;

    /// Remove and return the document stored under `docid`.
    fn remove(&mut self, docid: u32) -> Option<Vec<u8>>;

    /// Number of stored documents.
    fn len(&self) -> u32;

    /// `true` if no documents are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`DocumentStore`].
///
/// Docids start at 1 and increase monotonically. Removed ids are not reused
/// until the counter passes `u32::MAX`; after that the lowest free id is
/// handed out.
///
/// Capacity is one document per non-zero `u32`. A store at capacity has no
/// room for another document and refuses it as an allocation of its size.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    docs: BTreeMap<u32, Vec<u8>>,
    next_id: Option<u32>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            docs: BTreeMap::new(),
            next_id: Some(1),
        }
    }
}

impl MemoryStore {
    fn lowest_free_id(&self) -> Option<u32> {
        let mut candidate: u32 = 1;
        for &id in self.docs.keys() {
            if id != candidate {
                return Some(candidate);
            }
            candidate = candidate.checked_add(1)?;
        }
        Some(candidate)
    }
}

impl DocumentStore for MemoryStore {
    fn add(&mut self, data: Vec<u8>) -> DriverResult<u32> {
        let docid = match self.next_id {
            Some(id) => id,
            None => self
                .lowest_free_id()
                .ok_or_else(|| DriverError::memory_allocation(data.len()))?,
        };
        self.next_id = self.next_id.and_then(|id| id.checked_add(1));
        self.docs.insert(docid, data);
        Ok(docid)
    }

    fn get(&self, docid: u32) -> Option<&[u8]> {
        self.docs.get(&docid).map(Vec::as_slice)
    }

    fn remove(&mut self, docid: u32) -> Option<Vec<u8>> {
        self.docs.remove(&docid)
    }

    fn len(&self) -> u32 {
        // Bounded by the u32 docid space.
        self.docs.len() as u32
    }
}
