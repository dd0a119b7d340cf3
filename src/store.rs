//! Root Store
//!
//! Maps top-level keys to serialized node trees.
//!
//! ## Responsibilities
//! - Resolve a top-level key to its stored tree text
//! - Delegate path reads and writes to the node engine
//! - Guard the shared map against concurrent connection handlers
//!
//! Trees are stored as serialized text and decoded fresh on every access;
//! no parsed tree is ever cached or shared between requests. The map is
//! behind an `RwLock`: reads share, and a set holds the write lock across
//! its whole decode/apply/encode cycle so concurrent writers cannot
//! interleave on one key's read-modify-write.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{ArborError, Result};
use crate::node::{read_path, write_path, Node};
use crate::protocol::Step;

/// The root mapping from top-level key to serialized tree
#[derive(Debug, Default)]
pub struct Store {
    entries: RwLock<HashMap<String, String>>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Store::default()
    }

    /// Read the position `steps` addresses under `key`.
    ///
    /// Stored text that does not decode as a node is treated as an implicit
    /// bare scalar: an empty path returns it verbatim, a non-empty path
    /// fails because there is no structure to descend into.
    pub fn get(&self, key: &str, steps: &[Step]) -> Result<String> {
        let entries = self.entries.read();
        let raw = entries
            .get(key)
            .ok_or_else(|| ArborError::KeyMiss(key.to_string()))?;

        match Node::decode(raw) {
            Ok(node) => read_path(node, steps),
            Err(_) if steps.is_empty() => Ok(raw.clone()),
            Err(e) => Err(e),
        }
    }

    /// Apply a write of `payload` at the position `steps` addresses under
    /// `key`, creating the entry from an all-empty node when absent.
    ///
    /// When the stored text does not decode and the path is empty, the
    /// entry is overwritten wholesale with the raw payload; a non-empty
    /// path fails the same way reads do.
    pub fn set(&self, key: &str, steps: &[Step], payload: &str) -> Result<()> {
        let mut entries = self.entries.write();

        let node = match entries.get(key) {
            None => Node::default(),
            Some(raw) => match Node::decode(raw) {
                Ok(node) => node,
                Err(_) if steps.is_empty() => {
                    entries.insert(key.to_string(), payload.to_string());
                    return Ok(());
                }
                Err(e) => return Err(e),
            },
        };

        let updated = write_path(node, steps, payload)?;
        entries.insert(key.to_string(), updated.encode()?);
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when no key has been written
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copy of the full key → serialized-tree mapping
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries.read().clone()
    }
}
