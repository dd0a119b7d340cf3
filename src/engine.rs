//! Engine Module
//!
//! The core engine that coordinates all components.
//!
//! ## Responsibilities
//! - Rebuild the root store from the log at startup
//! - Parse request tokens and route them through the store
//! - Emit one log record per request outcome
//! - Sequence shutdown so the log drains before the file closes
//!
//! ## Concurrency Model
//!
//! - The root store guards its map with an `RwLock`; gets share, sets are
//!   exclusive for their whole read-modify-write cycle.
//! - Log records are handed to a single worker thread that owns the file;
//!   the submission lock keeps hand-off order equal to outcome order
//!   within this engine.
//! - An acknowledgment is returned once the worker has accepted the
//!   record, not once it is flushed (see the `wal` module caveat).

use std::fs::{self, OpenOptions};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{ArborError, Result};
use crate::protocol::Command;
use crate::store::Store;
use crate::wal::{self, LogRecord, LogWorker, LogWriter, Tag};

/// The main engine: root store plus durability log
pub struct Engine {
    /// Top-level key → serialized tree, shared across connection handlers
    store: Store,

    /// Submission handle to the log worker; `None` once closed
    logger: Mutex<Option<LogWriter>>,

    /// Worker join handle, taken by `close`
    worker: Mutex<Option<LogWorker>>,
}

impl Engine {
    /// Open an engine against the configured log file.
    ///
    /// On startup:
    /// 1. Delete the log file when `config.overwrite` is set
    /// 2. Replay any existing log into a fresh store
    /// 3. Open the file for append (creating it if missing)
    /// 4. Spawn the log worker
    ///
    /// Replay runs before the worker exists, so re-applied writes are not
    /// appended a second time.
    pub fn open(config: &Config) -> Result<Self> {
        if config.overwrite && config.log_path.exists() {
            fs::remove_file(&config.log_path)?;
            tracing::info!(path = %config.log_path.display(), "removed existing log file");
        }

        let store = Store::new();
        if config.log_path.exists() {
            let summary = wal::replay(&config.log_path, &store)?;
            tracing::info!(
                applied = summary.records_applied,
                skipped = summary.records_skipped,
                keys = store.len(),
                "rebuilt store from log"
            );
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_path)?;
        let (logger, worker) = LogWriter::spawn(file)?;

        Ok(Self {
            store,
            logger: Mutex::new(Some(logger)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Execute a get from its request tokens (top key, then path tokens).
    ///
    /// Every outcome leaves one log record: `get` with the literal tokens
    /// on success, `keymiss` for an absent top-level key, `errorget` for
    /// parse or evaluation failures.
    pub fn get(&self, args: &[String]) -> Result<String> {
        let command = match Command::parse_get(args) {
            Ok(command) => command,
            Err(e) => {
                self.log(Tag::ErrorGet, &[e.to_string()]);
                return Err(e);
            }
        };

        match self.store.get(&command.key, &command.steps) {
            Ok(value) => {
                self.log(Tag::Get, args);
                Ok(value)
            }
            Err(e @ ArborError::KeyMiss(_)) => {
                self.log(Tag::KeyMiss, &[e.to_string()]);
                Err(e)
            }
            Err(e) => {
                self.log(Tag::ErrorGet, &[e.to_string()]);
                Err(e)
            }
        }
    }

    /// Execute a set from its request tokens (top key, path tokens,
    /// payload last).
    ///
    /// Success logs `set` with the literal tokens, the exact record that
    /// replay re-applies at the next startup. Failures log `errorset`.
    pub fn set(&self, args: &[String]) -> Result<()> {
        let command = match Command::parse_set(args) {
            Ok(command) => command,
            Err(e) => {
                self.log(Tag::ErrorSet, &[e.to_string()]);
                return Err(e);
            }
        };

        match self.store.set(&command.key, &command.steps, &command.payload) {
            Ok(()) => {
                self.log(Tag::Set, args);
                Ok(())
            }
            Err(e) => {
                self.log(Tag::ErrorSet, &[e.to_string()]);
                Err(e)
            }
        }
    }

    /// Record a connection-level diagnostic (read failure, bad command)
    pub(crate) fn log_diagnostic(&self, tag: Tag, fields: &[String]) {
        self.log(tag, fields);
    }

    /// Submit one record to the log worker, if it is still running.
    ///
    /// Holding the lock across `submit` serializes producers, so records
    /// reach the worker in the order outcomes were decided here.
    fn log(&self, tag: Tag, fields: &[String]) {
        let logger = self.logger.lock();
        if let Some(writer) = logger.as_ref() {
            if let Err(e) = writer.submit(LogRecord::new(tag, fields)) {
                tracing::warn!(tag = tag.as_str(), "dropping log record: {e}");
            }
        }
    }

    /// Close the engine: stop accepting log records, then wait for the
    /// worker to drain, flush, and close the file. Idempotent.
    pub fn close(&self) -> Result<()> {
        // Dropping the writer disconnects the queue.
        drop(self.logger.lock().take());

        if let Some(worker) = self.worker.lock().take() {
            worker.join()?;
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// The underlying root store
    pub fn store(&self) -> &Store {
        &self.store
    }
}
