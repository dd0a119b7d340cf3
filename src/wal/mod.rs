//! Durability Log Module
//!
//! Provides durability through append-only operation logging.
//!
//! ## Responsibilities
//! - Record every request as one CSV record, in arrival order
//! - Serialize all file writes through a single worker thread
//! - Rebuild the root store at startup by replaying recorded writes
//!
//! ## File Format
//! ```text
//! set,users,name,alice          <- replayed at startup
//! get,users,name                <- skipped
//! keymiss,top-level key miss x  <- diagnostic, skipped
//! errorset,parse error: ...     <- diagnostic, skipped
//! ```
//!
//! One record per line, identical encoding to the wire protocol; the first
//! field is an operation/diagnostic tag. Only `set` records are replayed,
//! in file order. The log is the source of truth; the in-memory store is
//! a derived, rebuildable cache.

mod record;
mod replay;
mod writer;

pub use record::{LogRecord, Tag};
pub use replay::{replay, ReplaySummary};
pub use writer::{LogWorker, LogWriter};
