//! Log Writer
//!
//! Appends records to the log file through a dedicated worker thread.
//!
//! The worker owns the file handle exclusively and writes records in the
//! exact order it dequeues them, flushing after each one (the durability
//! unit is one record). Producers hand records over through a rendezvous
//! channel: `submit` blocks only until the worker accepts the record, NOT
//! until the flush completes. An acknowledgment sent to a client is
//! therefore not a durability guarantee against a crash between acceptance
//! and flush.

use std::fs::File;
use std::io::BufWriter;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Sender};

use crate::error::{ArborError, Result};
use super::LogRecord;

/// Submission handle to the log worker.
///
/// Dropping the last writer closes the queue, letting the worker drain,
/// flush, close the file, and finish.
pub struct LogWriter {
    tx: Sender<LogRecord>,
}

/// Join handle for the worker thread; `join` observes completion
pub struct LogWorker {
    handle: JoinHandle<Result<()>>,
}

impl LogWriter {
    /// Spawn the worker thread owning `file` and return the submission
    /// handle plus the worker's join handle.
    pub fn spawn(file: File) -> Result<(LogWriter, LogWorker)> {
        // Zero capacity: a submit parks the producer until the worker
        // takes the record, so acceptance order is submission order.
        let (tx, rx) = bounded::<LogRecord>(0);

        let handle = thread::Builder::new()
            .name("arborkv-log".to_string())
            .spawn(move || -> Result<()> {
                let mut writer = csv::WriterBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .from_writer(BufWriter::new(file));

                for record in rx {
                    writer.write_record(record.fields())?;
                    writer.flush()?;
                }

                // Queue closed: final flush, then the file closes on drop.
                writer.flush()?;
                tracing::debug!("log worker drained and stopped");
                Ok(())
            })?;

        Ok((LogWriter { tx }, LogWorker { handle }))
    }

    /// Hand one record to the worker, blocking until it is accepted
    pub fn submit(&self, record: LogRecord) -> Result<()> {
        self.tx.send(record).map_err(|_| ArborError::LogClosed)
    }
}

impl LogWorker {
    /// Wait for the worker to drain, flush, and close the file
    pub fn join(self) -> Result<()> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(ArborError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "log worker thread panicked",
            ))),
        }
    }
}
