//! Connection Handler
//!
//! Handles individual client connections.
//!
//! Per connection the state machine is `Open → (read request, dispatch,
//! write response)* → Closed`: exactly one response record per request,
//! no pipelining. The connection closes on any record-read failure or an
//! unrecognized leading token, writing one final error response first.

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::{ArborError, Result};
use crate::protocol::Response;
use crate::wal::Tag;

/// Handles a single client connection
pub struct Connection {
    /// Record reader over the stream's read half
    reader: csv::Reader<TcpStream>,

    /// Record writer over the stream's write half
    writer: csv::Writer<TcpStream>,

    /// Reference to the shared engine
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler.
    ///
    /// Configures the socket (no delay, optional timeouts) before wrapping
    /// it in the record codec; timeouts of 0 are left disabled.
    pub fn new(
        stream: TcpStream,
        engine: Arc<Engine>,
        read_timeout_ms: u64,
        write_timeout_ms: u64,
    ) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        if read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(read_timeout_ms)))?;
        }
        if write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(write_timeout_ms)))?;
        }

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(read_stream),
            writer: csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(write_stream),
            engine,
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed).
    ///
    /// Reads request records in a loop and sends one response per request.
    /// Returns when the client disconnects or the connection is closed on
    /// an error.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("connection established from {}", self.peer_addr);

        let mut record = csv::StringRecord::new();
        loop {
            match self.reader.read_record(&mut record) {
                // Clean end of stream
                Ok(false) => {
                    tracing::debug!("client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Ok(true) => {}
                Err(e) if is_disconnect(&e) => {
                    tracing::debug!("client {} connection dropped: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    // Malformed record: log a diagnostic, answer once, close.
                    tracing::warn!("error reading from {}: {}", self.peer_addr, e);
                    self.engine.log_diagnostic(
                        Tag::Error,
                        &["read_request_csv_parse".to_string(), e.to_string()],
                    );
                    let _ = self.send_response(Response::error(e.to_string()));
                    return Err(e.into());
                }
            }

            let fields: Vec<String> = record.iter().map(str::to_string).collect();
            tracing::trace!("request from {}: {:?}", self.peer_addr, fields);

            match self.dispatch(&fields) {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                // The peer vanished before the response landed; not a
                // server error.
                Err(ArborError::Codec(ref e)) if is_disconnect(e) => {
                    tracing::debug!(
                        "client {} disconnected before response could be sent",
                        self.peer_addr
                    );
                    return Ok(());
                }
                Err(ArborError::Io(ref e)) if is_disconnect_io(e.kind()) => {
                    tracing::debug!(
                        "client {} disconnected before response could be sent",
                        self.peer_addr
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("error writing to {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            }
        }
    }

    /// Execute one request and send its response.
    ///
    /// Returns `Ok(false)` when the connection should close (unrecognized
    /// leading token).
    fn dispatch(&mut self, fields: &[String]) -> Result<bool> {
        let op = fields.first().map(String::as_str).unwrap_or_default();
        match op {
            "get" => {
                let response = match self.engine.get(&fields[1..]) {
                    Ok(value) => Response::ok_value(value),
                    Err(e) => Response::error(e.to_string()),
                };
                self.send_response(response)?;
                Ok(true)
            }
            "set" => {
                // Key plus payload at minimum
                if fields.len() < 3 {
                    self.send_response(Response::error(format!(
                        "set command requires 2 arguments, saw {fields:?}"
                    )))?;
                    return Ok(true);
                }
                let response = match self.engine.set(&fields[1..]) {
                    Ok(()) => Response::ok(),
                    Err(e) => Response::error(e.to_string()),
                };
                self.send_response(response)?;
                Ok(true)
            }
            other => {
                tracing::warn!("bad command from {}: {:?}", self.peer_addr, other);
                self.engine.log_diagnostic(
                    Tag::Error,
                    &["bad_command".to_string(), other.to_string()],
                );
                let _ = self.send_response(Response::error_fields(vec![
                    "bad_command".to_string(),
                    other.to_string(),
                ]));
                Ok(false)
            }
        }
    }

    /// Send one response record to the client
    fn send_response(&mut self, response: Response) -> Result<()> {
        self.writer.write_record(&response.to_record())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// True for I/O failures that mean the peer is simply gone, as opposed to
/// a malformed record that deserves an error response
fn is_disconnect(e: &csv::Error) -> bool {
    match e.kind() {
        csv::ErrorKind::Io(io) => is_disconnect_io(io.kind()),
        _ => false,
    }
}

fn is_disconnect_io(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::WouldBlock
            | std::io::ErrorKind::TimedOut
    )
}
