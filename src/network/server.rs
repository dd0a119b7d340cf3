//! TCP Server
//!
//! Accepts connections and dispatches each to its own handler thread.
//!
//! Shutdown is sequenced deterministically: the accept loop stops, the
//! wait group drains as the remaining connection handlers finish on their
//! own, and only then is the engine closed, which closes the log worker's
//! queue and waits for it to flush and release the file. Stopping the
//! listener never terminates live connections.

use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::sync::WaitGroup;
use parking_lot::Mutex;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use super::Connection;

/// How often the accept loop rechecks the shutdown flag
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// TCP server for ArborKV
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    shutdown: AtomicBool,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            engine,
            shutdown: AtomicBool::new(false),
            local_addr: Mutex::new(None),
        }
    }

    /// Start the server (blocking until shutdown).
    ///
    /// Runs the accept loop on the calling thread, spawning one handler
    /// thread per connection. Returns after every handler has finished and
    /// the engine's log worker has drained.
    pub fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.listen_addr.as_str())?;
        // Non-blocking accept so the loop can notice the shutdown flag.
        listener.set_nonblocking(true)?;

        let addr = listener.local_addr()?;
        *self.local_addr.lock() = Some(addr);
        tracing::info!(%addr, "listening");

        let wait_group = WaitGroup::new();
        let mut accept_result = Ok(());

        while !self.shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    tracing::debug!(%peer, "accepted connection");
                    // The accepted socket must not inherit non-blocking mode.
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!(%peer, "failed to configure socket: {e}");
                        continue;
                    }

                    let engine = Arc::clone(&self.engine);
                    let guard = wait_group.clone();
                    let read_timeout_ms = self.config.read_timeout_ms;
                    let write_timeout_ms = self.config.write_timeout_ms;

                    thread::spawn(move || {
                        let _guard = guard;
                        match Connection::new(stream, engine, read_timeout_ms, write_timeout_ms) {
                            Ok(mut connection) => {
                                if let Err(e) = connection.handle() {
                                    tracing::warn!(
                                        "connection {} closed on error: {e}",
                                        connection.peer_addr()
                                    );
                                }
                            }
                            Err(e) => tracing::warn!(%peer, "failed to set up connection: {e}"),
                        }
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::error!("accept failed: {e}");
                    accept_result = Err(e.into());
                    break;
                }
            }
        }

        // Stop taking connections, let the live ones run to completion,
        // then release the log worker.
        drop(listener);
        tracing::info!("accept loop stopped, waiting for connections to finish");
        wait_group.wait();
        self.engine.close()?;
        tracing::info!("server stopped");

        accept_result
    }

    /// Signal the server to shut down gracefully.
    ///
    /// Stops accepting new connections; existing connections terminate
    /// only on their own read failure or peer close.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// The bound listen address, available once `run` has bound the
    /// listener (useful with port 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }
}
