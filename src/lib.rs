//! # ArborKV
//!
//! A network-accessible key-value store whose values are addressable
//! trees, with:
//! - A compact path grammar selecting scalar / list / map positions
//! - An append-only operation log replayed at startup for durability
//! - Thread-per-connection TCP serving over a CSV record protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                             │
//! │         (accept loop + one thread per connection)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ request records
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                │
//! │        (parse path grammar, route, emit log records)        │
//! └──────────┬───────────────────────────────────┬──────────────┘
//!            │                                   │
//!            ▼                                   ▼
//!     ┌─────────────┐                    ┌───────────────┐
//!     │ Root Store  │                    │  Log Worker   │
//!     │  (RwLock)   │                    │ (append+flush)│
//!     └──────┬──────┘                    └───────────────┘
//!            │
//!            ▼
//!     ┌─────────────┐
//!     │ Node Engine │
//!     │ (tree walk) │
//!     └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod node;
pub mod protocol;
pub mod store;
pub mod wal;
pub mod engine;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ArborError, Result};
pub use config::Config;
pub use engine::Engine;
pub use client::Client;
pub use node::Node;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ArborKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
