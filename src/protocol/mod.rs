//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format
//!
//! Each request and response is one CSV record (standard quoting for
//! embedded separators, quotes, and newlines), terminated by a line break,
//! over a persistent TCP connection. Requests and responses alternate
//! one-for-one per connection. The `csv` crate handles the escaping; this
//! module owns the field layout.
//!
//! ### Requests
//! ```text
//! get,<topKey>[,<pathToken>...]
//! set,<topKey>[,<pathToken>...],<payload>
//! ```
//!
//! ### Responses
//! ```text
//! ok[,<value>]
//! error,<message>[,<diagnostic>...]
//! ```
//!
//! The operation log uses the identical record encoding, prefixed with an
//! operation/diagnostic tag (see the `wal` module).

mod command;
mod response;

pub use command::{Command, CommandKind, ListOp, Step};
pub use response::Response;
