//! Blocking TCP Client
//!
//! Speaks the wire protocol over a persistent connection: one request
//! record out, one response record back. Used by the CLI binary and the
//! integration tests.

use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{ArborError, Result};
use crate::node::Node;
use crate::protocol::Response;

/// A connected client
pub struct Client {
    reader: csv::Reader<TcpStream>,
    writer: csv::Writer<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(read_stream),
            writer: csv::WriterBuilder::new().flexible(true).from_writer(stream),
        })
    }

    /// Read the value at `args` = `[topKey, pathToken...]`
    pub fn get(&mut self, args: &[&str]) -> Result<String> {
        let response = self.request("get", args)?;
        match response {
            Response::Ok(value) => Ok(value.unwrap_or_default()),
            Response::Error(fields) => Err(ArborError::Remote(fields.join(", "))),
        }
    }

    /// Write the payload at `args` = `[topKey, pathToken..., payload]`
    pub fn set(&mut self, args: &[&str]) -> Result<()> {
        let response = self.request("set", args)?;
        match response {
            Response::Ok(_) => Ok(()),
            Response::Error(fields) => Err(ArborError::Remote(fields.join(", "))),
        }
    }

    /// Append `value` as a new element of `key`'s list slot
    pub fn append(&mut self, key: &str, value: &str) -> Result<()> {
        self.set(&[key, "+", "+", value])
    }

    /// Read the scalar of every element in `key`'s list slot.
    ///
    /// A value that is not a structured node, or a node without list
    /// children, reads as an empty list.
    pub fn get_list(&mut self, key: &str) -> Result<Vec<String>> {
        let raw = self.get(&[key])?;
        match serde_json::from_str::<Node>(&raw) {
            Ok(node) => Ok(node.list.into_iter().map(|child| child.value).collect()),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Send one request record and read the matching response record
    fn request(&mut self, op: &str, args: &[&str]) -> Result<Response> {
        let mut record = Vec::with_capacity(1 + args.len());
        record.push(op);
        record.extend_from_slice(args);

        self.writer.write_record(&record)?;
        self.writer.flush()?;

        let mut reply = csv::StringRecord::new();
        if !self.reader.read_record(&mut reply)? {
            return Err(ArborError::Protocol(
                "connection closed before response".to_string(),
            ));
        }
        let fields: Vec<String> = reply.iter().map(str::to_string).collect();
        Response::from_record(&fields)
    }
}
