//! Response definitions
//!
//! Represents responses to clients.

use crate::error::{ArborError, Result};

/// A response to send to a client, one record per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Success, with the value for gets
    Ok(Option<String>),

    /// Failure; first field is the message, any further fields are
    /// diagnostic context
    Error(Vec<String>),
}

impl Response {
    /// Success without a value (sets)
    pub fn ok() -> Self {
        Response::Ok(None)
    }

    /// Success carrying a value (gets)
    pub fn ok_value(value: impl Into<String>) -> Self {
        Response::Ok(Some(value.into()))
    }

    /// Failure with a single message field
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(vec![message.into()])
    }

    /// Failure with extra diagnostic fields after the message
    pub fn error_fields(fields: Vec<String>) -> Self {
        Response::Error(fields)
    }

    /// Encode as the record fields sent on the wire
    pub fn to_record(&self) -> Vec<String> {
        match self {
            Response::Ok(None) => vec!["ok".to_string()],
            Response::Ok(Some(value)) => vec!["ok".to_string(), value.clone()],
            Response::Error(fields) => {
                let mut record = vec!["error".to_string()];
                record.extend(fields.iter().cloned());
                record
            }
        }
    }

    /// Decode from the record fields read off the wire
    pub fn from_record(fields: &[String]) -> Result<Response> {
        match fields.first().map(String::as_str) {
            Some("ok") => Ok(Response::Ok(fields.get(1).cloned())),
            Some("error") => Ok(Response::Error(fields[1..].to_vec())),
            _ => Err(ArborError::Protocol(format!(
                "malformed response record: {fields:?}"
            ))),
        }
    }
}
