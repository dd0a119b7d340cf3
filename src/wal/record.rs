//! Log record definitions
//!
//! Defines the structure of individual log entries.

/// Tag carried in the first field of every log record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// A successful write; the only tag replayed at startup
    Set,

    /// A successful read
    Get,

    /// A transport or dispatch failure on a connection
    Error,

    /// A get that failed to parse or evaluate
    ErrorGet,

    /// A set that failed to parse or evaluate
    ErrorSet,

    /// A read of an absent top-level key
    KeyMiss,
}

impl Tag {
    /// The literal first field written to the log
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Set => "set",
            Tag::Get => "get",
            Tag::Error => "error",
            Tag::ErrorGet => "errorget",
            Tag::ErrorSet => "errorset",
            Tag::KeyMiss => "keymiss",
        }
    }
}

/// A single entry in the operation log: a tag followed by the literal
/// token sequence of the request (or diagnostic detail fields)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    fields: Vec<String>,
}

impl LogRecord {
    /// Build a record from a tag and its trailing fields
    pub fn new(tag: Tag, args: &[String]) -> Self {
        let mut fields = Vec::with_capacity(1 + args.len());
        fields.push(tag.as_str().to_string());
        fields.extend(args.iter().cloned());
        LogRecord { fields }
    }

    /// All fields, tag first
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The leading tag field
    pub fn tag(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }
}
