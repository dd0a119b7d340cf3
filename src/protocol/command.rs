//! Command definitions
//!
//! Parses the token sequence of one request into a command plan: operation
//! kind, top-level key, and the path steps addressing a position inside the
//! key's tree.
//!
//! ## Path grammar (tokens after the top-level key)
//!
//! | token(s)    | step                                                  |
//! |-------------|-------------------------------------------------------|
//! | `_`         | scalar slot (terminal)                                |
//! | `+`         | whole list slot (reads only)                          |
//! | `+` `+`     | append a new list element (writes only)               |
//! | `+` `<int>` | existing list element by index                        |
//! | other       | map entry under that literal key                      |
//!
//! Reads reject tokens left over after a terminal `_`; writes stop
//! consuming at `_` and ignore whatever trails it. That asymmetry is kept
//! deliberately; see DESIGN.md.

use crate::error::{ArborError, Result};

/// Operation kind of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Get,
    Set,
}

/// One addressing instruction inside a list slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOp {
    /// The entire list slot (bare `+` on a read)
    Whole,

    /// Create and descend into a new trailing element (`+ +` on a write)
    Append,

    /// An existing element; bounds are checked against the live list
    Index(i64),
}

/// One addressing instruction derived from path tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The scalar slot (`_`)
    Scalar,

    /// The list slot (`+` forms)
    List(ListOp),

    /// The map entry under a literal key
    Map(String),
}

/// A parsed command plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Operation kind
    pub kind: CommandKind,

    /// Top-level key addressing a whole tree in the root store
    pub key: String,

    /// Path steps, applied left to right below the top-level key
    pub steps: Vec<Step>,

    /// Scalar payload of a set; empty for gets
    pub payload: String,
}

impl Command {
    /// Parse a full request record (leading operation token included)
    pub fn parse(fields: &[String]) -> Result<Command> {
        let Some((op, args)) = fields.split_first() else {
            return Err(ArborError::parse("empty request"));
        };
        match op.as_str() {
            "get" => Command::parse_get(args),
            "set" => Command::parse_set(args),
            other => Err(ArborError::Parse(format!("unknown command: {other}"))),
        }
    }

    /// Parse the arguments of a get: `<topKey> [pathToken...]`
    pub fn parse_get(args: &[String]) -> Result<Command> {
        let Some((key, rest)) = args.split_first() else {
            return Err(ArborError::parse("no top key provided"));
        };
        let (steps, leftover) = parse_steps(rest, CommandKind::Get)?;
        if !leftover.is_empty() {
            return Err(ArborError::Parse(format!(
                "extra values received on get: {leftover:?}"
            )));
        }
        Ok(Command {
            kind: CommandKind::Get,
            key: key.clone(),
            steps,
            payload: String::new(),
        })
    }

    /// Parse the arguments of a set: `<topKey> [pathToken...] <payload>`
    pub fn parse_set(args: &[String]) -> Result<Command> {
        let Some((key, rest)) = args.split_first() else {
            return Err(ArborError::parse("no top key provided"));
        };
        let Some((payload, path_tokens)) = rest.split_last() else {
            return Err(ArborError::parse(
                "no key or value provided for set command",
            ));
        };
        // Leftover tokens after a terminal `_` are ignored on writes.
        let (steps, _leftover) = parse_steps(path_tokens, CommandKind::Set)?;
        Ok(Command {
            kind: CommandKind::Set,
            key: key.clone(),
            steps,
            payload: payload.clone(),
        })
    }
}

/// Consume path tokens left to right into steps.
///
/// Returns the steps plus any tokens left unconsumed (only possible after a
/// terminal `_`); the caller decides whether leftovers are an error.
fn parse_steps(tokens: &[String], kind: CommandKind) -> Result<(Vec<Step>, &[String])> {
    let mut steps = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i].as_str() {
            "_" => {
                steps.push(Step::Scalar);
                i += 1;
                break;
            }
            "+" => {
                i += 1;
                let Some(selector) = tokens.get(i) else {
                    if kind == CommandKind::Get {
                        steps.push(Step::List(ListOp::Whole));
                        break;
                    }
                    return Err(ArborError::parse(
                        "list command expects index/append value, none given",
                    ));
                };
                if selector == "+" {
                    if kind == CommandKind::Get {
                        return Err(ArborError::parse(
                            "no append command allowed in get calls",
                        ));
                    }
                    steps.push(Step::List(ListOp::Append));
                } else {
                    let index: i64 = selector.parse().map_err(|_| {
                        ArborError::Parse(format!("invalid list index: {selector}"))
                    })?;
                    steps.push(Step::List(ListOp::Index(index)));
                }
                i += 1;
            }
            key => {
                steps.push(Step::Map(key.to_string()));
                i += 1;
            }
        }
    }

    Ok((steps, &tokens[i..]))
}
