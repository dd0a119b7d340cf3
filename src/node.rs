//! Node Tree Engine
//!
//! The value type stored under every top-level key, and the recursive
//! algorithms that read or mutate a position inside it.
//!
//! ## Responsibilities
//! - Model tree values with scalar, list, and map slots
//! - Walk a parsed path plan to read one position
//! - Rebuild a subtree to apply one write
//!
//! A node's three slots are independently addressable and may all be
//! populated at once: a node can carry a scalar while also holding list or
//! map children. Writes never touch slots the path does not address.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ArborError, Result};
use crate::protocol::{ListOp, Step};

/// A tree value with three independently addressable slots.
///
/// Serialized as JSON with empty slots omitted; `BTreeMap` keeps the
/// encoding a pure function of slot contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Scalar slot, addressed by the `_` path token
    #[serde(default, rename = "v", skip_serializing_if = "String::is_empty")]
    pub value: String,

    /// Ordered-list slot, addressed by `+` path tokens
    #[serde(default, rename = "l", skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<Node>,

    /// Keyed-map slot, addressed by bare literal path tokens
    #[serde(default, rename = "m", skip_serializing_if = "BTreeMap::is_empty")]
    pub map: BTreeMap<String, Node>,
}

impl Node {
    /// Create a node holding only a scalar
    pub fn scalar(value: impl Into<String>) -> Self {
        Node {
            value: value.into(),
            ..Node::default()
        }
    }

    /// True when every slot is empty
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.list.is_empty() && self.map.is_empty()
    }

    /// Decode a node from its serialized text
    pub fn decode(raw: &str) -> Result<Node> {
        serde_json::from_str(raw).map_err(|e| ArborError::Decode(e.to_string()))
    }

    /// Encode a node to its serialized text
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ArborError::Encode(e.to_string()))
    }
}

// =============================================================================
// Read Walk
// =============================================================================

/// Read the position a path plan addresses inside `node`.
///
/// `Scalar` returns the scalar slot immediately; a bare list step returns
/// the serialized list slot immediately. After all steps are consumed, a
/// node with empty list and map slots yields just its scalar text, while a
/// node with children yields its full serialized form, so one call fetches
/// either the leaf text or everything under a position.
pub fn read_path(mut node: Node, steps: &[Step]) -> Result<String> {
    for step in steps {
        match step {
            Step::Scalar => return Ok(node.value),
            Step::List(ListOp::Whole) => {
                return serde_json::to_string(&node.list)
                    .map_err(|e| ArborError::Encode(e.to_string()));
            }
            Step::List(ListOp::Append) => {
                // The parser rejects appends on reads; kept so the walk is
                // total over every step shape.
                return Err(ArborError::parse("no append command allowed in get calls"));
            }
            Step::List(ListOp::Index(n)) => {
                let len = node.list.len();
                if *n < 0 || *n as usize >= len {
                    return Err(ArborError::IndexOutOfRange { requested: *n, len });
                }
                node = node.list.swap_remove(*n as usize);
            }
            // An absent map entry reads as an all-empty node.
            Step::Map(key) => node = node.map.remove(key).unwrap_or_default(),
        }
    }

    if node.list.is_empty() && node.map.is_empty() {
        Ok(node.value)
    } else {
        node.encode()
    }
}

// =============================================================================
// Write Rebuild
// =============================================================================

/// Apply a write along a path plan, returning the replacement subtree.
///
/// Every level rebuilds and returns a new node rather than mutating in
/// place: the caller swaps the result in where the old subtree was. Slots
/// the path does not address are carried over untouched, which is what
/// lets a plain `set key value` update a leaf scalar without discarding
/// sibling structure.
pub fn write_path(mut node: Node, steps: &[Step], payload: &str) -> Result<Node> {
    let Some((step, rest)) = steps.split_first() else {
        node.value = payload.to_string();
        return Ok(node);
    };

    match step {
        Step::Scalar => {
            if !rest.is_empty() {
                return Err(ArborError::parse(
                    "leftover positional arguments in set command",
                ));
            }
            node.value = payload.to_string();
            Ok(node)
        }
        Step::List(ListOp::Append) => {
            let child = write_path(Node::default(), rest, payload)?;
            node.list.push(child);
            Ok(node)
        }
        Step::List(ListOp::Index(n)) => {
            // No implicit extension: the index must address an existing element.
            let len = node.list.len();
            if *n < 0 || *n as usize >= len {
                return Err(ArborError::IndexOutOfRange { requested: *n, len });
            }
            let i = *n as usize;
            let child = write_path(std::mem::take(&mut node.list[i]), rest, payload)?;
            node.list[i] = child;
            Ok(node)
        }
        Step::List(ListOp::Whole) => Err(ArborError::parse(
            "list command expects index/append value, none given",
        )),
        Step::Map(key) => {
            let existing = node.map.remove(key).unwrap_or_default();
            let child = write_path(existing, rest, payload)?;
            node.map.insert(key.clone(), child);
            Ok(node)
        }
    }
}
