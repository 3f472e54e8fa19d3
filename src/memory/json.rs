//! Tree-shaped document implementation of [`MemoryContext`]

use log::trace;
use serde_json::{Map, Value};

use super::{MemoryContext, MemoryError, MemoryResult, Version};
use crate::codec::node_kind;
use crate::path::{PathExpr, Segment};

/// A memory context over an owned `serde_json::Value` tree.
///
/// The root is always a mapping or a sequence; scalars have no addressable
/// structure and are rejected at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonMemory {
    root: Value,
    version: u64,
}

impl JsonMemory {
    /// Create an empty memory context rooted at an empty mapping.
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
            version: 0,
        }
    }

    /// Wrap an existing document value. Fails with
    /// [`MemoryError::UnsupportedValue`] unless the value is a mapping or a
    /// sequence.
    pub fn from_value(root: Value) -> MemoryResult<Self> {
        match root {
            Value::Object(_) | Value::Array(_) => Ok(Self { root, version: 0 }),
            other => Err(MemoryError::UnsupportedValue {
                kind: node_kind(&other).to_string(),
            }),
        }
    }

    /// The backing document value.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Take ownership of the backing document value.
    pub fn into_root(self) -> Value {
        self.root
    }
}

impl Default for JsonMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContext for JsonMemory {
    fn try_get_value(&self, path: &str) -> MemoryResult<Option<Value>> {
        let parsed = PathExpr::parse(path)?;
        let mut current = &self.root;
        for segment in parsed.segments() {
            let next = match segment {
                Segment::Field(name) | Segment::Key(name) => {
                    current.as_object().and_then(|map| map.get(name))
                }
                Segment::Index(index) => match current {
                    Value::Array(items) => {
                        usize::try_from(*index).ok().and_then(|i| items.get(i))
                    }
                    Value::Object(map) => map.get(&index.to_string()),
                    _ => None,
                },
            };
            match next {
                Some(value) => current = value,
                // Absence and structural mismatch are both "not found".
                None => return Ok(None),
            }
        }
        Ok(Some(current.clone()))
    }

    fn set_value(&mut self, path: &str, value: Value) -> MemoryResult<()> {
        let parsed = PathExpr::parse(path)?;
        let segments = parsed.segments();
        let Some((last, lead)) = segments.split_last() else {
            // Parsing never yields an empty segment list.
            return Err(MemoryError::Path(crate::path::PathError::Empty));
        };

        // Reject bad indexes before touching the tree; a failed write must
        // not leave vivified intermediates behind.
        for segment in segments {
            if let Segment::Index(index) = segment {
                checked_index(*index)?;
            }
        }

        let mut current = &mut self.root;
        for (i, step) in lead.iter().enumerate() {
            current = descend(current, step, &segments[i + 1])?;
        }
        assign(current, last, value)?;

        self.version += 1;
        trace!("set {path} (version {})", self.version);
        Ok(())
    }

    fn version(&self) -> Version {
        Version(self.version)
    }

    fn create_memory_from(&self, value: Value) -> MemoryResult<Box<dyn MemoryContext>> {
        Ok(Box::new(Self::from_value(value)?))
    }
}

/// The container a missing or null intermediate becomes, chosen by the step
/// that follows it.
fn vivify_for(next: &Segment) -> Value {
    match next {
        Segment::Index(_) => Value::Array(Vec::new()),
        Segment::Field(_) | Segment::Key(_) => Value::Object(Map::new()),
    }
}

fn not_a_container(expected: &str, node: &Value) -> MemoryError {
    MemoryError::TypeConversion {
        expected: expected.to_string(),
        actual: node_kind(node).to_string(),
    }
}

fn checked_index(index: i64) -> MemoryResult<usize> {
    usize::try_from(index).map_err(|_| MemoryError::TypeConversion {
        expected: "non-negative sequence index".to_string(),
        actual: index.to_string(),
    })
}

/// Step into `node`, creating the missing intermediate container when
/// necessary. Null slots (including padding nulls) vivify in place.
fn descend<'a>(node: &'a mut Value, step: &Segment, next: &Segment) -> MemoryResult<&'a mut Value> {
    match step {
        Segment::Field(name) | Segment::Key(name) => match node {
            Value::Object(map) => {
                let slot = map.entry(name.clone()).or_insert(Value::Null);
                if slot.is_null() {
                    *slot = vivify_for(next);
                }
                Ok(slot)
            }
            other => Err(not_a_container("object", other)),
        },
        Segment::Index(index) => match node {
            Value::Array(items) => {
                let i = checked_index(*index)?;
                if items.len() <= i {
                    items.resize(i + 1, Value::Null);
                }
                let slot = &mut items[i];
                if slot.is_null() {
                    *slot = vivify_for(next);
                }
                Ok(slot)
            }
            Value::Object(map) => {
                let slot = map.entry(index.to_string()).or_insert(Value::Null);
                if slot.is_null() {
                    *slot = vivify_for(next);
                }
                Ok(slot)
            }
            other => Err(not_a_container("object or array", other)),
        },
    }
}

/// Write `value` into the final segment's container.
fn assign(node: &mut Value, step: &Segment, value: Value) -> MemoryResult<()> {
    match step {
        Segment::Field(name) | Segment::Key(name) => match node {
            Value::Object(map) => {
                map.insert(name.clone(), value);
                Ok(())
            }
            other => Err(not_a_container("object", other)),
        },
        Segment::Index(index) => match node {
            Value::Array(items) => {
                let i = checked_index(*index)?;
                if items.len() <= i {
                    items.resize(i + 1, Value::Null);
                }
                items[i] = value;
                Ok(())
            }
            Value::Object(map) => {
                map.insert(index.to_string(), value);
                Ok(())
            }
            other => Err(not_a_container("object or array", other)),
        },
    }
}
