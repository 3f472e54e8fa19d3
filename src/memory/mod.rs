//! Path-addressable memory contexts
//!
//! A [`MemoryContext`] is the addressable data an external expression
//! evaluator resolves paths against: any nested combination of mappings,
//! sequences and scalar leaves. The contract covers reading and mutating
//! through paths, wrapping retrieved sub-values into child contexts,
//! converting opaque values into caller shapes, and change detection via an
//! opaque version token.

#![warn(missing_docs)]

mod json;
mod stacked;

use std::any;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::codec::node_kind;
use crate::path::PathError;

pub use json::JsonMemory;
pub use stacked::StackedMemory;

/// Result type for memory operations.
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Errors raised by memory operations.
///
/// "Not found" is deliberately absent: a missing segment during
/// [`MemoryContext::try_get_value`] is a normal `Ok(None)` outcome, never
/// an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryError {
    /// The path string itself was malformed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// A value could not be reshaped into the requested type, or a
    /// mutation would have to descend through a non-container value.
    #[error("type conversion failed: expected {expected}, got {actual}")]
    TypeConversion {
        /// The shape the caller required.
        expected: String,
        /// The shape actually found.
        actual: String,
    },

    /// A value with no addressable structure was asked to back a context.
    #[error("a {kind} value has no addressable structure")]
    UnsupportedValue {
        /// The kind of the offending value.
        kind: String,
    },
}

/// Opaque change-detection token for a memory context.
///
/// The only guarantee is inequality after a successful mutation and
/// stability otherwise; there is no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version(pub(crate) u64);

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The addressable data a path expression resolves against.
///
/// Implementations are not thread-safe by contract; callers needing
/// concurrent access must serialize externally.
pub trait MemoryContext {
    /// Resolve a path against the root.
    ///
    /// Returns `Ok(None)` for any missing segment or structural mismatch
    /// along the way; `Ok(Some(Value::Null))` when the path resolves to an
    /// explicit null. Only a malformed path string is an error.
    fn try_get_value(&self, path: &str) -> MemoryResult<Option<Value>>;

    /// Mutate through a path, auto-vivifying missing intermediate
    /// containers: a missing parent becomes a mapping or sequence depending
    /// on the following step, and an index past the end of a sequence
    /// null-pads up to that index. Every successful call changes the
    /// version token.
    fn set_value(&mut self, path: &str, value: Value) -> MemoryResult<()>;

    /// The current version token.
    fn version(&self) -> Version;

    /// Wrap a value previously retrieved from this context into a child
    /// context, so path resolution can recurse uniformly into nested
    /// structures. Fails for values with no addressable structure.
    fn create_memory_from(&self, value: Value) -> MemoryResult<Box<dyn MemoryContext>>;

    /// Normalize an opaque value retrieved from this context into the shape
    /// the caller requires.
    fn convert_to<T: DeserializeOwned>(&self, value: Value) -> MemoryResult<T>
    where
        Self: Sized,
    {
        convert(value)
    }
}

/// Re-materialize a canonical document node as a `T`.
///
/// This is the inverse of [`serialize_to_node`]: serialize then convert is
/// the identity for any value a context can produce.
pub fn convert<T: DeserializeOwned>(value: Value) -> MemoryResult<T> {
    let actual = node_kind(&value);
    serde_json::from_value(value).map_err(|err| MemoryError::TypeConversion {
        expected: any::type_name::<T>().to_string(),
        actual: format!("{actual} ({err})"),
    })
}

/// Canonical node serialization of any value sourced from a context.
pub fn serialize_to_node<T: Serialize>(value: &T) -> MemoryResult<Value> {
    serde_json::to_value(value).map_err(|err| MemoryError::TypeConversion {
        expected: "document node".to_string(),
        actual: format!("{} ({err})", any::type_name::<T>()),
    })
}

/// Canonical textual serialization, agreeing with [`convert`] on the way
/// back in.
pub fn json_serialize_to_string<T: Serialize>(value: &T) -> MemoryResult<String> {
    serde_json::to_string(value).map_err(|err| MemoryError::TypeConversion {
        expected: "json text".to_string(),
        actual: format!("{} ({err})", any::type_name::<T>()),
    })
}
