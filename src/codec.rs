//! Document codec for deferred-value properties
//!
//! One generic [`Codec<T>`] translates between document tokens
//! (`serde_json::Value`) and [`DeferredValue<T>`] for every supported value
//! shape. The expression/literal decision for string tokens is delegated to
//! [`DeferredValue::from_raw_str`] so it is made in exactly one place; a
//! non-string token is never reinterpreted as an expression.

use std::any;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::property::DeferredValue;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while reading or writing a property token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A non-string document node could not be coerced to the declared type.
    #[error("cannot coerce {node} node to {expected}: {message}")]
    Type {
        /// The declared literal type.
        expected: &'static str,
        /// The kind of node encountered.
        node: &'static str,
        /// Underlying coercion failure.
        message: String,
    },

    /// A literal value could not be serialized back to a document node.
    #[error("cannot serialize {expected} literal: {message}")]
    Serialize {
        /// The literal type being written.
        expected: &'static str,
        /// Underlying serialization failure.
        message: String,
    },
}

/// Out-of-band type descriptor for `T`, used when the literal shape cannot
/// be inferred from the raw document node (e.g. polymorphic object types).
///
/// When no descriptor is supplied the codec falls back to serde, the
/// generic representation of the document itself.
pub struct TypeDescriptor<T> {
    /// Human-readable type name used in diagnostics.
    pub name: &'static str,
    /// Parse a structured document node into a literal `T`.
    pub parse: fn(&Value) -> CodecResult<T>,
    /// Serialize a literal `T` back to a document node.
    pub serialize: fn(&T) -> CodecResult<Value>,
}

impl<T> Clone for TypeDescriptor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypeDescriptor<T> {}

/// Reads and writes a single document token per property field.
///
/// Pure and deterministic: the same token always produces a structurally
/// equal [`DeferredValue`], and writing an expression produces exactly the
/// string token that re-reads to an equal property.
pub struct Codec<T> {
    descriptor: Option<TypeDescriptor<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Codec<T> {
    /// Create a codec using the generic serde representation for literals.
    pub fn new() -> Self {
        Self {
            descriptor: None,
            _marker: PhantomData,
        }
    }

    /// Create a codec with an explicit type descriptor for literals.
    pub fn with_descriptor(descriptor: TypeDescriptor<T>) -> Self {
        Self {
            descriptor: Some(descriptor),
            _marker: PhantomData,
        }
    }

    fn type_name(&self) -> &'static str {
        match &self.descriptor {
            Some(descriptor) => descriptor.name,
            None => any::type_name::<T>(),
        }
    }
}

impl<T> Default for Codec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Codec<T> {
    /// Read a document token into a property.
    ///
    /// String tokens carry the expression/template decision; a null token
    /// is the unset state; any other node is parsed as a literal `T`.
    pub fn read(&self, token: &Value) -> CodecResult<DeferredValue<T>> {
        match token {
            Value::String(s) => Ok(DeferredValue::from_raw_str(s)),
            Value::Null => Ok(DeferredValue::Empty),
            node => {
                let literal = match &self.descriptor {
                    Some(descriptor) => (descriptor.parse)(node)?,
                    None => {
                        serde_json::from_value(node.clone()).map_err(|err| CodecError::Type {
                            expected: self.type_name(),
                            node: node_kind(node),
                            message: err.to_string(),
                        })?
                    }
                };
                Ok(DeferredValue::Literal(literal))
            }
        }
    }
}

impl<T: Serialize> Codec<T> {
    /// Write a property back to a document token.
    pub fn write(&self, value: &DeferredValue<T>) -> CodecResult<Value> {
        match value {
            DeferredValue::Empty => Ok(Value::Null),
            DeferredValue::Expression(text) => Ok(Value::String(text.clone())),
            DeferredValue::Literal(literal) => match &self.descriptor {
                Some(descriptor) => (descriptor.serialize)(literal),
                None => serde_json::to_value(literal).map_err(|err| CodecError::Serialize {
                    expected: self.type_name(),
                    message: err.to_string(),
                }),
            },
        }
    }
}

/// The document-node kind name used in diagnostics.
pub(crate) fn node_kind(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Serializes through the descriptor-less codec so host document structs
/// can hold `DeferredValue<T>` fields directly.
impl<T: Serialize> Serialize for DeferredValue<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let token = Codec::new()
            .write(self)
            .map_err(serde::ser::Error::custom)?;
        token.serialize(serializer)
    }
}

/// Deserializes through the descriptor-less codec; combined with
/// `#[serde(default)]`, an absent field yields the unset state.
impl<'de, T: DeserializeOwned> Deserialize<'de> for DeferredValue<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let token = Value::deserialize(deserializer)?;
        Codec::new().read(&token).map_err(serde::de::Error::custom)
    }
}
