//! Deferred-value properties
//!
//! A [`DeferredValue<T>`] is a document field that is either a literal of
//! type `T` or unevaluated expression text, decided once at load time and
//! resolved later by an external evaluator against a memory context.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// A property holding either a literal `T` or deferred expression text.
///
/// The two payloads are mutually exclusive by construction; a freshly
/// created (or null-initialized) property is [`DeferredValue::Empty`].
///
/// The interpretation of raw string input follows one central rule set
/// (see [`DeferredValue::from_raw_str`]):
/// * `"=user.age"` is a raw expression, kept verbatim;
/// * `"\=user.age"` has the escape stripped and becomes the quoted
///   template `` =`=user.age` ``;
/// * `"hello ${user.name}"` becomes the quoted template
///   `` =`hello ${user.name}` ``, so interpolation stays live.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredValue<T> {
    /// Neither a literal nor an expression; the unset state.
    Empty,
    /// Unevaluated expression text, always carrying the `=` prefix.
    Expression(String),
    /// An already-typed literal value.
    Literal(T),
}

/// Raw input accepted by [`DeferredValue::set_value`], covering the
/// untyped input space of a document loader.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue<T> {
    /// No value; resets the property to [`DeferredValue::Empty`].
    Null,
    /// A raw string, subject to the expression/template decision.
    Str(String),
    /// An already-typed literal.
    Typed(T),
}

impl<T> DeferredValue<T> {
    /// Create an unset property.
    pub fn new() -> Self {
        Self::Empty
    }

    /// Construct from a raw string, making the expression/literal decision.
    ///
    /// This is the single place that decision is made; codecs delegate
    /// every string token here rather than parsing it as a literal `T`.
    pub fn from_raw_str(s: &str) -> Self {
        // A leading '=' always means a raw expression.
        if s.starts_with('=') {
            return Self::Expression(s.to_string());
        }

        // "\=foo" keeps the '=' as text: strip the one escape backslash,
        // then wrap like any other plain string so interpolation inside
        // it still activates.
        let text: Cow<'_, str> = match s.strip_prefix("\\=") {
            Some(rest) => Cow::Owned(format!("={rest}")),
            None => Cow::Borrowed(s),
        };

        // Every plain string is wrapped as a quoted template expression;
        // backticks already present must stay valid inside the quoting.
        Self::Expression(format!("=`{}`", text.replace('`', "\\`")))
    }

    /// Construct holding a literal value.
    pub fn from_literal(value: T) -> Self {
        Self::Literal(value)
    }

    /// Replace the entire state of the property.
    pub fn set_value(&mut self, raw: RawValue<T>) {
        *self = match raw {
            RawValue::Null => Self::Empty,
            RawValue::Str(s) => Self::from_raw_str(&s),
            RawValue::Typed(value) => Self::Literal(value),
        };
    }

    /// The expression text, if this property holds one.
    pub fn expression_text(&self) -> Option<&str> {
        match self {
            Self::Expression(text) => Some(text),
            _ => None,
        }
    }

    /// The literal value, if this property holds one.
    pub fn literal(&self) -> Option<&T> {
        match self {
            Self::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Take the literal value, if this property holds one.
    pub fn into_literal(self) -> Option<T> {
        match self {
            Self::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the property is in the unset state.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl<T> Default for DeferredValue<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> From<&str> for DeferredValue<T> {
    fn from(s: &str) -> Self {
        Self::from_raw_str(s)
    }
}

impl<T> From<String> for DeferredValue<T> {
    fn from(s: String) -> Self {
        Self::from_raw_str(&s)
    }
}

impl From<bool> for DeferredValue<bool> {
    fn from(value: bool) -> Self {
        Self::Literal(value)
    }
}

impl From<i64> for DeferredValue<i64> {
    fn from(value: i64) -> Self {
        Self::Literal(value)
    }
}

impl From<f64> for DeferredValue<f64> {
    fn from(value: f64) -> Self {
        Self::Literal(value)
    }
}

impl From<Value> for DeferredValue<Value> {
    fn from(node: Value) -> Self {
        match node {
            Value::Null => Self::Empty,
            Value::String(s) => Self::from_raw_str(&s),
            other => Self::Literal(other),
        }
    }
}

/// Canonical textual form: expression text verbatim (it carries its own
/// `=` prefix), literals in their JSON rendering, nothing for `Empty`.
impl<T: Serialize> fmt::Display for DeferredValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Expression(text) => f.write_str(text),
            Self::Literal(value) => {
                let rendered = serde_json::to_string(value).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

/// Boolean-valued property.
pub type BoolProperty = DeferredValue<bool>;
/// Integer-valued property.
pub type IntProperty = DeferredValue<i64>;
/// Floating-number-valued property.
pub type NumberProperty = DeferredValue<f64>;
/// String-valued property.
pub type StringProperty = DeferredValue<String>;
/// Enumeration-valued property; `T` is a serde-deserializable enum.
pub type EnumProperty<T> = DeferredValue<T>;
/// Array-of-`T`-valued property.
pub type ArrayProperty<T> = DeferredValue<Vec<T>>;
/// Structured-object-valued property.
pub type ObjectProperty<T> = DeferredValue<T>;
/// Opaque "any" property over a raw document node.
pub type ValueProperty = DeferredValue<Value>;
