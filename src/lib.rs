//! Deferred-value properties and path-addressable memory
//!
//! The core under an expression-evaluation engine that binds document
//! fields to either a literal value or a deferred textual expression
//! (`=`-prefixed) resolved later against a runtime data context.
//!
//! Two pieces:
//! * [`DeferredValue<T>`] with its [`Codec`] — the literal/expression sum
//!   type and the document read/write rules that round-trip it losslessly;
//! * [`MemoryContext`] with [`PathExpr`] — the contract for resolving and
//!   mutating dotted/indexed paths against arbitrary nested data, plus
//!   change detection via an opaque [`Version`] token.
//!
//! The expression grammar, function library and interpolation engine are
//! external collaborators; this crate only exposes their boundary.

pub mod codec;
pub mod memory;
pub mod path;
pub mod property;

// Re-export main types
pub use codec::{Codec, CodecError, CodecResult, TypeDescriptor};
pub use memory::{
    JsonMemory, MemoryContext, MemoryError, MemoryResult, StackedMemory, Version, convert,
    json_serialize_to_string, serialize_to_node,
};
pub use path::{PathError, PathExpr, PathResult, Segment};
pub use property::{
    ArrayProperty, BoolProperty, DeferredValue, EnumProperty, IntProperty, NumberProperty,
    ObjectProperty, RawValue, StringProperty, ValueProperty,
};
