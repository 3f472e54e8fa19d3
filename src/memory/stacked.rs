//! Layered implementation of [`MemoryContext`]
//!
//! A stack of child contexts searched top-down on reads; writes go through
//! to the topmost layer. Useful for scoped evaluation environments where a
//! local scope shadows globals.

use serde_json::Value;

use super::{JsonMemory, MemoryContext, MemoryError, MemoryResult, Version};

/// An ordered stack of memory contexts; the last pushed layer is the top.
///
/// Reshaping the stack (push/pop) changes the visible data just as a write
/// does, so it perturbs the version token too.
#[derive(Default)]
pub struct StackedMemory {
    layers: Vec<Box<dyn MemoryContext>>,
    /// Absorbs push/pop reshapes and the final tokens of popped layers so
    /// the combined version cannot revisit a previous value.
    epoch: u64,
}

impl StackedMemory {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            epoch: 0,
        }
    }

    /// Create a stack from bottom-to-top layers.
    pub fn from_layers(layers: Vec<Box<dyn MemoryContext>>) -> Self {
        Self { layers, epoch: 0 }
    }

    /// Push a layer onto the top of the stack.
    pub fn push(&mut self, layer: Box<dyn MemoryContext>) {
        self.epoch = self.epoch.wrapping_add(1);
        self.layers.push(layer);
    }

    /// Pop the top layer, if any.
    pub fn pop(&mut self) -> Option<Box<dyn MemoryContext>> {
        let layer = self.layers.pop()?;
        // The popped layer no longer contributes to the fold; fold its
        // final token into the epoch so the combined version still moves
        // forward.
        self.epoch = self.epoch.wrapping_add(layer.version().0).wrapping_add(1);
        Some(layer)
    }

    /// Number of layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

impl MemoryContext for StackedMemory {
    fn try_get_value(&self, path: &str) -> MemoryResult<Option<Value>> {
        for layer in self.layers.iter().rev() {
            if let Some(value) = layer.try_get_value(path)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn set_value(&mut self, path: &str, value: Value) -> MemoryResult<()> {
        match self.layers.last_mut() {
            Some(top) => top.set_value(path, value),
            None => Err(MemoryError::UnsupportedValue {
                kind: "empty stack".to_string(),
            }),
        }
    }

    /// Combines the layer tokens with the reshape epoch so that a mutation
    /// in any layer, a push, or a pop changes the stack token. Every
    /// contribution only moves forward, so the fold cannot revisit a
    /// previous value.
    fn version(&self) -> Version {
        Version(
            self.layers
                .iter()
                .map(|layer| layer.version().0)
                .fold(self.epoch, u64::wrapping_add),
        )
    }

    fn create_memory_from(&self, value: Value) -> MemoryResult<Box<dyn MemoryContext>> {
        Ok(Box::new(JsonMemory::from_value(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn layer(value: Value) -> Box<dyn MemoryContext> {
        Box::new(JsonMemory::from_value(value).unwrap())
    }

    #[test]
    fn top_layer_shadows_lower_layers() {
        let stack = StackedMemory::from_layers(vec![
            layer(json!({"a": "global", "b": "only below"})),
            layer(json!({"a": "local"})),
        ]);

        assert_eq!(stack.try_get_value("a").unwrap(), Some(json!("local")));
        assert_eq!(stack.try_get_value("b").unwrap(), Some(json!("only below")));
        assert_eq!(stack.try_get_value("c").unwrap(), None);
    }

    #[test]
    fn writes_go_to_the_top_layer() {
        let mut stack = StackedMemory::from_layers(vec![
            layer(json!({"a": "global"})),
            layer(json!({})),
        ]);
        stack.set_value("a", json!("shadowed")).unwrap();

        assert_eq!(stack.try_get_value("a").unwrap(), Some(json!("shadowed")));

        let top = stack.pop().unwrap();
        assert_eq!(top.try_get_value("a").unwrap(), Some(json!("shadowed")));
        assert_eq!(stack.try_get_value("a").unwrap(), Some(json!("global")));
    }

    #[test]
    fn set_on_empty_stack_fails() {
        let mut stack = StackedMemory::new();
        assert!(matches!(
            stack.set_value("a", json!(1)).unwrap_err(),
            MemoryError::UnsupportedValue { .. }
        ));
    }

    #[test]
    fn stack_reshaping_perturbs_the_version() {
        let mut stack = StackedMemory::from_layers(vec![layer(json!({"a": 1}))]);
        let base = stack.version();

        stack.push(layer(json!({"a": 2})));
        let shadowed = stack.version();
        assert_ne!(shadowed, base, "a pushed shadowing layer changes the view");

        stack.set_value("b", json!(3)).unwrap();
        let written = stack.version();
        assert_ne!(written, shadowed);

        // Popping drops both the shadow and the write; the token must not
        // fall back to any earlier value.
        stack.pop();
        assert_ne!(stack.version(), written);
        assert_ne!(stack.version(), base);
    }

    #[test]
    fn any_layer_mutation_changes_the_stack_version() {
        let mut stack =
            StackedMemory::from_layers(vec![layer(json!({})), layer(json!({}))]);
        let before = stack.version();
        stack.set_value("x", json!(1)).unwrap();
        assert_ne!(stack.version(), before);

        let stable = stack.version();
        assert_eq!(stack.try_get_value("x").unwrap(), Some(json!(1)));
        assert_eq!(stack.version(), stable);
    }
}
