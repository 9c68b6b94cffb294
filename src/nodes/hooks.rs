//! Node lifecycle hooks
//!
//! Extensions register hooks per node type. The graph calls them once when a
//! node of that type is created and once per link attached to or removed from
//! one of its inputs.

use super::host::OriginLookup;
use super::node::Node;
use super::notification::LinkNotification;
use std::collections::HashMap;
use std::fmt;

/// Trait for node-type specific lifecycle hooks
pub trait NodeLifecycleHooks: Send + Sync {
    /// Called once when a node of the registered type is added to a graph
    fn on_node_created(&self, _node: &mut Node) {
        // Default: no special handling
    }

    /// Called after a link was attached to or removed from one of the node's inputs
    fn on_link_changed(&self, _node: &mut Node, _notification: &LinkNotification, _lookup: &dyn OriginLookup) {
        // Default: no special handling
    }

    /// Clone the hooks for registration
    fn clone_box(&self) -> Box<dyn NodeLifecycleHooks>;
}

/// Default implementation for nodes that don't need special handling
#[derive(Clone)]
pub struct DefaultHooks;

impl NodeLifecycleHooks for DefaultHooks {
    fn clone_box(&self) -> Box<dyn NodeLifecycleHooks> {
        Box::new(self.clone())
    }
}

/// Hooks registered per node type name
#[derive(Default)]
pub struct NodeHooksRegistry {
    hooks: HashMap<String, Vec<Box<dyn NodeLifecycleHooks>>>,
}

impl NodeHooksRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register hooks for every node whose `type_name` equals `node_type`
    pub fn register(&mut self, node_type: impl Into<String>, hooks: Box<dyn NodeLifecycleHooks>) {
        self.hooks.entry(node_type.into()).or_default().push(hooks);
    }

    /// Hooks registered for `node_type`, in registration order
    pub fn hooks_for(&self, node_type: &str) -> &[Box<dyn NodeLifecycleHooks>] {
        self.hooks.get(node_type).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Clone for NodeHooksRegistry {
    fn clone(&self) -> Self {
        let hooks = self
            .hooks
            .iter()
            .map(|(node_type, hooks)| {
                (node_type.clone(), hooks.iter().map(|h| h.clone_box()).collect())
            })
            .collect();
        Self { hooks }
    }
}

impl fmt::Debug for NodeHooksRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<(&String, usize)> =
            self.hooks.iter().map(|(node_type, hooks)| (node_type, hooks.len())).collect();
        types.sort();
        f.debug_struct("NodeHooksRegistry").field("types", &types).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup_by_type() {
        let mut registry = NodeHooksRegistry::new();
        registry.register("OpenRouterNode", Box::new(DefaultHooks));
        registry.register("OpenRouterNode", Box::new(DefaultHooks));

        assert_eq!(registry.hooks_for("OpenRouterNode").len(), 2);
        assert!(registry.hooks_for("LoadImage").is_empty());
        assert_eq!(registry.clone().hooks_for("OpenRouterNode").len(), 2);
    }
}
