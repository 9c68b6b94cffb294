//! Registration of the OpenRouter node with a host

use crate::config::Config;
use crate::nodes::dynamic_sockets::DynamicSocketManager;
use crate::nodes::openrouter::{OpenRouterNodeFactory, OPENROUTER_NODE_TYPE};
use crate::nodes::{NodeGraph, NodeHooksRegistry, NodeRegistry};
use log::info;

/// Register the node factory and its socket hooks
///
/// Fails when the configured image prefix would govern one of the node's
/// declared inputs.
pub fn register_extension(
    hooks: &mut NodeHooksRegistry,
    registry: &mut NodeRegistry,
    config: &Config,
) -> Result<(), String> {
    config.validate()?;
    registry.register::<OpenRouterNodeFactory>();
    hooks.register(
        OPENROUTER_NODE_TYPE,
        Box::new(DynamicSocketManager::from_config(config)),
    );
    if let Some(metadata) = registry.metadata(OPENROUTER_NODE_TYPE) {
        info!(
            "registered {} in {} with dynamic '{}' inputs",
            metadata.display_name,
            metadata.category.display_string(),
            config.image_family_prefix
        );
    }
    Ok(())
}

/// Hook a graph up to the socket manager, e.g. after loading it from disk
pub fn install(graph: &mut NodeGraph, config: &Config) -> Result<(), String> {
    config.validate()?;
    graph.register_hooks(
        OPENROUTER_NODE_TYPE,
        Box::new(DynamicSocketManager::from_config(config)),
    );
    Ok(())
}

/// A registry and a hooked-up graph, ready to take OpenRouter nodes
pub fn new_graph(config: &Config) -> Result<(NodeGraph, NodeRegistry), String> {
    let mut hooks = NodeHooksRegistry::new();
    let mut registry = NodeRegistry::new();
    register_extension(&mut hooks, &mut registry, config)?;
    Ok((NodeGraph::with_hooks(hooks), registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Node;
    use egui::Pos2;

    #[test]
    fn test_registered_node_gets_its_image_socket() {
        let (mut graph, registry) = new_graph(&Config::default()).unwrap();
        assert_eq!(registry.node_types(), vec![OPENROUTER_NODE_TYPE]);

        let node = registry.create_node(OPENROUTER_NODE_TYPE, Pos2::ZERO).unwrap();
        let id = graph.add_node(node);

        let names: Vec<&str> = graph.nodes[&id].inputs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["system_prompt", "user_message", "model", "temperature", "chat_mode", "image_"]
        );
    }

    #[test]
    fn test_install_uses_configured_prefix() {
        let config = Config {
            image_family_prefix: "frame".to_string(),
            ..Config::default()
        };
        let mut graph = NodeGraph::new();
        install(&mut graph, &config).unwrap();

        let id = graph.add_node(Node::new(0, OPENROUTER_NODE_TYPE, Pos2::ZERO));
        assert_eq!(graph.nodes[&id].inputs[0].name, "frame_");
    }

    #[test]
    fn test_prefix_claiming_fixed_inputs_is_refused() {
        for prefix in ["", "s", "m"] {
            let config = Config {
                image_family_prefix: prefix.to_string(),
                ..Config::default()
            };
            assert!(new_graph(&config).is_err(), "prefix {:?} accepted", prefix);
            assert!(install(&mut NodeGraph::new(), &config).is_err());
        }
    }
}
