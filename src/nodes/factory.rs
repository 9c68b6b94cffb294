//! Node factory system with self-registration and metadata

use crate::nodes::Node;
use egui::{Color32, Pos2, Vec2};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Data types that can flow through ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Text string
    String,
    /// Image batch
    Image,
    /// Floating point number
    Float,
    /// Integer number
    Int,
    /// Boolean value
    Boolean,
    /// Any type (for generic ports)
    Any,
}

impl DataType {
    /// Type tag carried by sockets of this type
    pub fn name(&self) -> &'static str {
        match self {
            DataType::String => "STRING",
            DataType::Image => "IMAGE",
            DataType::Float => "FLOAT",
            DataType::Int => "INT",
            DataType::Boolean => "BOOLEAN",
            DataType::Any => crate::constants::sockets::PLACEHOLDER_TYPE,
        }
    }
}

/// Hierarchical category system for organizing nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeCategory {
    path: Vec<String>,
}

impl NodeCategory {
    /// Create a new category from path components
    pub fn new(path: &[&str]) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Get display string for UI
    pub fn display_string(&self) -> String {
        self.path.join(" > ")
    }

    /// Category of LLM-backed nodes
    pub fn llm() -> Self {
        Self::new(&["LLM", "OpenRouter"])
    }
}

/// Port definition for node creation
#[derive(Debug, Clone)]
pub struct PortDefinition {
    pub name: String,
    pub data_type: DataType,
    pub optional: bool,
    pub description: Option<String>,
}

impl PortDefinition {
    /// Create a required port
    pub fn required(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            optional: false,
            description: None,
        }
    }

    /// Create an optional port
    pub fn optional(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            optional: true,
            description: None,
        }
    }

    /// Add description to port
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Metadata for nodes - the single source of truth for how a node is built
#[derive(Debug, Clone)]
pub struct NodeMetadata {
    pub node_type: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,

    pub color: Color32,
    pub size_hint: Vec2,
    pub category: NodeCategory,
    pub tags: Vec<&'static str>,

    pub inputs: Vec<PortDefinition>,
    pub outputs: Vec<PortDefinition>,
}

impl NodeMetadata {
    /// Create node metadata with sensible defaults
    pub fn new(
        node_type: &'static str,
        display_name: &'static str,
        category: NodeCategory,
        description: &'static str,
    ) -> Self {
        Self {
            node_type,
            display_name,
            description,
            color: Color32::from_rgb(100, 100, 100),
            size_hint: Vec2::new(150.0, 80.0),
            category,
            tags: vec![],
            inputs: vec![],
            outputs: vec![],
        }
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    pub fn with_size_hint(mut self, size: Vec2) -> Self {
        self.size_hint = size;
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<PortDefinition>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<PortDefinition>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_tags(mut self, tags: Vec<&'static str>) -> Self {
        self.tags = tags;
        self
    }
}

/// Node factory trait with metadata
pub trait NodeFactory: Send + Sync {
    /// Get node metadata
    fn metadata() -> NodeMetadata
    where
        Self: Sized;

    /// Create a node instance at the given position
    ///
    /// Dynamic input families are not created here; the graph adds them
    /// through the hooks registered for the node type.
    fn create(position: Pos2) -> Node
    where
        Self: Sized,
    {
        let meta = Self::metadata();
        let mut node = Node::new(0, meta.node_type, position)
            .with_title(meta.display_name)
            .with_color(meta.color)
            .with_size(meta.size_hint);

        for input in &meta.inputs {
            node.add_typed_input(&input.name, input.data_type.name());
        }
        for output in &meta.outputs {
            node.add_output(&output.name, output.data_type.name());
        }

        node.update_port_positions();
        node
    }
}

/// Function pointer type for creating nodes
type NodeCreator = fn(Pos2) -> Node;
type MetadataProvider = fn() -> NodeMetadata;

/// Registry for managing node factories
#[derive(Default)]
pub struct NodeRegistry {
    creators: BTreeMap<String, NodeCreator>,
    metadata_providers: BTreeMap<String, MetadataProvider>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node factory
    pub fn register<T: NodeFactory + 'static>(&mut self) {
        let node_type = T::metadata().node_type.to_string();
        debug!("registering node type {}", node_type);

        self.creators.insert(node_type.clone(), T::create);
        self.metadata_providers.insert(node_type, T::metadata);
    }

    /// Create a node by type name
    pub fn create_node(&self, node_type: &str, position: Pos2) -> Option<Node> {
        match self.creators.get(node_type) {
            Some(creator) => Some(creator(position)),
            None => {
                warn!("unknown node type: {}", node_type);
                None
            }
        }
    }

    /// Metadata of a registered node type
    pub fn metadata(&self, node_type: &str) -> Option<NodeMetadata> {
        self.metadata_providers.get(node_type).map(|provider| provider())
    }

    /// Registered node types, sorted
    pub fn node_types(&self) -> Vec<&str> {
        self.creators.keys().map(String::as_str).collect()
    }
}
