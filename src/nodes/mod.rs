//! Node system - graph data structures and the dynamic image sockets

// Core node system modules
pub mod data;
pub mod error;
pub mod factory;
pub mod graph;
pub mod hooks;
pub mod host;
pub mod node;
pub mod notification;
pub mod socket;

// Socket management
pub mod dynamic_sockets;
pub mod naming;

// Node implementations
pub mod openrouter;

// Re-export core types
pub use graph::{Connection, NodeGraph};
pub use node::{Node, NodeId};
pub use socket::{ColorHint, LinkId, Socket, SocketId, SocketKind};

// Re-export factory types
pub use factory::{DataType, NodeCategory, NodeFactory, NodeMetadata, NodeRegistry, PortDefinition};

// Re-export socket management types
pub use dynamic_sockets::{DynamicSocketManager, SocketEdit, SocketEditPlan};
pub use error::SocketError;
pub use hooks::{NodeHooksRegistry, NodeLifecycleHooks};
pub use host::{OriginLookup, SocketHost};
pub use notification::{LinkDirection, LinkNotification, LinkOrigin};
