//! OpenRouter node library
//!
//! A chat node whose image inputs grow and shrink with its links: there is
//! always exactly one unconnected `image_` socket at the end, and the
//! connected ones are named `image_1`, `image_2`, ... in order.

pub mod chat;
pub mod config;
pub mod constants;
pub mod extension;
pub mod nodes;

// Re-export commonly used types
pub use config::Config;
pub use extension::{install, new_graph, register_extension};
pub use nodes::dynamic_sockets::DynamicSocketManager;
pub use nodes::openrouter::{OpenRouterLogic, OpenRouterNodeFactory, OPENROUTER_NODE_TYPE};
