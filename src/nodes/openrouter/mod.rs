//! OpenRouter chat node
//!
//! - mod.rs: node metadata and factory implementation
//! - logic.rs: gathering inputs, chat sessions and the backend call

mod logic;

pub use logic::*;

use crate::nodes::{DataType, NodeCategory, NodeFactory, NodeMetadata, PortDefinition};
use egui::{Color32, Vec2};

/// Node type name the socket hooks are registered under
pub const OPENROUTER_NODE_TYPE: &str = "OpenRouterNode";

/// Chat node forwarding a prompt and any number of images to OpenRouter
#[derive(Default)]
pub struct OpenRouterNodeFactory;

impl NodeFactory for OpenRouterNodeFactory {
    fn metadata() -> NodeMetadata {
        NodeMetadata::new(
            OPENROUTER_NODE_TYPE,
            "OpenRouter Chat",
            NodeCategory::llm(),
            "Sends a prompt and optional images to a model routed through OpenRouter",
        )
        .with_color(Color32::from_rgb(60, 45, 80))
        .with_size_hint(Vec2::new(220.0, 120.0))
        .with_inputs(vec![
            PortDefinition::required("system_prompt", DataType::String)
                .with_description("Instructions placed before the conversation"),
            PortDefinition::required("user_message", DataType::String)
                .with_description("The prompt to send"),
            PortDefinition::required("model", DataType::String),
            PortDefinition::optional("temperature", DataType::Float),
            PortDefinition::optional("chat_mode", DataType::Boolean)
                .with_description("Continue the active chat session instead of a one-off request"),
        ])
        .with_outputs(vec![
            PortDefinition::required("response", DataType::String),
            PortDefinition::required("stats", DataType::String)
                .with_description("Token usage of the request"),
            PortDefinition::optional("credits", DataType::Float)
                .with_description("Remaining account credit, when reported"),
        ])
        .with_tags(vec!["llm", "chat", "vision"])
    }
}
