//! OpenRouter node execution

use crate::chat::{
    ChatBackend, ChatError, ChatMessage, ChatOptions, ChatReply, ChatRequest, ChatSessionManager,
    ImageAttachment, Role, UsageStats,
};
use crate::nodes::data::NodeData;
use crate::nodes::dynamic_sockets::DynamicSocketManager;
use crate::nodes::Node;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Values arriving on a node's inputs, keyed by socket name
pub type NodeInputs = HashMap<String, NodeData>;

/// Runs one OpenRouter node
#[derive(Debug)]
pub struct OpenRouterLogic {
    sockets: DynamicSocketManager,
    sessions: Option<ChatSessionManager>,
}

impl OpenRouterLogic {
    pub fn new(sockets: DynamicSocketManager) -> Self {
        Self {
            sockets,
            sessions: None,
        }
    }

    /// Enable chat mode by giving the node a session store
    pub fn with_sessions(mut self, sessions: ChatSessionManager) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn sessions(&self) -> Option<&ChatSessionManager> {
        self.sessions.as_ref()
    }

    /// Images on the connected family sockets, in socket order
    pub fn collect_images(&self, node: &Node, inputs: &NodeInputs) -> Vec<ImageAttachment> {
        self.sockets
            .connected(&node.inputs)
            .filter_map(|socket| {
                let value = inputs.get(&socket.name)?;
                match value.as_image() {
                    Some(image) => Some(ImageAttachment {
                        label: socket.name.clone(),
                        bytes: image.bytes.clone(),
                    }),
                    None => {
                        warn!("{} carries {:?}, not an image; skipped", socket.name, value);
                        None
                    }
                }
            })
            .collect()
    }

    /// Request options from the node's widget inputs
    pub fn options(inputs: &NodeInputs) -> ChatOptions {
        let defaults = ChatOptions::default();
        ChatOptions {
            model: inputs
                .get("model")
                .and_then(NodeData::as_str)
                .filter(|model| !model.is_empty())
                .map(str::to_string)
                .unwrap_or(defaults.model),
            temperature: inputs
                .get("temperature")
                .and_then(NodeData::as_float)
                .unwrap_or(defaults.temperature),
            chat_mode: inputs
                .get("chat_mode")
                .and_then(NodeData::as_bool)
                .unwrap_or(defaults.chat_mode),
        }
    }

    /// Execute the node; outputs follow the factory's output order
    pub fn process(
        &mut self,
        node: &Node,
        inputs: &NodeInputs,
        backend: &dyn ChatBackend,
    ) -> Result<Vec<NodeData>, ChatError> {
        let reply = self.run(node, inputs, backend)?;
        Ok(vec![
            NodeData::String(reply.text),
            NodeData::String(format_usage(&reply.usage)),
            reply
                .credit_balance
                .map(|credits| NodeData::Float(credits as f32))
                .unwrap_or(NodeData::None),
        ])
    }

    /// Build the request, call the backend and record the exchange
    pub fn run(
        &mut self,
        node: &Node,
        inputs: &NodeInputs,
        backend: &dyn ChatBackend,
    ) -> Result<ChatReply, ChatError> {
        let user_message = inputs
            .get("user_message")
            .and_then(NodeData::as_str)
            .filter(|message| !message.trim().is_empty())
            .ok_or(ChatError::MissingInput("user_message"))?;
        let system_prompt = inputs
            .get("system_prompt")
            .and_then(NodeData::as_str)
            .unwrap_or_default();
        let options = Self::options(inputs);
        let images = self.collect_images(node, inputs);

        let session = match (&mut self.sessions, options.chat_mode) {
            (Some(sessions), true) => Some(sessions.get_or_create_session(user_message, system_prompt)?),
            (None, true) => {
                warn!("chat mode requested without a session store; sending a single turn");
                None
            }
            _ => None,
        };

        let mut messages = match &session {
            Some((_, history)) => history.clone(),
            None => vec![ChatMessage::system(system_prompt)],
        };
        messages.push(ChatMessage::user(user_message));

        debug!(
            "sending {} messages and {} images to {}",
            messages.len(),
            images.len(),
            options.model
        );
        let request = ChatRequest {
            messages,
            images,
            options,
        };
        let reply = backend.send_chat_request(&request)?;

        if let (Some(sessions), Some((path, _))) = (&self.sessions, &session) {
            sessions.append_message(Role::User, user_message, Some(path.as_path()))?;
            sessions.append_message(Role::Assistant, &reply.text, Some(path.as_path()))?;
            info!("chat session {} updated", path.display());
        }

        Ok(reply)
    }
}

/// One-line token usage summary for the `stats` output
pub fn format_usage(usage: &UsageStats) -> String {
    format!(
        "Tokens: {} prompt, {} completion, {} total",
        usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
    )
}
