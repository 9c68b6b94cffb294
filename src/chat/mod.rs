//! Chat side of the OpenRouter node
//!
//! - backend.rs: request/reply types and the `ChatBackend` seam
//! - session.rs: conversations persisted on disk
//! - export.rs: rendering a conversation as JSON, text or Markdown

pub mod backend;
pub mod export;
pub mod session;

pub use backend::{
    ChatBackend, ChatError, ChatMessage, ChatOptions, ChatReply, ChatRequest, ImageAttachment,
    Role, UsageStats,
};
pub use export::ExportFormat;
pub use session::{ChatSessionManager, Conversation, SessionError, SessionSummary};
