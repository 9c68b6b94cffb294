//! Application-wide constants and default values
//!
//! Centralized location for all hard-coded values to improve maintainability

/// Dynamic socket defaults
pub mod sockets {
    /// Name prefix of the repeatable image sockets on the OpenRouter node
    pub const IMAGE_FAMILY_PREFIX: &str = "image";

    /// Type tag carried by a socket until a link narrows it
    pub const PLACEHOLDER_TYPE: &str = "*";
}

/// Node layout constants
pub mod layout {
    /// Horizontal distance between two ports on the same edge
    pub const PORT_SPACING: f32 = 30.0;

    /// Minimum width of a node
    pub const MIN_NODE_WIDTH: f32 = 150.0;
}

/// Chat session persistence constants
pub mod session {
    /// File holding one session's conversation
    pub const CONVERSATION_FILE: &str = "conversation.json";

    /// Directory-name prefix of every session
    pub const SESSION_DIR_PREFIX: &str = "session_";

    /// Sessions expire after this many hours of inactivity
    pub const DEFAULT_TIMEOUT_HOURS: u64 = 1;

    /// `clean` removes sessions older than this many days by default
    pub const DEFAULT_CLEAN_AFTER_DAYS: u64 = 30;

    /// Number of words of the first message kept in a session name
    pub const NAME_WORD_LIMIT: usize = 5;

    /// Maximum length of the sanitized message part of a session name
    pub const NAME_MAX_LENGTH: usize = 50;

    /// Characters of the first user message kept in a session summary
    pub const SUMMARY_PREVIEW_CHARS: usize = 100;

    /// Placeholder shown when a session has no user message yet
    pub const NO_USER_MESSAGE: &str = "No user message";
}

/// Configuration lookup
pub mod config {
    /// Environment variable naming an explicit config file
    pub const CONFIG_ENV_VAR: &str = "OPENROUTER_NODE_CONFIG";

    /// Application directory under the platform data dir
    pub const APP_DIR_NAME: &str = "openrouter-node";

    /// Chat directory name, used under the data dir or the working dir
    pub const CHATS_DIR_NAME: &str = "chats";
}
