//! Persistent chat sessions
//!
//! Every session is a directory under the base path holding a single
//! `conversation.json`. A run in chat mode continues the most recently touched
//! session if its conversation changed within the timeout, and otherwise
//! starts a new one named after the first message.

use super::backend::{ChatMessage, Role};
use crate::config::Config;
use crate::constants::session::{
    CONVERSATION_FILE, NAME_MAX_LENGTH, NAME_WORD_LIMIT, NO_USER_MESSAGE, SESSION_DIR_PREFIX,
    SUMMARY_PREVIEW_CHARS,
};
use chrono::Local;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, SystemTime};
use thiserror::Error;

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

static NON_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid name filter pattern"));
static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid separator pattern"));

/// `count` hours as a duration, saturating instead of overflowing
fn hours(count: u64) -> Duration {
    count
        .checked_mul(SECONDS_PER_HOUR)
        .map_or(Duration::MAX, Duration::from_secs)
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid conversation file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no active session to append message to")]
    NoActiveSession,

    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("invalid session id '{0}'")]
    InvalidSessionId(String),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> SessionError + '_ {
    move |source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Contents of `conversation.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// One line of the session listing
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub path: PathBuf,
    pub created_at: Option<String>,
    pub last_updated: Option<String>,
    pub message_count: usize,
    pub first_user_message: String,
}

/// Local time as used in session directory names
fn dir_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Local time as stored in conversation files
pub fn iso_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Turn the start of a message into a file-name fragment
///
/// Keeps the first five words, drops everything but word characters,
/// whitespace and hyphens, joins the rest with `_`, caps the length at 50 and
/// lowercases the result.
pub fn sanitize_filename(text: &str) -> String {
    let words = text
        .split_whitespace()
        .take(NAME_WORD_LIMIT)
        .collect::<Vec<_>>()
        .join(" ");
    let kept = NON_NAME_CHARS.replace_all(&words, "");
    let mut joined = SEPARATOR_RUNS.replace_all(&kept, "_").into_owned();

    if joined.chars().count() > NAME_MAX_LENGTH {
        let truncated: String = joined.chars().take(NAME_MAX_LENGTH).collect();
        joined = truncated.trim_end_matches('_').to_string();
    }
    joined.to_lowercase()
}

/// Manages the chat sessions under one base directory
#[derive(Debug, Clone)]
pub struct ChatSessionManager {
    base_path: PathBuf,
    current_session: Option<PathBuf>,
    session_timeout: Duration,
}

impl ChatSessionManager {
    /// Open (creating if needed) the session store at `base_path`
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(io_error(&base_path))?;
        Ok(Self {
            base_path,
            current_session: None,
            session_timeout: hours(crate::constants::session::DEFAULT_TIMEOUT_HOURS),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SessionError> {
        Ok(Self::new(&config.chats_dir)?
            .with_timeout(hours(config.session_timeout_hours)))
    }

    /// Sessions untouched for longer than `timeout` are not continued; zero
    /// disables continuation altogether
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn current_session(&self) -> Option<&Path> {
        self.current_session.as_deref()
    }

    /// Directory of an existing session
    ///
    /// The id must name a direct child of the base path.
    pub fn session_path(&self, session_id: &str) -> Result<PathBuf, SessionError> {
        let mut components = Path::new(session_id).components();
        let is_plain_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !is_plain_name || session_id.contains(|c| c == '/' || c == '\\') {
            return Err(SessionError::InvalidSessionId(session_id.to_string()));
        }
        let path = self.base_path.join(session_id);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(SessionError::SessionNotFound(session_id.to_string()))
        }
    }

    /// Session directories, most recently modified first
    fn session_dirs(&self) -> Vec<(PathBuf, SystemTime)> {
        let entries = match fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot list {}: {}", self.base_path.display(), e);
                return Vec::new();
            }
        };
        let mut dirs: Vec<(PathBuf, SystemTime)> = entries
            .flatten()
            .filter_map(|entry| {
                let metadata = entry.metadata().ok()?;
                if !metadata.is_dir() {
                    return None;
                }
                Some((entry.path(), metadata.modified().ok()?))
            })
            .collect();
        dirs.sort_by(|a, b| b.1.cmp(&a.1));
        dirs
    }

    /// The most recent session whose conversation changed within the timeout
    pub fn find_active_session(&self) -> Option<PathBuf> {
        if self.session_timeout.is_zero() {
            return None;
        }
        let now = SystemTime::now();
        self.session_dirs().into_iter().find_map(|(dir, _)| {
            let modified = fs::metadata(dir.join(CONVERSATION_FILE)).ok()?.modified().ok()?;
            let elapsed = now.duration_since(modified).unwrap_or_default();
            (elapsed <= self.session_timeout).then_some(dir)
        })
    }

    /// Create `session_<timestamp>_<message>`, suffixed `_<n>` on collision
    fn create_new_session(&self, first_message: &str) -> Result<PathBuf, SessionError> {
        let session_name = format!(
            "{}{}_{}",
            SESSION_DIR_PREFIX,
            dir_timestamp(),
            sanitize_filename(first_message)
        );
        let mut session_path = self.base_path.join(&session_name);
        let mut counter = 1;
        while session_path.exists() {
            session_path = self.base_path.join(format!("{}_{}", session_name, counter));
            counter += 1;
        }

        fs::create_dir_all(&session_path).map_err(io_error(&session_path))?;
        info!("created chat session {}", session_path.display());
        Ok(session_path)
    }

    /// Continue the active session or start a new one seeded with the system prompt
    pub fn get_or_create_session(
        &mut self,
        user_message: &str,
        system_prompt: &str,
    ) -> Result<(PathBuf, Vec<ChatMessage>), SessionError> {
        if let Some(active) = self.find_active_session() {
            debug!("continuing chat session {}", active.display());
            let messages = self.load_conversation(&active);
            self.current_session = Some(active.clone());
            return Ok((active, messages));
        }

        let session_path = self.create_new_session(user_message)?;
        let messages = vec![ChatMessage::system(system_prompt)];
        let now = iso_timestamp();
        let conversation = Conversation {
            session_id: dir_name(&session_path),
            created_at: Some(now.clone()),
            last_updated: Some(now),
            messages: messages.clone(),
        };
        write_conversation(&session_path, &conversation)?;

        self.current_session = Some(session_path.clone());
        Ok((session_path, messages))
    }

    /// Read a session's conversation file
    pub fn read_conversation(&self, session_path: &Path) -> Result<Conversation, SessionError> {
        let file = session_path.join(CONVERSATION_FILE);
        let content = fs::read_to_string(&file).map_err(io_error(&file))?;
        serde_json::from_str(&content).map_err(|source| SessionError::Json { path: file, source })
    }

    /// Messages of a session; empty when the file is missing or unreadable
    pub fn load_conversation(&self, session_path: &Path) -> Vec<ChatMessage> {
        if !session_path.join(CONVERSATION_FILE).exists() {
            return Vec::new();
        }
        match self.read_conversation(session_path) {
            Ok(conversation) => conversation.messages,
            Err(e) => {
                warn!("error loading conversation: {}", e);
                Vec::new()
            }
        }
    }

    /// Replace a session's messages, keeping its id and creation time
    pub fn save_conversation(&self, session_path: &Path, messages: &[ChatMessage]) -> Result<(), SessionError> {
        let existing = self.read_conversation(session_path).unwrap_or_default();
        let session_id = if existing.session_id.is_empty() {
            dir_name(session_path)
        } else {
            existing.session_id
        };
        let conversation = Conversation {
            session_id,
            created_at: existing.created_at.or_else(|| Some(iso_timestamp())),
            last_updated: Some(iso_timestamp()),
            messages: messages.to_vec(),
        };
        write_conversation(session_path, &conversation)
    }

    /// Append a timestamped message to `session_path` or the current session
    pub fn append_message(
        &self,
        role: Role,
        content: &str,
        session_path: Option<&Path>,
    ) -> Result<(), SessionError> {
        let session_path = session_path
            .or(self.current_session.as_deref())
            .ok_or(SessionError::NoActiveSession)?;

        let mut messages = self.load_conversation(session_path);
        messages.push(ChatMessage {
            role,
            content: content.to_string(),
            timestamp: Some(iso_timestamp()),
        });
        self.save_conversation(session_path, &messages)
    }

    /// Up to `limit` sessions, most recently modified first
    pub fn recent_sessions(&self, limit: usize) -> Vec<SessionSummary> {
        self.session_dirs()
            .into_iter()
            .take(limit)
            .filter(|(dir, _)| dir.join(CONVERSATION_FILE).exists())
            .filter_map(|(dir, _)| {
                let conversation = self.read_conversation(&dir).ok()?;
                let first_user_message = conversation
                    .messages
                    .iter()
                    .find(|message| message.role == Role::User)
                    .map(|message| message.content.as_str())
                    .unwrap_or(NO_USER_MESSAGE)
                    .chars()
                    .take(SUMMARY_PREVIEW_CHARS)
                    .collect();
                Some(SessionSummary {
                    session_id: if conversation.session_id.is_empty() {
                        dir_name(&dir)
                    } else {
                        conversation.session_id
                    },
                    path: dir,
                    created_at: conversation.created_at,
                    last_updated: conversation.last_updated,
                    message_count: conversation.messages.len(),
                    first_user_message,
                })
            })
            .collect()
    }

    /// Delete sessions not modified within `days`; returns how many went
    pub fn clear_old_sessions(&self, days: u64) -> usize {
        let cutoff = days
            .checked_mul(SECONDS_PER_DAY)
            .map(Duration::from_secs)
            .and_then(|age| SystemTime::now().checked_sub(age))
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut removed = 0;
        for (dir, modified) in self.session_dirs() {
            if modified >= cutoff {
                continue;
            }
            match fs::remove_dir_all(&dir) {
                Ok(()) => {
                    info!("removed old session: {}", dir_name(&dir));
                    removed += 1;
                }
                Err(e) => error!("error removing session {}: {}", dir_name(&dir), e),
            }
        }
        removed
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn write_conversation(session_path: &Path, conversation: &Conversation) -> Result<(), SessionError> {
    let file = session_path.join(CONVERSATION_FILE);
    let json = serde_json::to_string_pretty(conversation).map_err(|source| SessionError::Json {
        path: file.clone(),
        source,
    })?;
    fs::write(&file, json).map_err(io_error(&file))
}
