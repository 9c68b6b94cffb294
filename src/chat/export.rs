//! Rendering conversations for export

use super::backend::Role;
use super::session::Conversation;
use clap::ValueEnum;

const RULE_WIDTH: usize = 80;
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Txt,
    Md,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
        }
    }

    pub fn render(&self, conversation: &Conversation) -> Result<String, serde_json::Error> {
        match self {
            ExportFormat::Json => render_json(conversation),
            ExportFormat::Txt => Ok(render_text(conversation)),
            ExportFormat::Md => Ok(render_markdown(conversation)),
        }
    }
}

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNKNOWN)
}

fn session_id(conversation: &Conversation) -> &str {
    if conversation.session_id.is_empty() {
        UNKNOWN
    } else {
        &conversation.session_id
    }
}

pub fn render_json(conversation: &Conversation) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(conversation)
}

pub fn render_text(conversation: &Conversation) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = format!(
        "Chat Session: {}\nCreated: {}\nLast Updated: {}\n{}\n\n",
        session_id(conversation),
        or_unknown(&conversation.created_at),
        or_unknown(&conversation.last_updated),
        "=".repeat(RULE_WIDTH)
    );

    for message in &conversation.messages {
        if let Some(timestamp) = &message.timestamp {
            out.push_str(&format!("\n[{}] ", timestamp));
        }
        out.push_str(&format!(
            "{}:\n{}\n{}\n",
            message.role.as_str().to_uppercase(),
            message.content,
            rule
        ));
    }
    out
}

pub fn render_markdown(conversation: &Conversation) -> String {
    let mut out = format!(
        "# Chat Session: {}\n\n**Created:** {}  \n**Last Updated:** {}\n\n---\n\n",
        session_id(conversation),
        or_unknown(&conversation.created_at),
        or_unknown(&conversation.last_updated)
    );

    for message in &conversation.messages {
        let heading = match &message.role {
            Role::System => {
                out.push_str(&format!("### System Prompt\n\n{}\n\n", message.content));
                None
            }
            Role::User => Some("User"),
            Role::Assistant => Some("Assistant"),
            // Other roles only get the separator
            Role::Other(_) => None,
        };
        if let Some(heading) = heading {
            out.push_str(&format!("### {}", heading));
            if let Some(timestamp) = &message.timestamp {
                out.push_str(&format!(" _{}_", timestamp));
            }
            out.push_str(&format!("\n\n{}\n\n", message.content));
        }
        out.push_str("---\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::backend::ChatMessage;

    fn sample() -> Conversation {
        let mut user = ChatMessage::user("What is in the picture?");
        user.timestamp = Some("2025-03-01T10:00:00".to_string());
        Conversation {
            session_id: "session_20250301_100000_what".to_string(),
            created_at: Some("2025-03-01T10:00:00".to_string()),
            last_updated: None,
            messages: vec![
                ChatMessage::system("Be precise"),
                user,
                ChatMessage::assistant("A cat."),
            ],
        }
    }

    #[test]
    fn test_text_export() {
        let text = render_text(&sample());
        assert!(text.starts_with("Chat Session: session_20250301_100000_what\nCreated: 2025-03-01T10:00:00\n"));
        assert!(text.contains("Last Updated: Unknown\n"));
        assert!(text.contains("SYSTEM:\nBe precise\n"));
        assert!(text.contains("\n[2025-03-01T10:00:00] USER:\nWhat is in the picture?\n"));
        assert_eq!(text.matches(&"-".repeat(80)).count(), 3);
    }

    #[test]
    fn test_markdown_export() {
        let md = render_markdown(&sample());
        assert!(md.starts_with("# Chat Session: session_20250301_100000_what\n\n**Created:** 2025-03-01T10:00:00  \n"));
        assert!(md.contains("### System Prompt\n\nBe precise\n\n---\n\n"));
        assert!(md.contains("### User _2025-03-01T10:00:00_\n\nWhat is in the picture?\n\n"));
        assert!(md.contains("### Assistant\n\nA cat.\n\n"));
        assert_eq!(md.matches("---\n\n").count(), 4);
    }

    #[test]
    fn test_json_export_parses_back() {
        let json = ExportFormat::Json.render(&sample()).unwrap();
        let parsed: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
        assert_eq!(ExportFormat::Md.extension(), "md");
    }

    #[test]
    fn test_other_roles_export() {
        let mut conversation = sample();
        conversation.messages.push(ChatMessage::new(Role::Other("tool".to_string()), "42"));

        let text = render_text(&conversation);
        assert!(text.contains("TOOL:\n42\n"));

        let md = render_markdown(&conversation);
        assert!(!md.contains("42"));
        assert_eq!(md.matches("---\n\n").count(), 5);
    }
}
