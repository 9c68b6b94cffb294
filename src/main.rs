//! manage-chats - inspect and tidy the OpenRouter node's chat sessions

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use clap::{Parser, Subcommand};
use openrouter_node::chat::{ChatSessionManager, ExportFormat};
use openrouter_node::Config;
use std::path::PathBuf;

const LIST_RULE_WIDTH: usize = 140;
const VIEW_RULE_WIDTH: usize = 80;
const COLUMN_WIDTH: usize = 50;
const LIST_ALL: usize = 1000;

#[derive(Parser, Debug)]
#[command(name = "manage-chats", about = "Manage OpenRouter chat sessions")]
struct Cli {
    /// JSON config file; defaults to $OPENROUTER_NODE_CONFIG, then built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all chat sessions
    List {
        /// Limit number of sessions to display
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// View a specific chat session
    View {
        /// Session ID to view
        session_id: String,
    },
    /// Export a chat session
    Export {
        /// Session ID to export
        session_id: String,
        #[arg(short, long, value_enum, default_value = "txt")]
        format: ExportFormat,
        /// Output filename, `<session id>.<format>` by default
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Clean up old sessions
    Clean {
        /// Remove sessions older than this many days
        #[arg(short, long)]
        days: Option<u64>,
    },
}

/// Parse a stored timestamp, with or without fractional seconds or offset
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_local()))
}

fn format_created(value: Option<&str>) -> String {
    match value {
        Some(value) => parse_timestamp(value)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| value.to_string()),
        None => "Unknown".to_string(),
    }
}

fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

fn list_sessions(manager: &ChatSessionManager, limit: Option<usize>) {
    let sessions = manager.recent_sessions(limit.unwrap_or(LIST_ALL));
    if sessions.is_empty() {
        println!("No chat sessions found.");
        return;
    }

    println!("\nFound {} chat session(s):\n", sessions.len());
    println!(
        "{:<4} {:<50} {:<20} {:<10} {:<50}",
        "#", "Session ID", "Created", "Messages", "First Message"
    );
    println!("{}", "-".repeat(LIST_RULE_WIDTH));

    for (i, session) in sessions.iter().enumerate() {
        println!(
            "{:<4} {:<50} {:<20} {:<10} {:<50}",
            i + 1,
            truncate(&session.session_id, COLUMN_WIDTH),
            format_created(session.created_at.as_deref()),
            session.message_count,
            truncate(&session.first_user_message, COLUMN_WIDTH)
        );
    }
}

fn view_session(manager: &ChatSessionManager, session_id: &str) -> Result<()> {
    let path = manager.session_path(session_id)?;
    let messages = manager.load_conversation(&path);
    if messages.is_empty() {
        println!("No messages found in this session.");
        return Ok(());
    }

    println!("\n=== Chat Session: {} ===\n", session_id);
    for message in &messages {
        let timestamp = message
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .map(|dt| dt.format(" [%Y-%m-%d %H:%M:%S]").to_string())
            .unwrap_or_default();
        println!("{}{}:", message.role.as_str().to_uppercase(), timestamp);
        println!("{}", message.content);
        println!("{}", "-".repeat(VIEW_RULE_WIDTH));
    }
    Ok(())
}

fn export_session(
    manager: &ChatSessionManager,
    session_id: &str,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let path = manager.session_path(session_id)?;
    let conversation = manager.read_conversation(&path)?;
    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.{}", session_id, format.extension())));

    let rendered = format.render(&conversation).context("Failed to render conversation")?;
    std::fs::write(&output, rendered)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Session exported to: {}", output.display());
    Ok(())
}

fn clean_sessions(manager: &ChatSessionManager, days: u64) {
    println!("\nCleaning up sessions older than {} days...", days);
    let removed = manager.clear_old_sessions(days);
    println!("Cleanup complete. Removed {} session(s).", removed);
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).map_err(anyhow::Error::msg)?;
    let manager = ChatSessionManager::from_config(&config)
        .with_context(|| format!("Cannot open chat directory {}", config.chats_dir.display()))?;

    match cli.command {
        Command::List { limit } => list_sessions(&manager, limit),
        Command::View { session_id } => view_session(&manager, &session_id)?,
        Command::Export {
            session_id,
            format,
            output,
        } => export_session(&manager, &session_id, format, output)?,
        Command::Clean { days } => clean_sessions(&manager, days.unwrap_or(config.clean_after_days)),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
