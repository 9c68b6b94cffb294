//! Configuration for the node extension and the session tooling

use crate::constants::config::{APP_DIR_NAME, CHATS_DIR_NAME, CONFIG_ENV_VAR};
use crate::constants::session::{DEFAULT_CLEAN_AFTER_DAYS, DEFAULT_TIMEOUT_HOURS};
use crate::constants::sockets::{IMAGE_FAMILY_PREFIX, PLACEHOLDER_TYPE};
use crate::nodes::openrouter::OpenRouterNodeFactory;
use crate::nodes::NodeFactory;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one sub-directory per chat session
    pub chats_dir: PathBuf,
    /// A session is reused while its conversation was touched this recently
    pub session_timeout_hours: u64,
    /// Default age threshold of `manage-chats clean`
    pub clean_after_days: u64,
    /// Name prefix of the repeatable image sockets
    pub image_family_prefix: String,
    /// Type tag of an image socket before anything is connected
    pub placeholder_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chats_dir: default_chats_dir(),
            session_timeout_hours: DEFAULT_TIMEOUT_HOURS,
            clean_after_days: DEFAULT_CLEAN_AFTER_DAYS,
            image_family_prefix: IMAGE_FAMILY_PREFIX.to_string(),
            placeholder_type: PLACEHOLDER_TYPE.to_string(),
        }
    }
}

/// `<data dir>/openrouter-node/chats`, or `./chats` without a data dir
pub fn default_chats_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(data) => data.join(APP_DIR_NAME).join(CHATS_DIR_NAME),
        None => PathBuf::from(CHATS_DIR_NAME),
    }
}

impl Config {
    /// Read a JSON config file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))?;
        config
            .validate()
            .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Check that the image family cannot claim one of the node's own inputs
    ///
    /// Every input whose name starts with the prefix belongs to the family,
    /// so the prefix must be non-empty and must not start any input the node
    /// declares.
    pub fn validate(&self) -> Result<(), String> {
        let prefix = &self.image_family_prefix;
        if prefix.is_empty() {
            return Err("image_family_prefix must not be empty".to_string());
        }
        let metadata = OpenRouterNodeFactory::metadata();
        if let Some(input) = metadata.inputs.iter().find(|input| input.name.starts_with(prefix.as_str())) {
            return Err(format!(
                "image_family_prefix '{}' would take over the '{}' input",
                prefix, input.name
            ));
        }
        Ok(())
    }

    /// Resolve the config: explicit path, then the env variable, then defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            info!("using config from ${}", CONFIG_ENV_VAR);
            return Self::from_file(Path::new(&path));
        }
        Ok(Self::default())
    }
}
