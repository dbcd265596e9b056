//! Viewer configuration

use serde::{Deserialize, Serialize};

use prism_core::{PrismError, PrismResult};
use prism_visual::ENTITY_CLASS;

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// PRISM viewer configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Class of the root container
    pub root_class: String,
    /// Category class carried by every entity node
    pub entity_class: String,
    /// Hold style writes until the end of the turn so host transitions run
    pub defer_styles: bool,
    /// Capacity of each update and command channel
    pub stream_buffer: usize,
    /// Fixed seed for command operands; entropy when unset
    pub command_seed: Option<u64>,
    pub log: LogConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            root_class: "root".to_string(),
            entity_class: ENTITY_CLASS.to_string(),
            defer_styles: true,
            stream_buffer: 1024,
            command_seed: None,
            log: LogConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Configuration for hosts without style transitions
    pub fn headless() -> Self {
        ViewerConfig {
            defer_styles: false,
            log: LogConfig {
                filter: "warn".to_string(),
                json: false,
            },
            ..ViewerConfig::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(s: &str) -> PrismResult<Self> {
        let config: ViewerConfig =
            serde_json::from_str(s).map_err(|e| PrismError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PrismResult<()> {
        if self.root_class.trim().is_empty() {
            return Err(PrismError::InvalidConfig("root_class is empty".into()));
        }
        if self.entity_class.trim().is_empty() {
            return Err(PrismError::InvalidConfig("entity_class is empty".into()));
        }
        if self.stream_buffer == 0 {
            return Err(PrismError::InvalidConfig("stream_buffer must be positive".into()));
        }
        Ok(())
    }
}
