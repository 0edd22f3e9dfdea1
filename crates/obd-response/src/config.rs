//! Adapter dialect configuration
//!
//! Prompt byte, placeholder text, fault phrases and per-PID reply layouts
//! vary between adapter firmwares. Defaults match a stock ELM327.

use crate::fault::{default_fault_phrases, FaultPhrase, FaultTable};
use crate::frame::DEFAULT_PROMPT;
use crate::pid::PidLayout;
use crate::sanitize::{Sanitizer, DEFAULT_PLACEHOLDERS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides, e.g. `OBD_RESPONSE_STRIP_ECHO`
pub const ENV_PREFIX: &str = "OBD_RESPONSE";

/// Layout override for a single PID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidLayoutOverride {
    pub pid: u8,
    pub skip_bytes: usize,
    pub min_bytes: usize,
}

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Byte the adapter sends when a response is complete
    pub prompt_byte: u8,
    /// Remove the command echo from responses
    pub strip_echo: bool,
    /// Status phrases dropped from responses
    pub placeholders: Vec<String>,
    /// Ordered fault phrase table
    pub fault_phrases: Vec<FaultPhrase>,
    /// Per-PID layout overrides
    pub layouts: Vec<PidLayoutOverride>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            prompt_byte: DEFAULT_PROMPT,
            strip_echo: true,
            placeholders: DEFAULT_PLACEHOLDERS.iter().map(|s| s.to_string()).collect(),
            fault_phrases: default_fault_phrases(),
            layouts: Vec::new(),
        }
    }
}

impl DecoderConfig {
    /// Load from a file (format chosen by extension) with environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Parse a TOML document
    pub fn from_toml(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Override the reply layout of a PID
    pub fn with_layout(mut self, pid: u8, layout: PidLayout) -> Self {
        self.layouts.retain(|o| o.pid != pid);
        self.layouts.push(PidLayoutOverride {
            pid,
            skip_bytes: layout.skip_bytes,
            min_bytes: layout.min_bytes,
        });
        self
    }

    pub fn layout_for(&self, pid: u8) -> Option<PidLayout> {
        self.layouts
            .iter()
            .find(|o| o.pid == pid)
            .map(|o| PidLayout {
                skip_bytes: o.skip_bytes,
                min_bytes: o.min_bytes,
            })
    }

    pub fn sanitizer(&self) -> Sanitizer {
        Sanitizer::new(self.prompt_byte, &self.placeholders)
    }

    pub fn fault_table(&self) -> FaultTable {
        FaultTable::new(&self.fault_phrases)
    }
}
