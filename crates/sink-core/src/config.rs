//! Configuration system for the sink sender.
//!
//! Resolution order: environment variables → config file → defaults.
//! Command-line flags are layered on top by the binary.
//!
//! Config file location:
//!   1. $SINK_SEND_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/onms-sink-send/config.toml
//!   3. ~/.config/onms-sink-send/config.toml

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kafka: KafkaConfig,
    pub chunking: ChunkingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    /// Comma separated broker list.
    pub brokers: String,
    /// Sink API topic the chunks are published to.
    pub topic: String,
    /// Per-message delivery timeout in milliseconds.
    pub timeout_ms: u64,
    /// Extra producer properties passed straight to the client.
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk content size in bytes. 0 = unbounded (single chunk).
    /// Signed so that a negative value can be reported instead of wrapping.
    pub buffer_size: i64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_BROKERS: &str = "127.0.0.1:9092";
pub const DEFAULT_TOPIC: &str = "OpenNMS.Sink.Events";
pub const DEFAULT_BUFFER_SIZE: i64 = 1024;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: DEFAULT_BROKERS.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            properties: BTreeMap::new(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

// ── Chunk settings ────────────────────────────────────────────────────────────

/// Validated settings the publisher runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkConfig {
    max_frame_size: usize,
    topic: String,
}

impl ChunkConfig {
    /// Reject negative frame sizes and empty topics before anything is planned.
    pub fn new(max_frame_size: i64, topic: impl Into<String>) -> Result<Self, ConfigError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        let max_frame_size = usize::try_from(max_frame_size)
            .map_err(|_| ConfigError::NegativeBufferSize(max_frame_size))?;
        Ok(Self {
            max_frame_size,
            topic,
        })
    }

    /// Maximum chunk content size. 0 = unbounded.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("onms-sink-send")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("buffer size must not be negative: {0}")]
    NegativeBufferSize(i64),
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("broker list must not be empty")]
    NoBrokers,
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl SinkConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::file_path())
    }

    /// Load from an explicit path, then apply SINK_SEND_* env overrides.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// File contents over defaults, no environment. A missing file yields defaults.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(SinkConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("SINK_SEND_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&SinkConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply SINK_SEND_* overrides, reading values through `lookup`.
    ///
    /// Unparsable numeric overrides are ignored and the previous value kept.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SINK_SEND_KAFKA__BROKERS") {
            self.kafka.brokers = v;
        }
        if let Some(v) = lookup("SINK_SEND_KAFKA__TOPIC") {
            self.kafka.topic = v;
        }
        if let Some(v) = lookup("SINK_SEND_KAFKA__TIMEOUT_MS") {
            if let Ok(ms) = v.parse() {
                self.kafka.timeout_ms = ms;
            }
        }
        if let Some(v) = lookup("SINK_SEND_CHUNKING__BUFFER_SIZE") {
            if let Ok(size) = v.parse() {
                self.chunking.buffer_size = size;
            }
        }
    }

    /// Brokers split on commas, blanks dropped.
    pub fn broker_list(&self) -> Result<Vec<String>, ConfigError> {
        let brokers: Vec<String> = self
            .kafka
            .brokers
            .split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect();
        if brokers.is_empty() {
            return Err(ConfigError::NoBrokers);
        }
        Ok(brokers)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.kafka.timeout_ms)
    }

    /// Validated publisher settings.
    pub fn chunk_config(&self) -> Result<ChunkConfig, ConfigError> {
        ChunkConfig::new(self.chunking.buffer_size, self.kafka.topic.clone())
    }
}
