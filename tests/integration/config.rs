use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use sink_core::config::{DEFAULT_BROKERS, DEFAULT_BUFFER_SIZE, DEFAULT_TOPIC};
use sink_core::{ConfigError, SinkConfig};

use crate::*;

// ══════════════════════════════════════════════════════════════════════════════
//  Config file → publisher
// ══════════════════════════════════════════════════════════════════════════════

/// Write `text` to a per-process temp config file and return its path.
fn temp_config(name: &str, text: &str) -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("onms-sink-send-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(name);
    std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[test]
fn test_missing_file_yields_defaults() {
    let config = SinkConfig::from_file(&PathBuf::from("/nonexistent/onms-sink-send.toml")).unwrap();
    assert_eq!(config.kafka.brokers, DEFAULT_BROKERS);
    assert_eq!(config.kafka.topic, DEFAULT_TOPIC);
    assert_eq!(config.chunking.buffer_size, DEFAULT_BUFFER_SIZE);
}

#[test]
fn test_default_file_round_trips() -> Result<()> {
    let text = toml::to_string_pretty(&SinkConfig::default())?;
    let path = temp_config("roundtrip.toml", &text)?;
    assert_eq!(SinkConfig::from_file(&path)?, SinkConfig::default());
    Ok(())
}

#[test]
fn test_negative_buffer_size_rejected_before_publish() -> Result<()> {
    let path = temp_config("negative.toml", "[chunking]\nbuffer_size = -5\n")?;
    let config = SinkConfig::from_file(&path)?;
    assert!(matches!(
        config.chunk_config(),
        Err(ConfigError::NegativeBufferSize(-5))
    ));
    Ok(())
}

#[test]
fn test_malformed_file_reports_path() -> Result<()> {
    let path = temp_config("broken.toml", "[kafka\nbrokers = ")?;
    match SinkConfig::from_file(&path) {
        Err(err @ ConfigError::ParseFailed(..)) => {
            assert!(err.to_string().contains("broken.toml"));
        }
        other => bail!("expected parse failure, got {other:?}"),
    }
    Ok(())
}

/// Topic and buffer size from the file drive what the publisher sends.
#[tokio::test]
async fn test_file_settings_reach_publisher() -> Result<()> {
    let path = temp_config(
        "publish.toml",
        "[kafka]\ntopic = \"OpenNMS.Sink.Trap\"\n\n[chunking]\nbuffer_size = 128\n",
    )?;
    let config = SinkConfig::from_file(&path)?;
    let recorder = Arc::new(Recorder::new());
    let publisher = Publisher::new(recorder.clone(), config.chunk_config()?);

    publisher.publish(payload(300)).await?;

    let sent = recorder.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|s| s.topic == "OpenNMS.Sink.Trap"));
    let sizes: Vec<usize> = sent.iter().map(|s| s.decode().content.len()).collect();
    assert_eq!(sizes, vec![128, 128, 44]);
    Ok(())
}
