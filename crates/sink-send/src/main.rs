//! onms-sink-send — publish an OpenNMS event (or any file) to the Sink topic
//! as a sequence of chunked SinkMessage records.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use sink_core::{ChunkConfig, Publisher, SinkConfig, Transport};

mod event;
mod transport;

use event::{Event, EventTime};
use transport::DryRunTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportKind {
    Kafka,
    DryRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

/// Send a payload to the OpenNMS Sink API through Kafka.
#[derive(Parser, Debug)]
#[command(name = "onms-sink-send")]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file (defaults to $SINK_SEND_CONFIG or the XDG config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kafka bootstrap servers (comma-separated)
    #[arg(long)]
    brokers: Option<String>,

    /// Sink topic
    #[arg(long)]
    topic: Option<String>,

    /// Maximum content bytes per chunk; 0 sends the payload unsplit
    #[arg(long, allow_negative_numbers = true)]
    buffer_size: Option<i64>,

    /// Where chunks go
    #[arg(long, value_enum, default_value_t = TransportKind::Kafka)]
    transport: TransportKind,

    /// Publish this file instead of the sample event
    #[arg(long)]
    payload: Option<PathBuf>,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

fn setup_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set subscriber")?;
        }
        LogFormat::Plain => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set subscriber")?;
        }
    }
    Ok(())
}

/// File and environment first, then command-line flags on top.
fn load_config(args: &Args) -> Result<SinkConfig> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => SinkConfig::write_default_if_missing().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to write default config");
            SinkConfig::file_path()
        }),
    };
    let mut config = SinkConfig::load_from(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;

    if let Some(brokers) = &args.brokers {
        config.kafka.brokers = brokers.clone();
    }
    if let Some(topic) = &args.topic {
        config.kafka.topic = topic.clone();
    }
    if let Some(size) = args.buffer_size {
        config.chunking.buffer_size = size;
    }
    Ok(config)
}

async fn read_payload(args: &Args) -> Result<Vec<u8>> {
    if let Some(path) = &args.payload {
        return tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read payload {}", path.display()));
    }

    let xml = Event::sample(EventTime::now())
        .to_xml()
        .context("failed to serialize sample event")?;
    tracing::info!(payload = %xml, "event payload");
    Ok(xml.into_bytes())
}

async fn publish<T: Transport>(transport: T, chunking: ChunkConfig, payload: Vec<u8>) -> Result<()> {
    let publisher = Publisher::new(transport, chunking);
    tracing::info!(
        topic = publisher.config().topic(),
        buffer_size = publisher.config().max_frame_size(),
        bytes = payload.len(),
        "publishing payload"
    );
    let receipt = publisher.publish(payload).await.context("publish failed")?;
    tracing::info!(
        key = %receipt.message_id,
        chunks = receipt.frames,
        bytes = receipt.bytes,
        "payload published"
    );
    Ok(())
}

#[cfg(feature = "kafka")]
async fn publish_kafka(config: &SinkConfig, chunking: ChunkConfig, payload: Vec<u8>) -> Result<()> {
    let mut transport =
        transport::KafkaTransport::new(config).context("invalid kafka configuration")?;
    transport.connect().context("failed to create kafka producer")?;
    let result = publish(&transport, chunking, payload).await;
    transport.close();
    result
}

#[cfg(not(feature = "kafka"))]
async fn publish_kafka(_: &SinkConfig, _: ChunkConfig, _: Vec<u8>) -> Result<()> {
    anyhow::bail!("built without kafka support; rebuild with --features kafka or pass --transport dry-run")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.log_format)?;

    let config = load_config(&args)?;
    let chunking = config.chunk_config().context("invalid chunking configuration")?;
    tracing::info!(
        brokers = %config.kafka.brokers,
        transport = ?args.transport,
        "onms-sink-send starting"
    );

    let payload = read_payload(&args).await?;

    match args.transport {
        TransportKind::DryRun => publish(DryRunTransport::new(), chunking, payload).await,
        TransportKind::Kafka => publish_kafka(&config, chunking, payload).await,
    }
}
