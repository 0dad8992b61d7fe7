//! # Pad Transcoder
//!
//! Replays a raw controller capture through a configured transcoder and
//! writes every adapter frame as a JSON line.
//!
//! ```text
//! pad-transcoder [CONFIG] [CAPTURE]
//! ```
//!
//! `CONFIG` defaults to `config/default.toml`. `CAPTURE` overrides
//! `[capture] input` from the configuration.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pad_transcoder::capture::jsonl::JsonlSink;
use pad_transcoder::capture::replay::ReplaySource;
use pad_transcoder::config::Config;
use pad_transcoder::poller::Poller;

/// Configuration used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up non-blocking logging to stderr
///    - Load and validate the configuration
///    - Build the transcoder, rejecting any malformed mapping
///
/// 2. **Main Loop**
///    - Poll the capture at the configured rate
///    - Log status every `log_interval_frames` frames
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if the configuration or capture cannot be loaded, or the
/// capture source fails mid-run.
#[tokio::main]
async fn main() -> Result<()> {
    // Frames go to stdout, so logs stay on stderr
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Pad Transcoder v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let capture_override = args.next().map(PathBuf::from);

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let transcoder = config.build_transcoder()?;
    info!(
        "Transcoder ready: {} buttons, {} axes",
        transcoder.button_count(),
        transcoder.axes().len()
    );

    let Some(input) = capture_override.or_else(|| config.capture.input.clone()) else {
        bail!("no capture input: pass one on the command line or set [capture] input");
    };

    let mut source = ReplaySource::open(&input, config.capture.repeat)
        .with_context(|| format!("failed to open capture {}", input.display()))?;
    let mut sink = JsonlSink::create(&config.capture.output)?;

    let poller = Poller::new(transcoder, config.poll.rate_hz, config.poll.log_interval_frames);
    info!("Press Ctrl+C to exit");

    let stats = poller
        .run(&mut source, &mut sink, tokio::signal::ctrl_c())
        .await?;

    info!(
        "Total frames transcoded: {} ({} dropped)",
        stats.transcoded, stats.dropped
    );
    Ok(())
}
