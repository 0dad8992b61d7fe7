//! # Poller Module
//!
//! Drives a [`FrameTranscoder`] at a fixed rate: each tick pulls one raw frame
//! from a [`FrameSource`], transcodes it, and hands the record to a
//! [`FrameSink`].
//!
//! ## Failure Handling
//!
//! - Source error: the run stops and the error is returned
//! - Sink error: logged and counted as dropped, polling continues
//! - Source exhausted or shutdown signalled: the run stops cleanly
//!
//! ## Usage
//!
//! ```no_run
//! use pad_transcoder::capture::jsonl::JsonlSink;
//! use pad_transcoder::capture::replay::ReplaySource;
//! use pad_transcoder::config::Config;
//! use pad_transcoder::poller::Poller;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("config/default.toml")?;
//! let poller = Poller::new(config.build_transcoder()?, 125, 1000);
//!
//! let mut source = ReplaySource::open("capture.hex", false)?;
//! let mut sink = JsonlSink::create("-")?;
//! let stats = poller.run(&mut source, &mut sink, tokio::signal::ctrl_c()).await?;
//! println!("{} frames", stats.transcoded);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::capture::{FrameRecord, FrameSink, FrameSource};
use crate::controller::pad::ConsolePad;
use crate::controller::transcoder::FrameTranscoder;
use crate::error::Result;

/// Counters for one poller run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Frames transcoded
    pub transcoded: u64,
    /// Frames the sink failed to accept
    pub dropped: u64,
}

/// Fixed-rate transcoding loop
#[derive(Debug, Clone)]
pub struct Poller {
    transcoder: FrameTranscoder,
    rate_hz: u32,
    log_interval_frames: u64,
}

impl Poller {
    /// Create a poller
    ///
    /// # Arguments
    ///
    /// * `transcoder` - Validated transcoder
    /// * `rate_hz` - Frames per second, clamped to at least 1
    /// * `log_interval_frames` - Frames between status lines, clamped to at least 1
    #[must_use]
    pub fn new(transcoder: FrameTranscoder, rate_hz: u32, log_interval_frames: u64) -> Self {
        Self {
            transcoder,
            rate_hz: rate_hz.max(1),
            log_interval_frames: log_interval_frames.max(1),
        }
    }

    /// Time between polls
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.rate_hz))
    }

    /// The transcoder this poller drives
    #[must_use]
    pub fn transcoder(&self) -> &FrameTranscoder {
        &self.transcoder
    }

    /// Poll until the source is exhausted or `shutdown` completes
    ///
    /// # Errors
    ///
    /// Returns the first error reported by `source`
    pub async fn run<S, K, F>(
        &self,
        source: &mut S,
        sink: &mut K,
        shutdown: F,
    ) -> Result<PollStats>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
        F: Future,
    {
        let mut ticker = interval(self.period());
        let mut stats = PollStats::default();
        let mut last_pad: Option<ConsolePad> = None;
        let mut last_log_count: u64 = 0;

        tokio::pin!(shutdown);

        info!("Starting poll loop at {}Hz", self.rate_hz);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }

                _ = ticker.tick() => {
                    let raw = match source.next_frame() {
                        Ok(Some(raw)) => raw,
                        Ok(None) => {
                            info!("Frame source exhausted");
                            break;
                        }
                        Err(e) => {
                            warn!("Frame source failed after {} frames: {}", stats.transcoded, e);
                            return Err(e);
                        }
                    };

                    let frame = self.transcoder.transcode(&raw);
                    let record = FrameRecord::new(stats.transcoded, &frame);
                    stats.transcoded += 1;

                    if last_pad != Some(record.pad) {
                        debug!(
                            "Pad: buttons={:#06x} stick=({}, {})",
                            record.pad.buttons, record.pad.stick_x, record.pad.stick_y
                        );
                        last_pad = Some(record.pad);
                    }

                    if let Err(e) = sink.write_frame(&record) {
                        warn!("Failed to write frame {}: {}", record.seq, e);
                        stats.dropped += 1;
                    }

                    if stats.transcoded - last_log_count >= self.log_interval_frames {
                        info!(
                            "Transcoded {} frames ({}Hz, {} dropped)",
                            stats.transcoded, self.rate_hz, stats.dropped
                        );
                        last_log_count = stats.transcoded;
                    }
                }
            }
        }

        info!(
            "Poll loop stopped: {} frames transcoded, {} dropped",
            stats.transcoded, stats.dropped
        );
        Ok(stats)
    }
}
