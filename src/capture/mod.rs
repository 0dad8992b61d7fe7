//! # Capture Module
//!
//! Frame sources and sinks the poller runs between.
//!
//! - [`replay::ReplaySource`] - raw source frames from a hex capture file
//! - [`jsonl::JsonlSink`] - transcoded frames as JSON lines
//!
//! Both sides are traits so the poller can be driven by mocks in tests.

pub mod jsonl;
pub mod replay;

use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::controller::pad::ConsolePad;
use crate::controller::transcoder::{AdapterAxes, DestFrame};
use crate::error::Result;

/// Supplies raw source frames, one per poll
#[cfg_attr(test, mockall::automock)]
pub trait FrameSource: Send {
    /// Next raw frame, or `None` once the source is exhausted
    ///
    /// # Errors
    ///
    /// Returns error if the underlying source fails
    fn next_frame(&mut self) -> Result<Option<Bytes>>;
}

/// Receives every transcoded frame
#[cfg_attr(test, mockall::automock)]
pub trait FrameSink: Send {
    /// Write one frame record
    ///
    /// # Errors
    ///
    /// Returns error if the record cannot be written
    fn write_frame(&mut self, record: &FrameRecord) -> Result<()>;
}

/// One transcoded frame as it is logged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    /// RFC 3339 time the frame was transcoded
    pub timestamp: String,
    /// Frame sequence number, starting at 0
    pub seq: u64,
    /// Adapter button bits
    pub buttons: u16,
    /// Adapter axis bytes
    pub axes: AdapterAxes,
    /// Console view of the same frame
    pub pad: ConsolePad,
}

impl FrameRecord {
    /// Stamps a transcoded frame with the current time
    #[must_use]
    pub fn new(seq: u64, frame: &DestFrame) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            seq,
            buttons: frame.buttons,
            axes: frame.axes,
            pad: ConsolePad::from_frame(frame),
        }
    }
}
