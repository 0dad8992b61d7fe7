//! Replays raw source frames from a hex capture file.
//!
//! One frame per line, as hex digits. Bytes may be separated by spaces,
//! and each group may carry an optional `0x` prefix. Blank lines and lines
//! starting with `#` are skipped.
//!
//! ```text
//! # Z pressed, stick right
//! 40 00 08 ff 7f 80 7f 00
//! 0x4000087f7f807f00
//! ```

use bytes::Bytes;
use std::fs;
use std::path::Path;
use tracing::info;

use super::FrameSource;
use crate::error::{RemapError, Result};

/// Frame source backed by a capture file loaded into memory.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    frames: Vec<Bytes>,
    cursor: usize,
    repeat: bool,
}

impl ReplaySource {
    /// Load a capture file.
    ///
    /// # Arguments
    ///
    /// * `path` - Capture file
    /// * `repeat` - Restart from the first frame once the last is replayed
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, or `Capture` if a line is
    /// malformed or the file holds no frames.
    pub fn open<P: AsRef<Path>>(path: P, repeat: bool) -> Result<Self> {
        let path = path.as_ref();
        let source = Self::parse(&fs::read_to_string(path)?, repeat)?;
        info!(
            "Loaded {} frames from {}{}",
            source.len(),
            path.display(),
            if repeat { " (repeating)" } else { "" }
        );
        Ok(source)
    }

    /// Parse capture text.
    ///
    /// # Errors
    ///
    /// Returns `Capture` naming the first malformed line, or if no frames are found.
    pub fn parse(text: &str, repeat: bool) -> Result<Self> {
        let mut frames = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let frame = parse_hex(line).map_err(|reason| {
                RemapError::Capture(format!("line {}: {}", index + 1, reason))
            })?;
            frames.push(frame);
        }

        if frames.is_empty() {
            return Err(RemapError::Capture("capture contains no frames".to_string()));
        }

        Ok(Self {
            frames,
            cursor: 0,
            repeat,
        })
    }

    /// Number of frames in the capture
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; an empty capture is rejected when parsed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<Bytes>> {
        if self.cursor >= self.frames.len() {
            if !self.repeat {
                return Ok(None);
            }
            self.cursor = 0;
        }
        let frame = self.frames[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(frame))
    }
}

fn parse_hex(line: &str) -> std::result::Result<Bytes, String> {
    // Each token may carry its own prefix: "0x40 0x00" or "0x4000"
    let digits: String = line
        .split_whitespace()
        .map(|token| {
            token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token)
        })
        .collect();

    if digits.is_empty() {
        return Err("no hex digits".to_string());
    }
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = digits.get(i..i + 2).ok_or_else(|| "non-ASCII input".to_string())?;
            u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte '{}'", pair))
        })
        .collect::<std::result::Result<Vec<u8>, String>>()
        .map(Bytes::from)
}
