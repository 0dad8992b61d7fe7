//! Writes transcoded frames as JSON lines.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;

use super::{FrameRecord, FrameSink};
use crate::error::Result;

/// Output name that selects stdout
pub const STDOUT: &str = "-";

/// One JSON object per frame, flushed after every line.
#[derive(Debug)]
pub struct JsonlSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonlSink<W> {
    /// Wraps a writer; nothing is written until the first frame
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink, returning the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonlSink<Box<dyn Write + Send>> {
    /// Open `output` for writing, where `"-"` means stdout.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be created
    pub fn create(output: &str) -> Result<Self> {
        let writer: Box<dyn Write + Send> = if output == STDOUT {
            Box::new(io::stdout())
        } else {
            info!("Writing frames to {}", output);
            Box::new(BufWriter::new(File::create(output)?))
        };
        Ok(Self::new(writer))
    }
}

impl<W: Write + Send> FrameSink for JsonlSink<W> {
    fn write_frame(&mut self, record: &FrameRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::transcoder::DestFrame;
    use crate::error::RemapError;

    fn record(seq: u64) -> FrameRecord {
        FrameRecord::new(
            seq,
            &DestFrame {
                buttons: 0x0008,
                axes: [208, 128, 128, 128, 0, 0],
            },
        )
    }

    #[test]
    fn test_one_line_per_frame() {
        let mut sink = JsonlSink::new(Vec::new());
        sink.write_frame(&record(0)).unwrap();
        sink.write_frame(&record(1)).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(value["seq"], 1);
        assert_eq!(value["buttons"], 8);
        assert_eq!(value["axes"], serde_json::json!([208, 128, 128, 128, 0, 0]));
        assert_eq!(value["pad"]["buttons"], 0x2000);
        assert_eq!(value["pad"]["stick_x"], 120);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.jsonl");
        let mut sink = JsonlSink::create(path.to_str().unwrap()).unwrap();
        sink.write_frame(&record(0)).unwrap();
        drop(sink);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_create_in_missing_directory() {
        assert!(matches!(
            JsonlSink::create("/nonexistent/dir/frames.jsonl"),
            Err(RemapError::Io(_))
        ));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error_propagates() {
        let mut sink = JsonlSink::new(FailingWriter);
        assert!(sink.write_frame(&record(0)).is_err());
    }
}
