//! JSON Lines frame exporter.
//!
//! Streams every rendered frame to a file as it happens, so a run can be
//! replayed or plotted offline without holding the run in memory.
//!
//! Format: the first line is an [`ExportHeader`], every following line is
//! one [`FrameRecord`].

use blocktime_core::{DelayPolicy, SimConfig};
use blocktime_env::{EnvError, FrameSink, Position, RenderFrame};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

/// A single recorded tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub tick: u64,
    pub leader: Position,
    pub follower: Position,
    pub refreshed: bool,
    pub synced: bool,
}

impl From<&RenderFrame> for FrameRecord {
    fn from(frame: &RenderFrame) -> Self {
        Self {
            tick: frame.tick,
            leader: frame.leader,
            follower: frame.follower,
            refreshed: frame.refreshed,
            synced: frame.follower_synced,
        }
    }
}

/// First line of an export: what produced the frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportHeader {
    /// Input source description (path name or "mouse")
    pub source: String,

    /// Configuration the run used
    pub config: SimConfig,

    /// Tick counts derived from the configuration
    pub policy: DelayPolicy,
}

impl ExportHeader {
    pub fn new(source: &str, config: SimConfig, policy: DelayPolicy) -> Self {
        Self {
            source: source.to_string(),
            config,
            policy,
        }
    }
}

/// Streaming sink: one JSON line per frame, nothing retained.
pub struct FrameWriter<W: Write> {
    writer: W,
    frames: u64,
}

impl FrameWriter<BufWriter<File>> {
    /// Creates (truncates) `path` and writes the header line.
    pub fn create(path: &str, header: &ExportHeader) -> io::Result<Self> {
        Self::new(BufWriter::new(File::create(path)?), header)
    }
}

impl<W: Write> FrameWriter<W> {
    /// Writes the header line to `writer`.
    pub fn new(mut writer: W, header: &ExportHeader) -> io::Result<Self> {
        serde_json::to_writer(&mut writer, header)?;
        writer.write_all(b"\n")?;
        Ok(Self { writer, frames: 0 })
    }

    /// Frames written so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> FrameSink for FrameWriter<W> {
    fn render(&mut self, frame: &RenderFrame) -> Result<(), EnvError> {
        serde_json::to_writer(&mut self.writer, &FrameRecord::from(frame)).map_err(io::Error::from)?;
        self.writer.write_all(b"\n")?;
        self.frames += 1;
        Ok(())
    }
}

/// A whole export loaded back into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameExport {
    pub header: ExportHeader,
    pub frames: Vec<FrameRecord>,
}

impl FrameExport {
    /// Parses an export from any reader.
    pub fn read_from<R: Read>(reader: R) -> io::Result<Self> {
        let mut lines = BufReader::new(reader).lines();
        let header_line = lines
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "missing export header"))??;
        let header: ExportHeader = serde_json::from_str(&header_line)?;

        let mut frames = Vec::new();
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            frames.push(serde_json::from_str(&line)?);
        }
        Ok(Self { header, frames })
    }

    /// Reads an export back from a file.
    pub fn read_from_file(path: &str) -> io::Result<Self> {
        Self::read_from(File::open(path)?)
    }

    /// Number of follower refreshes recorded.
    pub fn refresh_count(&self) -> usize {
        self.frames.iter().filter(|f| f.refreshed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> ExportHeader {
        let config = SimConfig::default();
        let policy = config.delay_policy().unwrap();
        ExportHeader::new("circle", config, policy)
    }

    fn frame(tick: u64) -> RenderFrame {
        RenderFrame {
            tick,
            leader: Position::new(tick as i32, 0),
            follower: Position::ORIGIN,
            refreshed: tick == 2,
            follower_synced: false,
        }
    }

    #[test]
    fn test_streams_one_line_per_frame() {
        let mut writer = FrameWriter::new(Vec::new(), &header()).unwrap();
        for tick in 1..=3 {
            writer.render(&frame(tick)).unwrap();
        }
        assert_eq!(writer.frames(), 3);

        let bytes = writer.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 4);

        let export = FrameExport::read_from(text.as_bytes()).unwrap();
        assert_eq!(export.header, header());
        assert_eq!(export.frames.len(), 3);
        assert_eq!(export.frames[2].leader, Position::new(3, 0));
        assert_eq!(export.refresh_count(), 1);
    }

    #[test]
    fn test_line_shape() {
        let mut writer = FrameWriter::new(Vec::new(), &header()).unwrap();
        writer
            .render(&RenderFrame {
                tick: 1,
                leader: Position::new(5, 6),
                follower: Position::ORIGIN,
                refreshed: true,
                follower_synced: false,
            })
            .unwrap();
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        let mut lines = text.lines();

        let head: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(head["source"], "circle");
        assert_eq!(head["policy"]["lag_ticks"], 10);

        let record: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(record["leader"]["x"], 5);
        assert_eq!(record["synced"], false);
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let err = FrameExport::read_from(&b""[..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
