//! Render-sink seam.
//!
//! The visualization layer is an external collaborator: it receives each
//! assembled [`Snapshot`] through this trait and owns everything visual
//! (tiles, markers, legends). The JSON-lines sink here is the minimal
//! built-in consumer used by the binary.

use std::io::{self, Write};

use crate::snapshot::Snapshot;

/// Consumer of assembled snapshots.
pub trait RenderSink: Send {
    fn render(&mut self, snapshot: &Snapshot) -> anyhow::Result<()>;
}

/// Writes each snapshot as one JSON document per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> RenderSink for JsonLinesSink<W> {
    fn render(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, snapshot)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::snapshot::assemble;

    #[test]
    fn test_json_lines_sink_writes_one_line_per_snapshot() {
        let snapshot = assemble(Vec::new(), Utc::now());
        let mut buffer = Vec::new();

        {
            let mut sink = JsonLinesSink::new(&mut buffer);
            sink.render(&snapshot).unwrap();
            sink.render(&snapshot).unwrap();
        }

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 2);
        let parsed: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert!(parsed.get("captured_at").is_some());
        assert!(parsed["events"].as_array().unwrap().is_empty());
    }
}
