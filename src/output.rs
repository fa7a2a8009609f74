// JSON-lines event sink: one object per line, `{"event": n, "nuclei": [...]}`
use crate::error::Result;
use crate::nucleus::Nucleus;
use crate::system::Event;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    event: u64,
    nuclei: &'a [Nucleus],
}

/// Owned form of one output line, for reading files back.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoredEvent {
    pub event: u64,
    pub nuclei: Vec<Nucleus>,
}

pub struct EventWriter<W: Write> {
    writer: W,
    written: u64,
}

impl EventWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> EventWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Append one event. Events are numbered in the order they are written.
    pub fn write(&mut self, event: &Event) -> Result<()> {
        let record = EventRecord {
            event: self.written,
            nuclei: &event.nuclei,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
