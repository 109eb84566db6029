//! Newline-delimited JSON view records.
use std::io::{BufRead, Write};

use crate::emit::{ViewEmitter, ViewRecord};
use crate::error::Result;
use crate::evaluate::View;

/// Writes one [`ViewRecord`] per line.
pub struct JsonLinesEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ViewEmitter for JsonLinesEmitter<W> {
    fn emit(&mut self, view: &View) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &ViewRecord::from(view))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Reads records written by [`JsonLinesEmitter`], skipping blank lines.
pub fn read_json_lines<R: BufRead>(reader: R) -> Result<Vec<ViewRecord>> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
