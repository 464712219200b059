//! Line-oriented JSON encoding of command sequences.
//!
//! Each non-blank line holds exactly one [`Record`]. Readers accept `\n` and `\r\n` terminators
//! and skip whitespace-only lines; [`IrWriter`] emits `\r\n`.

use std::io::{BufRead, Write};

use crate::foundation::error::{VisionError, VisionResult};
use crate::ir::command::{Command, Record};

/// Record terminator written by [`IrWriter`].
pub const LINE_TERMINATOR: &str = "\r\n";

/// Parse one line into a raw record.
pub fn decode_record(line: &str) -> VisionResult<Record> {
    let value: serde_json::Value =
        serde_json::from_str(line.trim()).map_err(|e| VisionError::decode(e.to_string()))?;
    if !value.is_object() {
        return Err(VisionError::decode("record must be a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| VisionError::decode(e.to_string()))
}

/// Parse and validate one line.
pub fn decode_command(line: &str) -> VisionResult<Command> {
    Command::from_record(&decode_record(line)?)
}

/// Compact single-line JSON for one command, without terminator.
pub fn encode_command(command: &Command) -> VisionResult<String> {
    let record = command.to_record()?;
    Ok(serde_json::to_string(&record).map_err(anyhow::Error::from)?)
}

/// Iterator over the records of a sequence, yielding `(line_number, command)`.
///
/// Line numbers are 1-based and count skipped blank lines. Read failures surface as
/// [`VisionError::Io`] items.
pub struct RecordReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> RecordReader<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = (usize, VisionResult<Command>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some((self.line_no, decode_command(&line))),
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    return Some((self.line_no, Err(VisionError::decode(e.to_string()))));
                }
                Err(e) => return Some((self.line_no, Err(e.into()))),
            }
        }
    }
}

/// Writes commands as one record per line.
pub struct IrWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> IrWriter<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Append one record.
    pub fn write(&mut self, command: &Command) -> VisionResult<()> {
        let line = encode_command(command)?;
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(LINE_TERMINATOR.as_bytes())?;
        self.written += 1;
        Ok(())
    }

    /// Append every command in order.
    pub fn write_all<'a>(
        &mut self,
        commands: impl IntoIterator<Item = &'a Command>,
    ) -> VisionResult<()> {
        for command in commands {
            self.write(command)?;
        }
        Ok(())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> usize {
        self.written
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> VisionResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ir/codec.rs"]
mod tests;
