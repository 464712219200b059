use std::io::BufRead;
use std::path::Path;

use crate::canvas::contract::Canvas;
use crate::foundation::error::VisionError;
use crate::ir::codec::RecordReader;
use crate::ir::command::{Command, CommandKind};

/// Outcome of a fully successful replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Commands applied.
    pub applied: usize,
    /// Refresh commands among them.
    pub refreshes: usize,
}

impl ReplayStats {
    pub(crate) fn record(&mut self, kind: CommandKind) {
        self.applied += 1;
        if kind == CommandKind::Refresh {
            self.refreshes += 1;
        }
    }
}

/// First failure of a replay. Everything before `line` was applied; nothing after it was attempted.
#[derive(thiserror::Error, Debug)]
#[error("line {line}: {source} ({applied} command(s) applied)")]
pub struct ReplayError {
    /// 1-based line (or sequence position) of the failing record; 0 when the input could not be opened.
    pub line: usize,
    /// Commands applied before the failure.
    pub applied: usize,
    /// Underlying cause.
    #[source]
    pub source: VisionError,
}

/// Sequential, fail-fast replay of command sequences onto one canvas.
#[derive(Debug)]
pub struct Interpreter<C> {
    canvas: C,
}

impl<C: Canvas> Interpreter<C> {
    /// Wrap a canvas.
    pub fn new(canvas: C) -> Self {
        Self { canvas }
    }

    /// Borrow the canvas.
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Mutably borrow the canvas.
    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// Return the canvas.
    pub fn into_canvas(self) -> C {
        self.canvas
    }

    /// Apply already-decoded commands in order.
    pub fn run<I>(&mut self, commands: I) -> Result<ReplayStats, ReplayError>
    where
        I: IntoIterator<Item = Command>,
    {
        self.apply_all(
            commands
                .into_iter()
                .enumerate()
                .map(|(i, c)| (i + 1, Ok(c))),
        )
    }

    /// Decode and apply a line-oriented sequence.
    pub fn interpret<R: BufRead>(&mut self, reader: R) -> Result<ReplayStats, ReplayError> {
        self.apply_all(RecordReader::new(reader))
    }

    /// Decode and apply the sequence stored at `path`.
    pub fn interpret_file(&mut self, path: impl AsRef<Path>) -> Result<ReplayStats, ReplayError> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| ReplayError {
            line: 0,
            applied: 0,
            source: e.into(),
        })?;
        self.interpret(std::io::BufReader::new(file))
    }

    fn apply_all<I>(&mut self, records: I) -> Result<ReplayStats, ReplayError>
    where
        I: IntoIterator<Item = (usize, Result<Command, VisionError>)>,
    {
        let mut stats = ReplayStats::default();
        for (line, decoded) in records {
            let applied = stats.applied;
            let fail = |source| ReplayError {
                line,
                applied,
                source,
            };
            let command = decoded.map_err(fail)?;
            command.apply(&mut self.canvas).map_err(fail)?;
            tracing::debug!(line, cmd = %command.kind(), "applied");
            stats.record(command.kind());
        }
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interpret/replay.rs"]
mod tests;
