use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canvas::contract::Canvas;
use crate::canvas::params::{
    Circle, Line, Polygon, Polyline, Rect, Refresh, ensure_min_points,
};
use crate::foundation::error::{VisionError, VisionResult};

/// The fixed set of canvas operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Clear or resize the frame buffer.
    Refresh,
    /// Straight segment.
    Line,
    /// Circle outline or disc.
    Circle,
    /// Center-anchored rectangle.
    Rect,
    /// Connected segments; streamed over the network.
    Polyline,
    /// Filled closed polygon.
    Polygon,
}

impl CommandKind {
    /// Dispatch table, in canonical order.
    pub const ALL: [CommandKind; 6] = [
        CommandKind::Refresh,
        CommandKind::Line,
        CommandKind::Circle,
        CommandKind::Rect,
        CommandKind::Polyline,
        CommandKind::Polygon,
    ];

    /// Record and procedure name.
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Refresh => "refresh",
            CommandKind::Line => "line",
            CommandKind::Circle => "circle",
            CommandKind::Rect => "rect",
            CommandKind::Polyline => "polyline",
            CommandKind::Polygon => "polygon",
        }
    }

    /// Resolve a record name; names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Whether the network procedure is client-streaming rather than unary.
    pub fn is_streaming(self) -> bool {
        matches!(self, CommandKind::Polyline)
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One IR record as it appears on a line: `{"cmd": <name>, "param": {...}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    /// Operation name.
    pub cmd: String,
    /// Operation parameters; missing and `null` both mean "no parameters".
    #[serde(default)]
    pub param: Value,
}

/// A decoded, validated operation ready for dispatch.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// See [`Canvas::refresh`].
    Refresh(Refresh),
    /// See [`Canvas::line`].
    Line(Line),
    /// See [`Canvas::circle`].
    Circle(Circle),
    /// See [`Canvas::rect`].
    Rect(Rect),
    /// See [`Canvas::polyline`].
    Polyline(Polyline),
    /// See [`Canvas::polygon`].
    Polygon(Polygon),
}

impl Command {
    /// Operation this command invokes.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Refresh(_) => CommandKind::Refresh,
            Command::Line(_) => CommandKind::Line,
            Command::Circle(_) => CommandKind::Circle,
            Command::Rect(_) => CommandKind::Rect,
            Command::Polyline(_) => CommandKind::Polyline,
            Command::Polygon(_) => CommandKind::Polygon,
        }
    }

    /// Invoke the matching canvas operation.
    pub fn apply<C: Canvas + ?Sized>(&self, canvas: &mut C) -> VisionResult<()> {
        match self {
            Command::Refresh(p) => canvas.refresh(p),
            Command::Line(p) => canvas.line(p),
            Command::Circle(p) => canvas.circle(p),
            Command::Rect(p) => canvas.rect(p),
            Command::Polyline(p) => canvas.polyline(p),
            Command::Polygon(p) => canvas.polygon(p),
        }
    }

    /// Validate a raw record against the dispatch table.
    pub fn from_record(record: &Record) -> VisionResult<Self> {
        let kind = CommandKind::from_name(&record.cmd)
            .ok_or_else(|| VisionError::UnknownCommand(record.cmd.clone()))?;
        let param = match &record.param {
            Value::Null => Value::Object(serde_json::Map::new()),
            Value::Object(_) => record.param.clone(),
            other => {
                return Err(VisionError::invalid_parameter(
                    kind.name(),
                    format!("param must be an object, got {}", json_type(other)),
                ));
            }
        };

        Ok(match kind {
            CommandKind::Refresh => Command::Refresh(parse(kind, param)?),
            CommandKind::Line => Command::Line(parse(kind, param)?),
            CommandKind::Circle => Command::Circle(parse(kind, param)?),
            CommandKind::Rect => Command::Rect(parse(kind, param)?),
            CommandKind::Polyline => {
                let p: Polyline = parse(kind, param)?;
                ensure_min_points(kind.name(), &p.points, Polyline::MIN_POINTS)?;
                Command::Polyline(p)
            }
            CommandKind::Polygon => {
                let p: Polygon = parse(kind, param)?;
                ensure_min_points(kind.name(), &p.points, Polygon::MIN_POINTS)?;
                Command::Polygon(p)
            }
        })
    }

    /// Build the record form with every parameter present.
    pub fn to_record(&self) -> VisionResult<Record> {
        let param = match self {
            Command::Refresh(p) => serde_json::to_value(p),
            Command::Line(p) => serde_json::to_value(p),
            Command::Circle(p) => serde_json::to_value(p),
            Command::Rect(p) => serde_json::to_value(p),
            Command::Polyline(p) => serde_json::to_value(p),
            Command::Polygon(p) => serde_json::to_value(p),
        }
        .map_err(anyhow::Error::from)?;
        Ok(Record {
            cmd: self.kind().name().to_owned(),
            param,
        })
    }
}

fn parse<T: DeserializeOwned>(kind: CommandKind, param: Value) -> VisionResult<T> {
    serde_json::from_value(param)
        .map_err(|e| VisionError::invalid_parameter(kind.name(), e.to_string()))
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ir/command.rs"]
mod tests;
