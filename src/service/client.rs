use std::io::BufRead;

use serde::Serialize;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::canvas::params::{Circle, Line, Polygon, Polyline, Rect, Refresh, ensure_min_points};
use crate::foundation::error::{VisionError, VisionResult};
use crate::interpret::replay::{ReplayError, ReplayStats};
use crate::ir::codec::RecordReader;
use crate::ir::command::{Command, CommandKind, Record};
use crate::service::wire::{
    Ack, ClientMessage, DEFAULT_MAX_MESSAGE_BYTES, decode_payload, read_frame, write_frame,
};

/// Async client for a [`crate::RenderService`].
///
/// Each method returns the server's acknowledgment: `Ok(false)` means the server rejected the
/// call, `Err` means the call could not be delivered or answered.
pub struct RenderClient {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
}

impl RenderClient {
    /// Connect to a running service.
    pub async fn connect(addr: impl ToSocketAddrs) -> VisionResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        Ok(Self { reader, writer })
    }

    /// Remote [`crate::Canvas::refresh`].
    pub async fn refresh(&mut self, params: &Refresh) -> VisionResult<bool> {
        self.unary(CommandKind::Refresh, params).await
    }

    /// Remote [`crate::Canvas::line`].
    pub async fn line(&mut self, params: &Line) -> VisionResult<bool> {
        self.unary(CommandKind::Line, params).await
    }

    /// Remote [`crate::Canvas::circle`].
    pub async fn circle(&mut self, params: &Circle) -> VisionResult<bool> {
        self.unary(CommandKind::Circle, params).await
    }

    /// Remote [`crate::Canvas::rect`].
    pub async fn rect(&mut self, params: &Rect) -> VisionResult<bool> {
        self.unary(CommandKind::Rect, params).await
    }

    /// Remote [`crate::Canvas::polygon`].
    pub async fn polygon(&mut self, params: &Polygon) -> VisionResult<bool> {
        self.unary(CommandKind::Polygon, params).await
    }

    /// Stream a polyline as independent two-point segments, including the closing segment when
    /// `close` is set.
    pub async fn polyline(&mut self, params: &Polyline) -> VisionResult<bool> {
        ensure_min_points(
            CommandKind::Polyline.name(),
            &params.points,
            Polyline::MIN_POINTS,
        )?;
        self.stream_segments(&params.segments()).await
    }

    /// Stream raw segments through the polyline procedure.
    pub async fn stream_segments(&mut self, segments: &[Line]) -> VisionResult<bool> {
        self.send(&ClientMessage::Open {
            procedure: CommandKind::Polyline.name().to_owned(),
        })
        .await?;
        for segment in segments {
            let body = serde_json::to_value(segment).map_err(anyhow::Error::from)?;
            self.send(&ClientMessage::Item(body)).await?;
        }
        self.send(&ClientMessage::Close).await?;
        self.ack().await
    }

    /// Send any command through its procedure.
    pub async fn call(&mut self, command: &Command) -> VisionResult<bool> {
        match command {
            Command::Polyline(p) => self.polyline(p).await,
            other => {
                let record = other.to_record()?;
                self.send(&ClientMessage::Call(record)).await?;
                self.ack().await
            }
        }
    }

    /// Send a line-oriented sequence record by record, stopping at the first decode error or
    /// rejected call.
    pub async fn replay<R: BufRead>(&mut self, reader: R) -> Result<ReplayStats, ReplayError> {
        let mut stats = ReplayStats::default();
        for (line, decoded) in RecordReader::new(reader) {
            let applied = stats.applied;
            let fail = |source| ReplayError {
                line,
                applied,
                source,
            };
            let command = decoded.map_err(fail)?;
            let kind = command.kind();
            if !self.call(&command).await.map_err(fail)? {
                return Err(fail(VisionError::Rejected(kind.name().to_owned())));
            }
            stats.record(kind);
        }
        Ok(stats)
    }

    async fn unary<P: Serialize>(&mut self, kind: CommandKind, params: &P) -> VisionResult<bool> {
        let param = serde_json::to_value(params).map_err(anyhow::Error::from)?;
        self.send(&ClientMessage::Call(Record {
            cmd: kind.name().to_owned(),
            param,
        }))
        .await?;
        self.ack().await
    }

    async fn send(&mut self, msg: &ClientMessage) -> VisionResult<()> {
        write_frame(&mut self.writer, msg).await
    }

    async fn ack(&mut self) -> VisionResult<bool> {
        let payload = read_frame(&mut self.reader, DEFAULT_MAX_MESSAGE_BYTES)
            .await?
            .ok_or_else(|| VisionError::protocol("connection closed before acknowledgment"))?;
        let ack: Ack = decode_payload(&payload)?;
        Ok(ack.state)
    }
}
