use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

use crate::canvas::contract::Canvas;
use crate::canvas::params::Line;
use crate::config::ServiceConfig;
use crate::foundation::error::VisionResult;
use crate::ir::command::{Command, CommandKind, Record};
use crate::service::wire::{Ack, ClientMessage, decode_payload, read_frame, write_frame};

/// Network front end exposing the canvas operations as remote procedures.
///
/// All connections share one canvas behind a FIFO-fair [`tokio::sync::Mutex`]; it is the only
/// serialization point. Each connection handles its messages strictly in order.
pub struct RenderService<C> {
    canvas: Arc<Mutex<C>>,
    config: ServiceConfig,
}

impl<C: Canvas + Send + 'static> RenderService<C> {
    /// Wrap a canvas.
    pub fn new(canvas: C, config: ServiceConfig) -> Self {
        Self {
            canvas: Arc::new(Mutex::new(canvas)),
            config,
        }
    }

    /// Shared handle to the canvas, e.g. for inspection after a session.
    pub fn canvas(&self) -> Arc<Mutex<C>> {
        self.canvas.clone()
    }

    /// Serve until the listener fails.
    pub async fn serve(self, listener: TcpListener) -> VisionResult<()> {
        self.serve_with_shutdown(listener, std::future::pending())
            .await
    }

    /// Serve until `shutdown` resolves. Connections already accepted run to completion.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> VisionResult<()>
    where
        F: Future<Output = ()>,
    {
        let workers = Arc::new(Semaphore::new(self.config.max_workers.max(1)));
        let max_payload = self.config.max_message_bytes;
        info!(
            addr = ?listener.local_addr().ok(),
            max_workers = self.config.max_workers,
            max_payload,
            "render service listening"
        );

        tokio::pin!(shutdown);
        loop {
            let permit = tokio::select! {
                _ = &mut shutdown => break,
                permit = workers.clone().acquire_owned() => permit.map_err(anyhow::Error::from)?,
            };
            let (stream, peer) = tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => accepted?,
            };
            let canvas = self.canvas.clone();
            tokio::spawn(async move {
                if let Err(err) = handle_connection(stream, peer, canvas, max_payload).await {
                    warn!(?err, %peer, "connection closed with error");
                }
                drop(permit);
            });
        }

        info!("render service stopped");
        Ok(())
    }
}

#[tracing::instrument(name = "conn", skip_all, fields(%peer))]
async fn handle_connection<C: Canvas + Send>(
    stream: TcpStream,
    peer: SocketAddr,
    canvas: Arc<Mutex<C>>,
    max_payload: usize,
) -> VisionResult<()> {
    stream.set_nodelay(true)?;
    let (mut reader, mut writer) = stream.into_split();
    let mut session = Session {
        canvas,
        stream: None,
    };
    debug!("connected");

    while let Some(payload) = read_frame(&mut reader, max_payload).await? {
        let reply = match decode_payload::<ClientMessage>(&payload) {
            Ok(msg) => session.handle(msg).await,
            Err(err) => {
                warn!(%err, "undecodable message");
                Some(false)
            }
        };
        if let Some(state) = reply {
            write_frame(&mut writer, &Ack { state }).await?;
        }
    }

    if let Some(open) = session.stream.take() {
        warn!(procedure = %open.procedure, segments = open.segments, "stream abandoned without close");
    }
    debug!("disconnected");
    Ok(())
}

struct OpenStream {
    procedure: String,
    segments: usize,
    failed: bool,
}

/// Per-connection protocol state.
struct Session<C> {
    canvas: Arc<Mutex<C>>,
    stream: Option<OpenStream>,
}

impl<C: Canvas + Send> Session<C> {
    /// Returns the acknowledgment to send, if the message expects one.
    async fn handle(&mut self, msg: ClientMessage) -> Option<bool> {
        match msg {
            ClientMessage::Call(record) => Some(self.call(record).await),
            ClientMessage::Open { procedure } => {
                self.open(procedure);
                None
            }
            ClientMessage::Item(body) => {
                self.item(body).await;
                None
            }
            ClientMessage::Close => Some(self.close()),
        }
    }

    async fn call(&mut self, record: Record) -> bool {
        let command = match Command::from_record(&record) {
            Ok(command) => command,
            Err(err) => {
                warn!(cmd = %record.cmd, %err, "rejected call");
                return false;
            }
        };
        let kind = command.kind();
        if kind.is_streaming() {
            warn!(cmd = %kind, "streaming procedure called as unary");
            return false;
        }

        let result = {
            let mut canvas = self.canvas.lock().await;
            command.apply(&mut *canvas)
        };
        match result {
            Ok(()) => {
                debug!(cmd = %kind, "applied");
                true
            }
            Err(err) => {
                warn!(cmd = %kind, %err, "call failed");
                false
            }
        }
    }

    fn open(&mut self, procedure: String) {
        if let Some(open) = self.stream.as_mut() {
            warn!(procedure = %open.procedure, "open while a stream is open; stream marked failed");
            open.failed = true;
            return;
        }
        let streaming = CommandKind::from_name(&procedure).is_some_and(CommandKind::is_streaming);
        if !streaming {
            warn!(%procedure, "open for a non-streaming procedure");
        }
        debug!(%procedure, "stream opened");
        self.stream = Some(OpenStream {
            procedure,
            segments: 0,
            failed: !streaming,
        });
    }

    async fn item(&mut self, body: serde_json::Value) {
        let Some(open) = self.stream.as_mut() else {
            warn!("item without an open stream ignored");
            return;
        };
        if open.failed {
            return;
        }
        let segment: Line = match serde_json::from_value(body) {
            Ok(segment) => segment,
            Err(err) => {
                warn!(segment = open.segments, %err, "undecodable segment; skipping rest of stream");
                open.failed = true;
                return;
            }
        };
        let result = {
            let mut canvas = self.canvas.lock().await;
            canvas.line(&segment)
        };
        match result {
            Ok(()) => open.segments += 1,
            Err(err) => {
                warn!(segment = open.segments, %err, "segment failed; skipping rest of stream");
                open.failed = true;
            }
        }
    }

    fn close(&mut self) -> bool {
        match self.stream.take() {
            Some(open) => {
                debug!(procedure = %open.procedure, segments = open.segments, failed = open.failed, "stream closed");
                !open.failed
            }
            None => {
                warn!("close without an open stream");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/server.rs"]
mod tests;
