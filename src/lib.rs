//! Vision is a small protocol for 2D vector drawing.
//!
//! A fixed set of six canvas operations is exposed three ways:
//!
//! - Directly, through the [`Canvas`] trait and its `vello_cpu` implementation [`RasterCanvas`]
//! - As a line-oriented JSON sequence replayed by the [`Interpreter`]
//! - As remote procedures served by [`RenderService`] and called through [`RenderClient`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Drawing contract, raster backend and frame observers.
pub mod canvas;
/// Configuration loading and overrides.
pub mod config;
/// Local sequence interpreter.
pub mod interpret;
/// Command records and their text encoding.
pub mod ir;
/// Render service, client and wire protocol.
pub mod service;

pub use crate::foundation::core::{Color, FrameRGBA, Point};
pub use crate::foundation::error::{VisionError, VisionResult};

pub use crate::canvas::contract::Canvas;
pub use crate::canvas::observer::{FrameExporter, FrameObserver, InMemoryFrames, write_png};
pub use crate::canvas::params::{Circle, Line, Polygon, Polyline, Rect, Refresh};
pub use crate::canvas::raster::{DEFAULT_MAX_PIXELS, RasterCanvas, RasterCanvasOpts};
pub use crate::config::{CanvasConfig, ServiceConfig, VisionConfig};
pub use crate::interpret::replay::{Interpreter, ReplayError, ReplayStats};
pub use crate::ir::codec::{IrWriter, RecordReader, decode_command, encode_command};
pub use crate::ir::command::{Command, CommandKind, Record};
pub use crate::service::client::RenderClient;
pub use crate::service::server::RenderService;
