//! The drawing contract and its CPU raster implementation.
//!
//! Operations are applied to a [`contract::Canvas`] in call order; frames leave the canvas only
//! through a [`observer::FrameObserver`] or [`contract::Canvas::snapshot`].

/// The six-operation drawing contract.
pub mod contract;
pub(crate) mod geometry;
/// Frame observers invoked before a refresh replaces the frame buffer.
pub mod observer;
/// Parameter shapes of the six operations.
pub mod params;
/// `vello_cpu` implementation of the contract.
pub mod raster;
