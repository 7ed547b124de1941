//! Keeps a georeferenced raster aligned on top of a map viewport.
//!
//! The [`OverlayEngine`] opens a raster, computes its WGS84 footprint and
//! follows the events of a [`Viewport`](geooverlay_core::Viewport). It
//! publishes a composited buffer and its screen rectangle to a
//! [`RenderSurface`], rebuilding the buffer only when the zoom changes.

mod compose;
pub use compose::*;

mod config;
pub use config::*;

mod engine;
pub use engine::*;

mod job;
pub use job::CancelToken;

mod state;
pub use state::*;

mod surface;
pub use surface::*;
