//! # geooverlay
//!
//! Draws a GeoTIFF on top of a pannable, zoomable map and keeps it aligned.
//!
//! The raster's geotransform and CRS give its footprint, which is
//! reprojected to WGS84 and placed on the viewport through the viewport's
//! own projection. The pixels are only decoded and scaled again when the
//! zoom level changes.
//!
//! ```no_run
//! use geooverlay::{core::*, engine::*};
//! use std::sync::Arc;
//!
//! let viewport = Arc::new(MapViewport::new(GeoPoint::new(13.4, 52.5), 10.0, ScreenSize::new(800, 600)));
//! let mut overlay = OverlayEngine::new(CanvasSurface::new(ScreenSize::new(800, 600)), OverlayConfig::default());
//! overlay.attach_viewport(&viewport);
//! overlay.set_source("file:///data/berlin.tif").unwrap();
//!
//! viewport.pan_by(100.0, 0.0);
//! overlay.pump_events();
//! overlay.render();
//! ```

pub use geooverlay_core as core;
pub use geooverlay_engine as engine;
pub use geooverlay_image as image;
pub use geooverlay_raster as raster;
