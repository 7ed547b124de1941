//! Geometry, georeferencing and viewport primitives shared by the geooverlay crates.

pub mod error;
pub use error::OverlayError;

pub mod types;
pub use types::*;

pub mod viewport;
pub use viewport::*;
