//! Raster access for the overlay engine.
//!
//! A [`RasterSource`] exposes the pixel grid, georeferencing and bands of an
//! opened raster. Two backends exist: a pure-Rust GeoTIFF reader
//! ([`TiffRaster`]) and, with the `gdal` feature, a GDAL dataset
//! (`GdalRaster`). [`GeoReprojector`] moves footprint corners from the raster
//! CRS to WGS84.

mod band_mapping;
pub use band_mapping::*;

mod crs;
pub use crs::*;

mod decode;
pub use decode::*;

mod drivers;
pub use drivers::*;

mod geokeys;

mod open;
pub use open::*;

mod reproject;
pub use reproject::*;

mod source;
pub use source::*;

mod tiff_raster;
pub use tiff_raster::*;

#[cfg(feature = "gdal")]
mod gdal_raster;
#[cfg(feature = "gdal")]
pub use gdal_raster::*;

#[cfg(any(test, feature = "test"))]
mod memory_raster;
#[cfg(any(test, feature = "test"))]
pub use memory_raster::*;

#[cfg(any(test, feature = "test"))]
pub mod fixtures;
