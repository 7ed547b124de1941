use crate::{GeoReprojector, RasterSource, init_drivers};
use anyhow::Result;
use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

/// Turns a source location into a local path. Accepts plain paths and
/// `file://` URIs.
pub fn resolve_location(location: &str) -> PathBuf {
	let location = location.trim();
	match location.strip_prefix("file://") {
		Some(rest) => PathBuf::from(rest.strip_prefix("localhost").unwrap_or(rest)),
		None => PathBuf::from(location),
	}
}

/// Opens rasters and builds their reprojection. The engine owns one opener
/// and asks it for every source change and reload.
pub trait RasterOpener: Send + Sync {
	fn open(&self, path: &Path) -> Result<Arc<dyn RasterSource>>;

	fn reprojector(&self, source_crs: &str) -> Option<GeoReprojector> {
		GeoReprojector::build(source_crs)
	}
}

/// Opens files with the best available backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultOpener;

impl RasterOpener for DefaultOpener {
	fn open(&self, path: &Path) -> Result<Arc<dyn RasterSource>> {
		open_raster(path)
	}
}

#[cfg(feature = "gdal")]
pub fn open_raster(path: &Path) -> Result<Arc<dyn RasterSource>> {
	init_drivers();
	Ok(Arc::new(crate::GdalRaster::open(path)?))
}

#[cfg(not(feature = "gdal"))]
pub fn open_raster(path: &Path) -> Result<Arc<dyn RasterSource>> {
	init_drivers();
	Ok(Arc::new(crate::TiffRaster::open(path)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures::GeoTiffFixture;
	use geooverlay_core::OverlayError;
	use rstest::rstest;

	#[rstest]
	#[case("/data/a.tif", "/data/a.tif")]
	#[case("file:///data/a.tif", "/data/a.tif")]
	#[case("file://localhost/data/a.tif", "/data/a.tif")]
	#[case("  relative/b.tif ", "relative/b.tif")]
	fn locations(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(resolve_location(input), PathBuf::from(expected));
	}

	#[test]
	fn default_opener() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("a.tif");
		GeoTiffFixture::new(2, 2, 1).write(&path)?;
		let raster = DefaultOpener.open(&path)?;
		assert_eq!(raster.raster_size(), (2, 2));

		let err = DefaultOpener.open(&dir.path().join("b.tif")).unwrap_err();
		assert!(matches!(OverlayError::find(&err), Some(OverlayError::OpenFailed { .. })));
		Ok(())
	}
}
