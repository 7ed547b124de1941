use anyhow::Result;
use geooverlay_core::{GeoBBox, GeoTransform, OverlayError};
use std::{
	fmt::{self, Debug, Display},
	path::{Path, PathBuf},
};

/// An opened raster: pixel grid, georeferencing and bands.
///
/// Bands are numbered from 1. Every band read yields one byte per pixel in
/// row-major order, whatever the stored sample type.
pub trait RasterSource: Send + Sync + Debug {
	fn path(&self) -> &Path;

	/// Pixel width and height, both greater than zero.
	fn raster_size(&self) -> (u32, u32);

	fn band_count(&self) -> usize;

	fn geo_transform(&self) -> Result<GeoTransform>;

	/// CRS definition as EPSG code, WKT or PROJ string. `None` if the raster
	/// carries no usable CRS.
	fn crs(&self) -> Option<String>;

	fn read_band(&self, band: usize) -> Result<Vec<u8>>;

	/// Reads several bands. Backends that decode all bands at once override
	/// this to decode only once.
	fn read_bands(&self, bands: &[usize]) -> Vec<Result<Vec<u8>>> {
		bands.iter().map(|band| self.read_band(*band)).collect()
	}

	/// Stored sample type, e.g. `u8` or `f32`.
	fn sample_type(&self) -> String {
		String::from("u8")
	}

	fn info(&self) -> RasterInfo {
		let (width, height) = self.raster_size();
		let geo_transform = self.geo_transform().ok();
		RasterInfo {
			path: self.path().to_path_buf(),
			width,
			height,
			band_count: self.band_count(),
			sample_type: self.sample_type(),
			crs: self.crs(),
			bounds: geo_transform.map(|gt| {
				geooverlay_core::Footprint::from_transform(&gt, width, height).bbox()
			}),
			geo_transform,
		}
	}
}

/// Checks a band index against the band count of `source`.
pub(crate) fn check_band(source: &dyn RasterSource, band: usize) -> Result<()> {
	if band == 0 || band > source.band_count() {
		return Err(OverlayError::BandReadFailed {
			band,
			reason: format!("band index out of range 1..={}", source.band_count()),
		}
		.into());
	}
	Ok(())
}

/// Metadata summary of a raster, as shown by `probe`.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterInfo {
	pub path: PathBuf,
	pub width: u32,
	pub height: u32,
	pub band_count: usize,
	pub sample_type: String,
	pub crs: Option<String>,
	pub geo_transform: Option<GeoTransform>,
	/// Envelope in native CRS units.
	pub bounds: Option<GeoBBox>,
}

impl Display for RasterInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "file:       {}", self.path.display())?;
		writeln!(f, "size:       {}x{}", self.width, self.height)?;
		writeln!(f, "bands:      {} ({})", self.band_count, self.sample_type)?;
		match crate::BandMapping::from_band_count(self.band_count) {
			Ok(mapping) => writeln!(f, "layout:     {}", mapping.layout_name())?,
			Err(_) => writeln!(f, "layout:     unsupported")?,
		}
		match &self.crs {
			Some(crs) => writeln!(f, "crs:        {crs}")?,
			None => writeln!(f, "crs:        none")?,
		}
		match &self.geo_transform {
			Some(gt) => {
				writeln!(f, "transform:  {:?}", gt.coefficients())?;
				if gt.is_rotated() {
					writeln!(f, "            rotated, drawn as bounding box")?;
				}
			}
			None => writeln!(f, "transform:  none")?,
		}
		match &self.bounds {
			Some(bbox) => write!(f, "bounds:     {}", bbox.as_string_list()),
			None => write!(f, "bounds:     unknown"),
		}
	}
}
