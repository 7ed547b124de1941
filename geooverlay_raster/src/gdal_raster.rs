use crate::{RasterSource, source::check_band};
use anyhow::{Context, Result};
use gdal::Dataset;
use geooverlay_core::{GeoTransform, OverlayError};
use parking_lot::Mutex;
use std::{
	fmt::{self, Debug},
	path::{Path, PathBuf},
};

/// A raster opened through GDAL. Reads are serialized on the dataset handle.
pub struct GdalRaster {
	path: PathBuf,
	dataset: Mutex<Dataset>,
	width: u32,
	height: u32,
	band_count: usize,
	sample_type: String,
	geo_transform: Option<[f64; 6]>,
	crs: Option<String>,
}

impl GdalRaster {
	pub fn open(path: &Path) -> Result<Self> {
		crate::init_drivers();
		log::debug!("opening GDAL dataset {}", path.display());
		let dataset = Dataset::open(path).map_err(|err| OverlayError::OpenFailed {
			path: path.to_path_buf(),
			reason: err.to_string(),
		})?;

		let (width, height) = dataset.raster_size();
		let band_count = dataset.raster_count();
		if width == 0 || height == 0 || band_count == 0 {
			return Err(OverlayError::OpenFailed {
				path: path.to_path_buf(),
				reason: format!("empty raster ({width}x{height}, {band_count} bands)"),
			}
			.into());
		}

		let sample_type = dataset
			.rasterband(1)
			.map(|band| format!("{:?}", band.band_type()))
			.unwrap_or_else(|_| String::from("unknown"));
		let geo_transform = dataset.geo_transform().ok();
		let crs = dataset.spatial_ref().ok().and_then(|srs| {
			match (srs.auth_name(), srs.auth_code()) {
				(Ok(name), Ok(code)) => Some(format!("{name}:{code}")),
				_ => srs.to_wkt().ok().filter(|wkt| !wkt.is_empty()),
			}
		});

		log::trace!(
			"opened GDAL dataset {} ({width}x{height}, bands={band_count}, crs={crs:?})",
			path.display()
		);

		Ok(Self {
			path: path.to_path_buf(),
			dataset: Mutex::new(dataset),
			width: width as u32,
			height: height as u32,
			band_count,
			sample_type,
			geo_transform,
			crs,
		})
	}
}

impl Debug for GdalRaster {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "GdalRaster({})", self.path.display())
	}
}

impl RasterSource for GdalRaster {
	fn path(&self) -> &Path {
		&self.path
	}

	fn raster_size(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	fn band_count(&self) -> usize {
		self.band_count
	}

	fn geo_transform(&self) -> Result<GeoTransform> {
		match self.geo_transform {
			Some(coefficients) => GeoTransform::new(coefficients)
				.with_context(|| format!("invalid geotransform in {}", self.path.display())),
			None => Err(OverlayError::NoGeoTransform(format!("{} has no geotransform", self.path.display())).into()),
		}
	}

	fn crs(&self) -> Option<String> {
		self.crs.clone()
	}

	fn read_band(&self, band: usize) -> Result<Vec<u8>> {
		check_band(self, band)?;
		let dataset = self.dataset.lock();
		let buffer = dataset
			.rasterband(band)
			.and_then(|b| b.read_band_as::<u8>())
			.map_err(|err| OverlayError::BandReadFailed {
				band,
				reason: err.to_string(),
			})?;
		Ok(buffer.data().to_vec())
	}

	fn sample_type(&self) -> String {
		self.sample_type.clone()
	}
}
