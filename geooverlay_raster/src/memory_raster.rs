use crate::{GeoReprojector, RasterOpener, RasterSource, Reproject, source::check_band};
use anyhow::Result;
use geooverlay_core::{GeoPoint, GeoTransform, OverlayError};
use parking_lot::Mutex;
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
};

/// A raster held in memory, with injectable band failures and a read
/// counter. Used to drive decode and engine tests.
#[derive(Debug)]
pub struct MemoryRaster {
	path: PathBuf,
	width: u32,
	height: u32,
	bands: Vec<Vec<u8>>,
	failing_bands: Vec<usize>,
	geo_transform: Option<[f64; 6]>,
	crs: Option<String>,
	reads: AtomicUsize,
}

impl MemoryRaster {
	pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
		Self {
			path: path.into(),
			width,
			height,
			bands: Vec::new(),
			failing_bands: Vec::new(),
			geo_transform: None,
			crs: None,
			reads: AtomicUsize::new(0),
		}
	}

	/// A north-up raster with one band per entry of `bands`, every pixel of
	/// a band set to that value.
	pub fn filled(path: impl Into<PathBuf>, width: u32, height: u32, bands: &[u8]) -> Self {
		let pixel_count = width as usize * height as usize;
		bands.iter().fold(Self::new(path, width, height), |raster, value| {
			raster.with_band(vec![*value; pixel_count])
		})
	}

	pub fn with_band(mut self, data: Vec<u8>) -> Self {
		self.bands.push(data);
		self
	}

	pub fn with_failing_band(mut self, band: usize) -> Self {
		self.failing_bands.push(band);
		self
	}

	pub fn with_geo_transform(mut self, coefficients: [f64; 6]) -> Self {
		self.geo_transform = Some(coefficients);
		self
	}

	pub fn with_crs(mut self, crs: &str) -> Self {
		self.crs = Some(crs.to_string());
		self
	}

	/// Number of band reads served so far.
	pub fn reads(&self) -> usize {
		self.reads.load(Ordering::SeqCst)
	}
}

impl RasterSource for MemoryRaster {
	fn path(&self) -> &Path {
		&self.path
	}

	fn raster_size(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	fn band_count(&self) -> usize {
		self.bands.len()
	}

	fn geo_transform(&self) -> Result<GeoTransform> {
		match self.geo_transform {
			Some(coefficients) => GeoTransform::new(coefficients),
			None => Err(OverlayError::NoGeoTransform(String::from("no transform set")).into()),
		}
	}

	fn crs(&self) -> Option<String> {
		self.crs.clone()
	}

	fn read_band(&self, band: usize) -> Result<Vec<u8>> {
		check_band(self, band)?;
		self.reads.fetch_add(1, Ordering::SeqCst);
		if self.failing_bands.contains(&band) {
			return Err(OverlayError::BandReadFailed {
				band,
				reason: String::from("injected failure"),
			}
			.into());
		}
		Ok(self.bands[band - 1].clone())
	}
}

/// Serves [`MemoryRaster`]s by path. Reprojection can be switched to fail
/// on every transform.
#[derive(Default)]
pub struct MemoryOpener {
	rasters: Mutex<HashMap<PathBuf, Arc<MemoryRaster>>>,
	broken_reprojection: AtomicBool,
	opens: AtomicUsize,
}

impl MemoryOpener {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `raster` under its path, replacing any previous one.
	pub fn insert(&self, raster: MemoryRaster) -> Arc<MemoryRaster> {
		let raster = Arc::new(raster);
		self.rasters.lock().insert(raster.path.clone(), raster.clone());
		raster
	}

	pub fn remove(&self, path: &Path) {
		self.rasters.lock().remove(path);
	}

	pub fn set_reprojection_broken(&self, broken: bool) {
		self.broken_reprojection.store(broken, Ordering::SeqCst);
	}

	/// Number of successful opens so far.
	pub fn opens(&self) -> usize {
		self.opens.load(Ordering::SeqCst)
	}
}

impl RasterOpener for MemoryOpener {
	fn open(&self, path: &Path) -> Result<Arc<dyn RasterSource>> {
		let raster = self.rasters.lock().get(path).cloned();
		match raster {
			Some(raster) => {
				self.opens.fetch_add(1, Ordering::SeqCst);
				Ok(raster)
			}
			None => Err(OverlayError::OpenFailed {
				path: path.to_path_buf(),
				reason: String::from("no such raster"),
			}
			.into()),
		}
	}

	fn reprojector(&self, source_crs: &str) -> Option<GeoReprojector> {
		if self.broken_reprojection.load(Ordering::SeqCst) {
			Some(GeoReprojector::from_backend(source_crs, Box::new(BrokenTransform)))
		} else {
			GeoReprojector::build(source_crs)
		}
	}
}

#[derive(Debug)]
struct BrokenTransform;

impl Reproject for BrokenTransform {
	fn transform_points(&self, points: &[GeoPoint]) -> Result<Vec<GeoPoint>> {
		Err(OverlayError::TransformFailed(format!("refusing to transform {} points", points.len())).into())
	}
}
