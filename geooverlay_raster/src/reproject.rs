//! Reprojection of footprint corners into WGS84 longitude/latitude.

use crate::CrsDefinition;
use anyhow::{Result, anyhow};
use geooverlay_core::{GeoPoint, OverlayError, WGS84};
use proj4rs::{Proj, transform::transform};
use std::fmt::Debug;

/// A coordinate transformation into WGS84, `x` = longitude, `y` = latitude.
pub trait Reproject: Send + Sync + Debug {
	fn transform_points(&self, points: &[GeoPoint]) -> Result<Vec<GeoPoint>>;
}

/// Transforms point sets from a raster's CRS into WGS84. Immutable once
/// built; a new one is built for every opened raster.
#[derive(Debug)]
pub struct GeoReprojector {
	source_crs: String,
	backend: Box<dyn Reproject>,
}

impl GeoReprojector {
	/// Builds a reprojector for `source_crs`, or returns `None` if the CRS is
	/// empty, unparseable or no transformation can be constructed. Failures
	/// are logged and leave the caller in degraded mode.
	pub fn build(source_crs: &str) -> Option<Self> {
		match Self::try_build(source_crs) {
			Ok(reprojector) => Some(reprojector),
			Err(err) => {
				log::warn!("no reprojection available, using native coordinates: {err:#}");
				None
			}
		}
	}

	pub fn try_build(source_crs: &str) -> Result<Self> {
		if source_crs.trim().is_empty() {
			return Err(OverlayError::NoCrs.into());
		}
		let backend = build_backend(source_crs)?;
		log::debug!("built reprojection {source_crs} -> {WGS84}");
		Ok(Self {
			source_crs: source_crs.to_string(),
			backend,
		})
	}

	/// Wraps a custom transformation.
	pub fn from_backend(source_crs: &str, backend: Box<dyn Reproject>) -> Self {
		Self {
			source_crs: source_crs.to_string(),
			backend,
		}
	}

	pub fn source_crs(&self) -> &str {
		&self.source_crs
	}

	/// Transforms all points or none. Non-finite results count as failure.
	pub fn transform_points(&self, points: &[GeoPoint]) -> Result<Vec<GeoPoint>> {
		let out = self.backend.transform_points(points)?;
		if let Some(p) = out.iter().find(|p| !p.is_finite()) {
			return Err(OverlayError::TransformFailed(format!(
				"{} produced non-finite point {p:?}",
				self.source_crs
			))
			.into());
		}
		Ok(out)
	}
}

#[cfg(feature = "gdal")]
fn build_backend(source_crs: &str) -> Result<Box<dyn Reproject>> {
	match GdalTransform::new(source_crs) {
		Ok(backend) => Ok(Box::new(backend)),
		Err(err) => {
			log::debug!("GDAL cannot build a transformation for {source_crs}: {err:#}");
			proj4rs_backend(source_crs)
		}
	}
}

#[cfg(not(feature = "gdal"))]
fn build_backend(source_crs: &str) -> Result<Box<dyn Reproject>> {
	proj4rs_backend(source_crs)
}

fn proj4rs_backend(source_crs: &str) -> Result<Box<dyn Reproject>> {
	let definition = CrsDefinition::parse(source_crs)
		.ok_or_else(|| OverlayError::TransformBuildFailed(format!("unsupported CRS definition {source_crs:?}")))?;
	if definition.is_wgs84() {
		return Ok(Box::new(Identity));
	}
	Ok(Box::new(Proj4Transform::new(&definition)?))
}

/// Source CRS already is WGS84.
#[derive(Debug)]
struct Identity;

impl Reproject for Identity {
	fn transform_points(&self, points: &[GeoPoint]) -> Result<Vec<GeoPoint>> {
		Ok(points.to_vec())
	}
}

/// Pure-Rust transformation through proj4rs. Geographic coordinates are
/// radians on both ends of `proj4rs::transform`.
struct Proj4Transform {
	definition: String,
	source: Proj,
	target: Proj,
	source_is_geographic: bool,
}

impl Proj4Transform {
	fn new(definition: &CrsDefinition) -> Result<Self> {
		let source_str = definition.proj_string().ok_or_else(|| {
			OverlayError::TransformBuildFailed(format!("{definition} is not in the crs-definitions database"))
		})?;
		let target_str = CrsDefinition::Epsg(4326)
			.proj_string()
			.ok_or_else(|| anyhow!("EPSG:4326 missing from the crs-definitions database"))?;
		let source = Proj::from_proj_string(&source_str).map_err(|e| {
			OverlayError::TransformBuildFailed(format!("invalid projection {definition}: {e:?}"))
		})?;
		let target = Proj::from_proj_string(&target_str)
			.map_err(|e| OverlayError::TransformBuildFailed(format!("invalid WGS84 projection: {e:?}")))?;
		Ok(Self {
			definition: definition.to_string(),
			source,
			target,
			source_is_geographic: is_geographic(&source_str),
		})
	}
}

/// PROJ accepts several aliases for geographic coordinates.
fn is_geographic(proj_string: &str) -> bool {
	proj_string
		.split_whitespace()
		.filter_map(|token| token.strip_prefix("+proj="))
		.any(|name| matches!(name, "longlat" | "latlong" | "lonlat" | "latlon"))
}

impl Debug for Proj4Transform {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Proj4Transform({})", self.definition)
	}
}

impl Reproject for Proj4Transform {
	fn transform_points(&self, points: &[GeoPoint]) -> Result<Vec<GeoPoint>> {
		points
			.iter()
			.map(|p| {
				let mut point = if self.source_is_geographic {
					(p.x.to_radians(), p.y.to_radians(), 0.0)
				} else {
					(p.x, p.y, 0.0)
				};
				transform(&self.source, &self.target, &mut point).map_err(|e| {
					OverlayError::TransformFailed(format!("{} point {p:?}: {e:?}", self.definition))
				})?;
				Ok(GeoPoint::new(point.0.to_degrees(), point.1.to_degrees()))
			})
			.collect()
	}
}

#[cfg(feature = "gdal")]
struct GdalTransform {
	definition: String,
	transform: parking_lot::Mutex<gdal::spatial_ref::CoordTransform>,
}

#[cfg(feature = "gdal")]
impl GdalTransform {
	fn new(source_crs: &str) -> Result<Self> {
		use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};

		crate::init_drivers();
		let mut source = SpatialRef::from_definition(source_crs)
			.map_err(|e| OverlayError::TransformBuildFailed(format!("invalid CRS {source_crs:?}: {e}")))?;
		source.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
		let mut target = SpatialRef::from_epsg(4326)?;
		target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
		let transform = CoordTransform::new(&source, &target)
			.map_err(|e| OverlayError::TransformBuildFailed(format!("{e}")))?;
		Ok(Self {
			definition: source_crs.to_string(),
			transform: parking_lot::Mutex::new(transform),
		})
	}
}

#[cfg(feature = "gdal")]
impl Debug for GdalTransform {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "GdalTransform({})", self.definition)
	}
}

#[cfg(feature = "gdal")]
impl Reproject for GdalTransform {
	fn transform_points(&self, points: &[GeoPoint]) -> Result<Vec<GeoPoint>> {
		let mut xs: Vec<f64> = points.iter().map(|p| p.x).collect();
		let mut ys: Vec<f64> = points.iter().map(|p| p.y).collect();
		let mut zs = vec![0.0; points.len()];
		self
			.transform
			.lock()
			.transform_coords(&mut xs, &mut ys, &mut zs)
			.map_err(|e| OverlayError::TransformFailed(format!("{}: {e}", self.definition)))?;
		Ok(xs.into_iter().zip(ys).map(|(x, y)| GeoPoint::new(x, y)).collect())
	}
}
