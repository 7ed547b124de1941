use super::{GeoBBox, GeoPoint, GeoTransform};
use crate::OverlayError;
use anyhow::Result;

/// Relative tolerance when deciding whether four corners still form an
/// axis-aligned rectangle.
const SKEW_TOLERANCE: f64 = 1e-9;

/// The geographic extent of a raster, as four corner points clockwise from
/// the top-left pixel corner.
///
/// A footprint is *projected* when its corners are WGS84 longitude/latitude.
/// An unprojected footprint carries the raster's native coordinates and is
/// used when no CRS or no working reprojection is available.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
	corners: [GeoPoint; 4],
	projected: bool,
}

impl Footprint {
	/// Native (unprojected) footprint of a `width` × `height` raster.
	pub fn from_transform(transform: &GeoTransform, width: u32, height: u32) -> Self {
		Self {
			corners: transform.corners(width, height),
			projected: false,
		}
	}

	/// Replaces the corners, e.g. with their reprojected positions.
	pub fn with_corners(corners: [GeoPoint; 4], projected: bool) -> Result<Self> {
		if let Some(p) = corners.iter().find(|p| !p.is_finite()) {
			return Err(OverlayError::TransformFailed(format!("corner {p:?} is not finite")).into());
		}
		Ok(Self { corners, projected })
	}

	pub fn corners(&self) -> &[GeoPoint; 4] {
		&self.corners
	}

	pub fn is_projected(&self) -> bool {
		self.projected
	}

	/// Axis-aligned envelope of the four corners.
	pub fn bbox(&self) -> GeoBBox {
		let mut bbox = GeoBBox {
			x_min: f64::INFINITY,
			y_min: f64::INFINITY,
			x_max: f64::NEG_INFINITY,
			y_max: f64::NEG_INFINITY,
		};
		for p in &self.corners {
			bbox.include_point(*p);
		}
		bbox
	}

	/// `true` when the corners do not form an axis-aligned rectangle, so that
	/// drawing the envelope distorts the raster.
	pub fn is_skewed(&self) -> bool {
		let [a, b, c, d] = self.corners;
		let bbox = self.bbox();
		let tol_x = bbox.width().abs().max(f64::MIN_POSITIVE) * SKEW_TOLERANCE;
		let tol_y = bbox.height().abs().max(f64::MIN_POSITIVE) * SKEW_TOLERANCE;
		let same = |u: f64, v: f64, tol: f64| (u - v).abs() <= tol;
		!(same(a.y, b.y, tol_y) && same(c.y, d.y, tol_y) && same(a.x, d.x, tol_x) && same(b.x, c.x, tol_x))
	}
}
