use std::fmt::Debug;

/// A point in geographic or projected coordinates.
///
/// `x` is the easting or longitude, `y` the northing or latitude.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct GeoPoint {
	pub x: f64,
	pub y: f64,
}

impl GeoPoint {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Builds a point from latitude/longitude order, as humans usually write it.
	pub const fn from_lat_lon(lat: f64, lon: f64) -> Self {
		Self { x: lon, y: lat }
	}

	pub fn lon(&self) -> f64 {
		self.x
	}

	pub fn lat(&self) -> f64 {
		self.y
	}

	pub fn is_finite(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

impl Debug for GeoPoint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "GeoPoint({}, {})", self.x, self.y)
	}
}

impl From<(f64, f64)> for GeoPoint {
	fn from((x, y): (f64, f64)) -> Self {
		Self { x, y }
	}
}

impl From<GeoPoint> for (f64, f64) {
	fn from(p: GeoPoint) -> Self {
		(p.x, p.y)
	}
}
