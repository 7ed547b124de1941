use super::GeoPoint;
use anyhow::{Result, ensure};
use std::fmt::Debug;

/// An axis-aligned bounding box in geographic or projected coordinates,
/// defined by its minimum and maximum `x` and `y` values.
///
/// Unlike a tile bounding box, the values are not restricted to the
/// longitude/latitude ranges, because a raster without a CRS is described
/// in its native units.
///
/// # Examples
///
/// ```
/// use geooverlay_core::GeoBBox;
///
/// let bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
/// assert_eq!(bbox.width(), 20.0);
/// assert_eq!(bbox.as_tuple(), (-10.0, -5.0, 10.0, 5.0));
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	/// Creates a new `GeoBBox` from `west, south, east, north`.
	///
	/// Fails if a value is not finite or a minimum exceeds its maximum.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		}
		.checked()
	}

	/// Builds the smallest box containing all `points`.
	///
	/// # Examples
	/// ```
	/// use geooverlay_core::{GeoBBox, GeoPoint};
	///
	/// let bbox = GeoBBox::from_points(&[GeoPoint::new(3.0, -1.0), GeoPoint::new(-2.0, 4.0)]).unwrap();
	/// assert_eq!(bbox.as_tuple(), (-2.0, -1.0, 3.0, 4.0));
	/// ```
	pub fn from_points(points: &[GeoPoint]) -> Result<GeoBBox> {
		ensure!(!points.is_empty(), "cannot build a bounding box from zero points");
		let mut bbox = GeoBBox {
			x_min: f64::INFINITY,
			y_min: f64::INFINITY,
			x_max: f64::NEG_INFINITY,
			y_max: f64::NEG_INFINITY,
		};
		for p in points {
			bbox.include_point(*p);
		}
		bbox.checked()
	}

	pub fn include_point(&mut self, p: GeoPoint) {
		self.x_min = self.x_min.min(p.x);
		self.y_min = self.y_min.min(p.y);
		self.x_max = self.x_max.max(p.x);
		self.y_max = self.y_max.max(p.y);
	}

	/// Returns the corners clockwise, starting at the north-west one.
	pub fn corners(&self) -> [GeoPoint; 4] {
		[
			GeoPoint::new(self.x_min, self.y_max),
			GeoPoint::new(self.x_max, self.y_max),
			GeoPoint::new(self.x_max, self.y_min),
			GeoPoint::new(self.x_min, self.y_min),
		]
	}

	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	pub fn center(&self) -> GeoPoint {
		GeoPoint::new((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
	}

	#[must_use]
	pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
		(self.x_min, self.y_min, self.x_max, self.y_max)
	}

	/// Returns the bounding box as a string in the form `x_min,y_min,x_max,y_max`.
	#[must_use]
	pub fn as_string_list(&self) -> String {
		format!("{},{},{},{}", self.x_min, self.y_min, self.x_max, self.y_max)
	}

	fn checked(self) -> Result<Self> {
		ensure!(
			self.x_min.is_finite() && self.y_min.is_finite() && self.x_max.is_finite() && self.y_max.is_finite(),
			"bounding box {:?} contains non-finite values",
			self
		);
		ensure!(
			self.x_min <= self.x_max,
			"x_min ({}) must be <= x_max ({})",
			self.x_min,
			self.x_max
		);
		ensure!(
			self.y_min <= self.y_max,
			"y_min ({}) must be <= y_max ({})",
			self.y_min,
			self.y_max
		);
		Ok(self)
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"GeoBBox({}, {}, {}, {})",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}

impl TryFrom<[f64; 4]> for GeoBBox {
	type Error = anyhow::Error;

	fn try_from(input: [f64; 4]) -> Result<Self> {
		GeoBBox::new(input[0], input[1], input[2], input[3])
	}
}
