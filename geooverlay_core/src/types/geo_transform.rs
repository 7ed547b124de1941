use super::GeoPoint;
use crate::OverlayError;
use anyhow::Result;

/// Affine pixel-to-world transform of a raster, in GDAL coefficient order:
///
/// ```text
/// x = c[0] + col * c[1] + row * c[2]
/// y = c[3] + col * c[4] + row * c[5]
/// ```
///
/// For north-up rasters `c[2]` and `c[4]` are zero and `c[5]` is negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoTransform {
	coefficients: [f64; 6],
}

impl GeoTransform {
	/// Validates the coefficients. A transform is rejected if any coefficient
	/// is not finite, if a pixel dimension is zero, or if the matrix is not
	/// invertible.
	pub fn new(coefficients: [f64; 6]) -> Result<Self> {
		let [_, a, b, _, d, e] = coefficients;
		if coefficients.iter().any(|c| !c.is_finite()) {
			return Err(OverlayError::NoGeoTransform(format!("non-finite coefficients {coefficients:?}")).into());
		}
		if a == 0.0 || e == 0.0 {
			return Err(OverlayError::NoGeoTransform(format!("zero pixel size in {coefficients:?}")).into());
		}
		if a * e - b * d == 0.0 {
			return Err(OverlayError::NoGeoTransform(format!("singular transform {coefficients:?}")).into());
		}
		Ok(Self { coefficients })
	}

	pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Result<Self> {
		Self::new([origin_x, pixel_width, 0.0, origin_y, 0.0, pixel_height])
	}

	pub fn coefficients(&self) -> [f64; 6] {
		self.coefficients
	}

	pub fn origin(&self) -> GeoPoint {
		GeoPoint::new(self.coefficients[0], self.coefficients[3])
	}

	pub fn pixel_width(&self) -> f64 {
		self.coefficients[1]
	}

	pub fn pixel_height(&self) -> f64 {
		self.coefficients[5]
	}

	pub fn is_rotated(&self) -> bool {
		self.coefficients[2] != 0.0 || self.coefficients[4] != 0.0
	}

	pub fn pixel_to_geo(&self, col: f64, row: f64) -> GeoPoint {
		let c = &self.coefficients;
		GeoPoint::new(
			c[0] + col * c[1] + row * c[2],
			c[3] + col * c[4] + row * c[5],
		)
	}

	/// Inverse of [`pixel_to_geo`](Self::pixel_to_geo), returns `(col, row)`.
	pub fn geo_to_pixel(&self, p: GeoPoint) -> (f64, f64) {
		let [x0, a, b, y0, d, e] = self.coefficients;
		let det = a * e - b * d;
		let dx = p.x - x0;
		let dy = p.y - y0;
		((e * dx - b * dy) / det, (a * dy - d * dx) / det)
	}

	/// World positions of the outer pixel corners, clockwise from the
	/// top-left corner of pixel `(0, 0)`.
	pub fn corners(&self, width: u32, height: u32) -> [GeoPoint; 4] {
		let w = f64::from(width);
		let h = f64::from(height);
		[
			self.pixel_to_geo(0.0, 0.0),
			self.pixel_to_geo(w, 0.0),
			self.pixel_to_geo(w, h),
			self.pixel_to_geo(0.0, h),
		]
	}
}

impl TryFrom<&[f64]> for GeoTransform {
	type Error = anyhow::Error;

	fn try_from(values: &[f64]) -> Result<Self> {
		let coefficients: [f64; 6] = values.try_into().map_err(|_| {
			OverlayError::NoGeoTransform(format!("expected 6 coefficients, got {}", values.len()))
		})?;
		Self::new(coefficients)
	}
}
