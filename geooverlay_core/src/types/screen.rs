use std::fmt::Debug;

/// A position in viewport pixels, origin at the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
	pub x: f64,
	pub y: f64,
}

impl ScreenPoint {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Size of a viewport or a pixel buffer.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScreenSize {
	pub width: u32,
	pub height: u32,
}

impl ScreenSize {
	pub const fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	pub fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}
}

impl Debug for ScreenSize {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}x{}", self.width, self.height)
	}
}

/// An axis-aligned rectangle in viewport pixels. Width and height are never
/// negative.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct ScreenRect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl ScreenRect {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self { x, y, width, height }
	}

	/// Builds the rectangle spanned by two opposite corners in any order.
	pub fn from_corners(a: ScreenPoint, b: ScreenPoint) -> Self {
		let x = a.x.min(b.x);
		let y = a.y.min(b.y);
		Self {
			x,
			y,
			width: a.x.max(b.x) - x,
			height: a.y.max(b.y) - y,
		}
	}

	/// Envelope of `points`, `None` if empty.
	pub fn from_points(points: &[ScreenPoint]) -> Option<Self> {
		let first = points.first()?;
		let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
		for p in &points[1..] {
			x0 = x0.min(p.x);
			y0 = y0.min(p.y);
			x1 = x1.max(p.x);
			y1 = y1.max(p.y);
		}
		Some(Self::from_corners(ScreenPoint::new(x0, y0), ScreenPoint::new(x1, y1)))
	}

	pub fn left(&self) -> f64 {
		self.x
	}

	pub fn top(&self) -> f64 {
		self.y
	}

	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	pub fn is_finite(&self) -> bool {
		self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
	}

	/// `true` for zero-area or non-finite rectangles.
	pub fn is_empty(&self) -> bool {
		!self.is_finite() || self.width <= 0.0 || self.height <= 0.0
	}

	/// `true` if the rectangle has no overlap with `[0, width] × [0, height]`.
	/// Touching an edge does not count as overlap.
	pub fn is_outside(&self, size: ScreenSize) -> bool {
		self.right() <= 0.0
			|| self.bottom() <= 0.0
			|| self.left() >= f64::from(size.width)
			|| self.top() >= f64::from(size.height)
	}

	/// Pixel dimensions of a buffer covering this rectangle, at least 1×1.
	pub fn pixel_size(&self) -> ScreenSize {
		let px = |v: f64| if v.is_finite() { v.round().clamp(1.0, f64::from(u32::MAX)) as u32 } else { 1 };
		ScreenSize::new(px(self.width), px(self.height))
	}

	/// `true` if `other` has the same pixel dimensions, so it only differs
	/// by a translation.
	pub fn same_size(&self, other: &ScreenRect) -> bool {
		self.pixel_size() == other.pixel_size()
	}

	pub fn translated(&self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy, self.width, self.height)
	}
}

impl Debug for ScreenRect {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "ScreenRect({}, {}, {}x{})", self.x, self.y, self.width, self.height)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn corners_are_normalized() {
		let rect = ScreenRect::from_corners(ScreenPoint::new(50.0, 10.0), ScreenPoint::new(10.0, 40.0));
		assert_eq!(rect, ScreenRect::new(10.0, 10.0, 40.0, 30.0));
		assert_eq!(rect.right(), 50.0);
		assert_eq!(rect.bottom(), 40.0);
		assert!(ScreenRect::from_points(&[]).is_none());
	}

	#[rstest]
	#[case(ScreenRect::new(10.0, 10.0, 20.0, 20.0), false)]
	#[case(ScreenRect::new(-50.0, -50.0, 60.0, 60.0), false)]
	#[case(ScreenRect::new(-50.0, 10.0, 50.0, 20.0), true)]
	#[case(ScreenRect::new(100.0, 10.0, 50.0, 20.0), true)]
	#[case(ScreenRect::new(10.0, 100.0, 50.0, 20.0), true)]
	#[case(ScreenRect::new(10.0, -30.0, 50.0, 20.0), true)]
	#[case(ScreenRect::new(-1000.0, -1000.0, 3000.0, 3000.0), false)]
	fn outside(#[case] rect: ScreenRect, #[case] expected: bool) {
		assert_eq!(rect.is_outside(ScreenSize::new(100, 100)), expected);
	}

	#[test]
	fn pixel_size_is_at_least_one() {
		assert_eq!(ScreenRect::new(0.0, 0.0, 0.2, 10.6).pixel_size(), ScreenSize::new(1, 11));
		assert_eq!(ScreenRect::new(0.0, 0.0, f64::NAN, 3.0).pixel_size(), ScreenSize::new(1, 3));
		assert!(ScreenRect::new(0.0, 0.0, 0.0, 3.0).is_empty());
		assert!(ScreenRect::new(0.0, 0.0, 10.0, 10.0).same_size(&ScreenRect::new(5.0, 7.0, 10.2, 9.9)));
	}
}
