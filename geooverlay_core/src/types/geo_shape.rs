use super::{GeoBBox, GeoPoint};
use anyhow::Result;

/// The area a viewport currently shows, in geographic coordinates.
///
/// Rotated or tilted maps report a polygon, flat maps a rectangle.
#[derive(Clone, Debug, PartialEq)]
pub enum GeoShape {
	Rectangle(GeoBBox),
	Polygon(Vec<GeoPoint>),
}

impl GeoShape {
	pub fn bbox(&self) -> Result<GeoBBox> {
		match self {
			GeoShape::Rectangle(bbox) => Ok(*bbox),
			GeoShape::Polygon(points) => GeoBBox::from_points(points),
		}
	}
}
