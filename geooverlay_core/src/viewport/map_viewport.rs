use super::{Viewport, ViewportEvent, ViewportProjector, ViewportSubscription};
use crate::{GeoBBox, GeoPoint, GeoShape, MAX_MERCATOR_LAT, ScreenPoint, ScreenSize, TILE_SIZE};
use parking_lot::RwLock;
use std::f64::consts::PI;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;
const MAX_ZOOM: f64 = 30.0;

#[derive(Clone, Copy, Debug)]
struct ViewState {
	center: GeoPoint,
	zoom: f64,
	size: ScreenSize,
}

/// A flat Web Mercator map view: a center coordinate, a fractional zoom
/// level and a pixel size. At zoom `z` the world is `256 · 2^z` pixels wide.
///
/// All setters take `&self` and notify subscribers, so the viewport can be
/// shared behind an `Arc` by the map widget and any overlays.
#[derive(Debug)]
pub struct MapViewport {
	state: RwLock<ViewState>,
	events: broadcast::Sender<ViewportEvent>,
}

impl MapViewport {
	pub fn new(center: GeoPoint, zoom: f64, size: ScreenSize) -> Self {
		let (events, _) = broadcast::channel(EVENT_CAPACITY);
		Self {
			state: RwLock::new(ViewState {
				center: clamp_center(center),
				zoom: zoom.clamp(0.0, MAX_ZOOM),
				size,
			}),
			events,
		}
	}

	pub fn center(&self) -> GeoPoint {
		self.state.read().center
	}

	pub fn pan_to(&self, center: GeoPoint) {
		let center = clamp_center(center);
		{
			let mut state = self.state.write();
			if state.center == center {
				return;
			}
			state.center = center;
		}
		self.emit(ViewportEvent::RegionChanged);
	}

	/// Moves the view by a pixel offset, as a drag gesture would.
	pub fn pan_by(&self, dx: f64, dy: f64) {
		let state = *self.state.read();
		let (cx, cy) = world_pixel(state.center, state.zoom);
		self.pan_to(world_to_geo(cx + dx, cy + dy, state.zoom));
	}

	pub fn set_zoom(&self, zoom: f64) {
		let zoom = zoom.clamp(0.0, MAX_ZOOM);
		{
			let mut state = self.state.write();
			if state.zoom == zoom {
				return;
			}
			state.zoom = zoom;
		}
		self.emit(ViewportEvent::ZoomChanged);
	}

	pub fn resize(&self, size: ScreenSize) {
		{
			let mut state = self.state.write();
			if state.size == size {
				return;
			}
			state.size = size;
		}
		self.emit(ViewportEvent::SizeChanged);
	}

	/// Inverse of [`from_coordinate`](ViewportProjector::from_coordinate).
	pub fn to_coordinate(&self, point: ScreenPoint) -> GeoPoint {
		let state = *self.state.read();
		let (cx, cy) = world_pixel(state.center, state.zoom);
		world_to_geo(
			cx + point.x - f64::from(state.size.width) / 2.0,
			cy + point.y - f64::from(state.size.height) / 2.0,
			state.zoom,
		)
	}

	fn emit(&self, event: ViewportEvent) {
		log::trace!("viewport event {event:?}");
		// no subscribers is fine
		let _ = self.events.send(event);
	}
}

impl ViewportProjector for MapViewport {
	fn size(&self) -> ScreenSize {
		self.state.read().size
	}

	fn visible_region(&self) -> GeoShape {
		let size = self.size();
		let nw = self.to_coordinate(ScreenPoint::new(0.0, 0.0));
		let se = self.to_coordinate(ScreenPoint::new(f64::from(size.width), f64::from(size.height)));
		GeoShape::Rectangle(GeoBBox {
			x_min: nw.x,
			y_min: se.y,
			x_max: se.x,
			y_max: nw.y,
		})
	}

	fn from_coordinate(&self, coordinate: GeoPoint) -> Option<ScreenPoint> {
		if !coordinate.is_finite() {
			return None;
		}
		let state = *self.state.read();
		let (cx, cy) = world_pixel(state.center, state.zoom);
		let (wx, wy) = world_pixel(coordinate, state.zoom);
		let point = ScreenPoint::new(
			wx - cx + f64::from(state.size.width) / 2.0,
			wy - cy + f64::from(state.size.height) / 2.0,
		);
		(point.x.is_finite() && point.y.is_finite()).then_some(point)
	}

	fn zoom_level(&self) -> f64 {
		self.state.read().zoom
	}
}

impl Viewport for MapViewport {
	fn subscribe(&self) -> ViewportSubscription {
		ViewportSubscription::new(self.events.subscribe())
	}
}

fn clamp_center(center: GeoPoint) -> GeoPoint {
	GeoPoint::new(center.x, center.y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT))
}

fn world_size(zoom: f64) -> f64 {
	TILE_SIZE * 2f64.powf(zoom)
}

/// Web Mercator world pixel of a coordinate, origin at the north-west corner.
fn world_pixel(coordinate: GeoPoint, zoom: f64) -> (f64, f64) {
	let size = world_size(zoom);
	let lat = coordinate.y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
	let x = (coordinate.x + 180.0) / 360.0 * size;
	let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
	(x, y)
}

fn world_to_geo(x: f64, y: f64, zoom: f64) -> GeoPoint {
	let size = world_size(zoom);
	let lon = x / size * 360.0 - 180.0;
	let lat = (PI * (1.0 - 2.0 * y / size)).sinh().atan().to_degrees();
	GeoPoint::new(lon, lat)
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use pretty_assertions::assert_eq;

	fn viewport() -> MapViewport {
		MapViewport::new(GeoPoint::new(0.0, 0.0), 1.0, ScreenSize::new(512, 512))
	}

	#[test]
	fn center_maps_to_screen_center() {
		let vp = MapViewport::new(GeoPoint::from_lat_lon(52.5, 13.4), 10.0, ScreenSize::new(800, 600));
		let p = vp.from_coordinate(GeoPoint::from_lat_lon(52.5, 13.4)).unwrap();
		assert_relative_eq!(p.x, 400.0, epsilon = 1e-6);
		assert_relative_eq!(p.y, 300.0, epsilon = 1e-6);
		assert!(vp.from_coordinate(GeoPoint::new(f64::NAN, 0.0)).is_none());
	}

	#[test]
	fn whole_world_at_zoom_one() {
		let vp = viewport();
		let nw = vp.from_coordinate(GeoPoint::new(-180.0, MAX_MERCATOR_LAT)).unwrap();
		let se = vp.from_coordinate(GeoPoint::new(180.0, -MAX_MERCATOR_LAT)).unwrap();
		assert_relative_eq!(nw.x, 0.0, epsilon = 1e-6);
		assert_relative_eq!(nw.y, 0.0, epsilon = 1e-6);
		assert_relative_eq!(se.x, 512.0, epsilon = 1e-6);
		assert_relative_eq!(se.y, 512.0, epsilon = 1e-6);

		let bbox = vp.visible_region().bbox().unwrap();
		assert_relative_eq!(bbox.x_min, -180.0, epsilon = 1e-9);
		assert_relative_eq!(bbox.x_max, 180.0, epsilon = 1e-9);
		assert_relative_eq!(bbox.y_max, MAX_MERCATOR_LAT, epsilon = 1e-9);
	}

	#[test]
	fn zoom_doubles_distances() {
		let vp = viewport();
		let a = vp.from_coordinate(GeoPoint::new(10.0, 0.0)).unwrap();
		vp.set_zoom(2.0);
		let b = vp.from_coordinate(GeoPoint::new(10.0, 0.0)).unwrap();
		assert_relative_eq!(b.x - 256.0, 2.0 * (a.x - 256.0), epsilon = 1e-9);
		assert_eq!(vp.zoom_level(), 2.0);
	}

	#[test]
	fn pan_by_shifts_screen_positions() {
		let vp = viewport();
		let before = vp.from_coordinate(GeoPoint::new(20.0, 10.0)).unwrap();
		vp.pan_by(30.0, -20.0);
		let after = vp.from_coordinate(GeoPoint::new(20.0, 10.0)).unwrap();
		assert_relative_eq!(after.x, before.x - 30.0, epsilon = 1e-6);
		assert_relative_eq!(after.y, before.y + 20.0, epsilon = 1e-6);
	}

	#[test]
	fn setters_emit_events() {
		let vp = viewport();
		let mut sub = vp.subscribe();
		vp.pan_to(GeoPoint::new(5.0, 5.0));
		vp.pan_to(GeoPoint::new(5.0, 5.0));
		vp.set_zoom(3.0);
		vp.resize(ScreenSize::new(100, 100));
		vp.resize(ScreenSize::new(100, 100));
		assert_eq!(
			sub.drain(),
			vec![
				ViewportEvent::RegionChanged,
				ViewportEvent::ZoomChanged,
				ViewportEvent::SizeChanged
			]
		);
		assert_eq!(vp.size(), ScreenSize::new(100, 100));
	}

	#[test]
	fn to_coordinate_round_trip() {
		let vp = MapViewport::new(GeoPoint::new(7.0, 45.0), 6.5, ScreenSize::new(300, 200));
		let geo = vp.to_coordinate(ScreenPoint::new(12.0, 180.0));
		let screen = vp.from_coordinate(geo).unwrap();
		assert_relative_eq!(screen.x, 12.0, epsilon = 1e-6);
		assert_relative_eq!(screen.y, 180.0, epsilon = 1e-6);
	}
}
