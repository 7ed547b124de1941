//! The map viewport an overlay is drawn on.
//!
//! A [`Viewport`] answers projection queries and announces changes over a
//! broadcast channel. Consumers hold a [`ViewportSubscription`] and drain it
//! whenever they get a chance; dropping the subscription unsubscribes.

mod map_viewport;
pub use map_viewport::MapViewport;

use crate::{GeoPoint, GeoShape, ScreenPoint, ScreenSize};
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Change notifications emitted by a viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewportEvent {
	/// The visible region moved, e.g. after a pan.
	RegionChanged,
	/// The zoom level changed. Implies a region change.
	ZoomChanged,
	/// The viewport was resized.
	SizeChanged,
}

/// Projection queries against the current view.
pub trait ViewportProjector: Send + Sync {
	fn size(&self) -> ScreenSize;

	fn visible_region(&self) -> GeoShape;

	/// Maps a WGS84 coordinate (`x` = longitude, `y` = latitude) to viewport
	/// pixels. Returns `None` if the coordinate cannot be placed on screen.
	#[allow(clippy::wrong_self_convention)]
	fn from_coordinate(&self, coordinate: GeoPoint) -> Option<ScreenPoint>;

	fn zoom_level(&self) -> f64;
}

pub trait Viewport: ViewportProjector {
	fn subscribe(&self) -> ViewportSubscription;
}

/// Receiving end of a viewport's change notifications.
#[derive(Debug)]
pub struct ViewportSubscription {
	receiver: broadcast::Receiver<ViewportEvent>,
	closed: bool,
}

impl ViewportSubscription {
	pub fn new(receiver: broadcast::Receiver<ViewportEvent>) -> Self {
		Self {
			receiver,
			closed: false,
		}
	}

	/// Returns all pending events without blocking.
	///
	/// If the subscriber fell behind and events were dropped, a
	/// `ZoomChanged` is reported in their place so that nothing is missed.
	pub fn drain(&mut self) -> Vec<ViewportEvent> {
		let mut events = Vec::new();
		loop {
			match self.receiver.try_recv() {
				Ok(event) => events.push(event),
				Err(TryRecvError::Empty) => break,
				Err(TryRecvError::Lagged(skipped)) => {
					log::debug!("viewport subscriber lagged behind by {skipped} events");
					events.push(ViewportEvent::ZoomChanged);
				}
				Err(TryRecvError::Closed) => {
					self.closed = true;
					break;
				}
			}
		}
		events
	}

	/// `true` once the viewport has been dropped and all events were drained.
	pub fn is_closed(&self) -> bool {
		self.closed
	}
}
