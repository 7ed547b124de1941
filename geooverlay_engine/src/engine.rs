//! The overlay state machine.
//!
//! An [`OverlayEngine`] owns one raster source and keeps it placed on a map
//! viewport. Every viewport event recomputes the screen rectangle, which is
//! cheap. The expensive part, decoding the bands and scaling them to the
//! rectangle, only runs when the cache is stale: after a source was loaded or
//! the zoom level changed. Panning never triggers it.
//!
//! ```text
//! Empty ──set_source──▶ Loading ──ok──▶ Ready ◀──┐ viewport events
//!                          │              │     │
//!                          └──fail──▶ Error ◀───┘ fatal errors
//! ```

use crate::{
	CacheState, CancelToken, ComposeRequest, ComposedFrame, OverlayConfig, OverlayStatus, PublishedFrame,
	RecomposeMode, RenderSurface, SurfaceAdapter, compose,
	job::{JobResult, RecomposeJob},
};
use anyhow::{Context, Result, anyhow};
use geooverlay_core::{
	Footprint, GeoPoint, OverlayError, ScreenRect, Viewport, ViewportEvent, ViewportSubscription,
};
use geooverlay_raster::{
	BandMapping, DefaultOpener, GeoReprojector, NativeImage, RasterOpener, RasterSource, decode_native,
	init_drivers, resolve_location,
};
use std::{
	path::{Path, PathBuf},
	sync::{Arc, Weak},
};
use tokio::runtime::Handle;

struct LoadedSource {
	raster: Arc<dyn RasterSource>,
	reprojector: Option<GeoReprojector>,
	footprint: Footprint,
}

/// Result of opening a raster, before it is installed.
struct Opened {
	raster: Arc<dyn RasterSource>,
	reprojector: Option<GeoReprojector>,
	native: Footprint,
	/// Why the footprint will not be reprojected, if it will not.
	degraded: Option<OverlayError>,
}

/// Non-owning link to the viewport. Dropping it unsubscribes.
struct ViewportLink {
	viewport: Weak<dyn Viewport>,
	events: ViewportSubscription,
}

pub struct OverlayEngine<S: RenderSurface> {
	config: OverlayConfig,
	opener: Arc<dyn RasterOpener>,
	runtime: Option<Handle>,

	path: Option<PathBuf>,
	source: Option<LoadedSource>,
	status: OverlayStatus,
	status_message: String,
	last_error: Option<OverlayError>,

	cache: CacheState,
	generation: u64,
	job: Option<RecomposeJob>,
	rect: Option<ScreenRect>,

	viewport: Option<ViewportLink>,
	surface: SurfaceAdapter<S>,
}

impl<S: RenderSurface> OverlayEngine<S> {
	/// Creates an engine that opens files from disk.
	///
	/// Picks up the current tokio runtime, if any, for background
	/// recomposition.
	pub fn new(surface: S, config: OverlayConfig) -> Self {
		Self::with_opener(surface, config, Arc::new(DefaultOpener))
	}

	pub fn with_opener(surface: S, config: OverlayConfig, opener: Arc<dyn RasterOpener>) -> Self {
		init_drivers();
		Self {
			config,
			opener,
			runtime: Handle::try_current().ok(),
			path: None,
			source: None,
			status: OverlayStatus::Empty,
			status_message: String::new(),
			last_error: None,
			cache: CacheState::Stale,
			generation: 0,
			job: None,
			rect: None,
			viewport: None,
			surface: SurfaceAdapter::new(surface),
		}
	}

	/// Runtime used for background recomposition.
	pub fn set_runtime(&mut self, runtime: Handle) {
		self.runtime = Some(runtime);
	}

	pub fn config(&self) -> &OverlayConfig {
		&self.config
	}

	// ---------------------------------------------------------------------
	// source
	// ---------------------------------------------------------------------

	/// Opens the raster at `location`, a path or `file://` URI, and places it.
	///
	/// The previous source and its output are released first, so a failing
	/// open leaves nothing on screen. Setting the current path again does
	/// nothing; use [`reload`](Self::reload) to reopen it.
	pub fn set_source(&mut self, location: &str) -> Result<()> {
		let path = resolve_location(location);
		if self.path.as_ref() == Some(&path) {
			log::debug!("source {} unchanged", path.display());
			return Ok(());
		}
		self.release_source();
		self.path = Some(path.clone());
		self.load(&path)
	}

	/// Removes the source and all output.
	pub fn clear_source(&mut self) {
		self.release_source();
		self.path = None;
		self.status = OverlayStatus::Empty;
		self.status_message.clear();
		self.last_error = None;
	}

	/// Reopens the current path.
	///
	/// If reprojecting the new footprint fails, the previous footprint, and
	/// with it the screen rectangle, is kept. A failing open is fatal just
	/// like in [`set_source`](Self::set_source).
	pub fn reload(&mut self) -> Result<()> {
		let Some(path) = self.path.clone() else {
			return Ok(());
		};
		let Some(previous) = self.source.as_ref().map(|source| source.footprint) else {
			// nothing worth keeping after an error
			self.release_source();
			return self.load(&path);
		};

		log::debug!("reloading {}", path.display());
		self.cancel_job();
		let opened = match self.open(&path) {
			Ok(opened) => opened,
			Err(err) => {
				self.fail(&err);
				return Err(err);
			}
		};

		self.last_error = opened.degraded.clone();
		let footprint = match project_footprint(opened.reprojector.as_ref(), &opened.native) {
			Ok(footprint) => footprint,
			Err(err) => {
				log::warn!("keeping previous footprint of {}: {err:#}", path.display());
				self.last_error = OverlayError::find(&err).cloned();
				previous
			}
		};
		self.install(LoadedSource {
			raster: opened.raster,
			reprojector: opened.reprojector,
			footprint,
		});
		Ok(())
	}

	/// Recomputes the footprint with the current reprojector. On failure the
	/// previous footprint stays in place and the error is returned.
	pub fn refresh_footprint(&mut self) -> Result<()> {
		let Some(source) = self.source.as_ref() else {
			return Ok(());
		};
		let (width, height) = source.raster.raster_size();
		let result = source.raster.geo_transform().and_then(|transform| {
			project_footprint(
				source.reprojector.as_ref(),
				&Footprint::from_transform(&transform, width, height),
			)
		});
		match result {
			Ok(footprint) => {
				if let Some(source) = self.source.as_mut() {
					source.footprint = footprint;
				}
				self.update();
				Ok(())
			}
			Err(err) => {
				log::warn!("footprint not updated: {err:#}");
				self.last_error = OverlayError::find(&err).cloned();
				Err(err)
			}
		}
	}

	fn load(&mut self, path: &Path) -> Result<()> {
		self.status = OverlayStatus::Loading;
		self.status_message = format!("Loading {}…", display_name(path));
		self.last_error = None;
		log::debug!("loading {}", path.display());

		let opened = match self.open(path) {
			Ok(opened) => opened,
			Err(err) => {
				self.fail(&err);
				return Err(err);
			}
		};

		self.last_error = opened.degraded.clone();
		let footprint = match project_footprint(opened.reprojector.as_ref(), &opened.native) {
			Ok(footprint) => footprint,
			Err(err) => {
				log::warn!("drawing {} unprojected: {err:#}", path.display());
				self.last_error = OverlayError::find(&err).cloned();
				opened.native
			}
		};
		self.install(LoadedSource {
			raster: opened.raster,
			reprojector: opened.reprojector,
			footprint,
		});
		Ok(())
	}

	fn open(&self, path: &Path) -> Result<Opened> {
		let raster = self.opener.open(path)?;
		let transform = raster
			.geo_transform()
			.with_context(|| format!("placing {}", path.display()))?;
		BandMapping::from_band_count(raster.band_count()).map_err(|err| OverlayError::OpenFailed {
			path: path.to_path_buf(),
			reason: format!("{err:#}"),
		})?;
		log::debug!("opened raster\n{}", raster.info());

		if transform.is_rotated() {
			log::warn!(
				"{} has a rotated geotransform, it is drawn as its bounding box",
				path.display()
			);
		}
		let (width, height) = raster.raster_size();
		let native = Footprint::from_transform(&transform, width, height);

		let (reprojector, degraded) = match raster.crs() {
			None => {
				log::warn!("{} has no CRS, using its coordinates unprojected", path.display());
				(None, Some(OverlayError::NoCrs))
			}
			Some(crs) => match self.opener.reprojector(&crs) {
				Some(reprojector) => (Some(reprojector), None),
				None => {
					log::warn!("{} cannot be reprojected, using its coordinates unprojected", path.display());
					(None, Some(OverlayError::TransformBuildFailed(crs)))
				}
			},
		};

		Ok(Opened {
			raster,
			reprojector,
			native,
			degraded,
		})
	}

	fn install(&mut self, source: LoadedSource) {
		self.status_message = String::from(if source.footprint.is_projected() {
			"GeoTIFF loaded"
		} else {
			"GeoTIFF loaded without reprojection"
		});
		log::debug!("footprint {:?}", source.footprint.bbox());
		self.source = Some(source);
		self.status = OverlayStatus::Ready;
		self.mark_dirty();
		self.update();
	}

	/// Drops the source and everything derived from it.
	fn release_source(&mut self) {
		self.cancel_job();
		self.source = None;
		self.rect = None;
		self.cache = CacheState::Stale;
		self.surface.clear();
	}

	fn fail(&mut self, err: &anyhow::Error) {
		log::error!("{err:#}");
		let kind = OverlayError::find(err).cloned();
		self.status_message = match &kind {
			Some(OverlayError::OpenFailed { .. }) => String::from("Failed to open GeoTIFF file"),
			Some(OverlayError::NoGeoTransform(_)) => String::from("GeoTIFF is not georeferenced"),
			Some(OverlayError::RecompositionFailed(_)) => String::from("Failed to render GeoTIFF"),
			_ => format!("{err:#}"),
		};
		self.last_error = kind;
		self.release_source();
		self.status = OverlayStatus::Error;
	}

	// ---------------------------------------------------------------------
	// viewport
	// ---------------------------------------------------------------------

	/// Places the overlay on `viewport`. The engine only keeps a weak
	/// reference; once the viewport is dropped it is detached.
	pub fn attach_viewport<V: Viewport + 'static>(&mut self, viewport: &Arc<V>) {
		let events = viewport.subscribe();
		let weak: Weak<dyn Viewport> = Arc::<V>::downgrade(viewport);
		self.viewport = Some(ViewportLink { viewport: weak, events });
		self.mark_dirty();
		self.update();
	}

	/// Unsubscribes from the viewport and hides the overlay.
	pub fn detach_viewport(&mut self) {
		if self.viewport.take().is_some() {
			log::debug!("viewport detached");
		}
		self.cancel_job();
		self.cache = CacheState::Stale;
		self.rect = None;
		self.surface.clear();
	}

	/// Handles all pending viewport notifications at once and returns how
	/// many there were.
	pub fn pump_events(&mut self) -> usize {
		let Some(link) = self.viewport.as_mut() else {
			return 0;
		};
		let events = link.events.drain();
		if link.events.is_closed() || link.viewport.strong_count() == 0 {
			self.detach_viewport();
			return events.len();
		}
		let mut changed = false;
		for event in &events {
			changed |= self.note_event(*event);
		}
		if changed {
			self.update();
		}
		events.len()
	}

	/// Handles a single viewport notification delivered by the host.
	pub fn handle_event(&mut self, event: ViewportEvent) {
		if self.note_event(event) {
			self.update();
		}
	}

	fn note_event(&mut self, event: ViewportEvent) -> bool {
		if self.status != OverlayStatus::Ready {
			log::trace!("ignoring {event:?} while {}", self.status);
			return false;
		}
		if event == ViewportEvent::ZoomChanged {
			self.mark_dirty();
		}
		true
	}

	/// Recomputes the screen rectangle and starts a recomposition if the
	/// cache is stale and the overlay is visible.
	fn update(&mut self) {
		if self.status != OverlayStatus::Ready {
			return;
		}
		let Some(viewport) = self.viewport.as_ref().and_then(|link| link.viewport.upgrade()) else {
			return;
		};
		let Some(source) = self.source.as_ref() else {
			return;
		};
		let Some(rect) = screen_rect(viewport.as_ref(), &source.footprint) else {
			log::debug!("{} cannot be placed on the viewport", source.raster.path().display());
			return;
		};

		self.rect = Some(rect);
		self.surface.reposition(rect);

		if self.config.cull_offscreen && rect.is_outside(viewport.size()) {
			log::trace!("{rect:?} is off screen, recomposition skipped");
			return;
		}
		if self.cache == CacheState::Stale {
			self.recompose(rect);
		}
	}

	// ---------------------------------------------------------------------
	// recomposition
	// ---------------------------------------------------------------------

	fn mark_dirty(&mut self) {
		self.cancel_job();
		self.cache = CacheState::Stale;
	}

	fn cancel_job(&mut self) {
		if let Some(job) = self.job.take() {
			log::trace!("cancelling recomposition #{}", job.generation());
			job.cancel();
		}
	}

	fn recompose(&mut self, rect: ScreenRect) {
		let Some(source) = self.source.as_ref() else {
			return;
		};
		let raster = source.raster.clone();
		let request = ComposeRequest {
			target: rect.pixel_size(),
			filter: self.config.resample,
			max_buffer_dimension: self.config.max_buffer_dimension,
		};
		self.generation += 1;
		let generation = self.generation;
		self.cache = CacheState::Composing { generation };

		let runtime = match self.config.recompose {
			RecomposeMode::Background => {
				if self.runtime.is_none() {
					log::debug!("no tokio runtime available, recomposing inline");
				}
				self.runtime.clone()
			}
			RecomposeMode::Inline => None,
		};

		match runtime {
			Some(runtime) => {
				self.job = Some(RecomposeJob::spawn(&runtime, raster, request, generation));
			}
			None => {
				log::debug!("recomposing {} at {:?}", raster.path().display(), request.target);
				let result = compose(raster.as_ref(), &request, &CancelToken::new());
				self.finish(generation, result);
			}
		}
	}

	fn finish(&mut self, generation: u64, result: JobResult) {
		if !self.cache.accepts(generation) {
			log::trace!("discarding result of stale recomposition #{generation}");
			return;
		}
		match result {
			Ok(Some(frame)) => self.publish(frame),
			Ok(None) => self.cache = CacheState::Stale,
			Err(err) => self.fail(&err),
		}
	}

	fn publish(&mut self, frame: ComposedFrame) {
		let Some(rect) = self.rect else {
			self.cache = CacheState::Stale;
			return;
		};
		if let Some(&band) = frame.failed_bands.first() {
			self.last_error = Some(OverlayError::BandReadFailed {
				band,
				reason: format!("bands {:?} were zero-filled", frame.failed_bands),
			});
		}
		let published = PublishedFrame {
			image: Arc::new(frame.image),
			rect,
			has_alpha: frame.has_alpha,
		};
		match self.surface.publish(published) {
			Ok(()) => self.cache = CacheState::Fresh,
			Err(err) => {
				let err = anyhow::Error::from(OverlayError::RecompositionFailed(format!(
					"texture upload failed: {err:#}"
				)));
				self.fail(&err);
			}
		}
	}

	/// Delivers a finished background recomposition, if there is one.
	/// Returns `true` if a job result was handled.
	pub fn poll(&mut self) -> bool {
		let Some(job) = self.job.as_mut() else {
			return false;
		};
		let Some(result) = job.try_finish() else {
			return false;
		};
		let generation = job.generation();
		self.job = None;
		self.finish(generation, result);
		true
	}

	/// Waits for the running background recomposition and delivers it.
	pub async fn settle(&mut self) {
		while let Some(job) = self.job.as_mut() {
			let result = job.finish().await;
			let generation = job.generation();
			self.job = None;
			self.finish(generation, result);
		}
	}

	// ---------------------------------------------------------------------
	// output
	// ---------------------------------------------------------------------

	/// Draws the current frame onto the surface.
	pub fn render(&mut self) {
		self.surface.render();
	}

	/// Decodes the whole raster at native resolution.
	pub fn native_image(&self) -> Result<NativeImage> {
		let source = self.source.as_ref().ok_or_else(|| anyhow!("no raster loaded"))?;
		decode_native(source.raster.as_ref())
	}

	pub fn status(&self) -> OverlayStatus {
		self.status
	}

	/// Human-readable status, e.g. "GeoTIFF loaded".
	pub fn status_message(&self) -> &str {
		&self.status_message
	}

	/// The most recent error. Fatal errors also set the status to
	/// [`OverlayStatus::Error`]; others only degrade the output.
	pub fn last_error(&self) -> Option<&OverlayError> {
		self.last_error.as_ref()
	}

	pub fn source_path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	pub fn raster(&self) -> Option<&Arc<dyn RasterSource>> {
		self.source.as_ref().map(|source| &source.raster)
	}

	pub fn footprint(&self) -> Option<&Footprint> {
		self.source.as_ref().map(|source| &source.footprint)
	}

	/// `true` when the footprint is not an axis-aligned rectangle and is
	/// therefore drawn as its bounding box.
	pub fn is_skewed(&self) -> bool {
		self.footprint().is_some_and(Footprint::is_skewed)
	}

	/// `true` when the footprint is in native coordinates rather than WGS84.
	pub fn is_degraded(&self) -> bool {
		self.footprint().is_some_and(|footprint| !footprint.is_projected())
	}

	pub fn screen_rect(&self) -> Option<ScreenRect> {
		self.rect
	}

	pub fn cache_state(&self) -> CacheState {
		self.cache
	}

	pub fn is_dirty(&self) -> bool {
		self.cache.is_dirty()
	}

	pub fn published(&self) -> Option<&PublishedFrame> {
		self.surface.frame()
	}

	pub fn surface(&self) -> &S {
		self.surface.surface()
	}

	pub fn surface_mut(&mut self) -> &mut S {
		self.surface.surface_mut()
	}
}

impl<S: RenderSurface> Drop for OverlayEngine<S> {
	fn drop(&mut self) {
		self.cancel_job();
	}
}

/// Reprojects the corners of `native` to WGS84. Without a reprojector the
/// native footprint is returned as is.
fn project_footprint(reprojector: Option<&GeoReprojector>, native: &Footprint) -> Result<Footprint> {
	let Some(reprojector) = reprojector else {
		return Ok(*native);
	};
	let points = reprojector.transform_points(native.corners())?;
	let corners: [GeoPoint; 4] = points.try_into().map_err(|points: Vec<GeoPoint>| {
		OverlayError::TransformFailed(format!("expected 4 corners but got {}", points.len()))
	})?;
	Footprint::with_corners(corners, true)
}

/// Screen rectangle of the footprint's bounding box. `None` if a corner
/// cannot be projected or the rectangle is empty.
fn screen_rect(viewport: &dyn Viewport, footprint: &Footprint) -> Option<ScreenRect> {
	let points = footprint
		.bbox()
		.corners()
		.iter()
		.map(|corner| viewport.from_coordinate(*corner))
		.collect::<Option<Vec<_>>>()?;
	ScreenRect::from_points(&points).filter(|rect| !rect.is_empty())
}

fn display_name(path: &Path) -> String {
	path.file_name()
		.map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::CanvasSurface;
	use approx::assert_relative_eq;
	use geooverlay_core::{MapViewport, ScreenSize};
	use geooverlay_raster::{MemoryOpener, MemoryRaster};
	use pretty_assertions::assert_eq;

	/// 10°×10° RGB raster with its top-left corner at (0°, 10°).
	fn raster(path: &str) -> MemoryRaster {
		MemoryRaster::filled(path, 10, 10, &[255, 0, 0])
			.with_geo_transform([0.0, 1.0, 0.0, 10.0, 0.0, -1.0])
			.with_crs("EPSG:4326")
	}

	fn setup() -> (OverlayEngine<CanvasSurface>, Arc<MemoryOpener>, Arc<MapViewport>) {
		let opener = Arc::new(MemoryOpener::new());
		let engine = OverlayEngine::with_opener(
			CanvasSurface::new(ScreenSize::new(256, 256)),
			OverlayConfig::default(),
			opener.clone(),
		);
		let viewport = Arc::new(MapViewport::new(
			GeoPoint::new(5.0, 5.0),
			4.0,
			ScreenSize::new(256, 256),
		));
		(engine, opener, viewport)
	}

	#[test]
	fn empty_engine() {
		let (engine, _, _) = setup();
		assert_eq!(engine.status(), OverlayStatus::Empty);
		assert!(engine.published().is_none());
		assert!(engine.screen_rect().is_none());
		assert!(engine.is_dirty());
	}

	#[test]
	fn load_and_place() {
		let (mut engine, opener, viewport) = setup();
		opener.insert(raster("a.tif"));
		engine.attach_viewport(&viewport);
		engine.set_source("a.tif").unwrap();

		assert_eq!(engine.status(), OverlayStatus::Ready);
		assert_eq!(engine.status_message(), "GeoTIFF loaded");
		assert!(engine.last_error().is_none());
		assert!(!engine.is_dirty());

		// 10° at zoom 4 is 4096 · 10 / 360 pixels
		let rect = engine.screen_rect().unwrap();
		assert_relative_eq!(rect.width, 4096.0 / 36.0, epsilon = 1e-6);
		assert_relative_eq!(rect.x + rect.width / 2.0, 128.0, epsilon = 1e-6);
		let frame = engine.published().unwrap();
		assert_eq!(frame.image.width(), rect.pixel_size().width);
		assert_eq!(frame.image.height(), rect.pixel_size().height);
	}

	#[test]
	fn same_path_is_a_no_op() {
		let (mut engine, opener, viewport) = setup();
		opener.insert(raster("a.tif"));
		engine.attach_viewport(&viewport);
		engine.set_source("a.tif").unwrap();
		engine.set_source("file://a.tif").unwrap();
		assert_eq!(opener.opens(), 1);

		engine.reload().unwrap();
		assert_eq!(opener.opens(), 2);
	}

	#[test]
	fn missing_crs_degrades() {
		let (mut engine, opener, viewport) = setup();
		opener.insert(MemoryRaster::filled("plain.tif", 4, 4, &[1]).with_geo_transform([0.0, 1.0, 0.0, 4.0, 0.0, -1.0]));
		engine.attach_viewport(&viewport);
		engine.set_source("plain.tif").unwrap();
		assert_eq!(engine.status(), OverlayStatus::Ready);
		assert_eq!(engine.last_error(), Some(&OverlayError::NoCrs));
		assert!(engine.is_degraded());
		assert!(engine.published().is_some());
	}

	#[test]
	fn missing_geotransform_is_fatal() {
		let (mut engine, opener, viewport) = setup();
		opener.insert(MemoryRaster::filled("raw.tif", 4, 4, &[1]));
		engine.attach_viewport(&viewport);
		assert!(engine.set_source("raw.tif").is_err());
		assert_eq!(engine.status(), OverlayStatus::Error);
		assert_eq!(engine.last_error().map(OverlayError::kind), Some("no_geo_transform"));
		assert!(engine.published().is_none());
	}

	#[test]
	fn error_state_ignores_events() {
		let (mut engine, _, viewport) = setup();
		engine.attach_viewport(&viewport);
		assert!(engine.set_source("missing.tif").is_err());
		viewport.set_zoom(6.0);
		viewport.pan_by(10.0, 10.0);
		assert_eq!(engine.pump_events(), 2);
		assert_eq!(engine.status(), OverlayStatus::Error);
		assert!(engine.screen_rect().is_none());
	}

	#[test]
	fn clear_source_returns_to_empty() {
		let (mut engine, opener, viewport) = setup();
		opener.insert(raster("a.tif"));
		engine.attach_viewport(&viewport);
		engine.set_source("a.tif").unwrap();
		engine.clear_source();
		assert_eq!(engine.status(), OverlayStatus::Empty);
		assert!(engine.published().is_none());
		assert_eq!(engine.surface().live_textures(), 0);
		assert!(engine.source_path().is_none());
	}

	#[test]
	fn dropped_viewport_detaches() {
		let (mut engine, opener, viewport) = setup();
		opener.insert(raster("a.tif"));
		engine.attach_viewport(&viewport);
		engine.set_source("a.tif").unwrap();
		drop(viewport);
		engine.pump_events();
		assert!(engine.screen_rect().is_none());
		assert!(engine.published().is_none());
		assert_eq!(engine.status(), OverlayStatus::Ready);
	}

	#[test]
	fn skewed_raster_is_flagged() {
		let (mut engine, opener, viewport) = setup();
		opener.insert(
			MemoryRaster::filled("rot.tif", 4, 4, &[1])
				.with_geo_transform([0.0, 1.0, 0.5, 4.0, 0.0, -1.0])
				.with_crs("EPSG:4326"),
		);
		engine.attach_viewport(&viewport);
		engine.set_source("rot.tif").unwrap();
		assert!(engine.is_skewed());
		assert!(engine.published().is_some());
	}

	#[test]
	fn native_export() {
		let (mut engine, opener, _) = setup();
		assert!(engine.native_image().is_err());
		opener.insert(raster("a.tif"));
		engine.set_source("a.tif").unwrap();
		let native = engine.native_image().unwrap();
		assert_eq!((native.image.width(), native.image.height()), (10, 10));
		// no viewport, nothing composed yet
		assert!(engine.published().is_none());
	}

	/// Surface that cannot upload anything.
	struct DeviceLost;

	impl RenderSurface for DeviceLost {
		type Texture = ();

		fn create_texture(&mut self, _image: &image::DynamicImage, _has_alpha: bool) -> Result<()> {
			Err(anyhow!("device lost"))
		}

		fn release_texture(&mut self, _texture: ()) {}

		fn draw(&mut self, _texture: &(), _rect: ScreenRect) {}

		fn clear(&mut self) {}

		fn request_redraw(&mut self) {}
	}

	#[test]
	fn texture_upload_failure_is_fatal() {
		let opener = Arc::new(MemoryOpener::new());
		opener.insert(raster("a.tif"));
		let mut engine = OverlayEngine::with_opener(DeviceLost, OverlayConfig::default(), opener);
		let viewport = Arc::new(MapViewport::new(
			GeoPoint::new(5.0, 5.0),
			4.0,
			ScreenSize::new(256, 256),
		));
		engine.attach_viewport(&viewport);
		let _ = engine.set_source("a.tif");

		assert_eq!(engine.status(), OverlayStatus::Error);
		assert_eq!(engine.status_message(), "Failed to render GeoTIFF");
		match engine.last_error() {
			Some(OverlayError::RecompositionFailed(reason)) => assert!(reason.contains("device lost")),
			other => panic!("unexpected error {other:?}"),
		}
		assert!(engine.published().is_none());
	}
}
