use crate::CancelToken;
use anyhow::{Context, Result};
use geooverlay_core::{OverlayError, ScreenSize};
use geooverlay_image::{ImageTraitOperation, ResampleFilter, fit_within};
use geooverlay_raster::{RasterSource, decode_native};
use image::DynamicImage;

/// What a recomposition should produce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComposeRequest {
	/// Pixel size of the on-screen rectangle.
	pub target: ScreenSize,
	pub filter: ResampleFilter,
	pub max_buffer_dimension: u32,
}

impl ComposeRequest {
	/// Size of the buffer that is actually built.
	pub fn buffer_size(&self) -> ScreenSize {
		fit_within(self.target, self.max_buffer_dimension)
	}
}

/// A composited buffer, ready to be published.
#[derive(Debug)]
pub struct ComposedFrame {
	pub image: DynamicImage,
	pub has_alpha: bool,
	pub failed_bands: Vec<usize>,
}

/// Decodes all bands of `source` at native resolution and scales the result
/// to the requested buffer size. Returns `Ok(None)` if `cancel` fired.
///
/// The scale factors are independent per axis, `target / native`, and the
/// raster is never rotated.
pub fn compose(source: &dyn RasterSource, request: &ComposeRequest, cancel: &CancelToken) -> Result<Option<ComposedFrame>> {
	if cancel.is_cancelled() {
		return Ok(None);
	}

	let native = decode_native(source)
		.map_err(|err| OverlayError::RecompositionFailed(format!("{err:#}")))
		.with_context(|| format!("decoding {}", source.path().display()))?;

	if cancel.is_cancelled() {
		log::trace!("recomposition of {} cancelled after decode", source.path().display());
		return Ok(None);
	}

	let size = request.buffer_size();
	if size != request.target {
		log::debug!("buffer for {:?} limited to {size:?}", request.target);
	}

	let image = native
		.image
		.into_resampled(size, request.filter)
		.map_err(|err| OverlayError::RecompositionFailed(format!("{err:#}")))
		.with_context(|| format!("resampling {} to {size:?}", source.path().display()))?;

	Ok(Some(ComposedFrame {
		image,
		has_alpha: native.has_alpha,
		failed_bands: native.failed_bands,
	}))
}
