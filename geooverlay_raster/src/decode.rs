use crate::{BandMapping, BandMappingItem, RasterSource};
use anyhow::{Context, Result, ensure};
use geooverlay_core::OverlayError;
use geooverlay_image::ImageTraitConvert;
use image::DynamicImage;

/// A raster decoded at native resolution.
#[derive(Debug)]
pub struct NativeImage {
	pub image: DynamicImage,
	pub has_alpha: bool,
	/// Bands that failed to read and were zero-filled.
	pub failed_bands: Vec<usize>,
}

/// Decodes the bands of `source` into one interleaved 8-bit image, laid out
/// by [`BandMapping`].
///
/// A band that fails to read is logged and zero-filled; the other bands are
/// still decoded, so a partial failure yields a displayable image.
pub fn decode_native(source: &dyn RasterSource) -> Result<NativeImage> {
	let (width, height) = source.raster_size();
	let mapping = BandMapping::from_band_count(source.band_count())
		.with_context(|| format!("decoding {}", source.path().display()))?;
	let pixel_count = width as usize * height as usize;
	let channel_count = mapping.len();
	log::debug!(
		"decoding {}x{} raster {} as {} ({} bands)",
		width,
		height,
		source.path().display(),
		mapping.layout_name(),
		source.band_count()
	);

	let mut buf = vec![0u8; pixel_count * channel_count];
	let mut failed_bands = Vec::new();
	let results = source.read_bands(mapping.bands());

	for (
		BandMappingItem {
			band_index,
			channel_index,
		},
		result,
	) in mapping.iter().zip(results)
	{
		let data = result.and_then(|data| {
			ensure!(
				data.len() == pixel_count,
				OverlayError::BandReadFailed {
					band: band_index,
					reason: format!("expected {pixel_count} samples but got {}", data.len()),
				}
			);
			Ok(data)
		});
		match data {
			Ok(data) => {
				for (i, &px) in data.iter().enumerate() {
					buf[i * channel_count + channel_index] = px;
				}
			}
			Err(err) => {
				log::warn!("band {band_index} of {} zero-filled: {err:#}", source.path().display());
				failed_bands.push(band_index);
			}
		}
	}

	let image = DynamicImage::from_raw(width, height, buf).context("Failed to create image from raster bands")?;
	Ok(NativeImage {
		image,
		has_alpha: mapping.has_alpha(),
		failed_bands,
	})
}
