//! Resampling of decoded rasters to their on-screen size.
//!
//! Scaling runs through `fast_image_resize`, which premultiplies alpha so
//! that transparent pixels do not bleed into their neighbours.

use crate::ResampleFilter;
use anyhow::{Context, Result};
use fast_image_resize::{ResizeOptions, Resizer};
use geooverlay_core::ScreenSize;
use image::DynamicImage;

pub trait ImageTraitOperation {
	fn screen_size(&self) -> ScreenSize;

	/// Returns a copy scaled to exactly `size` using `filter`.
	fn get_resampled(&self, size: ScreenSize, filter: ResampleFilter) -> Result<DynamicImage>;

	/// Like [`get_resampled`](Self::get_resampled), but consumes `self` and
	/// returns it unchanged if it already has the requested size.
	fn into_resampled(self, size: ScreenSize, filter: ResampleFilter) -> Result<DynamicImage>;
}

impl ImageTraitOperation for DynamicImage {
	fn screen_size(&self) -> ScreenSize {
		ScreenSize::new(self.width(), self.height())
	}

	fn get_resampled(&self, size: ScreenSize, filter: ResampleFilter) -> Result<DynamicImage> {
		anyhow::ensure!(!size.is_empty(), "cannot resample to an empty size {size:?}");
		let mut dst_image = DynamicImage::new(size.width, size.height, self.color());
		Resizer::new()
			.resize(
				self,
				&mut dst_image,
				&ResizeOptions::default().resize_alg(filter.as_resize_alg()),
			)
			.with_context(|| {
				format!(
					"resampling {}x{} {:?} image to {size:?} ({filter:?})",
					self.width(),
					self.height(),
					self.color()
				)
			})?;
		Ok(dst_image)
	}

	fn into_resampled(self, size: ScreenSize, filter: ResampleFilter) -> Result<DynamicImage> {
		if self.screen_size() == size {
			Ok(self)
		} else {
			self.get_resampled(size, filter)
		}
	}
}
