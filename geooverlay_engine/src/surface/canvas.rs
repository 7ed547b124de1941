use super::RenderSurface;
use anyhow::Result;
use geooverlay_core::{ScreenRect, ScreenSize};
use geooverlay_image::{ImageTraitConvert, ImageTraitOperation, ResampleFilter};
use image::{DynamicImage, Rgba, RgbaImage, imageops};

/// Index of a texture held by a [`CanvasSurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CanvasTexture(usize);

/// A CPU render surface that draws into an RGBA canvas. Used by the CLI to
/// take viewport snapshots and by tests to count textures and redraws.
#[derive(Debug)]
pub struct CanvasSurface {
	canvas: RgbaImage,
	textures: Vec<Option<DynamicImage>>,
	redraw_requests: usize,
}

impl CanvasSurface {
	pub fn new(size: ScreenSize) -> Self {
		Self {
			canvas: RgbaImage::new(size.width, size.height),
			textures: Vec::new(),
			redraw_requests: 0,
		}
	}

	pub fn canvas(&self) -> &RgbaImage {
		&self.canvas
	}

	pub fn into_image(self) -> DynamicImage {
		DynamicImage::ImageRgba8(self.canvas)
	}

	pub fn resize(&mut self, size: ScreenSize) {
		self.canvas = RgbaImage::new(size.width, size.height);
	}

	/// Textures created and not yet released.
	pub fn live_textures(&self) -> usize {
		self.textures.iter().filter(|t| t.is_some()).count()
	}

	pub fn redraw_requests(&self) -> usize {
		self.redraw_requests
	}
}

impl RenderSurface for CanvasSurface {
	type Texture = CanvasTexture;

	fn create_texture(&mut self, image: &DynamicImage, _has_alpha: bool) -> Result<CanvasTexture> {
		let texture = image.to_texture_rgba8();
		let slot = self.textures.iter().position(Option::is_none);
		Ok(CanvasTexture(match slot {
			Some(index) => {
				self.textures[index] = Some(texture);
				index
			}
			None => {
				self.textures.push(Some(texture));
				self.textures.len() - 1
			}
		}))
	}

	fn release_texture(&mut self, texture: CanvasTexture) {
		if let Some(slot) = self.textures.get_mut(texture.0) {
			*slot = None;
		}
	}

	fn draw(&mut self, texture: &CanvasTexture, rect: ScreenRect) {
		let Some(Some(image)) = self.textures.get(texture.0) else {
			log::warn!("drawing released texture {texture:?}");
			return;
		};
		if rect.is_empty() {
			return;
		}
		let size = rect.pixel_size();
		let scaled = match image.get_resampled(size, ResampleFilter::Nearest) {
			Ok(scaled) => scaled.into_rgba8(),
			Err(err) => {
				log::warn!("cannot stretch texture to {size:?}: {err:#}");
				return;
			}
		};
		imageops::overlay(&mut self.canvas, &scaled, rect.x.round() as i64, rect.y.round() as i64);
	}

	fn clear(&mut self) {
		for pixel in self.canvas.pixels_mut() {
			*pixel = Rgba([0, 0, 0, 0]);
		}
	}

	fn request_redraw(&mut self) {
		self.redraw_requests += 1;
	}
}
