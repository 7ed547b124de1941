//! The drawing side of an overlay.
//!
//! A [`RenderSurface`] is whatever turns pixel buffers into textures and
//! draws them, e.g. a GPU scene graph. The [`SurfaceAdapter`] owns the
//! surface together with the one texture currently in use and makes sure
//! the previous texture is released whenever a new buffer is published.

mod canvas;
pub use canvas::*;

use anyhow::Result;
use geooverlay_core::ScreenRect;
use image::DynamicImage;
use std::sync::Arc;

pub trait RenderSurface {
	/// Opaque handle of an uploaded buffer.
	type Texture;

	fn create_texture(&mut self, image: &DynamicImage, has_alpha: bool) -> Result<Self::Texture>;

	fn release_texture(&mut self, texture: Self::Texture);

	/// Draws `texture` stretched into `rect`.
	fn draw(&mut self, texture: &Self::Texture, rect: ScreenRect);

	/// Starts a frame with nothing drawn.
	fn clear(&mut self);

	/// Asks the host to schedule a new frame.
	fn request_redraw(&mut self);
}

/// The buffer and rectangle last handed to the surface. The buffer is never
/// modified after publishing; a new one replaces it as a whole.
#[derive(Clone, Debug)]
pub struct PublishedFrame {
	pub image: Arc<DynamicImage>,
	pub rect: ScreenRect,
	pub has_alpha: bool,
}

pub struct SurfaceAdapter<S: RenderSurface> {
	surface: S,
	current: Option<(PublishedFrame, S::Texture)>,
}

impl<S: RenderSurface> SurfaceAdapter<S> {
	pub fn new(surface: S) -> Self {
		Self { surface, current: None }
	}

	/// Uploads `frame` and swaps it in for the previous one, whose texture
	/// is released.
	pub fn publish(&mut self, frame: PublishedFrame) -> Result<()> {
		let texture = self.surface.create_texture(&frame.image, frame.has_alpha)?;
		if let Some((_, old)) = self.current.replace((frame, texture)) {
			self.surface.release_texture(old);
		}
		self.surface.request_redraw();
		Ok(())
	}

	/// Moves the current frame without touching its pixels.
	pub fn reposition(&mut self, rect: ScreenRect) {
		if let Some((frame, _)) = self.current.as_mut() {
			if frame.rect != rect {
				frame.rect = rect;
				self.surface.request_redraw();
			}
		}
	}

	/// Drops the current frame so nothing is drawn.
	pub fn clear(&mut self) {
		if let Some((_, texture)) = self.current.take() {
			self.surface.release_texture(texture);
			self.surface.request_redraw();
		}
	}

	/// Draws one frame.
	pub fn render(&mut self) {
		self.surface.clear();
		if let Some((frame, texture)) = &self.current {
			self.surface.draw(texture, frame.rect);
		}
	}

	pub fn frame(&self) -> Option<&PublishedFrame> {
		self.current.as_ref().map(|(frame, _)| frame)
	}

	pub fn surface(&self) -> &S {
		&self.surface
	}

	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}
}

impl<S: RenderSurface> Drop for SurfaceAdapter<S> {
	fn drop(&mut self) {
		if let Some((_, texture)) = self.current.take() {
			self.surface.release_texture(texture);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use geooverlay_image::ImageTraitConvert;
	use pretty_assertions::assert_eq;

	#[derive(Default)]
	struct Recorder {
		log: Vec<String>,
		next: u32,
	}

	impl RenderSurface for &mut Recorder {
		type Texture = u32;

		fn create_texture(&mut self, image: &DynamicImage, has_alpha: bool) -> Result<u32> {
			self.next += 1;
			self.log
				.push(format!("create {} {}x{} {has_alpha}", self.next, image.width(), image.height()));
			Ok(self.next)
		}

		fn release_texture(&mut self, texture: u32) {
			self.log.push(format!("release {texture}"));
		}

		fn draw(&mut self, texture: &u32, rect: ScreenRect) {
			self.log.push(format!("draw {texture} {rect:?}"));
		}

		fn clear(&mut self) {
			self.log.push(String::from("clear"));
		}

		fn request_redraw(&mut self) {
			self.log.push(String::from("redraw"));
		}
	}

	fn frame(width: u32, rect: ScreenRect) -> PublishedFrame {
		PublishedFrame {
			image: Arc::new(DynamicImage::from_fn_rgb8(width, 1, |_, _| [0, 0, 0])),
			rect,
			has_alpha: false,
		}
	}

	#[test]
	fn previous_texture_is_released() {
		let mut recorder = Recorder::default();
		{
			let mut adapter = SurfaceAdapter::new(&mut recorder);
			let rect = ScreenRect::new(0.0, 0.0, 2.0, 1.0);
			adapter.publish(frame(2, rect)).unwrap();
			adapter.publish(frame(3, rect)).unwrap();
			adapter.render();
			adapter.reposition(rect.translated(5.0, 0.0));
			adapter.reposition(rect.translated(5.0, 0.0));
			adapter.clear();
			adapter.render();
		}
		assert_eq!(
			recorder.log,
			vec![
				"create 1 2x1 false",
				"redraw",
				"create 2 3x1 false",
				"release 1",
				"redraw",
				"clear",
				"draw 2 ScreenRect(0, 0, 2x1)",
				"redraw",
				"release 2",
				"redraw",
				"clear",
			]
		);
	}

	#[test]
	fn drop_releases_texture() {
		let mut recorder = Recorder::default();
		{
			let mut adapter = SurfaceAdapter::new(&mut recorder);
			adapter
				.publish(frame(1, ScreenRect::new(0.0, 0.0, 1.0, 1.0)))
				.unwrap();
			assert!(adapter.frame().is_some());
		}
		assert_eq!(recorder.log.last().map(String::as_str), Some("release 1"));
	}
}
