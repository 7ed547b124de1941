use anyhow::{Result, anyhow, bail, ensure};
use image::{DynamicImage, ImageBuffer, Luma, LumaA, Rgb, Rgba};

pub trait ImageTraitConvert {
	fn from_fn_l8(width: u32, height: u32, f: fn(u32, u32) -> u8) -> DynamicImage;
	fn from_fn_la8(width: u32, height: u32, f: fn(u32, u32) -> [u8; 2]) -> DynamicImage;
	fn from_fn_rgb8(width: u32, height: u32, f: fn(u32, u32) -> [u8; 3]) -> DynamicImage;
	fn from_fn_rgba8(width: u32, height: u32, f: fn(u32, u32) -> [u8; 4]) -> DynamicImage;

	/// Wraps interleaved 8-bit samples. The channel count (1 to 4) is derived
	/// from the buffer length.
	fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<DynamicImage>;

	/// Returns an 8-bit RGBA copy, the only layout render surfaces accept.
	fn to_texture_rgba8(&self) -> DynamicImage;
}

impl ImageTraitConvert for DynamicImage {
	fn from_fn_l8(width: u32, height: u32, f: fn(u32, u32) -> u8) -> DynamicImage {
		DynamicImage::ImageLuma8(ImageBuffer::from_fn(width, height, |x, y| Luma([f(x, y)])))
	}
	fn from_fn_la8(width: u32, height: u32, f: fn(u32, u32) -> [u8; 2]) -> DynamicImage {
		DynamicImage::ImageLumaA8(ImageBuffer::from_fn(width, height, |x, y| LumaA(f(x, y))))
	}
	fn from_fn_rgb8(width: u32, height: u32, f: fn(u32, u32) -> [u8; 3]) -> DynamicImage {
		DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| Rgb(f(x, y))))
	}
	fn from_fn_rgba8(width: u32, height: u32, f: fn(u32, u32) -> [u8; 4]) -> DynamicImage {
		DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| Rgba(f(x, y))))
	}

	fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<DynamicImage> {
		let pixel_count = width as usize * height as usize;
		ensure!(pixel_count > 0, "cannot build an image of size {width}x{height}");
		ensure!(
			data.len() % pixel_count == 0,
			"buffer of {} bytes does not fit {width}x{height} pixels",
			data.len()
		);
		let channel_count = data.len() / pixel_count;
		Ok(match channel_count {
			1 => DynamicImage::ImageLuma8(
				ImageBuffer::from_vec(width, height, data)
					.ok_or_else(|| anyhow!("Failed to create Luma8 image buffer with provided data"))?,
			),
			2 => DynamicImage::ImageLumaA8(
				ImageBuffer::from_vec(width, height, data)
					.ok_or_else(|| anyhow!("Failed to create LumaA8 image buffer with provided data"))?,
			),
			3 => DynamicImage::ImageRgb8(
				ImageBuffer::from_vec(width, height, data)
					.ok_or_else(|| anyhow!("Failed to create RGB8 image buffer with provided data"))?,
			),
			4 => DynamicImage::ImageRgba8(
				ImageBuffer::from_vec(width, height, data)
					.ok_or_else(|| anyhow!("Failed to create RGBA8 image buffer with provided data"))?,
			),
			_ => bail!("Unsupported channel count: {channel_count}"),
		})
	}

	fn to_texture_rgba8(&self) -> DynamicImage {
		match self {
			DynamicImage::ImageRgba8(_) => self.clone(),
			_ => DynamicImage::ImageRgba8(self.to_rgba8()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use image::GenericImageView;
	use rstest::rstest;

	#[rstest]
	#[case(1, image::ColorType::L8)]
	#[case(2, image::ColorType::La8)]
	#[case(3, image::ColorType::Rgb8)]
	#[case(4, image::ColorType::Rgba8)]
	fn from_raw_by_channels(#[case] channels: usize, #[case] color: image::ColorType) {
		let image = DynamicImage::from_raw(3, 2, vec![7; 6 * channels]).unwrap();
		assert_eq!(image.color(), color);
		assert_eq!(image.dimensions(), (3, 2));
	}

	#[test]
	fn from_raw_errors() {
		assert!(DynamicImage::from_raw(3, 2, vec![0; 7]).is_err());
		assert!(DynamicImage::from_raw(3, 2, vec![0; 30]).is_err());
		assert!(DynamicImage::from_raw(0, 2, vec![]).is_err());
	}

	#[test]
	fn grey_texture_is_opaque_rgba() {
		let image = DynamicImage::from_fn_l8(2, 1, |x, _| if x == 0 { 10 } else { 200 });
		let texture = image.to_texture_rgba8();
		assert_eq!(texture.color(), image::ColorType::Rgba8);
		assert_eq!(texture.as_bytes(), &[10, 10, 10, 255, 200, 200, 200, 255]);
	}
}
