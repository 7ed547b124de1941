use anyhow::{Context, Result, anyhow, bail};
use image::{DynamicImage, ImageEncoder, ImageFormat, codecs::png, load_from_memory_with_format};
use std::{fs, path::Path};

/// Encodes an 8-bit grey, grey-alpha, RGB or RGBA image as PNG.
pub fn encode(image: &DynamicImage) -> Result<Vec<u8>> {
	if image.color().bytes_per_pixel() != image.color().channel_count() {
		bail!("png only supports 8-bit images");
	}

	let mut buffer: Vec<u8> = Vec::new();
	png::PngEncoder::new_with_quality(&mut buffer, png::CompressionType::Fast, png::FilterType::Adaptive)
		.write_image(
			image.as_bytes(),
			image.width(),
			image.height(),
			image.color().into(),
		)?;

	Ok(buffer)
}

pub fn decode(data: &[u8]) -> Result<DynamicImage> {
	load_from_memory_with_format(data, ImageFormat::Png).map_err(|e| anyhow!("Failed to decode PNG image: {e}"))
}

pub fn save(image: &DynamicImage, path: &Path) -> Result<()> {
	let data = encode(image)?;
	fs::write(path, data).with_context(|| format!("writing PNG to {}", path.display()))
}
