use super::convert::ImageTraitConvert;
use image::DynamicImage;

/// Gradient images used by tests across the workspace.
pub trait ImageTraitTest: ImageTraitConvert {
	fn new_test_rgba() -> DynamicImage;
	fn new_test_rgb() -> DynamicImage;
	fn new_test_grey() -> DynamicImage;
	fn new_test_greya() -> DynamicImage;
}

impl ImageTraitTest for DynamicImage
where
	DynamicImage: ImageTraitConvert,
{
	/// 256×256, red and green along x, blue and alpha along y.
	fn new_test_rgba() -> DynamicImage {
		DynamicImage::from_fn_rgba8(256, 256, |x, y| [x as u8, (255 - x) as u8, y as u8, (255 - y) as u8])
	}

	fn new_test_rgb() -> DynamicImage {
		DynamicImage::from_fn_rgb8(256, 256, |x, y| [x as u8, (255 - x) as u8, y as u8])
	}

	/// 256×256 grey ramp from black on the left to white on the right.
	fn new_test_grey() -> DynamicImage {
		DynamicImage::from_fn_l8(256, 256, |x, _y| x as u8)
	}

	fn new_test_greya() -> DynamicImage {
		DynamicImage::from_fn_la8(256, 256, |x, y| [x as u8, y as u8])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use image::GenericImageView;

	#[test]
	fn corners() {
		let image = DynamicImage::new_test_rgba();
		assert_eq!(image.dimensions(), (256, 256));
		assert_eq!(image.get_pixel(0, 0).0, [0, 255, 0, 255]);
		assert_eq!(image.get_pixel(255, 255).0, [255, 0, 255, 0]);
		assert_eq!(DynamicImage::new_test_grey().get_pixel(255, 3).0, [255, 255, 255, 255]);
	}
}
