//! GeoTIFF fixtures written on the fly with the `tiff` encoder.

use anyhow::{Result, bail};
use std::{fs::File, io::BufWriter, path::Path};
use tiff::{
	encoder::{TiffEncoder, colortype},
	tags::Tag,
};

/// Builder for a small 8-bit GeoTIFF with explicit GeoTIFF tags.
///
/// Defaults to a north-up raster at the origin with 1° pixels in EPSG:4326
/// and a diagonal gradient as pixel data.
#[derive(Clone, Debug)]
pub struct GeoTiffFixture {
	width: u32,
	height: u32,
	channels: u8,
	data: Option<Vec<u8>>,
	origin: (f64, f64),
	pixel_size: (f64, f64),
	epsg: Option<u16>,
	georeferenced: bool,
}

impl GeoTiffFixture {
	/// `channels` must be 1 (grey), 3 (RGB) or 4 (RGBA).
	pub fn new(width: u32, height: u32, channels: u8) -> Self {
		Self {
			width,
			height,
			channels,
			data: None,
			origin: (0.0, 0.0),
			pixel_size: (1.0, 1.0),
			epsg: Some(4326),
			georeferenced: true,
		}
	}

	/// Interleaved samples, `width * height * channels` bytes.
	pub fn with_data(mut self, data: Vec<u8>) -> Self {
		self.data = Some(data);
		self
	}

	/// Model coordinates of the top-left corner of pixel `(0, 0)`.
	pub fn with_origin(mut self, x: f64, y: f64) -> Self {
		self.origin = (x, y);
		self
	}

	/// Pixel size in model units, both positive; rows run southwards.
	pub fn with_pixel_size(mut self, x: f64, y: f64) -> Self {
		self.pixel_size = (x, y);
		self
	}

	pub fn with_epsg(mut self, epsg: Option<u16>) -> Self {
		self.epsg = epsg;
		self
	}

	pub fn without_georeference(mut self) -> Self {
		self.georeferenced = false;
		self
	}

	fn pixel_data(&self) -> Vec<u8> {
		self.data.clone().unwrap_or_else(|| {
			let channels = u32::from(self.channels);
			(0..self.height)
				.flat_map(|y| (0..self.width).flat_map(move |x| (0..channels).map(move |c| (x + y + c * 40) as u8)))
				.collect()
		})
	}

	fn geo_keys(&self) -> Option<Vec<u16>> {
		let epsg = self.epsg?;
		let geographic = (4000..5000).contains(&epsg);
		let (model_type, crs_key) = if geographic { (2, 2048) } else { (1, 3072) };
		Some(vec![
			1, 1, 0, 3, //
			1024, 0, 1, model_type, //
			1025, 0, 1, 1, //
			crs_key, 0, 1, epsg,
		])
	}

	pub fn write(&self, path: &Path) -> Result<()> {
		let data = self.pixel_data();
		let file = BufWriter::new(File::create(path)?);
		let mut encoder = TiffEncoder::new(file)?;
		let (w, h) = (self.width, self.height);
		match self.channels {
			1 => {
				let mut image = encoder.new_image::<colortype::Gray8>(w, h)?;
				self.write_geotiff_tags(image.encoder())?;
				image.write_data(&data)?;
			}
			3 => {
				let mut image = encoder.new_image::<colortype::RGB8>(w, h)?;
				self.write_geotiff_tags(image.encoder())?;
				image.write_data(&data)?;
			}
			4 => {
				let mut image = encoder.new_image::<colortype::RGBA8>(w, h)?;
				self.write_geotiff_tags(image.encoder())?;
				image.write_data(&data)?;
			}
			n => bail!("unsupported fixture channel count {n}"),
		}
		Ok(())
	}

	fn write_geotiff_tags<W: std::io::Write + std::io::Seek, K: tiff::encoder::TiffKind>(
		&self,
		dir: &mut tiff::encoder::DirectoryEncoder<W, K>,
	) -> Result<()> {
		if !self.georeferenced {
			return Ok(());
		}
		let scale = [self.pixel_size.0, self.pixel_size.1, 0.0];
		dir.write_tag(Tag::ModelPixelScaleTag, &scale[..])?;
		let tie_point = [0.0, 0.0, 0.0, self.origin.0, self.origin.1, 0.0];
		dir.write_tag(Tag::ModelTiepointTag, &tie_point[..])?;
		if let Some(keys) = self.geo_keys() {
			dir.write_tag(Tag::GeoKeyDirectoryTag, keys.as_slice())?;
		}
		Ok(())
	}
}
