use crate::{
	RasterSource,
	geokeys::{GeoKeys, crs_from_keys, transform_from_tags},
	source::check_band,
};
use anyhow::{Context, Result, ensure};
use geooverlay_core::{GeoTransform, OverlayError};
use std::{
	fs::File,
	io::{BufReader, Read, Seek},
	path::{Path, PathBuf},
};
use tiff::{
	decoder::{Decoder, DecodingResult, Limits},
	tags::Tag,
};

/// A GeoTIFF read with the pure-Rust `tiff` decoder.
///
/// Opening reads only the header and GeoTIFF tags. Pixel data is decoded
/// on demand; all requested bands are served from one decode of the first
/// image in the file.
#[derive(Debug)]
pub struct TiffRaster {
	path: PathBuf,
	width: u32,
	height: u32,
	samples_per_pixel: usize,
	sample_type: String,
	geo_transform: Option<[f64; 6]>,
	crs: Option<String>,
}

impl TiffRaster {
	pub fn open(path: &Path) -> Result<Self> {
		Self::read_header(path).map_err(|err| {
			anyhow::Error::from(OverlayError::OpenFailed {
				path: path.to_path_buf(),
				reason: format!("{err:#}"),
			})
		})
	}

	fn read_header(path: &Path) -> Result<Self> {
		log::debug!("opening GeoTIFF {}", path.display());
		let mut decoder = open_decoder(path)?;

		let (width, height) = decoder.dimensions()?;
		ensure!(width > 0 && height > 0, "raster has no pixels");
		let (samples_per_pixel, bits) = sample_layout(&mut decoder)?;
		ensure!(samples_per_pixel > 0, "raster has no bands");

		let sample_format = decoder
			.find_tag(Tag::SampleFormat)?
			.map(|v| v.into_u16_vec())
			.transpose()?
			.and_then(|v| v.first().copied())
			.unwrap_or(1);
		let sample_type = match sample_format {
			2 => format!("i{bits}"),
			3 => format!("f{bits}"),
			_ => format!("u{bits}"),
		};

		let pixel_scale = f64_tag(&mut decoder, Tag::ModelPixelScaleTag)?;
		let tie_point = f64_tag(&mut decoder, Tag::ModelTiepointTag)?;
		let matrix = f64_tag(&mut decoder, Tag::ModelTransformationTag)?;
		let ascii_params = decoder
			.find_tag(Tag::GeoAsciiParamsTag)?
			.map(|v| v.into_string())
			.transpose()?;

		let keys = match decoder
			.find_tag(Tag::GeoKeyDirectoryTag)?
			.map(|v| v.into_u16_vec())
			.transpose()?
		{
			Some(directory) => GeoKeys::parse(&directory, ascii_params.as_deref()).unwrap_or_else(|err| {
				log::warn!("ignoring malformed GeoKey directory in {}: {err:#}", path.display());
				GeoKeys::default()
			}),
			None => GeoKeys::default(),
		};

		let geo_transform = transform_from_tags(
			pixel_scale.as_deref(),
			tie_point.as_deref(),
			matrix.as_deref(),
			keys.pixel_is_point(),
		);
		let crs = crs_from_keys(&keys, ascii_params.as_deref());

		log::trace!(
			"GeoTIFF {}: {width}x{height}, {samples_per_pixel} x {sample_type}, transform={geo_transform:?}, crs={crs:?}, citation={:?}",
			path.display(),
			keys.citation
		);

		Ok(Self {
			path: path.to_path_buf(),
			width,
			height,
			samples_per_pixel,
			sample_type,
			geo_transform,
			crs,
		})
	}

	/// Decodes all samples, interleaved, converted to bytes.
	fn decode_samples(&self) -> Result<Vec<u8>> {
		let mut decoder = open_decoder(&self.path)?;
		let samples = samples_to_bytes(decoder.read_image()?);
		let expected = self.width as usize * self.height as usize * self.samples_per_pixel;
		ensure!(
			samples.len() == expected,
			"decoded {} samples, expected {expected}",
			samples.len()
		);
		Ok(samples)
	}

	fn extract_band(&self, samples: &[u8], band: usize) -> Vec<u8> {
		samples
			.iter()
			.skip(band - 1)
			.step_by(self.samples_per_pixel)
			.copied()
			.collect()
	}
}

impl RasterSource for TiffRaster {
	fn path(&self) -> &Path {
		&self.path
	}

	fn raster_size(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	fn band_count(&self) -> usize {
		self.samples_per_pixel
	}

	fn geo_transform(&self) -> Result<GeoTransform> {
		match self.geo_transform {
			Some(coefficients) => GeoTransform::new(coefficients)
				.with_context(|| format!("invalid georeference in {}", self.path.display())),
			None => Err(OverlayError::NoGeoTransform(format!(
				"{} has neither tie point and pixel scale nor a transformation matrix",
				self.path.display()
			))
			.into()),
		}
	}

	fn crs(&self) -> Option<String> {
		self.crs.clone()
	}

	fn read_band(&self, band: usize) -> Result<Vec<u8>> {
		self.read_bands(&[band]).pop().unwrap_or_else(|| band_failed(band, "no data"))
	}

	fn read_bands(&self, bands: &[usize]) -> Vec<Result<Vec<u8>>> {
		let samples = self.decode_samples();
		bands
			.iter()
			.map(|&band| {
				check_band(self, band)?;
				match &samples {
					Ok(samples) => Ok(self.extract_band(samples, band)),
					Err(err) => band_failed(band, &format!("{err:#}")),
				}
			})
			.collect()
	}

	fn sample_type(&self) -> String {
		self.sample_type.clone()
	}
}

fn band_failed(band: usize, reason: &str) -> Result<Vec<u8>> {
	Err(OverlayError::BandReadFailed {
		band,
		reason: reason.to_string(),
	}
	.into())
}

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
	let file = File::open(path).with_context(|| format!("reading {}", path.display()))?;
	let decoder = Decoder::new(BufReader::new(file)).context("not a TIFF file")?;
	Ok(decoder.with_limits(Limits::unlimited()))
}

fn f64_tag<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Result<Option<Vec<f64>>> {
	Ok(decoder.find_tag(tag)?.map(|v| v.into_f64_vec()).transpose()?)
}

/// Samples per pixel and bits per sample, from the baseline TIFF tags.
fn sample_layout<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<(usize, u16)> {
	let samples_per_pixel = decoder
		.find_tag(Tag::SamplesPerPixel)?
		.map(|v| v.into_u16())
		.transpose()?
		.unwrap_or(1);
	let bits = decoder
		.find_tag(Tag::BitsPerSample)?
		.map(|v| v.into_u16_vec())
		.transpose()?
		.and_then(|v| v.first().copied())
		.unwrap_or(1);
	Ok((usize::from(samples_per_pixel), bits))
}

/// Converts decoded samples to bytes by clamping to `0..=255`.
fn samples_to_bytes(result: DecodingResult) -> Vec<u8> {
	fn float(v: f64) -> u8 {
		if v.is_nan() { 0 } else { v.round().clamp(0.0, 255.0) as u8 }
	}
	match result {
		DecodingResult::U8(v) => v,
		DecodingResult::U16(v) => v.into_iter().map(|s| s.min(255) as u8).collect(),
		DecodingResult::U32(v) => v.into_iter().map(|s| s.min(255) as u8).collect(),
		DecodingResult::U64(v) => v.into_iter().map(|s| s.min(255) as u8).collect(),
		DecodingResult::I8(v) => v.into_iter().map(|s| s.max(0) as u8).collect(),
		DecodingResult::I16(v) => v.into_iter().map(|s| s.clamp(0, 255) as u8).collect(),
		DecodingResult::I32(v) => v.into_iter().map(|s| s.clamp(0, 255) as u8).collect(),
		DecodingResult::I64(v) => v.into_iter().map(|s| s.clamp(0, 255) as u8).collect(),
		DecodingResult::F32(v) => v.into_iter().map(|s| float(f64::from(s))).collect(),
		DecodingResult::F64(v) => v.into_iter().map(float).collect(),
		#[allow(unreachable_patterns)]
		_ => Vec::new(),
	}
}
