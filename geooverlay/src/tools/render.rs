use anyhow::{Context, Result, bail, ensure};
use geooverlay_core::{GeoBBox, GeoPoint, MapViewport, ScreenSize, TILE_SIZE};
use geooverlay_engine::{CanvasSurface, OverlayConfig, OverlayEngine, OverlayStatus, RecomposeMode};
use geooverlay_image::{ResampleFilter, format::png};
use std::{f64::consts::PI, path::PathBuf, sync::Arc};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoTIFF file, as a path or file:// URI
	#[arg()]
	input_file: String,

	/// PNG file to write
	#[arg(long, short)]
	output: PathBuf,

	/// center of the view, defaults to the center of the raster
	#[arg(long, value_name = "lat,lon", allow_hyphen_values = true, value_parser = parse_center, display_order = 1)]
	center: Option<GeoPoint>,

	/// zoom level of the view, defaults to fitting the raster
	#[arg(long, short, value_name = "float", display_order = 1)]
	zoom: Option<f64>,

	/// size of the view in pixels
	#[arg(long, short, value_name = "WxH", default_value = "1024x768", value_parser = parse_size, display_order = 1)]
	size: ScreenSize,

	/// overlay configuration (YAML)
	#[arg(long, short, value_name = "FILE", display_order = 2)]
	config: Option<PathBuf>,

	/// override the resampling filter of the configuration
	#[arg(long, value_enum, display_order = 2)]
	filter: Option<ResampleFilter>,

	/// recompose on a background task
	#[arg(long, display_order = 2)]
	background: bool,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("render {:?} to {:?}", arguments.input_file, arguments.output);

	let mut config = match &arguments.config {
		Some(path) => OverlayConfig::from_path(path)?,
		None => OverlayConfig::default(),
	};
	if let Some(filter) = arguments.filter {
		config.resample = filter;
	}
	if arguments.background {
		config.recompose = RecomposeMode::Background;
	}

	let size = arguments.size;
	let mut engine = OverlayEngine::new(CanvasSurface::new(size), config);
	engine.set_source(&arguments.input_file)?;
	let bbox = engine
		.footprint()
		.map(|footprint| footprint.bbox())
		.context("raster has no footprint")?;
	if engine.is_degraded() {
		log::warn!("{}", engine.status_message());
	}
	if engine.is_skewed() {
		log::warn!("raster is rotated and drawn as its bounding box");
	}

	let center = arguments.center.unwrap_or_else(|| bbox.center());
	let zoom = arguments.zoom.unwrap_or_else(|| fit_zoom(&bbox, size));
	log::debug!("view centered on {center:?} at zoom {zoom:.2}");

	let viewport = Arc::new(MapViewport::new(center, zoom, size));
	engine.attach_viewport(&viewport);
	engine.settle().await;
	ensure!(
		engine.status() == OverlayStatus::Ready,
		"{}",
		engine.status_message()
	);

	match engine.screen_rect() {
		Some(rect) if !rect.is_outside(size) => log::debug!("raster drawn at {rect:?}"),
		_ => log::warn!("raster is outside of the view"),
	}

	engine.render();
	let image = image_of(engine.surface());
	png::save(&image, &arguments.output)?;

	eprintln!("finished rendering");

	Ok(())
}

fn image_of(surface: &CanvasSurface) -> image::DynamicImage {
	image::DynamicImage::ImageRgba8(surface.canvas().clone())
}

/// Largest zoom level at which `bbox` still fits into `size`.
fn fit_zoom(bbox: &GeoBBox, size: ScreenSize) -> f64 {
	let mercator_y = |lat: f64| {
		let lat = lat.clamp(-85.0, 85.0).to_radians();
		(PI / 4.0 + lat / 2.0).tan().ln()
	};
	let dx = bbox.width() / 360.0;
	let dy = (mercator_y(bbox.y_max) - mercator_y(bbox.y_min)) / (2.0 * PI);
	let zoom_for = |pixels: u32, fraction: f64| {
		if fraction > 0.0 {
			(f64::from(pixels) / (TILE_SIZE * fraction)).log2()
		} else {
			f64::INFINITY
		}
	};
	let zoom = zoom_for(size.width, dx).min(zoom_for(size.height, dy));
	if zoom.is_finite() { zoom.clamp(0.0, 22.0) } else { 0.0 }
}

fn parse_center(text: &str) -> Result<GeoPoint> {
	let values = text
		.split(&[',', ' ', ';'])
		.filter(|s| !s.is_empty())
		.map(|s| s.parse::<f64>().with_context(|| format!("{s:?} is not a number")))
		.collect::<Result<Vec<f64>>>()?;
	let [lat, lon] = values[..] else {
		bail!("center must be two numbers \"lat,lon\", got {text:?}");
	};
	ensure!((-90.0..=90.0).contains(&lat), "latitude {lat} out of range");
	Ok(GeoPoint::from_lat_lon(lat, lon))
}

fn parse_size(text: &str) -> Result<ScreenSize> {
	let Some((width, height)) = text.split_once(['x', 'X']) else {
		bail!("size must look like \"1024x768\", got {text:?}");
	};
	let size = ScreenSize::new(width.trim().parse()?, height.trim().parse()?);
	ensure!(!size.is_empty(), "size must not be empty");
	Ok(size)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::run_command;
	use approx::assert_relative_eq;
	use geooverlay_raster::fixtures::GeoTiffFixture;
	use rstest::rstest;

	#[rstest]
	#[case("52.5,13.4", 52.5, 13.4)]
	#[case("-33.9, 151.2", -33.9, 151.2)]
	#[case("0;0", 0.0, 0.0)]
	fn centers(#[case] text: &str, #[case] lat: f64, #[case] lon: f64) {
		let center = parse_center(text).unwrap();
		assert_eq!((center.lat(), center.lon()), (lat, lon));
	}

	#[rstest]
	#[case("52.5")]
	#[case("1,2,3")]
	#[case("north,east")]
	#[case("95,0")]
	fn bad_centers(#[case] text: &str) {
		assert!(parse_center(text).is_err());
	}

	#[test]
	fn sizes() {
		assert_eq!(parse_size("800x600").unwrap(), ScreenSize::new(800, 600));
		assert_eq!(parse_size("64X32").unwrap(), ScreenSize::new(64, 32));
		assert!(parse_size("800").is_err());
		assert!(parse_size("0x10").is_err());
		assert!(parse_size("ax10").is_err());
	}

	#[test]
	fn fit_whole_world() {
		let world = GeoBBox::new(-180.0, -85.051_128_779_806_59, 180.0, 85.051_128_779_806_59).unwrap();
		assert_relative_eq!(fit_zoom(&world, ScreenSize::new(512, 512)), 1.0, epsilon = 1e-3);
		let point = GeoBBox::new(1.0, 1.0, 1.0, 1.0).unwrap();
		assert_eq!(fit_zoom(&point, ScreenSize::new(512, 512)), 0.0);
	}

	#[test]
	fn render_fixture() {
		let dir = tempfile::tempdir().unwrap();
		let input = dir.path().join("in.tif");
		let output = dir.path().join("out.png");
		GeoTiffFixture::new(8, 8, 3)
			.with_origin(10.0, 20.0)
			.with_pixel_size(0.5, 0.5)
			.write(&input)
			.unwrap();

		run_command(vec![
			"geooverlay",
			"render",
			"-q",
			input.to_str().unwrap(),
			"--output",
			output.to_str().unwrap(),
			"--size",
			"64x64",
		])
		.unwrap();

		let image = png::decode(&std::fs::read(&output).unwrap()).unwrap();
		assert_eq!((image.width(), image.height()), (64, 64));
		assert_eq!(image.to_rgba8().get_pixel(32, 32).0[3], 255);
	}

	#[test]
	fn render_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let output = dir.path().join("out.png");
		let result = run_command(vec![
			"geooverlay",
			"render",
			"-q",
			"/does/not/exist.tif",
			"-o",
			output.to_str().unwrap(),
		]);
		assert!(result.is_err());
		assert!(!output.exists());
	}
}
