#![allow(unused)]

use assert_cmd::{Command, cargo};
use geooverlay_raster::fixtures::GeoTiffFixture;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

#[cfg(windows)]
pub const BINARY_NAME: &str = "geooverlay.exe";
#[cfg(not(windows))]
pub const BINARY_NAME: &str = "geooverlay";

/// Helper to create a Command for the geooverlay binary.
pub fn geooverlay_cmd() -> Command {
	Command::new(cargo::cargo_bin!())
}

/// Writes a small RGB GeoTIFF (EPSG:4326, 0.5° pixels, top-left at 10°E 20°N)
/// into a fresh temp dir.
pub fn write_fixture(filename: &str) -> (TempDir, PathBuf) {
	let dir = tempdir().expect("failed to create temp dir");
	let path = dir.path().join(filename);
	GeoTiffFixture::new(8, 8, 3)
		.with_origin(10.0, 20.0)
		.with_pixel_size(0.5, 0.5)
		.write(&path)
		.expect("failed to write fixture");
	(dir, path)
}
