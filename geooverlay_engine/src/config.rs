use anyhow::{Context, Result};
use geooverlay_image::ResampleFilter;
use serde::{Deserialize, Serialize};
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

/// Where the decode-and-resample step of a zoom change runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecomposeMode {
	/// On the owning thread, inside the event handler.
	#[default]
	Inline,
	/// As a cancellable blocking task on the tokio runtime. Falls back to
	/// inline when no runtime is available.
	Background,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct OverlayConfig {
	/// Interpolation used when the raster is scaled to its screen size
	pub resample: ResampleFilter,

	/// Run recomposition inline or in the background
	pub recompose: RecomposeMode,

	/// Longest side of the composited buffer in pixels. Larger rectangles are
	/// composited at a reduced size and stretched when drawn.
	pub max_buffer_dimension: u32,

	/// Skip recomposition while the overlay is completely off screen
	pub cull_offscreen: bool,
}

impl Default for OverlayConfig {
	fn default() -> Self {
		Self {
			resample: ResampleFilter::default(),
			recompose: RecomposeMode::default(),
			max_buffer_dimension: 8192,
			cull_offscreen: true,
		}
	}
}

impl OverlayConfig {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
		Self::from_reader(BufReader::new(file)).with_context(|| format!("parsing config {}", path.display()))
	}
}
