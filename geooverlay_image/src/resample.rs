//! Resampling filter used when a raster is scaled to its on-screen size.

use fast_image_resize::{FilterType, ResizeAlg};
use geooverlay_core::ScreenSize;
use serde::{Deserialize, Serialize};

/// Interpolation used when scaling the decoded raster.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
	/// Picks the closest pixel, keeps hard edges of classified rasters.
	Nearest,
	/// Interpolates over a 2×2 neighborhood.
	#[default]
	Bilinear,
}

impl ResampleFilter {
	pub fn as_resize_alg(&self) -> ResizeAlg {
		match self {
			ResampleFilter::Nearest => ResizeAlg::Nearest,
			ResampleFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
		}
	}
}

/// Scales `size` down uniformly so that neither side exceeds `max_dimension`.
///
/// Sizes that already fit are returned unchanged; sides never drop below 1.
pub fn fit_within(size: ScreenSize, max_dimension: u32) -> ScreenSize {
	let max_dimension = max_dimension.max(1);
	let longest = size.width.max(size.height);
	if longest <= max_dimension {
		return size;
	}
	let scale = f64::from(max_dimension) / f64::from(longest);
	let side = |v: u32| ((f64::from(v) * scale).round() as u32).clamp(1, max_dimension);
	ScreenSize::new(side(size.width), side(size.height))
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[rstest]
	#[case(ScreenSize::new(100, 50), 8192, ScreenSize::new(100, 50))]
	#[case(ScreenSize::new(20000, 10000), 8192, ScreenSize::new(8192, 4096))]
	#[case(ScreenSize::new(3, 100000), 1000, ScreenSize::new(1, 1000))]
	#[case(ScreenSize::new(10, 10), 0, ScreenSize::new(1, 1))]
	fn fit(#[case] size: ScreenSize, #[case] max: u32, #[case] expected: ScreenSize) {
		assert_eq!(fit_within(size, max), expected);
	}

	#[test]
	fn serde_names() {
		let filter: ResampleFilter = serde_yaml_ng::from_str("nearest").unwrap();
		assert_eq!(filter, ResampleFilter::Nearest);
		assert_eq!(serde_yaml_ng::to_string(&ResampleFilter::Bilinear).unwrap().trim(), "bilinear");
		assert_eq!(ResampleFilter::default(), ResampleFilter::Bilinear);
		assert!(matches!(ResampleFilter::Nearest.as_resize_alg(), ResizeAlg::Nearest));
	}
}
