use anyhow::{Result, bail};
use std::fmt::Debug;

pub struct BandMappingItem {
	pub band_index: usize,
	pub channel_index: usize,
}

/// Which raster band feeds which output channel.
///
/// | bands | output | mapping |
/// |---|---|---|
/// | 1 | grey | 1 → grey |
/// | 2 | grey | 1 → grey, band 2 ignored |
/// | 3 | RGB | 1, 2, 3 → R, G, B |
/// | ≥ 4 | RGBA | 1, 2, 3, 4 → R, G, B, A, further bands ignored |
#[derive(Clone, PartialEq, Eq)]
pub struct BandMapping {
	map: Vec<usize>,
}

impl BandMapping {
	pub fn from_band_count(band_count: usize) -> Result<Self> {
		let map = match band_count {
			0 => bail!("raster has no bands"),
			1 | 2 => vec![1],
			3 => vec![1, 2, 3],
			_ => vec![1, 2, 3, 4],
		};
		log::trace!("band mapping for {band_count} bands: {map:?}");
		Ok(BandMapping { map })
	}

	/// Number of output channels.
	pub fn len(&self) -> usize {
		self.map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.is_empty()
	}

	pub fn has_alpha(&self) -> bool {
		self.map.len() == 4
	}

	pub fn bands(&self) -> &[usize] {
		&self.map
	}

	pub fn layout_name(&self) -> &'static str {
		match self.map.len() {
			1 => "grey",
			3 => "rgb",
			_ => "rgba",
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = BandMappingItem> + '_ {
		self
			.map
			.iter()
			.enumerate()
			.map(|(channel_index, &band_index)| BandMappingItem {
				band_index,
				channel_index,
			})
	}
}

impl Debug for BandMapping {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "BandMapping {{ map: {:?} }}", self.map)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(1, &[1], "grey")]
	#[case(2, &[1], "grey")]
	#[case(3, &[1, 2, 3], "rgb")]
	#[case(4, &[1, 2, 3, 4], "rgba")]
	#[case(7, &[1, 2, 3, 4], "rgba")]
	fn mapping_by_band_count(#[case] band_count: usize, #[case] mapping: &[usize], #[case] layout: &str) {
		let bm = BandMapping::from_band_count(band_count).unwrap();
		let got: Vec<_> = bm
			.iter()
			.enumerate()
			.map(|(i, it)| {
				assert_eq!(i, it.channel_index);
				it.band_index
			})
			.collect();
		assert_eq!(got, mapping);
		assert_eq!(bm.layout_name(), layout);
		assert_eq!(bm.has_alpha(), band_count >= 4);
	}

	#[test]
	fn zero_bands() {
		assert_eq!(
			BandMapping::from_band_count(0).unwrap_err().to_string(),
			"raster has no bands"
		);
	}

	#[test]
	fn debug_fmt_includes_map() {
		let bm = BandMapping::from_band_count(3).unwrap();
		assert_eq!(format!("{bm:?}"), "BandMapping { map: [1, 2, 3] }");
	}
}
