//! GeoTIFF tag interpretation: GeoKey directory, CRS and pixel-to-model
//! transform.

use anyhow::{Result, ensure};

const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GT_CITATION: u16 = 1026;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

const GEO_ASCII_PARAMS_TAG: u16 = 34737;
const RASTER_PIXEL_IS_POINT: u16 = 2;
const USER_DEFINED: u16 = 32767;

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct GeoKeys {
	pub model_type: Option<u16>,
	pub raster_type: Option<u16>,
	pub geographic_type: Option<u16>,
	pub projected_type: Option<u16>,
	pub citation: Option<String>,
}

impl GeoKeys {
	/// Parses a GeoKeyDirectory: a header `[version, revision, minor, count]`
	/// followed by `count` entries `[key, location, count, value]`. Only
	/// inline SHORT values and ASCII citations are of interest here.
	pub fn parse(directory: &[u16], ascii_params: Option<&str>) -> Result<Self> {
		ensure!(directory.len() >= 4, "GeoKey directory is too short");
		let key_count = directory[3] as usize;
		ensure!(
			directory.len() >= 4 + 4 * key_count,
			"GeoKey directory announces {key_count} keys but holds {} values",
			directory.len()
		);

		let mut keys = GeoKeys::default();
		for entry in directory[4..4 + 4 * key_count].chunks_exact(4) {
			let (key, location, count, value) = (entry[0], entry[1], entry[2], entry[3]);
			if location == 0 {
				match key {
					GT_MODEL_TYPE => keys.model_type = Some(value),
					GT_RASTER_TYPE => keys.raster_type = Some(value),
					GEOGRAPHIC_TYPE => keys.geographic_type = Some(value),
					PROJECTED_CS_TYPE => keys.projected_type = Some(value),
					_ => {}
				}
			} else if location == GEO_ASCII_PARAMS_TAG && key == GT_CITATION {
				keys.citation = ascii_params.and_then(|ascii| {
					let start = value as usize;
					let end = start + count as usize;
					ascii.get(start..end).map(|s| s.trim_end_matches(['|', '\0']).to_string())
				});
			}
		}
		Ok(keys)
	}

	pub fn pixel_is_point(&self) -> bool {
		self.raster_type == Some(RASTER_PIXEL_IS_POINT)
	}

	/// EPSG code of the projected CRS, or of the geographic CRS for
	/// unprojected rasters. User-defined and undefined codes yield `None`.
	pub fn epsg(&self) -> Option<u16> {
		let valid = |code: &u16| *code != 0 && *code != USER_DEFINED;
		self
			.projected_type
			.filter(valid)
			.or_else(|| self.geographic_type.filter(valid))
	}
}

/// Resolves the CRS string of a GeoTIFF: an EPSG code from the GeoKeys, or a
/// PROJ string stored in the ASCII parameters.
pub(crate) fn crs_from_keys(keys: &GeoKeys, ascii_params: Option<&str>) -> Option<String> {
	if let Some(code) = keys.epsg() {
		return Some(format!("EPSG:{code}"));
	}
	ascii_params
		.into_iter()
		.flat_map(|ascii| ascii.split('|'))
		.map(str::trim)
		.find(|part| part.starts_with("+proj="))
		.map(str::to_string)
}

/// Builds the affine coefficients from either a ModelTransformation matrix or
/// a tie point plus pixel scale. PixelIsPoint rasters are shifted by half a
/// pixel so that the transform addresses pixel corners.
pub(crate) fn transform_from_tags(
	pixel_scale: Option<&[f64]>,
	tie_point: Option<&[f64]>,
	matrix: Option<&[f64]>,
	pixel_is_point: bool,
) -> Option<[f64; 6]> {
	let mut gt = match (matrix, tie_point, pixel_scale) {
		(Some(m), _, _) if m.len() >= 16 => [m[3], m[0], m[1], m[7], m[4], m[5]],
		(_, Some(tp), Some(scale)) if tp.len() >= 6 && scale.len() >= 2 => {
			let (i, j, x, y) = (tp[0], tp[1], tp[3], tp[4]);
			let (sx, sy) = (scale[0], scale[1]);
			[x - i * sx, sx, 0.0, y + j * sy, 0.0, -sy]
		}
		_ => return None,
	};
	if pixel_is_point {
		gt[0] -= 0.5 * (gt[1] + gt[2]);
		gt[3] -= 0.5 * (gt[4] + gt[5]);
	}
	Some(gt)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn projected_key_wins() {
		let directory = [1, 1, 0, 3, 1024, 0, 1, 1, 2048, 0, 1, 4326, 3072, 0, 1, 32633];
		let keys = GeoKeys::parse(&directory, None).unwrap();
		assert_eq!(keys.model_type, Some(1));
		assert_eq!(keys.epsg(), Some(32633));
		assert_eq!(crs_from_keys(&keys, None).as_deref(), Some("EPSG:32633"));
	}

	#[test]
	fn user_defined_falls_back_to_proj_string() {
		let directory = [1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32767];
		let ascii = "+proj=utm +zone=33 +datum=WGS84|";
		let keys = GeoKeys::parse(&directory, Some(ascii)).unwrap();
		assert_eq!(keys.epsg(), None);
		assert_eq!(
			crs_from_keys(&keys, Some(ascii)).as_deref(),
			Some("+proj=utm +zone=33 +datum=WGS84")
		);
		assert_eq!(crs_from_keys(&keys, Some("my citation|")), None);
	}

	#[test]
	fn citation_from_ascii_params() {
		let directory = [1, 1, 0, 2, 1025, 0, 1, 2, 1026, 34737, 9, 0];
		let keys = GeoKeys::parse(&directory, Some("Somewhere|")).unwrap();
		assert_eq!(keys.citation.as_deref(), Some("Somewhere"));
		assert!(keys.pixel_is_point());
	}

	#[test]
	fn truncated_directory() {
		assert!(GeoKeys::parse(&[1, 1, 0], None).is_err());
		assert!(GeoKeys::parse(&[1, 1, 0, 2, 1024, 0, 1, 1], None).is_err());
	}

	#[test]
	fn tie_point_and_scale() {
		let gt = transform_from_tags(Some(&[0.5, 0.25, 0.0]), Some(&[0.0, 0.0, 0.0, 10.0, 50.0, 0.0]), None, false);
		assert_eq!(gt, Some([10.0, 0.5, 0.0, 50.0, 0.0, -0.25]));

		let shifted = transform_from_tags(Some(&[2.0, 2.0, 0.0]), Some(&[0.0, 0.0, 0.0, 10.0, 50.0, 0.0]), None, true);
		assert_eq!(shifted, Some([9.0, 2.0, 0.0, 51.0, 0.0, -2.0]));
	}

	#[test]
	fn transformation_matrix() {
		let m = [
			2.0, 0.5, 0.0, 100.0, //
			0.3, -1.5, 0.0, 200.0, //
			0.0, 0.0, 0.0, 0.0, //
			0.0, 0.0, 0.0, 1.0,
		];
		assert_eq!(
			transform_from_tags(None, None, Some(&m), false),
			Some([100.0, 2.0, 0.5, 200.0, 0.3, -1.5])
		);
		assert_eq!(transform_from_tags(Some(&[1.0, 1.0]), None, None, false), None);
	}
}
