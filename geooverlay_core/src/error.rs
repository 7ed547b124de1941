//! Typed failures of the overlay pipeline.
//!
//! Fallible functions return `anyhow::Result`; an [`OverlayError`] sits at
//! the root of the chain so that callers can classify a failure with
//! [`OverlayError::find`] after any number of `.context(...)` layers.

use std::{fmt, path::PathBuf};

#[derive(Clone, Debug, PartialEq)]
pub enum OverlayError {
	/// The file is missing, unreadable or not a raster.
	OpenFailed { path: PathBuf, reason: String },
	/// The raster has no usable pixel-to-world transform.
	NoGeoTransform(String),
	/// The raster carries no coordinate reference system.
	NoCrs,
	/// A coordinate transformation to WGS84 could not be built.
	TransformBuildFailed(String),
	/// A point could not be reprojected.
	TransformFailed(String),
	/// A single band failed to decode.
	BandReadFailed { band: usize, reason: String },
	/// The image could not be rebuilt for the current zoom.
	RecompositionFailed(String),
}

impl OverlayError {
	/// Fatal errors put the overlay into the error state. All others degrade
	/// the output but keep it usable.
	pub fn is_fatal(&self) -> bool {
		matches!(
			self,
			OverlayError::OpenFailed { .. } | OverlayError::NoGeoTransform(_) | OverlayError::RecompositionFailed(_)
		)
	}

	/// Searches `err` for an `OverlayError`, either attached as context or
	/// anywhere in its cause chain.
	pub fn find(err: &anyhow::Error) -> Option<&OverlayError> {
		err
			.downcast_ref::<OverlayError>()
			.or_else(|| err.chain().find_map(|cause| cause.downcast_ref::<OverlayError>()))
	}

	pub fn kind(&self) -> &'static str {
		match self {
			OverlayError::OpenFailed { .. } => "open_failed",
			OverlayError::NoGeoTransform(_) => "no_geo_transform",
			OverlayError::NoCrs => "no_crs",
			OverlayError::TransformBuildFailed(_) => "transform_build_failed",
			OverlayError::TransformFailed(_) => "transform_failed",
			OverlayError::BandReadFailed { .. } => "band_read_failed",
			OverlayError::RecompositionFailed(_) => "recomposition_failed",
		}
	}
}

impl fmt::Display for OverlayError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OverlayError::OpenFailed { path, reason } => {
				write!(f, "failed to open raster {}: {reason}", path.display())
			}
			OverlayError::NoGeoTransform(reason) => write!(f, "raster has no valid geotransform: {reason}"),
			OverlayError::NoCrs => write!(f, "raster has no coordinate reference system"),
			OverlayError::TransformBuildFailed(reason) => {
				write!(f, "failed to build transformation to WGS84: {reason}")
			}
			OverlayError::TransformFailed(reason) => write!(f, "coordinate transformation failed: {reason}"),
			OverlayError::BandReadFailed { band, reason } => write!(f, "failed to read band {band}: {reason}"),
			OverlayError::RecompositionFailed(reason) => write!(f, "failed to recompose overlay image: {reason}"),
		}
	}
}

impl std::error::Error for OverlayError {}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::Context;
	use pretty_assertions::assert_eq;

	#[test]
	fn find_through_context() {
		let result: anyhow::Result<()> = Err(OverlayError::NoCrs).context("loading x.tif").context("outer");
		let err = result.unwrap_err();
		assert_eq!(OverlayError::find(&err), Some(&OverlayError::NoCrs));
		assert!(OverlayError::find(&anyhow::anyhow!("plain")).is_none());
	}

	#[test]
	fn find_attached_as_context() {
		let err = anyhow::anyhow!("gpu lost").context(OverlayError::RecompositionFailed("upload".into()));
		assert_eq!(
			OverlayError::find(&err),
			Some(&OverlayError::RecompositionFailed("upload".into()))
		);
	}

	#[test]
	fn fatality() {
		assert!(
			OverlayError::OpenFailed {
				path: PathBuf::from("a.tif"),
				reason: "missing".into()
			}
			.is_fatal()
		);
		assert!(OverlayError::NoGeoTransform(String::new()).is_fatal());
		assert!(OverlayError::RecompositionFailed(String::new()).is_fatal());
		assert!(!OverlayError::NoCrs.is_fatal());
		assert!(!OverlayError::TransformFailed(String::new()).is_fatal());
		assert!(!OverlayError::BandReadFailed { band: 2, reason: String::new() }.is_fatal());
	}

	#[test]
	fn display() {
		let err = OverlayError::BandReadFailed {
			band: 3,
			reason: "checksum".into(),
		};
		assert_eq!(err.to_string(), "failed to read band 3: checksum");
		assert_eq!(err.kind(), "band_read_failed");
	}
}
