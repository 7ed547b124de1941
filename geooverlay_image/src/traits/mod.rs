//! Extension traits for [`image::DynamicImage`].
//!
//! - [`ImageTraitConvert`]: building images from interleaved raster samples and
//!   converting them into drawable textures.
//! - [`ImageTraitOperation`]: resampling to a target size.

mod convert;
mod operation;
#[cfg(any(test, feature = "test"))]
mod test;

pub use convert::*;
pub use operation::*;
#[cfg(any(test, feature = "test"))]
pub use test::*;
