//! Image buffers for overlay rendering: building images from decoded raster
//! bands, resampling them to screen size and encoding them.

pub mod format;

mod resample;
pub use resample::*;

pub mod traits;
pub use traits::*;
