mod constants;
mod footprint;
mod geo_bbox;
mod geo_point;
mod geo_shape;
mod geo_transform;
mod screen;

pub use constants::*;
pub use footprint::*;
pub use geo_bbox::*;
pub use geo_point::*;
pub use geo_shape::*;
pub use geo_transform::*;
pub use screen::*;
