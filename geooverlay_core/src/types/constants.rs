/// Spherical Mercator radius (WGS84 semi-major axis) in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator projection.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

pub const MAX_MERCATOR_LNG: f64 = 180.0;

/// Edge length of a map tile in screen pixels.
pub const TILE_SIZE: f64 = 256.0;

/// CRS identifier of geographic WGS84 coordinates.
pub const WGS84: &str = "EPSG:4326";
