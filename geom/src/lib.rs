//! Just enough geometry for matching points against geographic features:
//! spherical distance, point-to-segment projection, and nearest-point search
//! over polylines and closed rings. Everything works directly on lon/lat
//! coordinates and is pure; no I/O, no caching.

mod bbox;
mod distance;
mod gps;
mod polyline;
mod ring;

pub use crate::bbox::BoundingBox;
pub use crate::distance::Distance;
pub use crate::gps::LonLat;
pub use crate::polyline::{nearest_point_on_segment, PolyLine, Projection};
pub use crate::ring::Ring;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
