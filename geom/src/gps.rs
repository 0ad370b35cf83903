use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Distance, EARTH_RADIUS_METERS};

// longitude is x, latitude is y
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> LonLat {
        LonLat {
            longitude: lon,
            latitude: lat,
        }
    }

    /// Haversine distance to another point, on a spherical earth model.
    /// Symmetric, and monotonic in how far apart the points are.
    pub fn dist_meters(self, other: LonLat) -> Distance {
        let lon1 = self.longitude.to_radians();
        let lon2 = other.longitude.to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let delta_lat = lat2 - lat1;
        let delta_lon = lon2 - lon1;

        let a = (delta_lat / 2.0).sin().powi(2)
            + (delta_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Distance::meters(EARTH_RADIUS_METERS * c)
    }

    pub fn center(pts: &[LonLat]) -> LonLat {
        let mut lon = 0.0;
        let mut lat = 0.0;
        for pt in pts {
            lon += pt.longitude;
            lat += pt.latitude;
        }
        let len = pts.len() as f64;
        LonLat {
            longitude: lon / len,
            latitude: lat / len,
        }
    }

    // A flat meters-based frame centered on self, longitude scaled by cos(lat).
    // Only trustworthy for points within a few hundred meters, which covers the
    // search radii used for matching.
    pub(crate) fn to_local(self, pt: LonLat) -> (f64, f64) {
        let scale = self.latitude.to_radians().cos();
        let x = (pt.longitude - self.longitude).to_radians() * scale * EARTH_RADIUS_METERS;
        let y = (pt.latitude - self.latitude).to_radians() * EARTH_RADIUS_METERS;
        (x, y)
    }

    pub(crate) fn from_local(self, x: f64, y: f64) -> LonLat {
        let scale = self.latitude.to_radians().cos();
        LonLat {
            longitude: self.longitude + (x / (scale * EARTH_RADIUS_METERS)).to_degrees(),
            latitude: self.latitude + (y / EARTH_RADIUS_METERS).to_degrees(),
        }
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LonLat({0}, {1})", self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dist_is_symmetric() {
        let p1 = LonLat::new(24.940, 60.170);
        let p2 = LonLat::new(24.941, 60.171);
        assert_eq!(p1.dist_meters(p2), p2.dist_meters(p1));
    }

    #[test]
    fn dist_has_the_right_scale() {
        // 0.001 degrees of latitude is about 111m anywhere on earth
        let p1 = LonLat::new(24.940, 60.170);
        let p2 = LonLat::new(24.940, 60.171);
        let m = p1.dist_meters(p2).inner_meters();
        assert!(m > 110.0 && m < 112.0, "got {}", m);
    }

    #[test]
    fn local_frame_roundtrips() {
        let origin = LonLat::new(24.940, 60.170);
        let pt = LonLat::new(24.9405, 60.1703);
        let (x, y) = origin.to_local(pt);
        let back = origin.from_local(x, y);
        assert!(pt.dist_meters(back).inner_meters() < 0.001);
    }
}
