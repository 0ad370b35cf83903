use serde::{Deserialize, Serialize};

use crate::{Distance, LonLat, EARTH_RADIUS_METERS};

/// An axis-aligned box in lon/lat space, used to scope remote feature queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new() -> BoundingBox {
        BoundingBox {
            min_lon: f64::MAX,
            min_lat: f64::MAX,
            max_lon: f64::MIN,
            max_lat: f64::MIN,
        }
    }

    /// The box spanning `radius` in every direction from `center`.
    pub fn from_center(center: LonLat, radius: Distance) -> BoundingBox {
        let delta_lat = (radius.inner_meters() / EARTH_RADIUS_METERS).to_degrees();
        let delta_lon = delta_lat / center.latitude.to_radians().cos();
        BoundingBox {
            min_lon: center.longitude - delta_lon,
            min_lat: center.latitude - delta_lat,
            max_lon: center.longitude + delta_lon,
            max_lat: center.latitude + delta_lat,
        }
    }

    pub fn update(&mut self, pt: LonLat) {
        self.min_lon = self.min_lon.min(pt.longitude);
        self.max_lon = self.max_lon.max(pt.longitude);
        self.min_lat = self.min_lat.min(pt.latitude);
        self.max_lat = self.max_lat.max(pt.latitude);
    }

    pub fn contains(&self, pt: LonLat) -> bool {
        pt.longitude >= self.min_lon
            && pt.longitude <= self.max_lon
            && pt.latitude >= self.min_lat
            && pt.latitude <= self.max_lat
    }
}

impl Default for BoundingBox {
    fn default() -> BoundingBox {
        BoundingBox::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_center_covers_the_radius() {
        let center = LonLat::new(24.940, 60.170);
        let bbox = BoundingBox::from_center(center, Distance::meters(100.0));
        assert!(bbox.contains(center));

        // The edges should be roughly 100m out from the center
        let north = LonLat::new(center.longitude, bbox.max_lat);
        let m = center.dist_meters(north).inner_meters();
        assert!(m > 99.0 && m < 101.0, "got {}", m);

        let east = LonLat::new(bbox.max_lon, center.latitude);
        let m = center.dist_meters(east).inner_meters();
        assert!(m > 99.0 && m < 101.0, "got {}", m);
    }
}
