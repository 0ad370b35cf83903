use serde::{Deserialize, Serialize};

use crate::{LonLat, PolyLine, Projection};

// Maybe a misnomer, but like a PolyLine, but closed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    // first equals last
    pts: Vec<LonLat>,
}

impl Ring {
    /// Closes the sequence if the input doesn't already repeat its first
    /// point. Forgetting the last-to-first edge is how nearest-point searches
    /// on building outlines go wrong, so closure is enforced here, not left to
    /// callers.
    pub fn new(mut pts: Vec<LonLat>) -> Ring {
        assert!(pts.len() >= 3);
        if pts[0] != *pts.last().unwrap() {
            pts.push(pts[0]);
        }
        Ring { pts }
    }

    pub fn maybe_new(pts: Vec<LonLat>) -> Option<Ring> {
        if pts.len() < 3 {
            return None;
        }
        Some(Ring::new(pts))
    }

    pub fn points(&self) -> &Vec<LonLat> {
        &self.pts
    }

    /// Like `PolyLine::nearest_point`, with the closing edge in play like any
    /// other.
    pub fn nearest_point(&self, query: LonLat) -> Projection {
        PolyLine::new(self.pts.clone()).nearest_point(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A ~20m square just north of the query points below. The input is
    // deliberately unclosed; d back to a is the implicit closing edge.
    fn square() -> Vec<LonLat> {
        vec![
            LonLat::new(24.9400, 60.1700),
            LonLat::new(24.9400, 60.1702),
            LonLat::new(24.9404, 60.1702),
            LonLat::new(24.9404, 60.1700),
        ]
    }

    #[test]
    fn closing_edge_counts() {
        let ring = Ring::new(square());
        // South of the midpoint of the closing edge
        let query = LonLat::new(24.9402, 60.1699);
        let hit = ring.nearest_point(query);

        // The projection must land on the closing edge, not on a corner
        assert_eq!(3, hit.segment);
        assert!((hit.pt.longitude - 24.9402).abs() < 1e-6);
        assert!((hit.pt.latitude - 60.1700).abs() < 1e-6);

        // And it must beat every vertex
        for corner in square() {
            assert!(hit.dist < query.dist_meters(corner));
        }
    }

    #[test]
    fn already_closed_input_is_left_alone() {
        let mut pts = square();
        pts.push(pts[0]);
        let ring = Ring::new(pts.clone());
        assert_eq!(&pts, ring.points());
    }
}
