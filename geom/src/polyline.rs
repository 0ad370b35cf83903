use serde::{Deserialize, Serialize};

use crate::{Distance, LonLat};

/// The nearest point on some geometry to a query point. `segment` is the index
/// of the vertex starting the edge the projection landed on; splicing a new
/// vertex into the geometry happens right after it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub pt: LonLat,
    pub dist: Distance,
    pub segment: usize,
}

/// An ordered sequence of at least two points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolyLine {
    pts: Vec<LonLat>,
}

impl PolyLine {
    pub fn new(pts: Vec<LonLat>) -> PolyLine {
        assert!(pts.len() >= 2);
        PolyLine { pts }
    }

    pub fn maybe_new(pts: Vec<LonLat>) -> Option<PolyLine> {
        if pts.len() < 2 {
            return None;
        }
        Some(PolyLine::new(pts))
    }

    pub fn points(&self) -> &Vec<LonLat> {
        &self.pts
    }

    pub fn length(&self) -> Distance {
        self.pts
            .windows(2)
            .map(|pair| pair[0].dist_meters(pair[1]))
            .sum::<Distance>()
    }

    /// Scans consecutive segments for the globally nearest projection of
    /// `query`. Ties go to the earliest segment, so results are reproducible
    /// for identical inputs.
    pub fn nearest_point(&self, query: LonLat) -> Projection {
        let mut best: Option<Projection> = None;
        for (idx, pair) in self.pts.windows(2).enumerate() {
            let pt = nearest_point_on_segment(query, pair[0], pair[1]);
            let dist = query.dist_meters(pt);
            if best.as_ref().map_or(true, |b| dist < b.dist) {
                best = Some(Projection {
                    pt,
                    dist,
                    segment: idx,
                });
            }
        }
        best.unwrap()
    }
}

/// Projects `query` onto the segment from `a` to `b`, clamped to the
/// endpoints. The projection happens in a flat frame centered on the query
/// point; plenty accurate at the scales matching works with.
pub fn nearest_point_on_segment(query: LonLat, a: LonLat, b: LonLat) -> LonLat {
    let (ax, ay) = query.to_local(a);
    let (bx, by) = query.to_local(b);
    let (dx, dy) = (bx - ax, by - ay);
    let len_squared = dx * dx + dy * dy;
    if len_squared == 0.0 {
        return a;
    }
    // The query point is the local origin
    let t = ((-ax * dx - ay * dy) / len_squared).clamp(0.0, 1.0);
    query.from_local(ax + t * dx, ay + t * dy)
}
