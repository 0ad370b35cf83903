//! Nearest-feature matching: given a query point and a bag of candidate
//! features, find the building footprint and routable way an entrance should
//! attach to, or rank everything nearby for a picker list.

use std::collections::BTreeSet;

use geom::{Distance, LonLat, PolyLine, Projection, Ring};

use crate::feature::GeoFeature;
use crate::labels::{feature_label, label_priority};
use crate::osm;

/// The projection of a query point onto one candidate's geometry.
#[derive(Clone, Debug)]
pub struct MatchResult {
    pub feature: GeoFeature,
    pub nearest: LonLat,
    pub dist: Distance,
    /// Index of the geometry vertex starting the edge the projection hit;
    /// splicing a new node into the way happens right after this vertex.
    pub segment: usize,
}

/// The building and road nearest a proposed entrance location. Both optional;
/// finding nothing nearby is a valid result, not an error.
#[derive(Clone, Debug, Default)]
pub struct EntranceSite {
    pub building: Option<MatchResult>,
    pub road: Option<MatchResult>,
}

impl EntranceSite {
    /// Where the entrance should actually go: projected onto the building
    /// outline when one was found, the raw request otherwise.
    pub fn entrance_point(&self, requested: LonLat) -> LonLat {
        self.building
            .as_ref()
            .map(|m| m.nearest)
            .unwrap_or(requested)
    }
}

/// Buildings first; the road hookup is then measured from wherever the
/// entrance actually lands, not from the original request.
pub fn match_entrance_site(pt: LonLat, candidates: &[GeoFeature]) -> EntranceSite {
    let building = nearest_match(pt, candidates, |f| {
        matches!(f, GeoFeature::Way(_)) && !f.tags().contains_key(osm::HIGHWAY)
    });
    let entrance_pt = building.as_ref().map(|m| m.nearest).unwrap_or(pt);
    let road = nearest_match(entrance_pt, candidates, |f| {
        matches!(f, GeoFeature::Way(_)) && f.tags().contains_key(osm::HIGHWAY)
    });
    EntranceSite { building, road }
}

/// Scans candidates in order. An equidistant later candidate never displaces
/// an earlier one, so identical inputs always produce identical results.
fn nearest_match<F: Fn(&GeoFeature) -> bool>(
    pt: LonLat,
    candidates: &[GeoFeature],
    filter: F,
) -> Option<MatchResult> {
    let mut best: Option<MatchResult> = None;
    for f in candidates {
        if !filter(f) {
            continue;
        }
        let projection = match project_onto(pt, f) {
            Some(p) => p,
            None => continue,
        };
        if best.as_ref().map_or(true, |b| projection.dist < b.dist) {
            best = Some(MatchResult {
                feature: f.clone(),
                nearest: projection.pt,
                dist: projection.dist,
                segment: projection.segment,
            });
        }
    }
    best
}

fn project_onto(pt: LonLat, f: &GeoFeature) -> Option<Projection> {
    match f {
        GeoFeature::Node(n) => Some(Projection {
            pt: n.pt,
            dist: pt.dist_meters(n.pt),
            segment: 0,
        }),
        GeoFeature::Way(w) => {
            // Building outlines are rings; whether or not the data actually
            // repeats the first point, the closing edge has to count.
            if w.pts.len() >= 3 && !w.tags.contains_key(osm::HIGHWAY) {
                Some(Ring::new(w.pts.clone()).nearest_point(pt))
            } else {
                Some(PolyLine::maybe_new(w.pts.clone())?.nearest_point(pt))
            }
        }
        GeoFeature::Relation(_) => {
            debug!("skipping {} in matching; member geometry isn't resolved", f.id());
            None
        }
    }
}

/// One entry in a "nearby features" picker list.
#[derive(Clone, Debug)]
pub struct RankedFeature {
    pub feature: GeoFeature,
    pub label: String,
    pub dist: Distance,
}

/// Ranks node/way candidates for a picker: primary order is the label-rule
/// priority, secondary the caller's input order. Ways repeating an earlier
/// way's name are dropped (one entry per street), as are relations. Node
/// labels get a distance suffix.
pub fn rank_nearby_features(pt: LonLat, candidates: &[GeoFeature]) -> Vec<RankedFeature> {
    let mut seen_way_names: BTreeSet<Option<String>> = BTreeSet::new();
    let mut result: Vec<(usize, RankedFeature)> = Vec::new();

    for f in candidates {
        match f {
            GeoFeature::Relation(_) => continue,
            GeoFeature::Way(w) => {
                if !seen_way_names.insert(w.tags.get(osm::NAME).cloned()) {
                    continue;
                }
            }
            GeoFeature::Node(_) => {}
        }
        let projection = match project_onto(pt, f) {
            Some(p) => p,
            None => continue,
        };
        let label = match feature_label(f.tags()) {
            Some(label) => label,
            None => f.id().to_string(),
        };
        let label = if let GeoFeature::Node(_) = f {
            format!("{} ({})", label, projection.dist)
        } else {
            label
        };
        result.push((
            label_priority(f.tags()),
            RankedFeature {
                feature: f.clone(),
                label,
                dist: projection.dist,
            },
        ));
    }

    // Stable, so input order breaks ties within a priority tier
    result.sort_by_key(|(priority, _)| *priority);
    result.into_iter().map(|(_, f)| f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osm::{NodeID, OsmID, WayID};
    use crate::{Node, Tags, Way};

    fn building(id: i64, pts: Vec<LonLat>) -> GeoFeature {
        let tags = Tags::from_pairs([(osm::BUILDING, "yes")]);
        GeoFeature::Way(Way {
            id: WayID(id),
            version: Some(1),
            nodes: (0..pts.len() as i64).map(NodeID).collect(),
            pts,
            tags,
        })
    }

    fn road(id: i64, pts: Vec<LonLat>) -> GeoFeature {
        let tags = Tags::from_pairs([(osm::HIGHWAY, "residential")]);
        GeoFeature::Way(Way {
            id: WayID(id),
            version: Some(1),
            nodes: (0..pts.len() as i64).map(NodeID).collect(),
            pts,
            tags,
        })
    }

    fn square(lon: f64, lat: f64) -> Vec<LonLat> {
        vec![
            LonLat::new(lon, lat),
            LonLat::new(lon, lat + 0.0002),
            LonLat::new(lon + 0.0002, lat + 0.0002),
            LonLat::new(lon + 0.0002, lat),
            LonLat::new(lon, lat),
        ]
    }

    #[test]
    fn ties_go_to_the_first_candidate() {
        // Two identical buildings; the query can't tell them apart
        let candidates = vec![building(10, square(24.94, 60.17)), building(20, square(24.94, 60.17))];
        let query = LonLat::new(24.9401, 60.1699);

        let first = match_entrance_site(query, &candidates);
        let second = match_entrance_site(query, &candidates);

        let b1 = first.building.unwrap();
        let b2 = second.building.unwrap();
        assert_eq!(OsmID::Way(WayID(10)), b1.feature.id());
        assert_eq!(b1.feature.id(), b2.feature.id());
        assert_eq!(b1.nearest, b2.nearest);
        assert_eq!(b1.segment, b2.segment);
    }

    #[test]
    fn no_building_leaves_the_raw_point() {
        let candidates = vec![road(30, vec![
            LonLat::new(24.9390, 60.1690),
            LonLat::new(24.9410, 60.1690),
        ])];
        let query = LonLat::new(24.9400, 60.1695);

        let site = match_entrance_site(query, &candidates);
        assert!(site.building.is_none());
        assert_eq!(query, site.entrance_point(query));
        assert!(site.road.is_some());
    }

    #[test]
    fn road_is_matched_from_the_entrance_point() {
        // Building north of the query, road south of it. The entrance snaps to
        // the building's south edge, so the road projection must line up with
        // that edge, not with the original query point.
        let candidates = vec![
            building(1, square(24.9400, 60.1700)),
            road(2, vec![
                LonLat::new(24.9390, 60.1695),
                LonLat::new(24.9410, 60.1695),
            ]),
        ];
        let query = LonLat::new(24.9401, 60.1698);

        let site = match_entrance_site(query, &candidates);
        let entrance = site.entrance_point(query);
        let access = site.road.unwrap();
        assert!((entrance.latitude - 60.1700).abs() < 1e-6);
        assert!((access.nearest.longitude - entrance.longitude).abs() < 1e-6);
    }

    #[test]
    fn picker_ranks_by_label_rule_then_input_order() {
        let entrance_node = GeoFeature::Node(Node {
            id: NodeID(1),
            version: Some(1),
            pt: LonLat::new(24.9401, 60.1700),
            tags: Tags::from_pairs([(osm::ENTRANCE, "yes")]),
        });
        let gate = GeoFeature::Node(Node {
            id: NodeID(2),
            version: Some(1),
            pt: LonLat::new(24.9400, 60.1700),
            tags: Tags::from_pairs([(osm::BARRIER, "gate")]),
        });
        let street = road(3, vec![
            LonLat::new(24.9390, 60.1690),
            LonLat::new(24.9410, 60.1690),
        ]);

        // Input order is gate, street, entrance; rule priority must reorder
        let ranked = rank_nearby_features(
            LonLat::new(24.9400, 60.1699),
            &[gate, street, entrance_node],
        );
        assert_eq!(3, ranked.len());
        assert!(ranked[0].label.starts_with("Entrance ("));
        assert!(ranked[1].label.starts_with("Barrier: gate"));
        // The unnamed road matches no label rule and falls to the bottom
        assert_eq!(OsmID::Way(WayID(3)), ranked[2].feature.id());
    }

    #[test]
    fn picker_drops_duplicate_way_names() {
        let mut named = road(1, vec![
            LonLat::new(24.9390, 60.1690),
            LonLat::new(24.9410, 60.1690),
        ]);
        if let GeoFeature::Way(w) = &mut named {
            w.tags.insert(osm::NAME, "Unioninkatu");
        }
        let mut dupe = road(2, vec![
            LonLat::new(24.9390, 60.1692),
            LonLat::new(24.9410, 60.1692),
        ]);
        if let GeoFeature::Way(w) = &mut dupe {
            w.tags.insert(osm::NAME, "Unioninkatu");
        }

        let ranked = rank_nearby_features(LonLat::new(24.9400, 60.1691), &[named, dupe]);
        assert_eq!(1, ranked.len());
    }
}
