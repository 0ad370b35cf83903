//! Turns a matched entrance site into a concrete creation plan: where the
//! entrance node goes, what it's tagged with, and optionally a short
//! connecting way to the nearest road. Pure data transformation; committing
//! the plan is the protocol client's job.

use geom::LonLat;

use crate::find_closest::{EntranceSite, MatchResult};
use crate::osm;
use crate::{GeoFeature, Tags};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntranceKind {
    Delivery,
    Other,
}

/// Everything needed to commit a new entrance. Built once per user
/// confirmation, consumed by value exactly once, never persisted.
#[derive(Clone, Debug)]
pub struct EntrancePlan {
    pub entrance_point: LonLat,
    pub building: Option<MatchResult>,
    pub road: Option<MatchResult>,
    /// Only present when `road` is.
    pub access_point: Option<LonLat>,
    pub entrance_tags: Tags,
    pub way_tags: Option<Tags>,
}

/// `steps` lets an already-surveyed flight of steps supply the connecting
/// way's tags; otherwise the way defaults to a destination-access path.
pub fn plan_entrance(
    point: LonLat,
    site: EntranceSite,
    kind: EntranceKind,
    connect_road: bool,
    steps: Option<&Tags>,
) -> EntrancePlan {
    let entrance_point = site.entrance_point(point);

    let mut entrance_tags = Tags::new();
    entrance_tags.insert(
        osm::ENTRANCE,
        match kind {
            EntranceKind::Delivery => "service",
            EntranceKind::Other => "yes",
        },
    );
    if let Some(building) = &site.building {
        for key in [osm::ADDR_STREET, osm::ADDR_HOUSENUMBER, osm::ADDR_UNIT] {
            if let Some(v) = building.feature.tags().get(key) {
                entrance_tags.insert(key, v.clone());
            }
        }
    }

    let (access_point, way_tags) = match (&site.road, connect_road) {
        (Some(road), true) => {
            let tags = match steps {
                Some(tags) => tags.clone(),
                None => {
                    let mut tags = Tags::new();
                    tags.insert(
                        osm::HIGHWAY,
                        match kind {
                            EntranceKind::Delivery => "service",
                            EntranceKind::Other => "footway",
                        },
                    );
                    tags.insert(osm::ACCESS, "destination");
                    tags
                }
            };
            (Some(road.nearest), Some(tags))
        }
        _ => (None, None),
    };

    EntrancePlan {
        entrance_point,
        building: site.building,
        road: site.road,
        access_point,
        entrance_tags,
        way_tags,
    }
}

impl EntrancePlan {
    /// The building outline with the entrance spliced in after the edge it
    /// projected onto; used for previews and for the way-update payload.
    pub fn spliced_building_points(&self) -> Option<Vec<LonLat>> {
        let m = self.building.as_ref()?;
        Some(splice(m, self.entrance_point))
    }

    /// The road with the access point spliced in, when a connecting way is
    /// planned.
    pub fn spliced_road_points(&self) -> Option<Vec<LonLat>> {
        let m = self.road.as_ref()?;
        let access = self.access_point?;
        Some(splice(m, access))
    }
}

fn splice(m: &MatchResult, pt: LonLat) -> Vec<LonLat> {
    let mut pts = match &m.feature {
        GeoFeature::Way(w) => w.pts.clone(),
        _ => return Vec::new(),
    };
    pts.insert((m.segment + 1).min(pts.len()), pt);
    pts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::find_closest::match_entrance_site;
    use crate::osm::{NodeID, WayID};
    use crate::Way;

    fn building_with_address() -> GeoFeature {
        let pts = vec![
            LonLat::new(24.9400, 60.1700),
            LonLat::new(24.9400, 60.1702),
            LonLat::new(24.9404, 60.1702),
            LonLat::new(24.9404, 60.1700),
            LonLat::new(24.9400, 60.1700),
        ];
        GeoFeature::Way(Way {
            id: WayID(1),
            version: Some(3),
            nodes: (0..pts.len() as i64).map(NodeID).collect(),
            pts,
            tags: Tags::from_pairs([
                (osm::BUILDING, "yes"),
                (osm::ADDR_STREET, "Unioninkatu"),
                (osm::ADDR_HOUSENUMBER, "12"),
            ]),
        })
    }

    fn road() -> GeoFeature {
        GeoFeature::Way(Way {
            id: WayID(2),
            version: Some(1),
            nodes: vec![NodeID(100), NodeID(101)],
            pts: vec![LonLat::new(24.9390, 60.1695), LonLat::new(24.9410, 60.1695)],
            tags: Tags::from_pairs([(osm::HIGHWAY, "residential")]),
        })
    }

    #[test]
    fn no_road_means_no_way() {
        let query = LonLat::new(24.9401, 60.1699);
        let site = match_entrance_site(query, &[building_with_address()]);
        let plan = plan_entrance(query, site, EntranceKind::Other, true, None);

        assert!(plan.access_point.is_none());
        assert!(plan.way_tags.is_none());
        assert!(plan.building.is_some());
    }

    #[test]
    fn entrance_inherits_the_building_address() {
        let query = LonLat::new(24.9401, 60.1699);
        let site = match_entrance_site(query, &[building_with_address()]);
        let plan = plan_entrance(query, site, EntranceKind::Other, false, None);

        assert!(plan.entrance_tags.is(osm::ENTRANCE, "yes"));
        assert!(plan.entrance_tags.is(osm::ADDR_STREET, "Unioninkatu"));
        assert!(plan.entrance_tags.is(osm::ADDR_HOUSENUMBER, "12"));
    }

    #[test]
    fn delivery_entrances_get_a_service_way() {
        let query = LonLat::new(24.9401, 60.1699);
        let site = match_entrance_site(query, &[building_with_address(), road()]);
        let plan = plan_entrance(query, site, EntranceKind::Delivery, true, None);

        assert!(plan.entrance_tags.is(osm::ENTRANCE, "service"));
        let way_tags = plan.way_tags.unwrap();
        assert!(way_tags.is(osm::HIGHWAY, "service"));
        assert!(way_tags.is(osm::ACCESS, "destination"));
        assert!(plan.access_point.is_some());
    }

    #[test]
    fn steps_tags_override_the_default_way() {
        let query = LonLat::new(24.9401, 60.1699);
        let site = match_entrance_site(query, &[building_with_address(), road()]);
        let steps = Tags::from_pairs([(osm::HIGHWAY, "steps"), ("step_count", "6")]);
        let plan = plan_entrance(query, site, EntranceKind::Other, true, Some(&steps));

        assert_eq!(Some(steps), plan.way_tags);
    }

    #[test]
    fn splicing_inserts_after_the_projected_edge() {
        let query = LonLat::new(24.9401, 60.1699);
        let site = match_entrance_site(query, &[building_with_address()]);
        let plan = plan_entrance(query, site, EntranceKind::Other, false, None);

        let spliced = plan.spliced_building_points().unwrap();
        assert_eq!(6, spliced.len());
        assert!(spliced.contains(&plan.entrance_point));
    }
}
