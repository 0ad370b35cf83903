//! Bounding-box queries against the spatial feature database (an
//! Overpass-dialect endpoint), decoded into typed features, plus the
//! supersession gate that keeps late results from clobbering newer ones.

use std::collections::BTreeMap;

use serde::Deserialize;

use geom::{BoundingBox, Distance, LonLat};
use osm_model::osm::{NodeID, OsmID, RelationID, WayID};
use osm_model::{GeoFeature, Node, Relation, Tags, Way};

use crate::error::ApiError;

pub struct QueryClient {
    api_url: String,
    client: reqwest::Client,
}

impl QueryClient {
    pub fn new(api_url: &str) -> QueryClient {
        QueryClient {
            api_url: api_url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetches every feature matching `filter` within `radius` of `center`.
    /// One shot, no retry; the caller decides what a failure means. The
    /// request asks for metadata so every returned feature carries a version.
    pub async fn query(
        &self,
        center: LonLat,
        radius: Distance,
        filter: &str,
    ) -> Result<Vec<GeoFeature>, ApiError> {
        let bbox = BoundingBox::from_center(center, radius);
        let query = format!(
            "[out:json][timeout:25][bbox:{},{},{},{}];({});out meta geom;",
            bbox.min_lat, bbox.min_lon, bbox.max_lat, bbox.max_lon, filter
        );
        debug!("query: {}", query);
        let resp = self.client.post(&self.api_url).body(query).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::Transport(format!(
                "POST {}: HTTP {} {}",
                self.api_url, status, text
            )));
        }
        let features = decode(&text)?;
        info!("got {} features near {}", features.len(), center);
        Ok(features)
    }
}

/// The query used for entrance siting: building outlines (including buildings
/// mapped as relations, via their member ways) and paths on the matching
/// layer.
pub fn entrance_site_filter(layer: Option<&str>) -> String {
    match layer {
        Some(layer) => format!(
            "relation[building];way(r);way[building];way[highway][layer={}];",
            layer
        ),
        None => r#"relation[building];way(r);way[building];way[highway][layer!~".*"];"#.to_string(),
    }
}

#[derive(Deserialize)]
struct Response {
    elements: Vec<Element>,
}

#[derive(Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    version: Option<i32>,
    tags: Option<BTreeMap<String, String>>,
    lat: Option<f64>,
    lon: Option<f64>,
    nodes: Option<Vec<i64>>,
    geometry: Option<Vec<RawPoint>>,
    members: Option<Vec<Member>>,
}

#[derive(Deserialize)]
struct RawPoint {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct Member {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "ref")]
    id: i64,
    role: String,
}

// Elements missing a version or their geometry are just filtered out, the
// same way references to missing objects are.
fn decode(raw: &str) -> Result<Vec<GeoFeature>, ApiError> {
    let response: Response = serde_json::from_str(raw)
        .map_err(|err| ApiError::Transport(format!("bad feature collection: {}", err)))?;
    let mut result = Vec::new();
    for el in response.elements {
        let version = match el.version {
            Some(v) => Some(v),
            None => {
                warn!("skipping {} {} with no version", el.kind, el.id);
                continue;
            }
        };
        let tags = Tags::from_pairs(el.tags.unwrap_or_default());
        match el.kind.as_str() {
            "node" => match (el.lat, el.lon) {
                (Some(lat), Some(lon)) => result.push(GeoFeature::Node(Node {
                    id: NodeID(el.id),
                    version,
                    pt: LonLat::new(lon, lat),
                    tags,
                })),
                _ => warn!("skipping node {} with no position", el.id),
            },
            "way" => {
                let pts: Vec<LonLat> = el
                    .geometry
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| LonLat::new(p.lon, p.lat))
                    .collect();
                if pts.is_empty() {
                    warn!("skipping way {} with no geometry", el.id);
                    continue;
                }
                result.push(GeoFeature::Way(Way {
                    id: WayID(el.id),
                    version,
                    nodes: el.nodes.unwrap_or_default().into_iter().map(NodeID).collect(),
                    pts,
                    tags,
                }));
            }
            "relation" => {
                let members = el
                    .members
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|m| {
                        let id = match m.kind.as_str() {
                            "node" => OsmID::Node(NodeID(m.id)),
                            "way" => OsmID::Way(WayID(m.id)),
                            "relation" => OsmID::Relation(RelationID(m.id)),
                            _ => return None,
                        };
                        Some((m.role, id))
                    })
                    .collect();
                result.push(GeoFeature::Relation(Relation {
                    id: RelationID(el.id),
                    version,
                    members,
                    tags,
                }));
            }
            other => warn!("unknown element kind {:?}", other),
        }
    }
    Ok(result)
}

/// Guards against out-of-order query results. The caller records each newly
/// desired center with `begin`, stamps the outgoing request with it, and only
/// applies a resolving result if its originating center is still the desired
/// one. The network call itself is never cancelled; a superseded result is
/// just dropped on arrival.
#[derive(Debug, Default)]
pub struct QueryIntent {
    desired: Option<LonLat>,
}

impl QueryIntent {
    pub fn new() -> QueryIntent {
        QueryIntent { desired: None }
    }

    /// Returns the center to stamp the outgoing query with.
    pub fn begin(&mut self, center: LonLat) -> LonLat {
        self.desired = Some(center);
        center
    }

    /// True if results that originated at `origin` are still wanted.
    pub fn is_current(&self, origin: LonLat) -> bool {
        self.desired == Some(origin)
    }

    pub fn clear(&mut self) {
        self.desired = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superseded_results_are_dropped() {
        let mut intent = QueryIntent::new();
        let p1 = intent.begin(LonLat::new(24.940, 60.170));
        // The user moves before the first query resolves
        let p2 = intent.begin(LonLat::new(24.941, 60.171));

        // B resolves and is applied; A resolves late and must be dropped
        assert!(intent.is_current(p2));
        assert!(!intent.is_current(p1));
    }

    #[test]
    fn decode_builds_typed_features() {
        let raw = r#"{"elements": [
            {"type": "node", "id": 1, "version": 2, "lat": 60.17, "lon": 24.94,
             "tags": {"entrance": "yes"}},
            {"type": "way", "id": 2, "version": 5, "nodes": [1, 3],
             "geometry": [{"lat": 60.17, "lon": 24.94}, {"lat": 60.171, "lon": 24.94}],
             "tags": {"highway": "footway"}},
            {"type": "relation", "id": 3, "version": 1,
             "members": [{"type": "way", "ref": 2, "role": "outer"}],
             "tags": {"building": "yes"}}
        ]}"#;
        let features = decode(raw).unwrap();
        assert_eq!(3, features.len());
        match &features[0] {
            GeoFeature::Node(n) => {
                assert_eq!(NodeID(1), n.id);
                assert_eq!(Some(2), n.version);
                assert!(n.tags.is("entrance", "yes"));
            }
            _ => panic!("expected a node"),
        }
        match &features[1] {
            GeoFeature::Way(w) => {
                assert_eq!(vec![NodeID(1), NodeID(3)], w.nodes);
                assert_eq!(2, w.pts.len());
            }
            _ => panic!("expected a way"),
        }
    }

    #[test]
    fn unversioned_elements_are_skipped() {
        let raw = r#"{"elements": [
            {"type": "node", "id": 1, "lat": 60.17, "lon": 24.94}
        ]}"#;
        assert!(decode(raw).unwrap().is_empty());
    }
}
