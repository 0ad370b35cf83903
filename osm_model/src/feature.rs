use geom::LonLat;
use serde::{Deserialize, Serialize};

use crate::osm::{NodeID, OsmID, RelationID, WayID};
use crate::Tags;

/// A geographic object as known to the remote feature database. Objects read
/// from the remote service always carry a version (the optimistic concurrency
/// token); objects planned locally don't have one until they're committed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GeoFeature {
    Node(Node),
    Way(Way),
    Relation(Relation),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeID,
    pub version: Option<i32>,
    pub pt: LonLat,
    pub tags: Tags,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Way {
    pub id: WayID,
    pub version: Option<i32>,
    // Duplicates geometry, because it's convenient
    pub nodes: Vec<NodeID>,
    pub pts: Vec<LonLat>,
    pub tags: Tags,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: RelationID,
    pub version: Option<i32>,
    /// Role, member
    pub members: Vec<(String, OsmID)>,
    pub tags: Tags,
}

impl GeoFeature {
    pub fn id(&self) -> OsmID {
        match self {
            GeoFeature::Node(n) => OsmID::Node(n.id),
            GeoFeature::Way(w) => OsmID::Way(w.id),
            GeoFeature::Relation(r) => OsmID::Relation(r.id),
        }
    }

    pub fn version(&self) -> Option<i32> {
        match self {
            GeoFeature::Node(n) => n.version,
            GeoFeature::Way(w) => w.version,
            GeoFeature::Relation(r) => r.version,
        }
    }

    pub fn tags(&self) -> &Tags {
        match self {
            GeoFeature::Node(n) => &n.tags,
            GeoFeature::Way(w) => &w.tags,
            GeoFeature::Relation(r) => &r.tags,
        }
    }

    pub fn pts(&self) -> &[LonLat] {
        match self {
            GeoFeature::Node(n) => std::slice::from_ref(&n.pt),
            GeoFeature::Way(w) => &w.pts,
            // Member geometry isn't resolved
            GeoFeature::Relation(_) => &[],
        }
    }
}

impl Way {
    pub fn is_closed(&self) -> bool {
        self.pts.len() >= 3 && self.pts[0] == *self.pts.last().unwrap()
    }
}

/// A batch of edits against the remote database. The id is assigned by the
/// server on open; the three lists fill up as edits are committed, or when a
/// finished changeset is downloaded for inspection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Changeset {
    pub id: i64,
    pub comment: String,
    pub created: Vec<GeoFeature>,
    pub modified: Vec<GeoFeature>,
    pub deleted: Vec<GeoFeature>,
}

impl Changeset {
    pub fn new(id: i64, comment: &str) -> Changeset {
        Changeset {
            id,
            comment: comment.to_string(),
            created: Vec::new(),
            modified: Vec::new(),
            deleted: Vec::new(),
        }
    }
}
