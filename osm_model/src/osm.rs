//! Well-known OSM keys and typed object IDs.

use std::fmt;

use serde::{Deserialize, Serialize};

// These are the keys the matching, labelling and planning code cares about.
// Keys used in just one or two places don't really need to be defined here.
pub const NAME: &str = "name";
pub const HIGHWAY: &str = "highway";
pub const BUILDING: &str = "building";
pub const ENTRANCE: &str = "entrance";
pub const BARRIER: &str = "barrier";
pub const SHOP: &str = "shop";
pub const PLACE: &str = "place";
pub const ACCESS: &str = "access";
pub const LAYER: &str = "layer";
pub const ADDR_STREET: &str = "addr:street";
pub const ADDR_HOUSENUMBER: &str = "addr:housenumber";
pub const ADDR_UNIT: &str = "addr:unit";

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct NodeID(pub i64);
impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/node/{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct WayID(pub i64);
impl fmt::Display for WayID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/way/{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RelationID(pub i64);
impl fmt::Display for RelationID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/relation/{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum OsmID {
    Node(NodeID),
    Way(WayID),
    Relation(RelationID),
}
impl fmt::Display for OsmID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsmID::Node(n) => write!(f, "{}", n),
            OsmID::Way(w) => write!(f, "{}", w),
            OsmID::Relation(r) => write!(f, "{}", r),
        }
    }
}
impl OsmID {
    pub fn inner(self) -> i64 {
        match self {
            OsmID::Node(n) => n.0,
            OsmID::Way(w) => w.0,
            OsmID::Relation(r) => r.0,
        }
    }
}
