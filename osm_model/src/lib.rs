//! The data model for remote geographic features (tagged nodes, ways and
//! relations with optimistic version tokens), plus the pure logic built on
//! top of it: nearest-feature matching, picker ranking and labels, and
//! entrance planning.

#[macro_use]
extern crate log;

mod entrance;
mod feature;
mod find_closest;
mod labels;
pub mod osm;
mod tags;

pub use crate::entrance::{plan_entrance, EntranceKind, EntrancePlan};
pub use crate::feature::{Changeset, GeoFeature, Node, Relation, Way};
pub use crate::find_closest::{
    match_entrance_site, rank_nearby_features, EntranceSite, MatchResult, RankedFeature,
};
pub use crate::labels::{feature_label, label_priority};
pub use crate::tags::Tags;
