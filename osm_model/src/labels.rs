//! Human-readable labels for features, driven by a fixed priority list of
//! tag-presence rules. The first rule whose required tag is present determines
//! both the label and the feature's position in picker lists.

use crate::osm;
use crate::Tags;

pub struct FeatureType {
    pub name: &'static str,
    pub required_tag: &'static str,
    label: fn(&Tags) -> String,
}

// These are searched, in order, to present features as strings
pub static FEATURE_TYPES: [FeatureType; 6] = [
    FeatureType {
        name: "entrance",
        required_tag: osm::ENTRANCE,
        label: entrance_label,
    },
    FeatureType {
        name: "business",
        required_tag: osm::SHOP,
        label: business_label,
    },
    FeatureType {
        name: "place",
        required_tag: osm::PLACE,
        label: place_label,
    },
    FeatureType {
        name: "address",
        required_tag: osm::ADDR_HOUSENUMBER,
        label: address_label,
    },
    FeatureType {
        name: "street or other named feature",
        required_tag: osm::NAME,
        label: named_way_label,
    },
    FeatureType {
        name: "barrier",
        required_tag: osm::BARRIER,
        label: barrier_label,
    },
];

/// The index of the first matching rule; lower sorts first in pickers.
/// Features matching no rule sort last.
pub fn label_priority(tags: &Tags) -> usize {
    FEATURE_TYPES
        .iter()
        .position(|ft| tags.contains_key(ft.required_tag))
        .unwrap_or(FEATURE_TYPES.len())
}

/// Applies the first matching rule, capitalized and with the first underscore
/// turned into a space.
pub fn feature_label(tags: &Tags) -> Option<String> {
    let ft = FEATURE_TYPES
        .iter()
        .find(|ft| tags.contains_key(ft.required_tag))?;
    Some(capitalize(&(ft.label)(tags)).replacen('_', " ", 1))
}

fn address(tags: &Tags) -> String {
    [osm::ADDR_STREET, osm::ADDR_HOUSENUMBER, osm::ADDR_UNIT]
        .iter()
        .filter_map(|k| tags.get(k))
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
}

fn entrance_label(tags: &Tags) -> String {
    let kind = match tags.get(osm::ENTRANCE).map(|v| v.as_str()) {
        Some("yes") | None => "entrance".to_string(),
        Some(kind) => format!("{} entrance", kind),
    };
    let addr = address(tags);
    if addr.is_empty() {
        kind
    } else {
        format!("{} {}", addr, kind)
    }
}

fn business_label(tags: &Tags) -> String {
    let shop = match tags.get(osm::SHOP).map(|v| v.as_str()) {
        Some("yes") | None => "business",
        Some(shop) => shop,
    };
    let base = match tags.get(osm::NAME) {
        Some(name) => format!("{} ({})", name, shop),
        None => shop.to_string(),
    };
    let addr = address(tags);
    if addr.is_empty() {
        base
    } else {
        format!("{}: {}", base, addr)
    }
}

fn place_label(tags: &Tags) -> String {
    let place = tags.get(osm::PLACE).cloned().unwrap_or_default();
    let base = match tags.get(osm::NAME) {
        Some(name) => format!("{} ({})", name, place),
        None => place,
    };
    let addr = address(tags);
    if addr.is_empty() {
        base
    } else {
        format!("{}: {}", base, addr)
    }
}

fn address_label(tags: &Tags) -> String {
    let addr = address(tags);
    match tags.get(osm::NAME) {
        Some(name) => format!("{}: {}", name, addr),
        None => addr,
    }
}

fn named_way_label(tags: &Tags) -> String {
    let name = tags.get(osm::NAME).cloned().unwrap_or_default();
    match tags.get(osm::HIGHWAY) {
        Some(highway) => format!("{} ({} road)", name, highway),
        None => name,
    }
}

fn barrier_label(tags: &Tags) -> String {
    format!("barrier: {}", tags.get(osm::BARRIER).cloned().unwrap_or_default())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
