use geom::LonLat;
use osm_model::{Changeset, GeoFeature};

use crate::reconcile::DisplayFeature;

/// How one marker looks. Colors are CSS hex strings, which is what the web map
/// layer on the other side expects.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerStyle {
    pub color: String,
    pub fill_color: String,
    pub radius: f64,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl MarkerStyle {
    /// A small solid dot, the default look for most overlays.
    pub fn dot(color: &str) -> MarkerStyle {
        MarkerStyle {
            color: color.to_string(),
            fill_color: color.to_string(),
            radius: 3.0,
            weight: 2.0,
            opacity: 1.0,
            fill_opacity: 1.0,
        }
    }
}

/// Review states a note moves through, in increasing order of doneness.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoteStatus {
    Problem,
    New,
    Accepted,
    Processed,
    Reviewed,
}

pub fn status_color(status: NoteStatus) -> &'static str {
    match status {
        NoteStatus::Problem => "#ff0000",
        NoteStatus::New => "#ff5000",
        NoteStatus::Accepted => "#b700ff",
        NoteStatus::Processed => "#007bff",
        NoteStatus::Reviewed => "#28a745",
    }
}

/// A note from the periodically refreshed backing collection.
#[derive(Clone, Debug)]
pub struct Note {
    pub id: i64,
    pub position: LonLat,
    pub status: NoteStatus,
}

/// Selected notes get a wide visible halo; unselected ones a faint one.
pub fn note_display(note: &Note, selected: bool) -> DisplayFeature {
    let color = status_color(note.status);
    DisplayFeature {
        id: note.id.to_string(),
        position: note.position,
        style: MarkerStyle {
            color: color.to_string(),
            fill_color: color.to_string(),
            radius: 2.0,
            weight: 20.0,
            opacity: if selected { 0.4 } else { 0.05 },
            fill_opacity: 1.0,
        },
    }
}

/// Overlay markers for a changeset's node edits: green for created, blue for
/// modified, red for deleted. Meant for its own layer, separate from the
/// notes.
pub fn changeset_display(changeset: &Changeset) -> Vec<DisplayFeature> {
    let mut result = Vec::new();
    for (features, color) in [
        (&changeset.created, "#28a745"),
        (&changeset.modified, "#007bff"),
        (&changeset.deleted, "#ff0000"),
    ] {
        for f in features {
            if let GeoFeature::Node(node) = f {
                result.push(DisplayFeature {
                    id: node.id.0.to_string(),
                    position: node.pt,
                    style: MarkerStyle {
                        color: color.to_string(),
                        fill_color: "#ffffff".to_string(),
                        radius: 3.0,
                        weight: 2.0,
                        opacity: 1.0,
                        fill_opacity: 1.0,
                    },
                });
            }
        }
    }
    result
}
