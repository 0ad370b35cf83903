//! Keeps an on-screen marker layer in sync with a periodically refreshed
//! feature collection by diffing against what's already drawn, never by
//! redrawing the whole layer.

#[macro_use]
extern crate log;

mod reconcile;
mod style;

pub use crate::reconcile::{DisplayFeature, MarkerBackend, MarkerLayer, ReconcileStats};
pub use crate::style::{
    changeset_display, note_display, status_color, MarkerStyle, Note, NoteStatus,
};
