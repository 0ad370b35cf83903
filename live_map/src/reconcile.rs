use std::collections::{BTreeMap, BTreeSet};

use geom::LonLat;

use crate::style::MarkerStyle;

/// One feature as the embedding application wants it drawn right now. The id
/// is whatever stable identity the backing collection has.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayFeature {
    pub id: String,
    pub position: LonLat,
    pub style: MarkerStyle,
}

/// The map widget being driven. A `Marker` is whatever the widget uses for one
/// dot on screen. Existing markers must be moved and restyled in place, never
/// destroyed and recreated; recreating one closes any popup the user has open
/// on it.
pub trait MarkerBackend {
    type Marker;

    fn add(&mut self, position: LonLat, style: &MarkerStyle) -> Self::Marker;
    fn update(&mut self, marker: &mut Self::Marker, position: LonLat, style: &MarkerStyle);
    fn remove(&mut self, marker: Self::Marker);
}

/// What one reconciliation pass actually did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReconcileStats {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

/// A persistent layer of markers keyed by feature id. The table is always a
/// bijection between displayed ids and markers: no orphaned markers, no
/// missing markers for present ids.
pub struct MarkerLayer<B: MarkerBackend> {
    backend: B,
    markers: BTreeMap<String, B::Marker>,
}

impl<B: MarkerBackend> MarkerLayer<B> {
    pub fn new(backend: B) -> MarkerLayer<B> {
        MarkerLayer {
            backend,
            markers: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Diffs `current` against what's on screen: adds markers for new ids,
    /// moves/restyles existing ones in place, removes markers whose ids are
    /// gone. Runs to completion synchronously.
    pub fn reconcile(&mut self, current: &[DisplayFeature]) -> ReconcileStats {
        let mut stats = ReconcileStats::default();

        for f in current {
            match self.markers.get_mut(&f.id) {
                Some(marker) => {
                    self.backend.update(marker, f.position, &f.style);
                    stats.updated += 1;
                }
                None => {
                    let marker = self.backend.add(f.position, &f.style);
                    self.markers.insert(f.id.clone(), marker);
                    stats.added += 1;
                }
            }
        }

        let current_ids: BTreeSet<&str> = current.iter().map(|f| f.id.as_str()).collect();
        let stale: Vec<String> = self
            .markers
            .keys()
            .filter(|id| !current_ids.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            let marker = self.markers.remove(&id).unwrap();
            self.backend.remove(marker);
            stats.removed += 1;
        }

        if stats.added + stats.removed > 0 {
            debug!(
                "reconciled layer: +{} ~{} -{}",
                stats.added, stats.updated, stats.removed
            );
        }
        stats
    }

    /// Drops every marker; for tearing the enclosing view down.
    pub fn clear(&mut self) {
        for (_, marker) in std::mem::take(&mut self.markers) {
            self.backend.remove(marker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Markers are just ids into a liveness table, so tests can check nothing
    // leaks and nothing gets recreated.
    #[derive(Default)]
    struct TestBackend {
        next: usize,
        alive: BTreeSet<usize>,
        total_created: usize,
    }

    impl MarkerBackend for TestBackend {
        type Marker = usize;

        fn add(&mut self, _: LonLat, _: &MarkerStyle) -> usize {
            let id = self.next;
            self.next += 1;
            self.alive.insert(id);
            self.total_created += 1;
            id
        }

        fn update(&mut self, marker: &mut usize, _: LonLat, _: &MarkerStyle) {
            assert!(self.alive.contains(marker), "updating a dead marker");
        }

        fn remove(&mut self, marker: usize) {
            assert!(self.alive.remove(&marker), "removing a dead marker");
        }
    }

    fn feature(id: &str, lon: f64) -> DisplayFeature {
        DisplayFeature {
            id: id.to_string(),
            position: LonLat::new(lon, 60.17),
            style: MarkerStyle::dot("#ff0000"),
        }
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut layer = MarkerLayer::new(TestBackend::default());
        let features = vec![feature("1", 24.94), feature("2", 24.95)];

        let first = layer.reconcile(&features);
        assert_eq!(2, first.added);

        let second = layer.reconcile(&features);
        assert_eq!(0, second.added);
        assert_eq!(0, second.removed);
        assert_eq!(2, second.updated);
        // Nothing was destroyed and recreated behind the scenes either
        assert_eq!(2, layer.backend().total_created);
    }

    #[test]
    fn absent_ids_lose_their_markers() {
        let mut layer = MarkerLayer::new(TestBackend::default());
        layer.reconcile(&[feature("1", 24.94), feature("2", 24.95)]);

        let stats = layer.reconcile(&[feature("2", 24.96)]);
        assert_eq!(0, stats.added);
        assert_eq!(1, stats.updated);
        assert_eq!(1, stats.removed);
        assert_eq!(1, layer.len());
        assert_eq!(1, layer.backend().alive.len());
    }

    #[test]
    fn clear_tears_everything_down() {
        let mut layer = MarkerLayer::new(TestBackend::default());
        layer.reconcile(&[feature("1", 24.94), feature("2", 24.95)]);
        layer.clear();
        assert!(layer.is_empty());
        assert!(layer.backend().alive.is_empty());
    }
}
