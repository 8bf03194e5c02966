use crate::error::BoardError;
use crate::model::{Beacon, BeaconId, BeaconUpdate, HistoryEntry, UserId};
use crate::render::Renderer;
use std::collections::VecDeque;

/// Diagnostics kept for display; older ones are dropped.
const DIAGNOSTICS_KEPT: usize = 32;

/// Beacons and history for one session, mirrored into a renderer.
pub struct BeaconStore<R> {
    beacons: Vec<Beacon>,
    history: Vec<HistoryEntry>,
    renderer: R,
    diagnostics: VecDeque<BoardError>,
    recorded: u64,
}

impl<R: Renderer> BeaconStore<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            beacons: Vec::new(),
            history: Vec::new(),
            renderer,
            diagnostics: VecDeque::with_capacity(DIAGNOSTICS_KEPT),
            recorded: 0,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[cfg(test)]
    pub fn beacons(&self) -> &[Beacon] {
        &self.beacons
    }

    #[cfg(test)]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The most recent diagnostics, oldest first.
    pub fn diagnostics(&self) -> &VecDeque<BoardError> {
        &self.diagnostics
    }

    /// Diagnostics recorded over the store's lifetime, including dropped ones.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    pub fn get_beacon(&self, id: BeaconId) -> Option<&Beacon> {
        self.beacons.iter().find(|b| b.id == id)
    }

    pub fn upsert_beacon(&mut self, update: BeaconUpdate) {
        let id = update.id;
        let index = match self.beacons.iter().position(|b| b.id == id) {
            Some(index) => {
                tracing::debug!(beacon = id, "beacon already known, merging");
                update.merge_into(&mut self.beacons[index]);
                index
            }
            None => {
                self.beacons.push(update.into_beacon());
                self.beacons.len() - 1
            }
        };
        self.renderer.on_upsert(&self.beacons[index]);
    }

    pub fn remove_beacon(&mut self, id: BeaconId) -> Option<Beacon> {
        let Some(index) = self.beacons.iter().position(|b| b.id == id) else {
            self.record(BoardError::BeaconNotFound(id));
            return None;
        };
        let removed = self.beacons.remove(index);
        if let Err(err) = self.renderer.on_remove(id) {
            self.record(err);
        }
        Some(removed)
    }

    pub fn append_history(&mut self, entry: HistoryEntry) {
        self.renderer.on_history_append(&entry);
        self.history.push(entry);
    }

    pub fn filter_history(&mut self, viewer: UserId) {
        self.renderer.on_history_filter(viewer, &self.history);
    }

    pub fn record(&mut self, err: BoardError) {
        tracing::warn!("{err}");
        if self.diagnostics.len() == DIAGNOSTICS_KEPT {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(err);
        self.recorded += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;
    use crate::render::{BoardView, UNPAIRED_HEADING};

    fn update(id: BeaconId, title: Option<&str>) -> BeaconUpdate {
        BeaconUpdate {
            id,
            title: title.map(str::to_string),
            desc: title.map(|t| format!("{t} desc")),
            base_color: title.map(|_| Color::white()),
            ..BeaconUpdate::default()
        }
    }

    #[test]
    fn second_upsert_merges_fields() {
        let mut store = BeaconStore::new(BoardView::new());
        store.upsert_beacon(BeaconUpdate {
            id: 1,
            title: Some("project 1".into()),
            desc: Some("first".into()),
            ..BeaconUpdate::default()
        });
        store.upsert_beacon(BeaconUpdate {
            id: 1,
            desc: Some("second".into()),
            owner: Some(7),
            ..BeaconUpdate::default()
        });

        assert_eq!(store.beacons().len(), 1);
        let beacon = store.get_beacon(1).unwrap();
        assert_eq!(beacon.title.as_deref(), Some("project 1"));
        assert_eq!(beacon.desc.as_deref(), Some("second"));
        assert_eq!(beacon.owner, Some(7));
        assert_eq!(store.renderer().beacons().len(), 1);
        assert_eq!(store.renderer().beacons()[0].description, "second");
    }

    #[test]
    fn removing_unknown_beacon_is_a_logged_no_op() {
        let mut store = BeaconStore::new(BoardView::new());
        store.upsert_beacon(update(1, Some("kept")));

        assert_eq!(store.remove_beacon(42), None);
        assert_eq!(store.beacons().len(), 1);
        assert_eq!(store.renderer().beacons().len(), 1);
        assert_eq!(*store.diagnostics(), [BoardError::BeaconNotFound(42)]);
    }

    #[test]
    fn remove_drops_record_and_node() {
        let mut store = BeaconStore::new(BoardView::new());
        store.upsert_beacon(update(1, Some("a")));
        store.upsert_beacon(update(2, Some("b")));

        let removed = store.remove_beacon(1).unwrap();
        assert_eq!(removed.id, 1);
        assert!(store.get_beacon(1).is_none());
        assert!(store.renderer().beacon_node(1).is_none());
        assert!(store.diagnostics().is_empty());
    }

    #[test]
    fn nodes_sort_by_heading_with_unpaired_grouped() {
        let mut store = BeaconStore::new(BoardView::new());
        let titles = [
            (1, Some("project 1")),
            (2, Some("Zebra")),
            (3, None),
            (4, Some("hands and feet")),
            (5, None),
            (6, None),
            (7, Some("mine craft")),
        ];
        for (id, title) in titles {
            store.upsert_beacon(update(id, title));
        }

        let order: Vec<_> = store.renderer().beacons().iter().map(|n| n.id).collect();
        // '[' sorts after upper-case and before lower-case letters.
        assert_eq!(order, vec![2, 3, 5, 6, 4, 7, 1]);
        let headings: Vec<_> = store.renderer().beacons()[1..4]
            .iter()
            .map(|n| n.heading.as_str())
            .collect();
        assert_eq!(headings, vec![UNPAIRED_HEADING; 3]);
    }

    #[test]
    fn diagnostics_keep_only_the_latest() {
        let mut store = BeaconStore::new(BoardView::new());
        for id in 0..10_000 {
            store.remove_beacon(id);
        }

        assert_eq!(store.diagnostics().len(), DIAGNOSTICS_KEPT);
        assert_eq!(store.recorded(), 10_000);
        assert_eq!(
            store.diagnostics().front(),
            Some(&BoardError::BeaconNotFound(10_000 - DIAGNOSTICS_KEPT as u32))
        );
        assert_eq!(
            store.diagnostics().back(),
            Some(&BoardError::BeaconNotFound(9_999))
        );
    }

    #[test]
    fn history_is_appended_in_order_without_dedup() {
        let mut store = BeaconStore::new(BoardView::new());
        let entry = HistoryEntry {
            id: 3,
            user: 1,
            title: "again".into(),
            desc: "twice".into(),
            color: Color::white(),
            date: 5,
        };
        store.append_history(entry.clone());
        store.append_history(entry);

        assert_eq!(store.history().len(), 2);
        assert_eq!(store.renderer().history().len(), 2);
    }
}
