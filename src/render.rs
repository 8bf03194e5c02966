use crate::error::{BoardError, Result};
use crate::model::{Beacon, BeaconId, Color, HistoryEntry, UserId};
use serde::Serialize;

pub const UNPAIRED_HEADING: &str = "[~Unpaired Beacon~]";

/// Presentation side of the store. Every store mutation is mirrored here.
pub trait Renderer {
    fn on_upsert(&mut self, beacon: &Beacon);
    fn on_remove(&mut self, id: BeaconId) -> Result<()>;
    fn on_history_append(&mut self, entry: &HistoryEntry);
    fn on_history_filter(&mut self, _viewer: UserId, _history: &[HistoryEntry]) {}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BeaconNode {
    pub id: BeaconId,
    pub heading: String,
    pub description: String,
    pub color: Color,
    pub paired: bool,
}

impl BeaconNode {
    fn from_beacon(beacon: &Beacon) -> Self {
        Self {
            id: beacon.id,
            heading: beacon
                .title
                .clone()
                .unwrap_or_else(|| UNPAIRED_HEADING.to_string()),
            description: beacon
                .desc
                .clone()
                .unwrap_or_else(|| format!("ID: {}", beacon.id)),
            color: beacon.base_color.clone().unwrap_or_else(Color::black),
            paired: beacon.is_paired(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryNode {
    pub id: BeaconId,
    pub heading: String,
    pub description: String,
    pub color: Color,
    pub visible: bool,
}

/// Headless board: the node lists the page is drawn from.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BoardView {
    beacons: Vec<BeaconNode>,
    history: Vec<HistoryNode>,
}

impl BoardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn beacons(&self) -> &[BeaconNode] {
        &self.beacons
    }

    pub fn history(&self) -> &[HistoryNode] {
        &self.history
    }

    #[cfg(test)]
    pub fn beacon_node(&self, id: BeaconId) -> Option<&BeaconNode> {
        self.beacons.iter().find(|node| node.id == id)
    }

    #[cfg(test)]
    pub fn visible_history(&self) -> impl Iterator<Item = &HistoryNode> {
        self.history.iter().filter(|node| node.visible)
    }
}

impl Renderer for BoardView {
    fn on_upsert(&mut self, beacon: &Beacon) {
        self.beacons.retain(|node| node.id != beacon.id);
        self.beacons.push(BeaconNode::from_beacon(beacon));
        // Stable, so untitled nodes keep their insertion order.
        self.beacons.sort_by(|a, b| a.heading.cmp(&b.heading));
        tracing::debug!(beacon = beacon.id, nodes = self.beacons.len(), "sorted beacon nodes");
    }

    fn on_remove(&mut self, id: BeaconId) -> Result<()> {
        let index = self
            .beacons
            .iter()
            .position(|node| node.id == id)
            .ok_or(BoardError::NodeNotFound(id))?;
        self.beacons.remove(index);
        Ok(())
    }

    fn on_history_append(&mut self, entry: &HistoryEntry) {
        self.history.push(HistoryNode {
            id: entry.id,
            heading: format!("{}: {}", entry.date, entry.title),
            description: entry.desc.clone(),
            color: entry.color.clone(),
            visible: true,
        });
    }

    fn on_history_filter(&mut self, viewer: UserId, history: &[HistoryEntry]) {
        // Nodes are appended alongside entries, so they pair up by position.
        for (node, entry) in self.history.iter_mut().zip(history) {
            node.visible = entry.user == viewer;
        }
    }
}
