use crate::model::{BeaconId, BeaconUpdate, Color, HistoryEntry, SearchSession};
use crate::palette;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// Pushes from the beacon backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Inbound {
    BeaconUpdated(BeaconUpdate),
    BeaconRemoved { id: BeaconId },
    PairRequested { id: BeaconId },
    HistoryRecorded(HistoryEntry),
    SearchState(SearchSession),
}

/// Requests this client sends to the beacon backend. Whether a beacon really
/// leaves search mode is up to the backend, which knows about other viewers.
pub trait Backend {
    fn confirm_pairing(&mut self, id: BeaconId, title: &str, desc: &str, color: &Color);
    fn request_search_start(&mut self, id: BeaconId);
    fn request_search_stop(&mut self, id: BeaconId);

    fn poll_inbound(&mut self) -> Vec<Inbound> {
        Vec::new()
    }
}

/// Stand-in for the real backend. Answers search requests itself.
pub struct SimulatedServer {
    rng: StdRng,
    palette: Vec<Color>,
    pending: VecDeque<Inbound>,
}

impl SimulatedServer {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    #[cfg(test)]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            palette: palette::generate_palette(),
            pending: VecDeque::new(),
        }
    }

    pub fn push(&mut self, inbound: Inbound) {
        self.pending.push_back(inbound);
    }
}

impl Default for SimulatedServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for SimulatedServer {
    fn confirm_pairing(&mut self, id: BeaconId, title: &str, _desc: &str, color: &Color) {
        tracing::info!(beacon = id, %color, "pairing confirmed: {title}");
    }

    fn request_search_start(&mut self, id: BeaconId) {
        let color = self.palette[self.rng.gen_range(0..self.palette.len())].clone();
        let frequency = self.rng.gen_range(0.5..1.7);
        let session = SearchSession {
            beacon_id: id,
            color,
            frequency,
            start_time: unix_now() - 2.0,
        };
        tracing::info!(beacon = id, frequency, "beacon entering search mode");
        self.push(Inbound::SearchState(session));
    }

    fn request_search_stop(&mut self, id: BeaconId) {
        tracing::info!(beacon = id, "search stop requested");
    }

    fn poll_inbound(&mut self) -> Vec<Inbound> {
        self.pending.drain(..).collect()
    }
}

pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
