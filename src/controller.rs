use crate::backend::Backend;
use crate::error::{BoardError, Result};
use crate::model::{BeaconId, BeaconUpdate, Color, SearchSession, UserId};
use crate::render::{Renderer, UNPAIRED_HEADING};
use crate::store::BeaconStore;
use serde::Serialize;

const DRAFT_TITLE: &str = "your project name...";
const DRAFT_DESC: &str = "your description...";

#[derive(Clone, Copy, Debug)]
pub struct CharLimits {
    pub title: usize,
    pub desc: usize,
}

impl Default for CharLimits {
    fn default() -> Self {
        Self {
            title: 128,
            desc: 1024,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PairingDraft {
    pub title: String,
    pub desc: String,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PopupState {
    Closed,
    OpenUnpaired {
        beacon_id: BeaconId,
        draft: PairingDraft,
    },
    OpenPaired {
        beacon_id: BeaconId,
    },
    Searching {
        beacon_id: BeaconId,
        base_color: Color,
        session: Option<SearchSession>,
    },
}

impl PopupState {
    pub fn label(&self) -> &'static str {
        match self {
            PopupState::Closed => "closed",
            PopupState::OpenUnpaired { .. } => "open-unpaired",
            PopupState::OpenPaired { .. } => "open-paired",
            PopupState::Searching { .. } => "searching",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(u64);

/// Per-frame callback slot. At most one frame is ever pending; each fired
/// frame schedules the next one until the loop is cancelled.
#[derive(Debug, Default)]
pub struct AnimationLoop {
    next: u64,
    pending: Option<FrameHandle>,
    cancelled: u64,
}

impl AnimationLoop {
    pub fn start(&mut self) -> FrameHandle {
        self.cancel();
        self.request()
    }

    /// Returns false when nothing was scheduled.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                self.cancelled += 1;
                tracing::debug!(?handle, total = self.cancelled, "animation frame cancelled");
                true
            }
            None => false,
        }
    }

    pub fn fire(&mut self) -> Option<FrameHandle> {
        let fired = self.pending.take()?;
        self.request();
        Some(fired)
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    #[cfg(test)]
    pub fn cancellations(&self) -> u64 {
        self.cancelled
    }

    fn request(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        handle
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PulseFrame {
    pub beacon_id: BeaconId,
    pub color: Color,
    pub base_color: Color,
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PopupView {
    pub state: &'static str,
    pub beacon_id: Option<BeaconId>,
    pub heading: String,
    pub description: String,
    pub heading_color: Color,
    pub action: Option<&'static str>,
    pub editable: bool,
    pub show_colors: bool,
}

pub struct Controller {
    user: UserId,
    limits: CharLimits,
    state: PopupState,
    animation: AnimationLoop,
}

impl Controller {
    pub fn new(user: UserId, limits: CharLimits) -> Self {
        Self {
            user,
            limits,
            state: PopupState::Closed,
            animation: AnimationLoop::default(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &PopupState {
        &self.state
    }

    #[cfg(test)]
    pub fn animation(&self) -> &AnimationLoop {
        &self.animation
    }

    pub fn select_beacon<R: Renderer, B: Backend>(
        &mut self,
        store: &mut BeaconStore<R>,
        backend: &mut B,
        id: BeaconId,
    ) -> Result<()> {
        self.close(backend);
        let beacon = store.get_beacon(id).ok_or(BoardError::BeaconNotFound(id))?;
        self.state = if beacon.is_paired() {
            PopupState::OpenPaired { beacon_id: id }
        } else {
            PopupState::OpenUnpaired {
                beacon_id: id,
                draft: new_draft(),
            }
        };
        tracing::debug!(beacon = id, state = self.state.label(), "popup opened");
        Ok(())
    }

    /// The backend asked this client to pair `id`. Unknown beacons are
    /// observed first.
    pub fn begin_pairing<R: Renderer, B: Backend>(
        &mut self,
        store: &mut BeaconStore<R>,
        backend: &mut B,
        id: BeaconId,
    ) {
        self.close(backend);
        if store.get_beacon(id).is_none() {
            store.upsert_beacon(BeaconUpdate::bare(id));
        }
        tracing::info!(beacon = id, "preparing to pair");
        self.state = PopupState::OpenUnpaired {
            beacon_id: id,
            draft: new_draft(),
        };
    }

    pub fn edit_title(&mut self, text: String) -> Result<()> {
        self.draft_mut("edit title")?.title = text;
        Ok(())
    }

    pub fn edit_desc(&mut self, text: String) -> Result<()> {
        self.draft_mut("edit description")?.desc = text;
        Ok(())
    }

    pub fn select_color(&mut self, color: Color) -> Result<()> {
        self.draft_mut("select color")?.color = color;
        Ok(())
    }

    pub fn confirm_pairing<R: Renderer, B: Backend>(
        &mut self,
        store: &mut BeaconStore<R>,
        backend: &mut B,
    ) -> Result<BeaconId> {
        let PopupState::OpenUnpaired { beacon_id, draft } = &self.state else {
            return Err(self.invalid("confirm pairing"));
        };
        let id = *beacon_id;
        let title = truncate_chars(&draft.title, self.limits.title);
        let desc = truncate_chars(&draft.desc, self.limits.desc);
        let color = draft.color.clone();

        backend.confirm_pairing(id, &title, &desc, &color);
        store.remove_beacon(id);
        store.upsert_beacon(BeaconUpdate {
            id,
            owner: Some(self.user),
            title: Some(title),
            desc: Some(desc),
            base_color: Some(color),
        });
        self.close(backend);
        Ok(id)
    }

    pub fn ping<R: Renderer, B: Backend>(
        &mut self,
        store: &BeaconStore<R>,
        backend: &mut B,
    ) -> Result<()> {
        let PopupState::OpenPaired { beacon_id } = self.state else {
            return Err(self.invalid("ping"));
        };
        let base_color = store
            .get_beacon(beacon_id)
            .and_then(|b| b.base_color.clone())
            .unwrap_or_else(Color::black);
        self.state = PopupState::Searching {
            beacon_id,
            base_color,
            session: None,
        };
        backend.request_search_start(beacon_id);
        Ok(())
    }

    /// Installs the pulse parameters pushed by the backend for the beacon
    /// being searched. Pushes for any other beacon are ignored.
    pub fn apply_search_state(&mut self, incoming: SearchSession) -> bool {
        let PopupState::Searching {
            beacon_id, session, ..
        } = &mut self.state
        else {
            tracing::debug!(beacon = incoming.beacon_id, "search state ignored, not searching");
            return false;
        };
        if *beacon_id != incoming.beacon_id {
            tracing::debug!(beacon = incoming.beacon_id, "search state for another beacon ignored");
            return false;
        }
        *session = Some(incoming);
        self.animation.start();
        true
    }

    pub fn stop_search<B: Backend>(&mut self, backend: &mut B) -> bool {
        if !matches!(self.state, PopupState::Searching { .. }) {
            return false;
        }
        self.close(backend);
        true
    }

    pub fn close<B: Backend>(&mut self, backend: &mut B) {
        let previous = std::mem::replace(&mut self.state, PopupState::Closed);
        self.animation.cancel();
        if let PopupState::Searching { beacon_id, .. } = previous {
            backend.request_search_stop(beacon_id);
        }
    }

    /// Runs the pending animation frame, if any, and schedules the next one.
    pub fn frame(&mut self, now: f64) -> Option<PulseFrame> {
        let PopupState::Searching {
            beacon_id,
            base_color,
            session: Some(session),
        } = &self.state
        else {
            return None;
        };
        self.animation.fire()?;
        Some(PulseFrame {
            beacon_id: *beacon_id,
            color: session.color.clone(),
            base_color: base_color.clone(),
            opacity: session.opacity_at(now),
        })
    }

    pub fn popup_view<R: Renderer>(&self, store: &BeaconStore<R>) -> PopupView {
        let closed = PopupView {
            state: self.state.label(),
            beacon_id: None,
            heading: String::new(),
            description: String::new(),
            heading_color: Color::black(),
            action: None,
            editable: false,
            show_colors: false,
        };
        match &self.state {
            PopupState::Closed => closed,
            PopupState::OpenUnpaired { beacon_id, draft } => PopupView {
                beacon_id: Some(*beacon_id),
                heading: draft.title.clone(),
                description: draft.desc.clone(),
                heading_color: draft.color.clone(),
                action: Some("Confirm"),
                editable: true,
                show_colors: true,
                ..closed
            },
            PopupState::OpenPaired { beacon_id } | PopupState::Searching { beacon_id, .. } => {
                let beacon = store.get_beacon(*beacon_id);
                let searching = matches!(self.state, PopupState::Searching { .. });
                PopupView {
                    beacon_id: Some(*beacon_id),
                    heading: beacon
                        .and_then(|b| b.title.clone())
                        .unwrap_or_else(|| UNPAIRED_HEADING.to_string()),
                    description: beacon.and_then(|b| b.desc.clone()).unwrap_or_default(),
                    heading_color: beacon
                        .and_then(|b| b.base_color.clone())
                        .unwrap_or_else(Color::black),
                    action: Some(if searching { "Stop" } else { "Ping" }),
                    ..closed
                }
            }
        }
    }

    fn draft_mut(&mut self, action: &'static str) -> Result<&mut PairingDraft> {
        let label = self.state.label();
        match &mut self.state {
            PopupState::OpenUnpaired { draft, .. } => Ok(draft),
            _ => Err(BoardError::InvalidState {
                action,
                state: label,
            }),
        }
    }

    fn invalid(&self, action: &'static str) -> BoardError {
        BoardError::InvalidState {
            action,
            state: self.state.label(),
        }
    }
}

fn new_draft() -> PairingDraft {
    PairingDraft {
        title: DRAFT_TITLE.to_string(),
        desc: DRAFT_DESC.to_string(),
        color: Color::black(),
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
