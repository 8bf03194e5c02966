use crate::backend::{Backend, Inbound};
use crate::controller::{CharLimits, Controller, PopupView, PulseFrame};
use crate::error::{BoardError, Result};
use crate::model::{BeaconId, Color, UserId};
use crate::palette;
use crate::render::{BeaconNode, BoardView, HistoryNode, Renderer};
use crate::store::BeaconStore;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiEvent {
    SelectBeacon { id: BeaconId },
    EditTitle { text: String },
    EditDesc { text: String },
    SelectColor { color: Color },
    Confirm,
    Ping,
    StopSearch,
    Close,
    KeyDown { code: String },
    ClickOutside,
    ToggleHistory,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Beacons,
    History,
}

/// Everything one viewer's page holds: beacons, history, popup and the
/// backend it talks to. Dropping the session ends it.
pub struct Session<R, B> {
    user: UserId,
    view: ViewMode,
    store: BeaconStore<R>,
    controller: Controller,
    backend: B,
}

impl<R: Renderer, B: Backend> Session<R, B> {
    pub fn new(user: UserId, limits: CharLimits, renderer: R, backend: B) -> Self {
        Self {
            user,
            view: ViewMode::Beacons,
            store: BeaconStore::new(renderer),
            controller: Controller::new(user, limits),
            backend,
        }
    }

    #[cfg(test)]
    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn store(&self) -> &BeaconStore<R> {
        &self.store
    }

    #[cfg(test)]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn handle_ui(&mut self, event: UiEvent) -> Result<()> {
        let result = self.apply_ui(event);
        if let Err(err) = &result {
            self.store.record(err.clone());
        }
        self.pump_inbound();
        result
    }

    fn apply_ui(&mut self, event: UiEvent) -> Result<()> {
        let controller = &mut self.controller;
        match event {
            UiEvent::SelectBeacon { id } => {
                controller.select_beacon(&mut self.store, &mut self.backend, id)
            }
            UiEvent::EditTitle { text } => controller.edit_title(text),
            UiEvent::EditDesc { text } => controller.edit_desc(text),
            UiEvent::SelectColor { color } => controller.select_color(color),
            UiEvent::Confirm => controller
                .confirm_pairing(&mut self.store, &mut self.backend)
                .map(|_| ()),
            UiEvent::Ping => controller.ping(&self.store, &mut self.backend),
            UiEvent::StopSearch => {
                if !controller.stop_search(&mut self.backend) {
                    tracing::debug!("stop requested while not searching");
                }
                Ok(())
            }
            UiEvent::Close | UiEvent::ClickOutside => {
                controller.close(&mut self.backend);
                Ok(())
            }
            UiEvent::KeyDown { code } => {
                if code == "Escape" {
                    controller.close(&mut self.backend);
                }
                Ok(())
            }
            UiEvent::ToggleHistory => {
                self.toggle_history();
                Ok(())
            }
        }
    }

    pub fn handle_inbound(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::BeaconUpdated(update) => self.store.upsert_beacon(update),
            Inbound::BeaconRemoved { id } => {
                self.store.remove_beacon(id);
            }
            Inbound::PairRequested { id } => {
                self.controller
                    .begin_pairing(&mut self.store, &mut self.backend, id)
            }
            Inbound::HistoryRecorded(entry) => {
                self.store.append_history(entry);
                if self.view == ViewMode::History {
                    self.store.filter_history(self.user);
                }
            }
            Inbound::SearchState(session) => {
                self.controller.apply_search_state(session);
            }
        }
    }

    /// Applies everything the backend has pushed since the last call.
    pub fn pump_inbound(&mut self) {
        for inbound in self.backend.poll_inbound() {
            self.handle_inbound(inbound);
        }
    }

    pub fn pump_frame(&mut self, now: f64) -> Option<PulseFrame> {
        self.controller.frame(now)
    }

    pub fn toggle_history(&mut self) {
        self.view = match self.view {
            ViewMode::Beacons => {
                self.store.filter_history(self.user);
                ViewMode::History
            }
            ViewMode::History => ViewMode::Beacons,
        };
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub user: UserId,
    pub view: ViewMode,
    pub beacons: Vec<BeaconNode>,
    pub history: Vec<HistoryNode>,
    pub popup: PopupView,
    pub palette: Vec<Vec<Color>>,
    pub diagnostics: Vec<String>,
}

impl<B: Backend> Session<BoardView, B> {
    pub fn snapshot(&self) -> BoardSnapshot {
        let view = self.store.renderer();
        BoardSnapshot {
            user: self.user,
            view: self.view,
            beacons: view.beacons().to_vec(),
            history: view.history().to_vec(),
            popup: self.controller.popup_view(&self.store),
            palette: palette::palette_rows(),
            diagnostics: self
                .store
                .diagnostics()
                .iter()
                .map(BoardError::to_string)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PopupState;
    use crate::model::{BeaconUpdate, HistoryEntry, SearchSession};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedBackend {
        sent: Vec<String>,
        replies: VecDeque<Inbound>,
        period: f64,
    }

    impl Backend for ScriptedBackend {
        fn confirm_pairing(&mut self, id: BeaconId, title: &str, _desc: &str, color: &Color) {
            self.sent.push(format!("pair {id} {title} {color}"));
        }

        fn request_search_start(&mut self, id: BeaconId) {
            self.sent.push(format!("start {id}"));
            self.replies.push_back(Inbound::SearchState(SearchSession {
                beacon_id: id,
                color: "#ff5675".parse().unwrap(),
                frequency: self.period,
                start_time: 1000.0,
            }));
        }

        fn request_search_stop(&mut self, id: BeaconId) {
            self.sent.push(format!("stop {id}"));
        }

        fn poll_inbound(&mut self) -> Vec<Inbound> {
            self.replies.drain(..).collect()
        }
    }

    fn session() -> Session<BoardView, ScriptedBackend> {
        let backend = ScriptedBackend {
            period: 2.0,
            ..ScriptedBackend::default()
        };
        let mut session = Session::new(2, CharLimits::default(), BoardView::new(), backend);
        session.handle_inbound(Inbound::BeaconUpdated(BeaconUpdate {
            id: 1,
            title: Some("project 1".into()),
            desc: Some("we are working on project 1".into()),
            base_color: Some("#a260be".parse().unwrap()),
            ..BeaconUpdate::default()
        }));
        session.handle_inbound(Inbound::BeaconUpdated(BeaconUpdate::bare(5)));
        session
    }

    fn entry(id: BeaconId, user: UserId) -> HistoryEntry {
        HistoryEntry {
            id,
            user,
            title: format!("project {id}"),
            desc: "done".into(),
            color: "#39ed3f".parse().unwrap(),
            date: id as i64,
        }
    }

    #[test]
    fn pairing_flow_through_ui_events() {
        let mut session = session();
        session.handle_ui(UiEvent::SelectBeacon { id: 5 }).unwrap();
        session
            .handle_ui(UiEvent::EditTitle {
                text: "Alpha".into(),
            })
            .unwrap();
        session
            .handle_ui(UiEvent::SelectColor {
                color: "#112233".parse().unwrap(),
            })
            .unwrap();
        session.handle_ui(UiEvent::Confirm).unwrap();

        let beacon = session.store().get_beacon(5).unwrap();
        assert_eq!(beacon.title.as_deref(), Some("Alpha"));
        assert_eq!(beacon.owner, Some(2));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.popup.state, "closed");
        let headings: Vec<_> = snapshot.beacons.iter().map(|b| b.heading.as_str()).collect();
        assert_eq!(headings, vec!["Alpha", "project 1"]);
        assert_eq!(session.backend().sent, vec!["pair 5 Alpha #112233".to_string()]);
    }

    #[test]
    fn search_pulses_until_stopped() {
        let mut session = session();
        session.handle_ui(UiEvent::SelectBeacon { id: 1 }).unwrap();
        session.handle_ui(UiEvent::Ping).unwrap();

        let frame = session.pump_frame(1000.0).unwrap();
        assert!(frame.opacity.abs() < 1e-9);
        assert_eq!(frame.base_color.as_str(), "#a260be");
        let frame = session.pump_frame(1001.0).unwrap();
        assert!((frame.opacity - 1.0).abs() < 1e-9);
        let frame = session.pump_frame(1002.0).unwrap();
        assert!(frame.opacity.abs() < 1e-9);

        session.handle_ui(UiEvent::StopSearch).unwrap();
        session.handle_ui(UiEvent::StopSearch).unwrap();
        assert!(session.pump_frame(1003.0).is_none());
        assert_eq!(
            session.backend().sent,
            vec!["start 1".to_string(), "stop 1".to_string()]
        );
    }

    #[test]
    fn escape_closes_but_other_keys_do_not() {
        let mut session = session();
        session.handle_ui(UiEvent::SelectBeacon { id: 1 }).unwrap();
        session
            .handle_ui(UiEvent::KeyDown { code: "KeyA".into() })
            .unwrap();
        assert_eq!(
            session.controller().state(),
            &PopupState::OpenPaired { beacon_id: 1 }
        );
        session
            .handle_ui(UiEvent::KeyDown {
                code: "Escape".into(),
            })
            .unwrap();
        assert_eq!(session.controller().state(), &PopupState::Closed);
    }

    #[test]
    fn rejected_events_become_diagnostics() {
        let mut session = session();
        assert!(session.handle_ui(UiEvent::Ping).is_err());
        assert!(session.handle_ui(UiEvent::SelectBeacon { id: 77 }).is_err());
        assert_eq!(session.snapshot().diagnostics.len(), 2);
        session.handle_inbound(Inbound::BeaconRemoved { id: 77 });
        assert_eq!(
            session.store().diagnostics().back(),
            Some(&BoardError::BeaconNotFound(77))
        );
    }

    #[test]
    fn history_view_shows_only_current_user() {
        let mut session = session();
        session.handle_inbound(Inbound::HistoryRecorded(entry(20, 1)));
        session.handle_inbound(Inbound::HistoryRecorded(entry(21, 2)));

        session.handle_ui(UiEvent::ToggleHistory).unwrap();
        assert_eq!(session.view(), ViewMode::History);
        session.handle_inbound(Inbound::HistoryRecorded(entry(22, 1)));

        let visible: Vec<_> = session
            .snapshot()
            .history
            .iter()
            .filter(|h| h.visible)
            .map(|h| h.id)
            .collect();
        assert_eq!(visible, vec![21]);

        session.handle_ui(UiEvent::ToggleHistory).unwrap();
        assert_eq!(session.view(), ViewMode::Beacons);
        assert_eq!(session.snapshot().history.len(), 3);
    }

    #[test]
    fn ui_events_use_tagged_json() {
        let event: UiEvent =
            serde_json::from_str(r##"{"type":"select-color","color":"#112233"}"##).unwrap();
        assert_eq!(
            event,
            UiEvent::SelectColor {
                color: "#112233".parse().unwrap()
            }
        );
        let event: UiEvent = serde_json::from_str(r#"{"type":"click-outside"}"#).unwrap();
        assert_eq!(event, UiEvent::ClickOutside);
    }
}
