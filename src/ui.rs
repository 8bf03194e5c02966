use crate::controller::PopupView;
use crate::model::Color;
use crate::render::{BeaconNode, HistoryNode};
use crate::session::{BoardSnapshot, ViewMode};
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct AppProps {
    pub snapshot: BoardSnapshot,
}

pub fn render_html(snapshot: &BoardSnapshot) -> String {
    let mut app = VirtualDom::new_with_props(
        App,
        AppProps {
            snapshot: snapshot.clone(),
        },
    );
    // Build the tree before rendering to avoid SSR panics.
    let mut noop = NoOpMutations {};
    let _ = app.rebuild(&mut noop);
    dioxus_ssr::render(&mut app)
}

const STYLES: &str = r#"
* { box-sizing: border-box; }
body, html { margin: 0; padding: 0; background: #f4f1ea; }
.page { min-height: 100vh; padding: 28px 18px; color: #1d1d1f; font-family: "Space Grotesk", "Inter", system-ui, sans-serif; }
.header { display: flex; align-items: center; justify-content: space-between; gap: 12px; margin-bottom: 18px; }
.title { font-size: 26px; margin: 0; }
.toggle { padding: 10px 14px; border-radius: 12px; border: 1px solid #d8d2c4; background: #fffdf8; font-weight: 700; cursor: pointer; }
.board { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 12px; }
.board.hidden, .history.hidden { display: none; }
.beacon-box, .history-box { background: #fffdf8; border: 1px solid #e2dccd; border-radius: 14px; padding: 14px 16px; cursor: pointer; overflow: hidden; }
.history-box { cursor: default; display: inline-block; width: min(420px, 100%); margin: 0 12px 12px 0; vertical-align: top; }
.beacon-title, .history-title { margin: 0 0 6px 0; font-size: 18px; filter: brightness(90%); }
.beacon-desc, .history-desc { margin: 0; color: #5b5950; font-size: 14px; }
.overlay { position: fixed; inset: 0; display: flex; align-items: center; justify-content: center; background: rgba(20, 18, 12, 0.35); }
.overlay.hidden { display: none; }
.panel { width: min(460px, 92vw); background: #fffdf8; border-radius: 16px; padding: 22px; box-shadow: 0 18px 44px rgba(0,0,0,0.25); }
.panel-heading { margin: 0 0 8px 0; font-size: 22px; filter: brightness(90%); }
.panel-desc { margin: 0 0 16px 0; color: #4a4840; }
[contenteditable=true] { outline: 1px dashed #b9b2a0; border-radius: 6px; padding: 2px 4px; }
.colors { margin-bottom: 14px; }
.color-row { display: flex; gap: 4px; margin-bottom: 4px; }
.color-elem { width: 26px; height: 26px; border-radius: 6px; border: 1px solid #cfc8b8; cursor: pointer; }
.primary { width: 100%; padding: 12px 14px; border-radius: 12px; border: none; background: #1d1d1f; color: #fffdf8; font-weight: 800; font-size: 16px; cursor: pointer; }
.bars { display: flex; flex-direction: column; gap: 10px; margin-bottom: 16px; }
.bar { height: 48px; border-radius: 12px; }
.status { margin-top: 10px; color: #8a8270; font-size: 13px; min-height: 16px; }
"#;

const SCRIPT: &str = r#"
(() => {
  const popup = document.getElementById('popup-space');
  const search = document.getElementById('search-space');
  const heading = document.getElementById('popup-heading');
  const desc = document.getElementById('popup-desc');
  const action = document.getElementById('popup-lower');
  const stop = document.getElementById('search-lower');
  const pulse = document.getElementById('search-pulse-bar');
  const status = document.getElementById('status');

  async function send(event) {
    const res = await fetch('/api/ui', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(event)
    });
    if (!res.ok) {
      status.textContent = await res.text();
      return false;
    }
    return true;
  }

  async function sendAndReload(event) {
    if (await send(event)) window.location.reload();
  }

  document.querySelectorAll('[data-beacon-id]').forEach((box) => {
    box.addEventListener('click', (e) => {
      e.stopPropagation();
      sendAndReload({ type: 'select-beacon', id: Number(box.dataset.beaconId) });
    });
  });

  document.querySelectorAll('[data-color]').forEach((btn) => {
    btn.addEventListener('click', async () => {
      if (await send({ type: 'select-color', color: btn.dataset.color })) {
        heading.style.color = btn.dataset.color;
      }
    });
  });

  action?.addEventListener('click', async () => {
    switch (popup.dataset.state) {
      case 'open-unpaired':
        await send({ type: 'edit-title', text: heading.textContent });
        await send({ type: 'edit-desc', text: desc.textContent });
        sendAndReload({ type: 'confirm' });
        break;
      case 'open-paired':
        sendAndReload({ type: 'ping' });
        break;
    }
  });

  stop?.addEventListener('click', () => sendAndReload({ type: 'stop-search' }));
  document.getElementById('button-history')?.addEventListener('click', () => sendAndReload({ type: 'toggle-history' }));

  window.addEventListener('keydown', (e) => {
    if (e.code === 'Escape') sendAndReload({ type: 'key-down', code: e.code });
  });

  [popup, search].forEach((overlay) => {
    overlay?.addEventListener('click', (e) => {
      if (e.target === overlay) sendAndReload({ type: 'click-outside' });
    });
  });

  if (pulse && search && !search.classList.contains('hidden')) {
    const scheme = window.location.protocol === 'https:' ? 'wss' : 'ws';
    const ws = new WebSocket(`${scheme}://${window.location.host}/ws/pulse`);
    ws.onmessage = (msg) => {
      try {
        const frame = JSON.parse(msg.data);
        pulse.style.backgroundColor = frame.color;
        pulse.style.opacity = frame.opacity;
      } catch (err) {
        // ignore malformed frames
      }
    };
  }
})();
"#;

#[component]
fn App(props: AppProps) -> Element {
    let snapshot = &props.snapshot;
    let in_history = snapshot.view == ViewMode::History;
    let board_class = if in_history { "board hidden" } else { "board" };
    let history_class = if in_history { "history" } else { "history hidden" };
    let toggle_label = if in_history {
        "View Active Beacons"
    } else {
        "View Project History"
    };
    let diagnostic = snapshot.diagnostics.last().cloned().unwrap_or_default();

    rsx! {
        div { class: "page",
            meta { name: "viewport", content: "width=device-width, initial-scale=1" }
            div { class: "header",
                h1 { class: "title", "Beacons" }
                button { id: "button-history", class: "toggle", "{toggle_label}" }
            }
            div { id: "main-space", class: "{board_class}",
                for node in snapshot.beacons.iter().cloned() {
                    BeaconBox { key: "{node.id}", node }
                }
            }
            div { id: "history-space", class: "{history_class}",
                for (index, node) in snapshot.history.iter().cloned().enumerate() {
                    HistoryBox { key: "{index}", node }
                }
            }
            div { id: "status", class: "status", "{diagnostic}" }
        }
        Popup { popup: snapshot.popup.clone(), palette: snapshot.palette.clone() }
        SearchPanel { popup: snapshot.popup.clone() }
        style { "{STYLES}" }
        script { "{SCRIPT}" }
    }
}

#[component]
fn BeaconBox(node: BeaconNode) -> Element {
    rsx! {
        div { id: "beacon-box-{node.id}", class: "beacon-box", "data-beacon-id": "{node.id}",
            h2 { class: "beacon-title", style: "color: {node.color};", "{node.heading}" }
            p { class: "beacon-desc", "{node.description}" }
        }
    }
}

#[component]
fn HistoryBox(node: HistoryNode) -> Element {
    let display = if node.visible { "inline-block" } else { "none" };
    rsx! {
        div { id: "history-box-{node.id}", class: "history-box", style: "display: {display};",
            h2 { class: "history-title", style: "color: {node.color};", "{node.heading}" }
            p { class: "history-desc", "{node.description}" }
        }
    }
}

#[component]
fn Popup(popup: PopupView, palette: Vec<Vec<Color>>) -> Element {
    let open = matches!(popup.state, "open-unpaired" | "open-paired");
    let overlay_class = if open { "overlay" } else { "overlay hidden" };
    let colors_style = if popup.show_colors {
        "display: inline-block;"
    } else {
        "display: none;"
    };
    let action = popup.action.unwrap_or_default();

    rsx! {
        div { id: "popup-space", class: "{overlay_class}", "data-state": "{popup.state}",
            div { class: "panel",
                h2 {
                    id: "popup-heading",
                    class: "panel-heading",
                    style: "color: {popup.heading_color};",
                    contenteditable: "{popup.editable}",
                    "{popup.heading}"
                }
                p { id: "popup-desc", class: "panel-desc", contenteditable: "{popup.editable}", "{popup.description}" }
                div { id: "popup-colors", class: "colors", style: "{colors_style}",
                    for row in palette.iter() {
                        div { class: "color-row",
                            for color in row.iter() {
                                button {
                                    class: "color-elem",
                                    "data-color": "{color}",
                                    style: "background-color: {color};",
                                }
                            }
                        }
                    }
                }
                button { id: "popup-lower", class: "primary", "{action}" }
            }
        }
    }
}

#[component]
fn SearchPanel(popup: PopupView) -> Element {
    let searching = popup.state == "searching";
    let overlay_class = if searching { "overlay" } else { "overlay hidden" };
    rsx! {
        div { id: "search-space", class: "{overlay_class}",
            div { class: "panel",
                h2 { class: "panel-heading", style: "color: {popup.heading_color};", "{popup.heading}" }
                div { class: "bars",
                    div { id: "search-base-bar", class: "bar", style: "background-color: {popup.heading_color};" }
                    div { id: "search-pulse-bar", class: "bar", style: "opacity: 0;" }
                }
                button { id: "search-lower", class: "primary", "Stop" }
            }
        }
    }
}
