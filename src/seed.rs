use crate::backend::{Backend, Inbound};
use crate::error::Result;
use crate::model::{BeaconUpdate, HistoryEntry, UserId};
use crate::render::Renderer;
use crate::session::Session;

const BEACONS: &[(Option<&str>, &str, &str)] = &[
    (Some("project 1"), "we are working on project 1 reall hard over here", "#a260be"),
    (Some("project 2"), "we are working on project 2 reall hard over here", "#1b713b"),
    (None, "", ""),
    (
        Some("hands and feet and hands and feet and arms and legs and shouldbers"),
        "what's up everyone it's your buddy victor frankenstein here back again with another human corpse project",
        "#ff5675",
    ),
    (None, "", ""),
    (None, "", ""),
    (Some("mine craft"), "mine craft", "#10f71f"),
];

const LATE_BEACONS: &[(&str, &str, &str)] = &[
    (
        "sewing pants by hand",
        "literal luddite mentality but hey! The luddites had a point.",
        "#2f52be",
    ),
    ("beacons", "sending out a beacon for working on beacons", "#42223f"),
];

const HISTORY: &[(UserId, &str, &str, &str, i64)] = &[
    (1, "The best project ever", "This is the best project. It will change the world a thousand times over.", "#39ed3f", 1),
    (1, "The worst project ever", "After the success of our last venture, we tried to replicate the same thing this week. We failed miserably.", "#FF0000", 2),
    (1, "just a mediuim project", "yeag", "#eab136", 3),
    (2, "The best project ever", "This is the best project. It will change the world a thousand times over.", "#00FFFF", 1),
    (2, "Hands and feet", "have you ever wanted. them.", "#0000FF", 2),
];

/// Loads the demo board: seven beacons (three unpaired), one of them
/// detached again, two late arrivals and five history entries.
pub fn demo_pushes() -> Result<Vec<Inbound>> {
    let mut pushes = Vec::new();
    let mut next_id = 1;

    for (title, desc, color) in BEACONS {
        let update = match title {
            Some(title) => BeaconUpdate {
                id: next_id,
                title: Some(title.to_string()),
                desc: Some(desc.to_string()),
                base_color: Some(color.parse()?),
                ..BeaconUpdate::default()
            },
            None => BeaconUpdate::bare(next_id),
        };
        pushes.push(Inbound::BeaconUpdated(update));
        next_id += 1;
    }

    pushes.push(Inbound::BeaconRemoved { id: 2 });

    for (title, desc, color) in LATE_BEACONS {
        pushes.push(Inbound::BeaconUpdated(BeaconUpdate {
            id: next_id,
            title: Some(title.to_string()),
            desc: Some(desc.to_string()),
            base_color: Some(color.parse()?),
            ..BeaconUpdate::default()
        }));
        next_id += 1;
    }

    for (user, title, desc, color, date) in HISTORY {
        pushes.push(Inbound::HistoryRecorded(HistoryEntry {
            id: next_id,
            user: *user,
            title: title.to_string(),
            desc: desc.to_string(),
            color: color.parse()?,
            date: *date,
        }));
        next_id += 1;
    }

    Ok(pushes)
}

pub fn load_demo<R: Renderer, B: Backend>(session: &mut Session<R, B>) -> Result<()> {
    let pushes = demo_pushes()?;
    tracing::info!(count = pushes.len(), "loading demo board");
    for inbound in pushes {
        session.handle_inbound(inbound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SimulatedServer;
    use crate::controller::CharLimits;
    use crate::render::{BoardView, UNPAIRED_HEADING};

    #[test]
    fn demo_board_loads_cleanly() {
        let mut session = Session::new(
            2,
            CharLimits::default(),
            BoardView::new(),
            SimulatedServer::with_seed(1),
        );
        load_demo(&mut session).unwrap();

        let snapshot = session.snapshot();
        assert!(snapshot.diagnostics.is_empty());
        assert_eq!(snapshot.beacons.len(), 8);
        assert!(snapshot.beacons.iter().all(|b| b.id != 2));
        assert_eq!(snapshot.beacons[0].heading, UNPAIRED_HEADING);
        assert_eq!(snapshot.beacons.last().unwrap().heading, "sewing pants by hand");
        assert_eq!(snapshot.history.len(), 5);
    }
}
