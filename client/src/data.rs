use leptos::prelude::*;

use gridlot_shared::GridEvent;

use crate::app::{ConnStatus, RevealSignal, SelectionSignal, StoreSignal};
use crate::cells::CellStore;
use crate::reveal::RevealSet;
use crate::selection::SelectionModel;

/// Connection to the game-data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Live,
    Failed,
}

/// Fetch the initial grid delivery and run it through `apply_event`.
/// One-shot by design: live streaming and reconnection belong to the
/// embedding page, which pushes later deliveries through the same path.
pub(crate) fn load_snapshot(
    StoreSignal(store): StoreSignal,
    ConnStatus(status): ConnStatus,
    SelectionSignal(selection): SelectionSignal,
    RevealSignal(reveal): RevealSignal,
) {
    wasm_bindgen_futures::spawn_local(async move {
        match fetch_grid().await {
            Ok(event) => {
                let mut outcome = Ok(());
                store.update(|st| {
                    reveal.update(|rev| {
                        selection.update(|sel| {
                            outcome = apply_event(event, st, rev, sel);
                        });
                    });
                });
                match outcome {
                    Ok(()) => status.set(ConnectionStatus::Live),
                    Err(err) => {
                        web_sys::console::warn_1(&format!("invalid grid delivery: {err}").into());
                        status.set(ConnectionStatus::Failed);
                    }
                }
            }
            Err(err) => {
                web_sys::console::warn_1(&format!("grid fetch failed: {err}").into());
                status.set(ConnectionStatus::Failed);
            }
        }
    });
}

async fn fetch_grid() -> Result<GridEvent, String> {
    let resp = gloo_net::http::Request::get("/api/grid")
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.json::<GridEvent>().await.map_err(|e| e.to_string())
}

/// Apply one game-data delivery. Snapshots replace the store wholesale (and
/// reconcile the selection against cells sold in the meantime); reveal
/// deliveries replace or clear the reveal set. The renderer never sees
/// partial state.
pub fn apply_event(
    event: GridEvent,
    store: &mut Option<CellStore>,
    reveal: &mut RevealSet,
    selection: &mut SelectionModel,
) -> Result<(), String> {
    match event {
        GridEvent::Snapshot { grid, .. } => {
            let cells = CellStore::from_snapshot(grid)?;
            selection.reconcile(&cells);
            *store = Some(cells);
        }
        GridEvent::Reveal { revealing, .. } => reveal.replace(revealing),
        GridEvent::RevealComplete { .. } => reveal.clear(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::apply_event;
    use crate::reveal::RevealSet;
    use crate::selection::SelectionModel;
    use gridlot_shared::{CellRecord, CellStatus, GridConfig, GridEvent, GridSnapshot};

    fn snapshot_event(cells: Vec<CellRecord>) -> GridEvent {
        GridEvent::Snapshot {
            seq: 1,
            grid: GridSnapshot {
                config: GridConfig::new(4, 4, 1.0).expect("valid config"),
                cells,
            },
            timestamp: "2026-07-01T12:00:00Z".into(),
        }
    }

    fn sold(id: u32) -> CellRecord {
        CellRecord {
            id,
            status: CellStatus::Alive,
            owner: Some("p_1".into()),
            price: 1.0,
            acquired: None,
        }
    }

    #[test]
    fn snapshot_replaces_store_and_reconciles_selection() {
        let mut store = None;
        let mut reveal = RevealSet::new();
        let mut selection = SelectionModel::new();

        apply_event(snapshot_event(vec![]), &mut store, &mut reveal, &mut selection)
            .expect("apply snapshot");
        let cells = store.as_ref().expect("store populated");
        selection.toggle(5, cells);
        assert!(selection.contains(5));

        // Cell 5 sells out from under the pending selection.
        apply_event(
            snapshot_event(vec![sold(5)]),
            &mut store,
            &mut reveal,
            &mut selection,
        )
        .expect("apply snapshot");
        assert!(!selection.contains(5));
        assert_eq!(store.expect("store populated").counts(), (15, 1, 0));
    }

    #[test]
    fn reveal_events_replace_then_clear() {
        let mut store = None;
        let mut reveal = RevealSet::new();
        let mut selection = SelectionModel::new();

        apply_event(
            GridEvent::Reveal {
                seq: 2,
                revealing: vec![1, 2],
                timestamp: "2026-07-01T12:00:01Z".into(),
            },
            &mut store,
            &mut reveal,
            &mut selection,
        )
        .expect("apply reveal");
        assert!(reveal.contains(1) && reveal.contains(2));

        apply_event(
            GridEvent::RevealComplete {
                seq: 3,
                eliminated: vec![2],
                timestamp: "2026-07-01T12:00:09Z".into(),
            },
            &mut store,
            &mut reveal,
            &mut selection,
        )
        .expect("apply reveal complete");
        assert!(reveal.is_empty());
    }

    #[test]
    fn invalid_snapshot_is_rejected_and_leaves_state() {
        let mut store = None;
        let mut reveal = RevealSet::new();
        let mut selection = SelectionModel::new();

        let bad = GridEvent::Snapshot {
            seq: 1,
            grid: GridSnapshot {
                config: GridConfig {
                    rows: 0,
                    cols: 4,
                    default_price: 1.0,
                },
                cells: vec![],
            },
            timestamp: "2026-07-01T12:00:00Z".into(),
        };
        assert!(apply_event(bad, &mut store, &mut reveal, &mut selection).is_err());
        assert!(store.is_none());
    }
}
