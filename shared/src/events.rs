use serde::{Deserialize, Serialize};

use crate::cell::GridSnapshot;

/// Messages delivered by the game-data service. Each `Snapshot` replaces the
/// client's cell store wholesale; reveal messages only name cell ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GridEvent {
    Snapshot {
        #[serde(default)]
        seq: u64,
        grid: GridSnapshot,
        timestamp: String,
    },
    /// Cells currently playing the elimination-reveal animation.
    Reveal {
        #[serde(default)]
        seq: u64,
        revealing: Vec<u32>,
        timestamp: String,
    },
    /// Terminal outcome of a reveal batch; the next snapshot carries the
    /// corresponding status changes.
    RevealComplete {
        #[serde(default)]
        seq: u64,
        eliminated: Vec<u32>,
        timestamp: String,
    },
}

#[cfg(test)]
mod tests {
    use super::GridEvent;

    #[test]
    fn event_tag_selects_variant() {
        let json = r#"{"type":"Reveal","revealing":[3,5,8],"timestamp":"2026-07-01T12:00:00Z"}"#;
        let event: GridEvent = serde_json::from_str(json).expect("deserialize");
        match event {
            GridEvent::Reveal { seq, revealing, .. } => {
                assert_eq!(seq, 0);
                assert_eq!(revealing, vec![3, 5, 8]);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn snapshot_event_round_trips() {
        let json = r#"{
            "type": "Snapshot",
            "seq": 12,
            "grid": {"config": {"rows": 2, "cols": 2, "default_price": 1.0}, "cells": []},
            "timestamp": "2026-07-01T12:00:00Z"
        }"#;
        let event: GridEvent = serde_json::from_str(json).expect("deserialize");
        let GridEvent::Snapshot { seq, grid, .. } = event else {
            panic!("expected snapshot");
        };
        assert_eq!(seq, 12);
        assert_eq!(grid.config.total_cells(), 4);
    }
}
