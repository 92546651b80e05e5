use std::collections::HashMap;

use chrono::{DateTime, Utc};
use gridlot_shared::{CellRecord, CellStatus, GridConfig, GridSnapshot};

/// Resolved state of one cell. Cells without an explicit record synthesize
/// to unsold at the default price — never an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellView<'a> {
    pub status: CellStatus,
    pub owner: Option<&'a str>,
    pub price: f64,
    pub acquired: Option<DateTime<Utc>>,
}

/// Cell state lookup for one grid instance. Rebuilt wholesale from each
/// snapshot the game-data service delivers; the renderer only reads it.
#[derive(Debug, Clone)]
pub struct CellStore {
    config: GridConfig,
    records: HashMap<u32, CellRecord>,
    alive: u32,
    eliminated: u32,
}

impl CellStore {
    pub fn from_snapshot(snapshot: GridSnapshot) -> Result<Self, String> {
        snapshot.config.validate()?;
        let total = snapshot.config.total_cells();

        let mut records = HashMap::with_capacity(snapshot.cells.len());
        let mut alive = 0u32;
        let mut eliminated = 0u32;
        for record in snapshot.cells {
            // Records outside the grid can't be drawn or hit; drop them.
            if record.id >= total {
                continue;
            }
            match record.status {
                CellStatus::Alive => alive += 1,
                CellStatus::Eliminated => eliminated += 1,
                CellStatus::Unsold => {}
            }
            records.insert(record.id, record);
        }

        Ok(Self {
            config: snapshot.config,
            records,
            alive,
            eliminated,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn rows(&self) -> u32 {
        self.config.rows
    }

    pub fn cols(&self) -> u32 {
        self.config.cols
    }

    pub fn total_cells(&self) -> u32 {
        self.config.total_cells()
    }

    pub fn get(&self, id: u32) -> CellView<'_> {
        match self.records.get(&id) {
            Some(record) => CellView {
                status: record.status,
                owner: record.owner.as_deref(),
                price: record.price,
                acquired: record.acquired,
            },
            None => CellView {
                status: CellStatus::Unsold,
                owner: None,
                price: self.config.default_price,
                acquired: None,
            },
        }
    }

    pub fn status(&self, id: u32) -> CellStatus {
        self.records
            .get(&id)
            .map(|r| r.status)
            .unwrap_or(CellStatus::Unsold)
    }

    /// (unsold, alive, eliminated) across the whole grid.
    pub fn counts(&self) -> (u32, u32, u32) {
        let sold = self.alive + self.eliminated;
        (self.total_cells() - sold, self.alive, self.eliminated)
    }
}

#[cfg(test)]
mod tests {
    use super::CellStore;
    use gridlot_shared::{CellRecord, CellStatus, GridConfig, GridSnapshot};

    fn record(id: u32, status: CellStatus, owner: &str) -> CellRecord {
        CellRecord {
            id,
            status,
            owner: Some(owner.to_string()),
            price: 3.0,
            acquired: None,
        }
    }

    fn store() -> CellStore {
        CellStore::from_snapshot(GridSnapshot {
            config: GridConfig::new(10, 10, 1.5).expect("valid config"),
            cells: vec![
                record(0, CellStatus::Alive, "p_1"),
                record(11, CellStatus::Eliminated, "p_2"),
                record(500, CellStatus::Alive, "p_3"), // outside 10x10
            ],
        })
        .expect("valid snapshot")
    }

    #[test]
    fn explicit_records_resolve() {
        let store = store();
        let cell = store.get(0);
        assert_eq!(cell.status, CellStatus::Alive);
        assert_eq!(cell.owner, Some("p_1"));
        assert_eq!(cell.price, 3.0);
    }

    #[test]
    fn missing_cells_synthesize_unsold_defaults() {
        let store = store();
        let cell = store.get(42);
        assert_eq!(cell.status, CellStatus::Unsold);
        assert_eq!(cell.owner, None);
        assert_eq!(cell.price, 1.5);
    }

    #[test]
    fn out_of_range_records_are_dropped() {
        let store = store();
        // 2 in-range records survive: 1 alive + 1 eliminated
        assert_eq!(store.counts(), (98, 1, 1));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = CellStore::from_snapshot(GridSnapshot {
            config: GridConfig {
                rows: 0,
                cols: 10,
                default_price: 1.0,
            },
            cells: Vec::new(),
        });
        assert!(result.is_err());
    }
}
