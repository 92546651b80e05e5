use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
    #[default]
    Unsold,
    Alive,
    Eliminated,
}

/// One explicitly-recorded cell as delivered by the game-data service.
/// Cells absent from a snapshot are implicitly unsold at the default price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub id: u32,
    #[serde(default)]
    pub status: CellStatus,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub price: f64,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquired: Option<DateTime<Utc>>,
}

/// Grid dimensions and default pricing. `rows * cols` is the cell count;
/// ids are row-major: `id = row * cols + col`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
    pub default_price: f64,
}

impl GridConfig {
    pub fn new(rows: u32, cols: u32, default_price: f64) -> Result<Self, String> {
        let config = Self {
            rows,
            cols,
            default_price,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects degenerate grids. Callers must validate before first use;
    /// deserialized configs are unchecked until then.
    pub fn validate(&self) -> Result<(), String> {
        if self.rows == 0 || self.cols == 0 {
            return Err(format!(
                "grid dimensions must be positive, got {}x{}",
                self.rows, self.cols
            ));
        }
        if self.rows.checked_mul(self.cols).is_none() {
            return Err(format!(
                "grid of {}x{} cells overflows the id space",
                self.rows, self.cols
            ));
        }
        if !self.default_price.is_finite() || self.default_price < 0.0 {
            return Err(format!("invalid default price {}", self.default_price));
        }
        Ok(())
    }

    pub const fn total_cells(&self) -> u32 {
        self.rows * self.cols
    }

    pub const fn cell_id(&self, row: u32, col: u32) -> u32 {
        row * self.cols + col
    }

    pub const fn row_col(&self, id: u32) -> (u32, u32) {
        (id / self.cols, id % self.cols)
    }

    pub const fn contains(&self, row: u32, col: u32) -> bool {
        row < self.rows && col < self.cols
    }
}

/// Full grid state at one point in time. Sparse: only sold/eliminated cells
/// carry records, everything else synthesizes to unsold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub config: GridConfig,
    #[serde(default)]
    pub cells: Vec<CellRecord>,
}
