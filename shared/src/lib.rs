pub mod cell;
pub mod colors;
pub mod events;

pub use cell::{CellRecord, CellStatus, GridConfig, GridSnapshot};
pub use colors::owner_color;
pub use events::GridEvent;
