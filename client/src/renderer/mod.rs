pub mod markup;
pub mod raster;

use crate::camera::Camera;
use crate::cells::CellStore;
use crate::culling::VisibleRange;
use crate::reveal::RevealSet;
use crate::selection::SelectionModel;

/// Cell pixel size above which id labels are legible.
pub const LABEL_MIN_CELL_PX: f64 = 12.0;
/// Cell pixel size above which the status dot is drawn.
pub const DOT_MIN_CELL_PX: f64 = 7.0;

/// Immutable, frame-local scene input. Every backend draws from the same
/// struct so swapping backends can never change what a frame means.
pub struct DrawInput<'a> {
    pub range: VisibleRange,
    pub store: &'a CellStore,
    pub selection: &'a SelectionModel,
    pub reveal: &'a RevealSet,
    pub camera: &'a Camera,
    /// Participant id of the local user, for the owned outline.
    pub viewer: Option<&'a str>,
    pub hovered: Option<u32>,
    pub owner_tint: bool,
    pub show_dots: bool,
    pub show_labels: bool,
    pub now_ms: f64,
}

impl DrawInput<'_> {
    pub fn owned_by_viewer(&self, owner: Option<&str>) -> bool {
        match (owner, self.viewer) {
            (Some(owner), Some(viewer)) => owner == viewer,
            _ => false,
        }
    }
}
