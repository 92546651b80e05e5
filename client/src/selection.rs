use std::collections::HashSet;

use gridlot_shared::CellStatus;

use crate::cells::CellStore;

pub type SelectionListener = Box<dyn Fn(u32) + Send + Sync>;

/// Toggleable set of selectable cell ids. Only unsold cells enter the set;
/// membership is not retracted automatically if a member's status changes
/// later — the caller reconciles against fresh snapshots.
///
/// Selection is independent of the camera and survives backend switches.
#[derive(Default)]
pub struct SelectionModel {
    selected: HashSet<u32>,
    on_select: Option<SelectionListener>,
    on_deselect: Option<SelectionListener>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_select(&mut self, listener: SelectionListener) {
        self.on_select = Some(listener);
    }

    pub fn on_deselect(&mut self, listener: SelectionListener) {
        self.on_deselect = Some(listener);
    }

    /// Flip membership of `id`. No-op (returns false) unless the cell's
    /// current status is unsold.
    pub fn toggle(&mut self, id: u32, store: &CellStore) -> bool {
        if store.status(id) != CellStatus::Unsold {
            return false;
        }
        if self.selected.remove(&id) {
            if let Some(listener) = &self.on_deselect {
                listener(id);
            }
        } else {
            self.selected.insert(id);
            if let Some(listener) = &self.on_select {
                listener(id);
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop members whose status is no longer unsold (e.g. bought by someone
    /// else in the latest snapshot). No deselect events: nothing was toggled.
    pub fn reconcile(&mut self, store: &CellStore) {
        self.selected
            .retain(|&id| store.status(id) == CellStatus::Unsold);
    }

    pub fn contains(&self, id: u32) -> bool {
        self.selected.contains(&id)
    }

    pub fn ids(&self) -> &HashSet<u32> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Sum of the current prices of every selected cell.
    pub fn total_price(&self, store: &CellStore) -> f64 {
        self.selected.iter().map(|&id| store.get(id).price).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::SelectionModel;
    use crate::camera::Camera;
    use crate::cells::CellStore;
    use crate::gestures::{GestureController, GestureEffect, PointerInput, hit_test};
    use gridlot_shared::{CellRecord, CellStatus, GridConfig, GridSnapshot};

    fn store_with_sold_cell(sold_id: u32) -> CellStore {
        CellStore::from_snapshot(GridSnapshot {
            config: GridConfig::new(10, 10, 2.0).expect("valid config"),
            cells: vec![CellRecord {
                id: sold_id,
                status: CellStatus::Alive,
                owner: Some("p_1".into()),
                price: 2.0,
                acquired: None,
            }],
        })
        .expect("valid snapshot")
    }

    #[test]
    fn toggling_sold_cell_is_a_no_op() {
        let store = store_with_sold_cell(7);
        let mut selection = SelectionModel::new();
        assert!(!selection.toggle(7, &store));
        assert!(selection.is_empty());
    }

    #[test]
    fn double_toggle_restores_original_set() {
        let store = store_with_sold_cell(7);
        let mut selection = SelectionModel::new();
        selection.toggle(3, &store);
        let before: Vec<u32> = selection.ids().iter().copied().collect();

        assert!(selection.toggle(42, &store));
        assert!(selection.contains(42));
        assert!(selection.toggle(42, &store));
        assert!(!selection.contains(42));

        let after: Vec<u32> = selection.ids().iter().copied().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn listeners_fire_on_select_and_deselect() {
        let store = store_with_sold_cell(7);
        let mut selection = SelectionModel::new();
        let selected = Arc::new(Mutex::new(Vec::new()));
        let deselected = Arc::new(Mutex::new(Vec::new()));

        let sink = selected.clone();
        selection.on_select(Box::new(move |id| sink.lock().unwrap().push(id)));
        let sink = deselected.clone();
        selection.on_deselect(Box::new(move |id| sink.lock().unwrap().push(id)));

        selection.toggle(5, &store);
        selection.toggle(5, &store);
        selection.toggle(7, &store); // sold: no event

        assert_eq!(*selected.lock().unwrap(), vec![5]);
        assert_eq!(*deselected.lock().unwrap(), vec![5]);
    }

    #[test]
    fn reconcile_drops_members_sold_elsewhere() {
        let store = store_with_sold_cell(7);
        let mut selection = SelectionModel::new();
        selection.toggle(3, &store);
        selection.toggle(4, &store);

        let refreshed = store_with_sold_cell(3);
        selection.reconcile(&refreshed);
        assert!(!selection.contains(3));
        assert!(selection.contains(4));
    }

    #[test]
    fn total_price_sums_selected_cells() {
        let store = store_with_sold_cell(7);
        let mut selection = SelectionModel::new();
        selection.toggle(1, &store);
        selection.toggle(2, &store);
        assert!((selection.total_price(&store) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn tap_resolves_and_selects_exactly_once() {
        // 10x10 grid, 50px cells, identity camera: a tap at (55,55) lands in
        // cell (1,1) and selects it through the full gesture -> hit -> toggle
        // path.
        let store = store_with_sold_cell(7);
        let cam = Camera {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
            base_cell_size: 50.0,
        };
        let mut gestures = GestureController::new();
        let mut selection = SelectionModel::new();
        let fired = Arc::new(Mutex::new(0u32));
        let sink = fired.clone();
        selection.on_select(Box::new(move |_| *sink.lock().unwrap() += 1));

        gestures.handle(PointerInput::Down {
            id: 1,
            x: 55.0,
            y: 55.0,
            time_ms: 0.0,
        });
        let effect = gestures.handle(PointerInput::Up {
            id: 1,
            x: 55.0,
            y: 55.0,
            time_ms: 100.0,
        });

        let GestureEffect::Tap { x, y } = effect else {
            panic!("expected tap, got {effect:?}");
        };
        let id = hit_test(&cam, store.config(), x, y).expect("inside grid");
        assert_eq!(id, store.config().cell_id(1, 1));
        assert!(selection.toggle(id, &store));
        assert_eq!(*fired.lock().unwrap(), 1);
    }
}
