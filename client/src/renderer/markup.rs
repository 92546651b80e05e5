use leptos::prelude::*;

use gridlot_shared::CellStatus;

use crate::app::{
    CameraSignal, DeviceClassCtx, GridViewportSize, HoveredCell, InteractionMode, ModeSignal,
    OwnerTint, RevealSignal, SelectionSignal, ShowLabels, StoreSignal, ViewerId,
};
use crate::colors::{Palette, brighten, cell_fill, rgba_css};
use crate::culling::visible_range;
use crate::renderer::LABEL_MIN_CELL_PX;
use crate::strategy::DeviceClass;

/// Markup backends: real elements instead of a pixel buffer.
///
/// `virtualized = false` materializes the whole grid once (small grids
/// only); `virtualized = true` materializes just the culled range and
/// re-keys it on every camera change. Both position cells with the same
/// camera pitch the raster path and the hit tester use, so a tap lands on
/// the same cell under every backend.
#[component]
pub fn MarkupLayer(virtualized: bool) -> impl IntoView {
    let StoreSignal(store) = expect_context();
    let CameraSignal(camera) = expect_context();
    let GridViewportSize(viewport) = expect_context();

    // Pan moves the layer, not the cells: the offset lives on the container
    // transform, cell positions depend on zoom alone.
    let container_style = move || {
        let cam = camera.get();
        format!(
            "position:absolute;left:0;top:0;transform:translate3d({:.2}px,{:.2}px,0);",
            cam.offset_x, cam.offset_y
        )
    };

    let cells = Memo::new(move |_| {
        store.with(|store| {
            let Some(store) = store else {
                return Vec::new();
            };
            let config = *store.config();
            if virtualized {
                let cam = camera.get();
                let (vw, vh) = viewport.get();
                let range = visible_range(&cam, vw, vh, config.rows, config.cols);
                let mut ids = Vec::with_capacity(range.count() as usize);
                ids.extend(range.iter().map(|(row, col)| config.cell_id(row, col)));
                ids
            } else {
                (0..config.total_cells()).collect()
            }
        })
    });

    view! {
        <div style=container_style>
            <For each=move || cells.get() key=|id| *id let:id>
                <MarkupCell id />
            </For>
        </div>
    }
}

#[component]
fn MarkupCell(id: u32) -> impl IntoView {
    let StoreSignal(store) = expect_context();
    let CameraSignal(camera) = expect_context();
    let SelectionSignal(selection) = expect_context();
    let RevealSignal(reveal) = expect_context();
    let HoveredCell(hovered) = expect_context();
    let ViewerId(viewer) = expect_context();
    let OwnerTint(owner_tint) = expect_context();
    let ShowLabels(show_labels) = expect_context();
    let ModeSignal(mode) = expect_context();
    let DeviceClassCtx(device) = expect_context();

    let palette = match device {
        DeviceClass::Touch => Palette::high_contrast(),
        DeviceClass::Desktop => Palette::standard(),
    };

    // One memo per cell: (inline style, label text, revealing flag).
    let appearance = Memo::new(move |_| {
        let cam = camera.get();
        let pitch = cam.pitch();
        let cell_px = cam.cell_px();

        let (row, col, status, fill, owned) = store.with(|store| match store {
            Some(store) => {
                let (row, col) = store.config().row_col(id);
                let cell = store.get(id);
                let fill = cell_fill(cell.status, cell.owner, owner_tint.get(), &palette);
                let owned = viewer.with(|viewer| {
                    matches!((cell.owner, viewer.as_deref()), (Some(a), Some(b)) if a == b)
                });
                (row, col, cell.status, fill, owned)
            }
            None => (0, 0, CellStatus::Unsold, palette.unsold, false),
        });

        let selected = selection.with(|s| s.contains(id));
        let is_hovered = hovered.get() == Some(id);
        let revealing = reveal.with(|r| r.contains(id));

        let mut shadows: Vec<String> = Vec::new();
        if selected {
            let (r, g, b) = palette.selection_outline;
            shadows.push(format!("inset 0 0 0 2px {}", rgba_css(r, g, b, 0.95)));
        } else if owned && status == CellStatus::Alive {
            let (r, g, b) = palette.owned_outline;
            shadows.push(format!("inset 0 0 0 2px {}", rgba_css(r, g, b, 0.85)));
        }
        if is_hovered {
            let (r, g, b) = brighten(fill.0, fill.1, fill.2, 1.6);
            shadows.push(format!("inset 0 0 0 1px {}", rgba_css(r, g, b, 0.9)));
        }

        let cursor = if mode.get() == InteractionMode::Select && status == CellStatus::Unsold {
            "pointer"
        } else {
            "inherit"
        };

        let mut style = format!(
            "position:absolute;left:{:.2}px;top:{:.2}px;width:{:.2}px;height:{:.2}px;background:{};cursor:{};",
            col as f64 * pitch,
            row as f64 * pitch,
            cell_px,
            cell_px,
            rgba_css(fill.0, fill.1, fill.2, 1.0),
            cursor,
        );
        if !shadows.is_empty() {
            style.push_str("box-shadow:");
            style.push_str(&shadows.join(","));
            style.push(';');
        }

        let label = (show_labels.get() && cell_px >= LABEL_MIN_CELL_PX).then(|| id.to_string());
        if label.is_some() {
            let font_px = (cell_px * 0.28).clamp(9.0, 26.0);
            let (lr, lg, lb) = palette.label;
            style.push_str(&format!(
                "display:flex;align-items:center;justify-content:center;font-size:{font_px:.0}px;color:{};",
                rgba_css(lr, lg, lb, 0.85)
            ));
        }

        (style, label, revealing)
    });

    view! {
        <div
            class="gl-cell"
            class:revealing=move || appearance.get().2
            style=move || appearance.get().0
        >
            {move || appearance.get().1}
        </div>
    }
}
