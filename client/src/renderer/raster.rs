use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use gridlot_shared::CellStatus;

use crate::colors::{Palette, brighten, cell_fill, rgba_css};
use crate::reveal::pulse_alpha;

use super::{DOT_MIN_CELL_PX, DrawInput, LABEL_MIN_CELL_PX};

/// Tuned parameters for the two rasterized backends. Same drawing
/// algorithm; touch gets smaller cells (set on the camera), a
/// higher-contrast palette, and no sub-pixel smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterStyle {
    pub palette: Palette,
    pub smoothing: bool,
    pub label_min_px: f64,
    pub dot_min_px: f64,
}

impl RasterStyle {
    pub fn desktop() -> Self {
        Self {
            palette: Palette::standard(),
            smoothing: true,
            label_min_px: LABEL_MIN_CELL_PX,
            dot_min_px: DOT_MIN_CELL_PX,
        }
    }

    pub fn touch() -> Self {
        Self {
            palette: Palette::high_contrast(),
            smoothing: false,
            // Fingers occlude more than cursors; demand a bit more room.
            label_min_px: LABEL_MIN_CELL_PX + 2.0,
            dot_min_px: DOT_MIN_CELL_PX + 1.0,
        }
    }
}

/// Draw the culled range into a 2D context sized `width`x`height` CSS px.
/// Clears the whole buffer, then touches only visible cells — the per-frame
/// cost is bounded by the viewport, not the grid.
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    width: f64,
    height: f64,
    input: &DrawInput<'_>,
    style: &RasterStyle,
) {
    let palette = &style.palette;
    let (bg_r, bg_g, bg_b) = palette.background;
    ctx.set_fill_style_str(&rgba_css(bg_r, bg_g, bg_b, 1.0));
    ctx.fill_rect(0.0, 0.0, width, height);
    ctx.set_image_smoothing_enabled(style.smoothing);

    if input.range.is_empty() {
        return;
    }

    let cam = input.camera;
    let cell_px = cam.cell_px();
    let show_dot = input.show_dots && cell_px >= style.dot_min_px;
    let show_label = input.show_labels && cell_px >= style.label_min_px;
    let pulse = pulse_alpha(input.now_ms);
    let config = input.store.config();

    if show_label {
        let font_px = (cell_px * 0.28).clamp(9.0, 26.0);
        ctx.set_font(&format!("{font_px:.0}px ui-monospace, monospace"));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
    }

    let outline_w = (cell_px * 0.08).clamp(1.5, 4.0);
    let (lr, lg, lb) = palette.label;

    for (row, col) in input.range.iter() {
        let id = config.cell_id(row, col);
        let cell = input.store.get(id);
        let (sx, sy) = cam.world_to_screen(row as f64, col as f64);

        // Snap to the pixel grid; at collapsed gap this closes sub-pixel
        // seams between neighbors.
        let x = sx.floor();
        let y = sy.floor();
        let w = (sx + cell_px).ceil() - x;
        let h = (sy + cell_px).ceil() - y;

        let revealing = input.reveal.contains(id);
        if revealing {
            ctx.set_global_alpha(pulse);
        }

        let (r, g, b) = cell_fill(cell.status, cell.owner, input.owner_tint, palette);
        ctx.set_fill_style_str(&rgba_css(r, g, b, 1.0));
        ctx.fill_rect(x, y, w, h);

        if input.selection.contains(id) {
            let (or_, og, ob) = palette.selection_outline;
            ctx.set_stroke_style_str(&rgba_css(or_, og, ob, 0.95));
            ctx.set_line_width(outline_w);
            ctx.stroke_rect(x + outline_w / 2.0, y + outline_w / 2.0, w - outline_w, h - outline_w);
        } else if cell.status == CellStatus::Alive && input.owned_by_viewer(cell.owner) {
            let (or_, og, ob) = palette.owned_outline;
            ctx.set_stroke_style_str(&rgba_css(or_, og, ob, 0.85));
            ctx.set_line_width((outline_w * 0.75).max(1.0));
            ctx.stroke_rect(x + outline_w / 2.0, y + outline_w / 2.0, w - outline_w, h - outline_w);
        }

        if input.hovered == Some(id) {
            let (hr, hg, hb) = brighten(r, g, b, 1.6);
            ctx.set_stroke_style_str(&rgba_css(hr, hg, hb, 0.9));
            ctx.set_line_width(1.0);
            ctx.stroke_rect(x + 0.5, y + 0.5, w - 1.0, h - 1.0);
        }

        if show_dot && cell.status != CellStatus::Unsold {
            let (dr, dg, db) = match cell.status {
                CellStatus::Alive => brighten(palette.alive.0, palette.alive.1, palette.alive.2, 1.5),
                _ => brighten(
                    palette.eliminated.0,
                    palette.eliminated.1,
                    palette.eliminated.2,
                    1.6,
                ),
            };
            let radius = (cell_px * 0.08).clamp(1.5, 5.0);
            ctx.set_fill_style_str(&rgba_css(dr, dg, db, 0.95));
            ctx.begin_path();
            let _ = ctx.arc(x + w - radius * 2.0, y + radius * 2.0, radius, 0.0, TAU);
            ctx.fill();
        }

        if show_label {
            ctx.set_fill_style_str(&rgba_css(lr, lg, lb, 0.85));
            let _ = ctx.fill_text(&id.to_string(), x + w / 2.0, y + h / 2.0);
        }

        if revealing {
            ctx.set_global_alpha(1.0);
        }
    }
}
