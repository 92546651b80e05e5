/// Camera manages the pan/zoom transformation from grid coordinates
/// (fractional row/col units) to screen pixels.
///
/// The screen-space distance between adjacent cell origins is the *pitch*:
/// `base_cell_size * zoom + gap(zoom)`. All transforms go through the pitch
/// so the inter-cell gap never skews coordinate math.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub offset_x: f64,
    pub offset_y: f64,
    pub zoom: f64,
    /// Cell edge in CSS pixels at zoom 1. Fixed per device class at mount.
    pub base_cell_size: f64,
}

pub const ZOOM_MIN: f64 = 0.05;
pub const ZOOM_MAX: f64 = 8.0;

pub const BASE_CELL_DESKTOP: f64 = 40.0;
pub const BASE_CELL_TOUCH: f64 = 28.0;

/// Below this zoom the 1px inter-cell gap collapses and cells fuse into a
/// continuous field.
const GAP_COLLAPSE_ZOOM: f64 = 0.5;
const CELL_GAP_PX: f64 = 1.0;

/// Fraction of the viewport the grid occupies after `fit_to_view`.
const FIT_MARGIN: f64 = 0.95;

impl Camera {
    pub fn new(base_cell_size: f64) -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
            base_cell_size,
        }
    }

    /// Center-to-center pixel distance between adjacent cells.
    pub fn pitch(&self) -> f64 {
        self.base_cell_size * self.zoom + self.gap()
    }

    /// Width of the seam between adjacent cells at the current zoom.
    pub fn gap(&self) -> f64 {
        if self.zoom >= GAP_COLLAPSE_ZOOM {
            CELL_GAP_PX
        } else {
            0.0
        }
    }

    /// Edge length of the filled part of a cell, in pixels.
    pub fn cell_px(&self) -> f64 {
        self.base_cell_size * self.zoom
    }

    /// Convert grid coordinates to screen coordinates (cell origin).
    pub fn world_to_screen(&self, row: f64, col: f64) -> (f64, f64) {
        let pitch = self.pitch();
        (self.offset_x + col * pitch, self.offset_y + row * pitch)
    }

    /// Convert screen coordinates to fractional grid coordinates.
    pub fn screen_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let pitch = self.pitch();
        ((y - self.offset_y) / pitch, (x - self.offset_x) / pitch)
    }

    /// Zoom by `factor` while holding the world point under the screen
    /// anchor fixed. The offset correction uses the pitch ratio, not the
    /// zoom ratio: the gap collapses in a step, and anchoring must survive
    /// crossing that step.
    pub fn zoom_around(&mut self, anchor_x: f64, anchor_y: f64, factor: f64) {
        if !factor.is_finite() {
            return;
        }
        let old_pitch = self.pitch();
        self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        let ratio = self.pitch() / old_pitch;

        self.offset_x = anchor_x - (anchor_x - self.offset_x) * ratio;
        self.offset_y = anchor_y - (anchor_y - self.offset_y) * ratio;
    }

    /// Pan by screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Zoom and center so the whole grid fits the viewport with a margin.
    pub fn fit_to_view(&mut self, viewport_w: f64, viewport_h: f64, rows: u32, cols: u32) {
        if viewport_w <= 0.0 || viewport_h <= 0.0 || rows == 0 || cols == 0 {
            return;
        }

        let zoom_x = viewport_w / (cols as f64 * self.base_cell_size);
        let zoom_y = viewport_h / (rows as f64 * self.base_cell_size);
        self.zoom = (zoom_x.min(zoom_y) * FIT_MARGIN).clamp(ZOOM_MIN, ZOOM_MAX);

        let pitch = self.pitch();
        self.offset_x = (viewport_w - cols as f64 * pitch) / 2.0;
        self.offset_y = (viewport_h - rows as f64 * pitch) / 2.0;
    }

    /// Pan (without changing zoom) so the given grid point lands on the
    /// viewport center.
    pub fn center_on(&mut self, row: f64, col: f64, viewport_w: f64, viewport_h: f64) {
        let pitch = self.pitch();
        self.offset_x = viewport_w / 2.0 - col * pitch;
        self.offset_y = viewport_h / 2.0 - row * pitch;
    }

    pub fn reset(&mut self) {
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.zoom = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::{BASE_CELL_DESKTOP, Camera, ZOOM_MAX, ZOOM_MIN};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cameras() -> Vec<Camera> {
        vec![
            Camera::new(BASE_CELL_DESKTOP),
            Camera {
                offset_x: -310.5,
                offset_y: 220.25,
                zoom: 2.5,
                base_cell_size: 40.0,
            },
            Camera {
                offset_x: 4_000.0,
                offset_y: -9_000.0,
                zoom: 0.08,
                base_cell_size: 28.0,
            },
        ]
    }

    #[test]
    fn screen_world_round_trip() {
        for cam in sample_cameras() {
            for (x, y) in [(0.0, 0.0), (55.0, 55.0), (1279.0, 719.0), (-40.0, 900.0)] {
                let (row, col) = cam.screen_to_world(x, y);
                let (bx, by) = cam.world_to_screen(row, col);
                assert_close(bx, x);
                assert_close(by, y);
            }
        }
    }

    #[test]
    fn zoom_around_holds_anchor_fixed() {
        for factor in [0.5, 1.0, 2.0] {
            for mut cam in sample_cameras() {
                let (ax, ay) = (412.0, 297.0);
                let before = cam.screen_to_world(ax, ay);
                cam.zoom_around(ax, ay, factor);
                let after = cam.screen_to_world(ax, ay);
                assert_close(after.0, before.0);
                assert_close(after.1, before.1);
            }
        }
    }

    #[test]
    fn zoom_around_holds_anchor_across_gap_collapse() {
        let mut cam = Camera {
            offset_x: 120.0,
            offset_y: -45.0,
            zoom: 0.6,
            base_cell_size: 40.0,
        };
        let (ax, ay) = (300.0, 200.0);
        let before = cam.screen_to_world(ax, ay);
        // 0.6 * 0.5 = 0.3 crosses the gap-collapse threshold
        cam.zoom_around(ax, ay, 0.5);
        let after = cam.screen_to_world(ax, ay);
        assert_close(after.0, before.0);
        assert_close(after.1, before.1);
    }

    #[test]
    fn zoom_stays_clamped() {
        let mut cam = Camera::new(40.0);
        cam.zoom_around(0.0, 0.0, 1e9);
        assert_close(cam.zoom, ZOOM_MAX);
        cam.zoom_around(0.0, 0.0, 1e-9);
        assert_close(cam.zoom, ZOOM_MIN);
        cam.zoom_around(0.0, 0.0, f64::NAN);
        assert_close(cam.zoom, ZOOM_MIN);
    }

    #[test]
    fn fit_to_view_contains_and_centers_grid() {
        let mut cam = Camera::new(40.0);
        cam.fit_to_view(500.0, 500.0, 10, 10);

        let (x0, y0) = cam.world_to_screen(0.0, 0.0);
        let (x1, y1) = cam.world_to_screen(10.0, 10.0);
        assert!(x0 >= 0.0 && y0 >= 0.0);
        assert!(x1 <= 500.0 && y1 <= 500.0);
        // centered: symmetric margins
        assert_close(x0 - 0.0, 500.0 - x1);
        assert_close(y0 - 0.0, 500.0 - y1);
    }

    #[test]
    fn center_on_places_point_mid_viewport() {
        let mut cam = Camera::new(40.0);
        cam.zoom = 1.7;
        cam.center_on(12.5, 30.5, 800.0, 600.0);
        let (x, y) = cam.world_to_screen(12.5, 30.5);
        assert_close(x, 400.0);
        assert_close(y, 300.0);
    }

    #[test]
    fn reset_restores_identity() {
        let mut cam = Camera {
            offset_x: 77.0,
            offset_y: -3.0,
            zoom: 4.2,
            base_cell_size: 40.0,
        };
        cam.reset();
        assert_close(cam.offset_x, 0.0);
        assert_close(cam.offset_y, 0.0);
        assert_close(cam.zoom, 1.0);
    }
}
