use crate::camera::Camera;
use gridlot_shared::GridConfig;

/// Movement below this (px) keeps a press eligible as a tap.
const DEAD_ZONE_PX: f64 = 5.0;
/// Press-to-release time above this is never a tap.
const TAP_MAX_MS: f64 = 300.0;
/// Pinch frames whose distance ratio is within this band of 1.0 are ignored.
/// Ignored frames keep the previous reference distance, so slow deliberate
/// pinches accumulate past the band instead of being eaten by it. Tuning
/// parameter.
const PINCH_JITTER: f64 = 0.012;
/// Wheel delta to zoom-factor conversion. Tuning parameter.
const WHEEL_SENSITIVITY: f64 = 0.001;

/// Unified pointer events: mouse and touch feed the same transition table,
/// distinguished only by the id the host assigns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down { id: i32, x: f64, y: f64, time_ms: f64 },
    Move { id: i32, x: f64, y: f64, time_ms: f64 },
    Up { id: i32, x: f64, y: f64, time_ms: f64 },
    Wheel { x: f64, y: f64, delta: f64 },
    /// Pointer capture lost / touchcancel. Always returns to idle.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    Idle,
    /// Primary pointer down, still within the tap dead-zone.
    Pressed,
    Panning,
    Pinching,
}

/// What the camera (or hit tester) should do in response to one input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEffect {
    None,
    Pan { dx: f64, dy: f64 },
    ZoomAround { x: f64, y: f64, factor: f64 },
    Tap { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy)]
struct TrackedPointer {
    id: i32,
    x: f64,
    y: f64,
}

/// Translates raw pointer/touch/wheel input into camera deltas and taps.
///
/// One continuous pointer session never spans gestures: releasing every
/// pointer always lands back in `Idle`. A pinch that loses one finger
/// resumes as a re-anchored pan with the survivor.
#[derive(Debug)]
pub struct GestureController {
    mode: GestureMode,
    pointers: Vec<TrackedPointer>,
    press_x: f64,
    press_y: f64,
    press_time_ms: f64,
    last_x: f64,
    last_y: f64,
    last_pinch_dist: f64,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureController {
    pub fn new() -> Self {
        Self {
            mode: GestureMode::Idle,
            pointers: Vec::with_capacity(2),
            press_x: 0.0,
            press_y: 0.0,
            press_time_ms: 0.0,
            last_x: 0.0,
            last_y: 0.0,
            last_pinch_dist: 0.0,
        }
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    /// A gesture is in flight (pan or pinch actively mutating the camera).
    pub fn is_active(&self) -> bool {
        matches!(self.mode, GestureMode::Panning | GestureMode::Pinching)
    }

    pub fn handle(&mut self, input: PointerInput) -> GestureEffect {
        match input {
            PointerInput::Down { id, x, y, time_ms } => self.on_down(id, x, y, time_ms),
            PointerInput::Move { id, x, y, .. } => self.on_move(id, x, y),
            PointerInput::Up { id, x, y, time_ms } => self.on_up(id, x, y, time_ms),
            PointerInput::Wheel { x, y, delta } => {
                let factor = (1.0 - delta * WHEEL_SENSITIVITY).max(0.05);
                GestureEffect::ZoomAround { x, y, factor }
            }
            PointerInput::Cancel => {
                self.reset();
                GestureEffect::None
            }
        }
    }

    fn on_down(&mut self, id: i32, x: f64, y: f64, time_ms: f64) -> GestureEffect {
        if self.pointers.iter().any(|p| p.id == id) {
            return GestureEffect::None;
        }
        match self.pointers.len() {
            0 => {
                self.pointers.push(TrackedPointer { id, x, y });
                self.mode = GestureMode::Pressed;
                self.press_x = x;
                self.press_y = y;
                self.press_time_ms = time_ms;
                self.last_x = x;
                self.last_y = y;
            }
            1 => {
                self.pointers.push(TrackedPointer { id, x, y });
                self.mode = GestureMode::Pinching;
                self.last_pinch_dist = self.pinch_distance();
            }
            // A third finger never joins a gesture in progress.
            _ => {}
        }
        GestureEffect::None
    }

    fn on_move(&mut self, id: i32, x: f64, y: f64) -> GestureEffect {
        let Some(idx) = self.pointers.iter().position(|p| p.id == id) else {
            return GestureEffect::None;
        };
        self.pointers[idx].x = x;
        self.pointers[idx].y = y;

        match self.mode {
            GestureMode::Pressed => {
                let moved = ((x - self.press_x).powi(2) + (y - self.press_y).powi(2)).sqrt();
                if moved <= DEAD_ZONE_PX {
                    return GestureEffect::None;
                }
                self.mode = GestureMode::Panning;
                let effect = GestureEffect::Pan {
                    dx: x - self.last_x,
                    dy: y - self.last_y,
                };
                self.last_x = x;
                self.last_y = y;
                effect
            }
            GestureMode::Panning => {
                let effect = GestureEffect::Pan {
                    dx: x - self.last_x,
                    dy: y - self.last_y,
                };
                self.last_x = x;
                self.last_y = y;
                effect
            }
            GestureMode::Pinching => {
                let dist = self.pinch_distance();
                if self.last_pinch_dist <= 0.0 {
                    // Degenerate reference (fingers started on one point).
                    self.last_pinch_dist = dist;
                    return GestureEffect::None;
                }
                let factor = dist / self.last_pinch_dist;
                if (factor - 1.0).abs() <= PINCH_JITTER {
                    return GestureEffect::None;
                }
                self.last_pinch_dist = dist;
                let (cx, cy) = self.pinch_centroid();
                GestureEffect::ZoomAround { x: cx, y: cy, factor }
            }
            GestureMode::Idle => GestureEffect::None,
        }
    }

    fn on_up(&mut self, id: i32, x: f64, y: f64, time_ms: f64) -> GestureEffect {
        let Some(idx) = self.pointers.iter().position(|p| p.id == id) else {
            return GestureEffect::None;
        };
        self.pointers.remove(idx);

        match self.mode {
            GestureMode::Pressed => {
                self.mode = GestureMode::Idle;
                let moved = ((x - self.press_x).powi(2) + (y - self.press_y).powi(2)).sqrt();
                let held = time_ms - self.press_time_ms;
                if moved <= DEAD_ZONE_PX && held <= TAP_MAX_MS {
                    return GestureEffect::Tap { x, y };
                }
                GestureEffect::None
            }
            GestureMode::Pinching => {
                if let Some(survivor) = self.pointers.first() {
                    // Re-anchor so the survivor pans without a jump.
                    self.mode = GestureMode::Panning;
                    self.last_x = survivor.x;
                    self.last_y = survivor.y;
                } else {
                    self.mode = GestureMode::Idle;
                }
                self.last_pinch_dist = 0.0;
                GestureEffect::None
            }
            _ => {
                if self.pointers.is_empty() {
                    self.mode = GestureMode::Idle;
                }
                GestureEffect::None
            }
        }
    }

    fn pinch_distance(&self) -> f64 {
        if self.pointers.len() < 2 {
            return 0.0;
        }
        let (a, b) = (&self.pointers[0], &self.pointers[1]);
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    fn pinch_centroid(&self) -> (f64, f64) {
        if self.pointers.len() < 2 {
            return (self.last_x, self.last_y);
        }
        let (a, b) = (&self.pointers[0], &self.pointers[1]);
        ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    fn reset(&mut self) {
        self.mode = GestureMode::Idle;
        self.pointers.clear();
        self.last_pinch_dist = 0.0;
    }
}

/// Resolve a screen point to the cell under it, or `None` outside the grid.
pub fn hit_test(cam: &Camera, config: &GridConfig, x: f64, y: f64) -> Option<u32> {
    let (row_f, col_f) = cam.screen_to_world(x, y);
    if row_f < 0.0 || col_f < 0.0 {
        return None;
    }
    if row_f >= config.rows as f64 || col_f >= config.cols as f64 {
        return None;
    }
    Some(config.cell_id(row_f as u32, col_f as u32))
}
