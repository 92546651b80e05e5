use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, PointerEvent, WheelEvent};

use crate::app::{
    ActiveBackend, CameraSignal, GestureActivity, GridViewportSize, HoveredCell, InteractionMode,
    ModeSignal, OwnerTint, RevealSignal, SelectionSignal, ShowDots, ShowLabels, StoreSignal,
    ViewerId, WindowSize,
};
use crate::colors::rgba_css;
use crate::culling::visible_range;
use crate::gestures::{GestureController, GestureEffect, GestureMode, PointerInput, hit_test};
use crate::render_loop::FrameScheduler;
use crate::renderer::DrawInput;
use crate::renderer::markup::MarkupLayer;
use crate::renderer::raster::{self, RasterStyle};
use crate::strategy::{Backend, demote};

/// Host of the grid engine: one container owns the pointer/wheel wiring for
/// every backend, so pan/zoom/tap semantics cannot diverge when the
/// strategy selector swaps the layer underneath.
#[component]
pub fn GridView() -> impl IntoView {
    let StoreSignal(store) = expect_context();
    let CameraSignal(camera) = expect_context();
    let SelectionSignal(selection) = expect_context();
    let ModeSignal(mode) = expect_context();
    let HoveredCell(hovered) = expect_context();
    let GridViewportSize(viewport) = expect_context();
    let WindowSize(window_size) = expect_context();
    let ActiveBackend(backend) = expect_context();
    let GestureActivity(gesture_mode) = expect_context();

    let container_ref = NodeRef::<leptos::html::Div>::new();
    let gestures = Rc::new(RefCell::new(GestureController::new()));
    let fitted = Rc::new(Cell::new(false));

    // Track the container's CSS size; window resizes re-measure it.
    Effect::new(move || {
        window_size.track();
        let Some(el) = container_ref.get() else {
            return;
        };
        let rect = el.get_bounding_client_rect();
        viewport.set((rect.width(), rect.height()));
    });

    // Fit the whole grid once, when data and layout are both ready.
    Effect::new({
        let fitted = fitted.clone();
        move || {
            if fitted.get() {
                return;
            }
            let (vw, vh) = viewport.get();
            let dims = store.with(|s| s.as_ref().map(|s| (s.rows(), s.cols())));
            let Some((rows, cols)) = dims else {
                return;
            };
            if vw <= 0.0 || vh <= 0.0 {
                return;
            }
            fitted.set(true);
            camera.update(|cam| cam.fit_to_view(vw, vh, rows, cols));
        }
    });

    // Event coordinates relative to the container.
    let local_pos = move |client_x: f64, client_y: f64| -> (f64, f64) {
        container_ref
            .get_untracked()
            .map(|el| {
                let rect = el.get_bounding_client_rect();
                (client_x - rect.left(), client_y - rect.top())
            })
            .unwrap_or((client_x, client_y))
    };

    // Route one gesture outcome to the camera or the selection model.
    let apply = move |effect: GestureEffect| match effect {
        GestureEffect::None => {}
        GestureEffect::Pan { dx, dy } => camera.update(|cam| cam.pan(dx, dy)),
        GestureEffect::ZoomAround { x, y, factor } => {
            camera.update(|cam| cam.zoom_around(x, y, factor));
        }
        GestureEffect::Tap { x, y } => {
            if mode.get_untracked() != InteractionMode::Select {
                return;
            }
            store.with_untracked(|s| {
                let Some(s) = s else {
                    return;
                };
                let cam = camera.get_untracked();
                if let Some(id) = hit_test(&cam, s.config(), x, y) {
                    selection.update(|sel| {
                        sel.toggle(id, s);
                    });
                }
            });
        }
    };

    let sync_mode = {
        let gestures = gestures.clone();
        move || {
            let current = gestures.borrow().mode();
            if gesture_mode.get_untracked() != current {
                gesture_mode.set(current);
            }
        }
    };

    let on_pointer_down = {
        let gestures = gestures.clone();
        let sync_mode = sync_mode.clone();
        move |e: PointerEvent| {
            e.prevent_default();
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
            }
            let (x, y) = local_pos(e.client_x() as f64, e.client_y() as f64);
            let effect = gestures.borrow_mut().handle(PointerInput::Down {
                id: e.pointer_id(),
                x,
                y,
                time_ms: e.time_stamp(),
            });
            apply(effect);
            sync_mode();
        }
    };

    let on_pointer_move = {
        let gestures = gestures.clone();
        let sync_mode = sync_mode.clone();
        move |e: PointerEvent| {
            let (x, y) = local_pos(e.client_x() as f64, e.client_y() as f64);
            let effect = gestures.borrow_mut().handle(PointerInput::Move {
                id: e.pointer_id(),
                x,
                y,
                time_ms: e.time_stamp(),
            });
            apply(effect);
            sync_mode();

            if gestures.borrow().is_active() {
                if hovered.get_untracked().is_some() {
                    hovered.set(None);
                }
            } else {
                let hit = store.with_untracked(|s| {
                    s.as_ref()
                        .and_then(|s| hit_test(&camera.get_untracked(), s.config(), x, y))
                });
                if hit != hovered.get_untracked() {
                    hovered.set(hit);
                }
            }
        }
    };

    let on_pointer_up = {
        let gestures = gestures.clone();
        let sync_mode = sync_mode.clone();
        move |e: PointerEvent| {
            let (x, y) = local_pos(e.client_x() as f64, e.client_y() as f64);
            let effect = gestures.borrow_mut().handle(PointerInput::Up {
                id: e.pointer_id(),
                x,
                y,
                time_ms: e.time_stamp(),
            });
            apply(effect);
            sync_mode();
        }
    };

    let on_pointer_cancel = {
        let gestures = gestures.clone();
        let sync_mode = sync_mode.clone();
        move |_: PointerEvent| {
            gestures.borrow_mut().handle(PointerInput::Cancel);
            sync_mode();
        }
    };

    let on_pointer_leave = move |_: PointerEvent| {
        if hovered.get_untracked().is_some() {
            hovered.set(None);
        }
    };

    let on_wheel = {
        let gestures = gestures.clone();
        move |e: WheelEvent| {
            e.prevent_default();
            let (x, y) = local_pos(e.client_x() as f64, e.client_y() as f64);
            let effect = gestures.borrow_mut().handle(PointerInput::Wheel {
                x,
                y,
                delta: e.delta_y(),
            });
            apply(effect);
        }
    };

    let container_style = move || {
        let cursor = match gesture_mode.get() {
            GestureMode::Panning | GestureMode::Pinching => "grabbing",
            _ => "grab",
        };
        format!(
            "position:relative;width:100%;height:100%;overflow:hidden;touch-action:none;\
             user-select:none;cursor:{cursor};"
        )
    };

    let layer = move || match backend.get() {
        Backend::PerCellMarkup => view! { <MarkupLayer virtualized=false /> }.into_any(),
        Backend::VirtualizedMarkup => view! { <MarkupLayer virtualized=true /> }.into_any(),
        Backend::RasterDesktop => {
            view! { <RasterLayer raster_style=RasterStyle::desktop() /> }.into_any()
        }
        Backend::RasterTouch => {
            view! { <RasterLayer raster_style=RasterStyle::touch() /> }.into_any()
        }
    };

    view! {
        <div
            node_ref=container_ref
            style=container_style
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointercancel=on_pointer_cancel
            on:pointerleave=on_pointer_leave
            on:wheel=on_wheel
        >
            {layer}
        </div>
    }
}

/// Canvas host for the rasterized backends. Owns the frame scheduler;
/// unmounting drops it, which cancels any pending animation frame.
#[component]
fn RasterLayer(raster_style: RasterStyle) -> impl IntoView {
    let StoreSignal(store) = expect_context();
    let CameraSignal(camera) = expect_context();
    let SelectionSignal(selection) = expect_context();
    let RevealSignal(reveal) = expect_context();
    let HoveredCell(hovered) = expect_context();
    let ViewerId(viewer) = expect_context();
    let OwnerTint(owner_tint) = expect_context();
    let ShowDots(show_dots) = expect_context();
    let ShowLabels(show_labels) = expect_context();
    let GridViewportSize(viewport) = expect_context();
    let ActiveBackend(backend) = expect_context();
    let GestureActivity(gesture_mode) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));
    let last_size = Rc::new(Cell::new((0u32, 0u32)));
    let demoted = Rc::new(Cell::new(false));

    let paint_ctx = cached_ctx.clone();
    let paint_size = last_size.clone();
    let paint_demoted = demoted.clone();
    let scheduler = Rc::new(FrameScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return false;
        };
        let canvas: &HtmlCanvasElement = &canvas;

        let (vw, vh) = viewport.get_untracked();
        if vw <= 0.0 || vh <= 0.0 {
            return false;
        }
        let dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);
        let pw = (vw * dpr).round().max(1.0) as u32;
        let ph = (vh * dpr).round().max(1.0) as u32;
        if paint_size.get() != (pw, ph) {
            canvas.set_width(pw);
            canvas.set_height(ph);
            paint_size.set((pw, ph));
            // Resizing resets 2D context state — reacquire and rescale.
            *paint_ctx.borrow_mut() = None;
        }

        if paint_ctx.borrow().is_none() {
            let acquired = canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
            match acquired {
                Some(ctx) => {
                    // All drawing happens in CSS pixel coordinates.
                    ctx.scale(dpr, dpr).ok();
                    *paint_ctx.borrow_mut() = Some(ctx);
                }
                None => {
                    // Renderer unavailable: demote to the next-safest backend
                    // instead of failing the whole view.
                    if !paint_demoted.get() {
                        paint_demoted.set(true);
                        web_sys::console::warn_1(
                            &"2d context unavailable, falling back to markup rendering".into(),
                        );
                        if let Some(next) = demote(backend.get_untracked()) {
                            backend.set(next);
                        }
                    }
                    return false;
                }
            }
        }
        let Some(ctx) = paint_ctx.borrow().clone() else {
            return false;
        };

        let now_ms = js_sys::Date::now();
        let animating = store.with_untracked(|maybe| {
            let Some(store_ref) = maybe else {
                let (r, g, b) = raster_style.palette.background;
                ctx.set_fill_style_str(&rgba_css(r, g, b, 1.0));
                ctx.fill_rect(0.0, 0.0, vw, vh);
                return false;
            };
            let cam = camera.get_untracked();
            let range = visible_range(&cam, vw, vh, store_ref.rows(), store_ref.cols());
            selection.with_untracked(|sel| {
                reveal.with_untracked(|rev| {
                    viewer.with_untracked(|viewer| {
                        let input = DrawInput {
                            range,
                            store: store_ref,
                            selection: sel,
                            reveal: rev,
                            camera: &cam,
                            viewer: viewer.as_deref(),
                            hovered: hovered.get_untracked(),
                            owner_tint: owner_tint.get_untracked(),
                            show_dots: show_dots.get_untracked(),
                            show_labels: show_labels.get_untracked(),
                            now_ms,
                        };
                        raster::draw(&ctx, vw, vh, &input, &raster_style);
                        !rev.is_empty()
                    })
                })
            })
        });

        // Continuous mode while revealing or while a gesture is in flight;
        // otherwise the next paint waits for a state change.
        animating || gesture_mode.get_untracked() != GestureMode::Idle
    }));

    // State changes: cells, selection, reveal set, display settings.
    let sched = scheduler.clone();
    Effect::new(move || {
        store.track();
        selection.track();
        reveal.track();
        viewer.track();
        owner_tint.track();
        show_dots.track();
        show_labels.track();
        hovered.track();
        sched.mark_dirty();
    });

    // Camera / layout / gesture-phase changes.
    let sched = scheduler.clone();
    Effect::new(move || {
        camera.track();
        viewport.track();
        gesture_mode.track();
        sched.mark_dirty();
    });

    // Backend switches and grid teardown must not leave a frame pending.
    // `on_cleanup` requires a `Send + Sync` closure, but the scheduler is
    // `Rc`-backed; store it in a thread-local arena handle (itself `Send +
    // Sync`) and reach it through that handle from the cleanup.
    let sched = StoredValue::new_local(scheduler.clone());
    on_cleanup(move || {
        if let Some(sched) = sched.try_get_value() {
            sched.cancel();
        }
    });

    view! {
        <canvas
            node_ref=canvas_ref
            style="position:absolute;inset:0;width:100%;height:100%;"
        />
    }
}
