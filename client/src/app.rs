use std::cell::RefCell;

use leptos::prelude::*;
use wasm_bindgen::JsCast;

use gloo_storage::Storage;
use gridlot_shared::CellStatus;

use crate::camera::{BASE_CELL_DESKTOP, BASE_CELL_TOUCH, Camera};
use crate::cells::CellStore;
use crate::data::{self, ConnectionStatus};
use crate::gestures::GestureMode;
use crate::grid_view::GridView;
use crate::reveal::RevealSet;
use crate::selection::SelectionModel;
use crate::strategy::{Backend, DeviceClass, detect_device_class, select_backend};
use crate::time_format::format_age;

/// Newtype wrappers give same-shaped signals distinct types for Leptos
/// context (two `RwSignal<bool>`s would overwrite each other).
#[derive(Clone, Copy)]
pub(crate) struct StoreSignal(pub RwSignal<Option<CellStore>>);
#[derive(Clone, Copy)]
pub(crate) struct CameraSignal(pub RwSignal<Camera>);
#[derive(Clone, Copy)]
pub(crate) struct SelectionSignal(pub RwSignal<SelectionModel>);
#[derive(Clone, Copy)]
pub(crate) struct RevealSignal(pub RwSignal<RevealSet>);
#[derive(Clone, Copy)]
pub(crate) struct HoveredCell(pub RwSignal<Option<u32>>);
#[derive(Clone, Copy)]
pub(crate) struct ViewerId(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct OwnerTint(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct ShowLabels(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct ShowDots(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct GridViewportSize(pub RwSignal<(f64, f64)>);
#[derive(Clone, Copy)]
pub(crate) struct WindowSize(pub RwSignal<(f64, f64)>);
#[derive(Clone, Copy)]
pub(crate) struct ActiveBackend(pub RwSignal<Backend>);
#[derive(Clone, Copy)]
pub(crate) struct ModeSignal(pub RwSignal<InteractionMode>);
#[derive(Clone, Copy)]
pub(crate) struct GestureActivity(pub RwSignal<GestureMode>);
#[derive(Clone, Copy)]
pub(crate) struct ConnStatus(pub RwSignal<ConnectionStatus>);
#[derive(Clone, Copy)]
pub(crate) struct DeviceClassCtx(pub DeviceClass);

/// Gates what a tap does: nothing, toggle selection, or nothing while the
/// reveal playback owns the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InteractionMode {
    View,
    Select,
    Reveal,
}

impl InteractionMode {
    fn label(self) -> &'static str {
        match self {
            InteractionMode::View => "View",
            InteractionMode::Select => "Select",
            InteractionMode::Reveal => "Reveal",
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct Settings {
    show_labels: bool,
    show_dots: bool,
    owner_tint: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_labels: true,
            show_dots: true,
            owner_tint: false,
        }
    }
}

struct TickIntervalBinding {
    window: web_sys::Window,
    interval_id: i32,
    _callback: wasm_bindgen::closure::Closure<dyn Fn()>,
}

struct ResizeBinding {
    window: web_sys::Window,
    handler: wasm_bindgen::closure::Closure<dyn Fn()>,
}

struct KeydownBinding {
    window: web_sys::Window,
    handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static TICK_INTERVAL_BINDING: RefCell<Option<TickIntervalBinding>> = const { RefCell::new(None) };
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

pub(crate) fn window_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

fn set_loading_shell_step(step: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(step_el) = document.get_element_by_id("grid-loading-step") {
        step_el.set_text_content(Some(step));
    }
}

fn remove_loading_shell() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(shell) = document.get_element_by_id("grid-loading-shell") {
        shell.remove();
    }
}

const GLOBAL_CSS: &str = "\
html,body{margin:0;padding:0;overflow:hidden;}\
.gl-cell{box-sizing:border-box;overflow:hidden;}\
.gl-cell.revealing{animation:gl-pulse 1.05s ease-in-out infinite;}\
@keyframes gl-pulse{0%,100%{opacity:1;}50%{opacity:0.4;}}\
.gl-toggle{display:inline-flex;align-items:center;gap:4px;font-size:0.72rem;color:#9a97a0;cursor:pointer;}\
.gl-button{background:#181b28;border:1px solid #282c3e;border-radius:4px;color:#dcdad2;\
font-size:0.72rem;padding:3px 10px;cursor:pointer;}\
.gl-button.active{border-color:#f5c542;color:#f5c542;}";

/// Root application component. Owns every signal the engine reads or
/// writes and provides them via context.
#[component]
pub fn App() -> impl IntoView {
    let device = detect_device_class();
    let base_cell = match device {
        DeviceClass::Touch => BASE_CELL_TOUCH,
        DeviceClass::Desktop => BASE_CELL_DESKTOP,
    };

    let store: RwSignal<Option<CellStore>> = RwSignal::new(None);
    let camera = RwSignal::new(Camera::new(base_cell));
    let reveal = RwSignal::new(RevealSet::new());
    let hovered: RwSignal<Option<u32>> = RwSignal::new(None);
    let mode = RwSignal::new(InteractionMode::View);
    let status = RwSignal::new(ConnectionStatus::Connecting);
    let gesture_mode = RwSignal::new(GestureMode::Idle);
    let backend = RwSignal::new(select_backend(0, device));
    let viewport: RwSignal<(f64, f64)> = RwSignal::new((0.0, 0.0));
    let window_size = RwSignal::new(window_dimensions());
    let tick: RwSignal<i64> = RwSignal::new(chrono::Utc::now().timestamp());
    let viewer: RwSignal<Option<String>> =
        RwSignal::new(gloo_storage::LocalStorage::get("gridlot_viewer").ok());
    let last_action: RwSignal<Option<String>> = RwSignal::new(None);

    let saved: Settings = gloo_storage::LocalStorage::get("gridlot_settings").unwrap_or_default();
    let show_labels = RwSignal::new(saved.show_labels);
    let show_dots = RwSignal::new(saved.show_dots);
    let owner_tint = RwSignal::new(saved.owner_tint);

    // Selection events surface in the status bar.
    let selection = {
        let mut model = SelectionModel::new();
        model.on_select(Box::new(move |id| {
            last_action.set(Some(format!("selected cell #{id}")));
        }));
        model.on_deselect(Box::new(move |id| {
            last_action.set(Some(format!("deselected cell #{id}")));
        }));
        RwSignal::new(model)
    };

    provide_context(StoreSignal(store));
    provide_context(CameraSignal(camera));
    provide_context(SelectionSignal(selection));
    provide_context(RevealSignal(reveal));
    provide_context(HoveredCell(hovered));
    provide_context(ViewerId(viewer));
    provide_context(OwnerTint(owner_tint));
    provide_context(ShowLabels(show_labels));
    provide_context(ShowDots(show_dots));
    provide_context(GridViewportSize(viewport));
    provide_context(WindowSize(window_size));
    provide_context(ActiveBackend(backend));
    provide_context(ModeSignal(mode));
    provide_context(GestureActivity(gesture_mode));
    provide_context(ConnStatus(status));
    provide_context(DeviceClassCtx(device));
    provide_context(tick);

    // Persist display settings on any change.
    Effect::new(move || {
        let settings = Settings {
            show_labels: show_labels.get(),
            show_dots: show_dots.get(),
            owner_tint: owner_tint.get(),
        };
        let _ = gloo_storage::LocalStorage::set("gridlot_settings", &settings);
    });

    // The strategy selector runs when the grid (or nothing else) changes.
    // Renderer-unavailable demotion writes the same signal and is not
    // re-contested until a new grid arrives.
    Effect::new(move || {
        let total = store.with(|s| s.as_ref().map(|s| s.total_cells()).unwrap_or(0));
        let next = select_backend(total, device);
        if backend.get_untracked() != next {
            backend.set(next);
        }
    });

    // 1-second tick for the ownership-age readout.
    Effect::new({
        move || {
            use wasm_bindgen::prelude::*;
            let Some(window) = web_sys::window() else {
                return;
            };

            TICK_INTERVAL_BINDING.with(|slot| {
                if let Some(old) = slot.borrow_mut().take() {
                    old.window.clear_interval_with_handle(old.interval_id);
                }
            });

            let cb = Closure::<dyn Fn()>::new(move || {
                tick.set(chrono::Utc::now().timestamp());
            });
            let Ok(interval_id) = window.set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                1_000,
            ) else {
                return;
            };
            TICK_INTERVAL_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(TickIntervalBinding {
                    window: window.clone(),
                    interval_id,
                    _callback: cb,
                });
            });
        }
    });

    // Window resize feeds the viewport-size pipeline.
    Effect::new({
        move || {
            use wasm_bindgen::prelude::*;
            let Some(window) = web_sys::window() else {
                return;
            };

            RESIZE_BINDING.with(|slot| {
                if let Some(old) = slot.borrow_mut().take() {
                    let _ = old
                        .window
                        .remove_event_listener_with_callback("resize", old.handler.as_ref().unchecked_ref());
                }
            });

            let handler = Closure::<dyn Fn()>::new(move || {
                window_size.set(window_dimensions());
            });
            if window
                .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
                .is_ok()
            {
                RESIZE_BINDING.with(|slot| {
                    *slot.borrow_mut() = Some(ResizeBinding {
                        window: window.clone(),
                        handler,
                    });
                });
            }
        }
    });

    // Keyboard zoom: +/- around the viewport center, 0 re-fits the grid.
    Effect::new({
        move || {
            use wasm_bindgen::prelude::*;
            let Some(window) = web_sys::window() else {
                return;
            };

            KEYDOWN_BINDING.with(|slot| {
                if let Some(old) = slot.borrow_mut().take() {
                    let _ = old.window.remove_event_listener_with_callback(
                        "keydown",
                        old.handler.as_ref().unchecked_ref(),
                    );
                }
            });

            let handler = Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(
                move |e: web_sys::KeyboardEvent| {
                    let (vw, vh) = viewport.get_untracked();
                    match e.key().as_str() {
                        "+" | "=" => {
                            camera.update(|cam| cam.zoom_around(vw / 2.0, vh / 2.0, 1.2))
                        }
                        "-" | "_" => {
                            camera.update(|cam| cam.zoom_around(vw / 2.0, vh / 2.0, 1.0 / 1.2))
                        }
                        "0" => {
                            let dims =
                                store.with_untracked(|s| s.as_ref().map(|s| (s.rows(), s.cols())));
                            if let Some((rows, cols)) = dims {
                                camera.update(|cam| cam.fit_to_view(vw, vh, rows, cols));
                            }
                        }
                        "Escape" => camera.update(|cam| cam.reset()),
                        _ => {}
                    }
                },
            );
            if window
                .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
                .is_ok()
            {
                KEYDOWN_BINDING.with(|slot| {
                    *slot.borrow_mut() = Some(KeydownBinding {
                        window: window.clone(),
                        handler,
                    });
                });
            }
        }
    });

    // Fetch the initial snapshot once.
    let load_started = StoredValue::new(false);
    Effect::new(move || {
        if load_started.get_value() {
            return;
        }
        load_started.set_value(true);
        data::load_snapshot(
            StoreSignal(store),
            ConnStatus(status),
            SelectionSignal(selection),
            RevealSignal(reveal),
        );
    });

    // When the sequencer hands over a reveal batch, bring its centroid into
    // view without touching zoom.
    Effect::new(move || {
        let target = reveal.with(|r| {
            if r.is_empty() {
                return None;
            }
            store.with_untracked(|s| {
                let s = s.as_ref()?;
                let (mut row_sum, mut col_sum, mut n) = (0.0, 0.0, 0.0);
                for id in r.iter() {
                    let (row, col) = s.config().row_col(id);
                    row_sum += row as f64 + 0.5;
                    col_sum += col as f64 + 0.5;
                    n += 1.0;
                }
                if n > 0.0 {
                    Some((row_sum / n, col_sum / n))
                } else {
                    None
                }
            })
        });
        if let Some((row, col)) = target {
            let (vw, vh) = viewport.get_untracked();
            if vw > 0.0 && vh > 0.0 {
                camera.update(|cam| cam.center_on(row, col, vw, vh));
            }
        }
    });

    // Loading shell milestones.
    Effect::new(move || {
        if store.with(|s| s.is_some()) {
            set_loading_shell_step("Preparing grid");
        } else if status.get() == ConnectionStatus::Failed {
            set_loading_shell_step("Game service unreachable");
        } else {
            set_loading_shell_step("Contacting game service");
        }
    });

    let shell_removed = StoredValue::new(false);
    Effect::new(move || {
        let done = store.with(|s| s.is_some()) || status.get() == ConnectionStatus::Failed;
        if !done || shell_removed.get_value() {
            return;
        }
        shell_removed.set_value(true);
        // Leave the final step visible for a beat.
        gloo_timers::callback::Timeout::new(240, remove_loading_shell).forget();
    });

    let mode_button = move |m: InteractionMode| {
        view! {
            <button
                class="gl-button"
                class:active=move || mode.get() == m
                on:click=move |_| mode.set(m)
            >
                {m.label()}
            </button>
        }
    };

    let clear_selection = move |_| {
        selection.update(|sel| sel.clear());
        last_action.set(Some("selection cleared".into()));
    };

    let counts_line = move || {
        store.with(|s| match s {
            Some(s) => {
                let (unsold, alive, eliminated) = s.counts();
                format!("{unsold} unsold · {alive} alive · {eliminated} eliminated")
            }
            None => match status.get() {
                ConnectionStatus::Failed => "grid unavailable".to_string(),
                _ => "loading grid…".to_string(),
            },
        })
    };

    let selection_line = move || {
        selection.with(|sel| {
            if sel.is_empty() {
                return String::new();
            }
            let total = store.with(|s| s.as_ref().map(|s| sel.total_price(s)).unwrap_or(0.0));
            format!("{} selected · {:.2} total", sel.len(), total)
        })
    };

    let status_line = move || match status.get() {
        ConnectionStatus::Connecting => "connecting…",
        ConnectionStatus::Live => "live",
        ConnectionStatus::Failed => "offline",
    };

    view! {
        <div style="position:fixed;inset:0;display:flex;flex-direction:column;background:#0c0e17;\
                    color:#dcdad2;font-family:system-ui,sans-serif;">
            <style>{GLOBAL_CSS}</style>
            <header style="display:flex;align-items:center;gap:10px;padding:6px 12px;\
                           border-bottom:1px solid #282c3e;flex-wrap:wrap;">
                <span style="font-weight:600;letter-spacing:0.08em;font-size:0.85rem;color:#f5c542;">
                    "GRIDLOT"
                </span>
                {mode_button(InteractionMode::View)}
                {mode_button(InteractionMode::Select)}
                {mode_button(InteractionMode::Reveal)}
                <button class="gl-button" on:click=clear_selection>"Clear selection"</button>
                <label class="gl-toggle">
                    <input
                        type="checkbox"
                        prop:checked=move || show_labels.get()
                        on:change=move |e| show_labels.set(event_target_checked(&e))
                    />
                    "Ids"
                </label>
                <label class="gl-toggle">
                    <input
                        type="checkbox"
                        prop:checked=move || show_dots.get()
                        on:change=move |e| show_dots.set(event_target_checked(&e))
                    />
                    "Status dots"
                </label>
                <label class="gl-toggle">
                    <input
                        type="checkbox"
                        prop:checked=move || owner_tint.get()
                        on:change=move |e| owner_tint.set(event_target_checked(&e))
                    />
                    "Owner colors"
                </label>
                <span style="margin-left:auto;font-size:0.72rem;color:#9a97a0;">
                    {status_line}
                </span>
            </header>
            <main style="flex:1;position:relative;min-height:0;">
                <GridView />
                <CellReadout />
            </main>
            <footer style="display:flex;gap:16px;padding:4px 12px;border-top:1px solid #282c3e;\
                           font-size:0.72rem;color:#9a97a0;">
                <span>{counts_line}</span>
                <span style="color:#f5c542;">{selection_line}</span>
                <span style="margin-left:auto;">{move || last_action.get().unwrap_or_default()}</span>
            </footer>
        </div>
    }
}

/// Overlay with the hovered cell's record: id, status, price, owner, age.
#[component]
fn CellReadout() -> impl IntoView {
    let StoreSignal(store) = expect_context();
    let HoveredCell(hovered) = expect_context();
    let ViewerId(viewer) = expect_context();
    // Epoch-second tick provided by the app; drives the age readout.
    let tick: RwSignal<i64> = expect_context();

    let readout = move || -> Option<String> {
        let id = hovered.get()?;
        store.with(|s| {
            let s = s.as_ref()?;
            let (row, col) = s.config().row_col(id);
            let cell = s.get(id);
            let status = match cell.status {
                CellStatus::Unsold => "unsold",
                CellStatus::Alive => "alive",
                CellStatus::Eliminated => "eliminated",
            };
            let mut line = format!("cell #{id} ({row},{col}) · {status} · {:.2}", cell.price);
            if let Some(owner) = cell.owner {
                let mine = viewer.with(|v| v.as_deref() == Some(owner));
                if mine {
                    line.push_str(" · yours");
                } else {
                    line.push_str(&format!(" · {owner}"));
                }
            }
            if let Some(acquired) = cell.acquired {
                let age = tick.get() - acquired.timestamp();
                line.push_str(&format!(" · bought {}", format_age(age)));
            }
            Some(line)
        })
    };

    view! {
        <div style="position:absolute;left:10px;bottom:10px;pointer-events:none;\
                    background:rgba(12,14,23,0.85);border:1px solid #282c3e;border-radius:4px;\
                    padding:4px 8px;font-size:0.72rem;color:#dcdad2;"
             style:display=move || if readout().is_some() { "block" } else { "none" }>
            {readout}
        </div>
    }
}
