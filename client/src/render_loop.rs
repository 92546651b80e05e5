use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Batches repaints via `requestAnimationFrame`.
///
/// `mark_dirty()` is cheap and idempotent; however many state changes land
/// between two vsyncs, the paint closure runs at most once per frame. The
/// closure returns `true` to request another frame — that is the continuous
/// mode used while the reveal set is non-empty or a gesture is in flight.
/// Everything else is event-triggered.
pub struct FrameScheduler {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    dirty: Cell<bool>,
    scheduled: Cell<bool>,
    raf_id: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Inner {
    fn schedule(&self) {
        if self.scheduled.get() {
            return;
        }
        let callback = self.callback.borrow();
        let (Some(callback), Some(window)) = (callback.as_ref(), self.window.as_ref()) else {
            return;
        };
        if let Ok(id) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            self.scheduled.set(true);
            self.raf_id.set(Some(id));
        }
    }

    fn cancel_pending(&self) {
        if let Some(raf_id) = self.raf_id.take()
            && let Some(window) = self.window.as_ref()
        {
            let _ = window.cancel_animation_frame(raf_id);
        }
        self.scheduled.set(false);
        self.dirty.set(false);
    }
}

impl FrameScheduler {
    /// `paint` returns `true` when another frame should follow immediately.
    pub fn new(paint: impl Fn() -> bool + 'static) -> Self {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            dirty: Cell::new(false),
            scheduled: Cell::new(false),
            raf_id: Cell::new(None),
            callback: RefCell::new(None),
        });

        let frame_inner = inner.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            frame_inner.scheduled.set(false);
            frame_inner.raf_id.set(None);
            if !frame_inner.dirty.get() {
                return;
            }
            frame_inner.dirty.set(false);
            if paint() {
                frame_inner.dirty.set(true);
                frame_inner.schedule();
            }
        });
        *inner.callback.borrow_mut() = Some(callback);

        Self { inner }
    }

    /// Request a repaint on the next frame.
    pub fn mark_dirty(&self) {
        self.inner.dirty.set(true);
        self.inner.schedule();
    }

    /// Drop any pending frame. The scheduler stays usable; the next
    /// `mark_dirty` re-arms it.
    pub fn cancel(&self) {
        self.inner.cancel_pending();
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        self.inner.cancel_pending();
        // Break the callback->inner reference cycle on teardown.
        self.inner.callback.borrow_mut().take();
    }
}
