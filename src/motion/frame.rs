//! Per-effect animation loops scheduled on the display refresh callback.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Opaque id of one pending refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub i32);

/// The host's refresh callback (`requestAnimationFrame` in the browser).
/// Callbacks receive the frame timestamp in milliseconds.
pub trait FrameScheduler {
    fn request(&self, callback: Box<dyn FnOnce(f64)>) -> FrameToken;
    fn cancel(&self, token: FrameToken);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

struct DriverInner {
    scheduler: Rc<dyn FrameScheduler>,
    body: RefCell<Box<dyn FnMut(f64) -> Flow>>,
    pending: Cell<Option<FrameToken>>,
    live: Cell<bool>,
}

impl DriverInner {
    fn schedule(inner: &Rc<Self>) {
        if let Some(old) = inner.pending.take() {
            inner.scheduler.cancel(old);
        }
        let weak: Weak<Self> = Rc::downgrade(inner);
        let token = inner.scheduler.request(Box::new(move |ts| {
            if let Some(inner) = weak.upgrade() {
                DriverInner::tick(&inner, ts);
            }
        }));
        inner.pending.set(Some(token));
    }

    fn tick(inner: &Rc<Self>, ts: f64) {
        inner.pending.set(None);
        if !inner.live.get() {
            return;
        }
        let flow = match inner.body.try_borrow_mut() {
            Ok(mut body) => (*body)(ts),
            // re-entered from inside its own body; skip this frame
            Err(_) => return,
        };
        match flow {
            Flow::Continue if inner.live.get() => DriverInner::schedule(inner),
            Flow::Continue => {}
            Flow::Stop => inner.live.set(false),
        }
    }

    fn cancel(&self) {
        self.live.set(false);
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
        }
    }
}

/// Owns one animation loop. At most one refresh request is pending per driver;
/// cancelling is idempotent and dropping the driver cancels it.
pub struct FrameDriver {
    inner: Rc<DriverInner>,
}

impl FrameDriver {
    /// Schedule `body` for the next frame and keep rescheduling while it
    /// returns [`Flow::Continue`].
    pub fn start<F>(scheduler: Rc<dyn FrameScheduler>, body: F) -> Self
    where
        F: FnMut(f64) -> Flow + 'static,
    {
        let driver = Self::idle(scheduler, body);
        driver.restart();
        driver
    }

    /// Build the driver without requesting a frame yet.
    pub fn idle<F>(scheduler: Rc<dyn FrameScheduler>, body: F) -> Self
    where
        F: FnMut(f64) -> Flow + 'static,
    {
        Self {
            inner: Rc::new(DriverInner {
                scheduler,
                body: RefCell::new(Box::new(body)),
                pending: Cell::new(None),
                live: Cell::new(false),
            }),
        }
    }

    /// Cancel any pending request and schedule a fresh one.
    pub fn restart(&self) {
        self.inner.live.set(true);
        DriverInner::schedule(&self.inner);
    }

    /// Schedule a frame only if none is pending.
    pub fn wake(&self) {
        if self.inner.pending.get().is_none() {
            self.restart();
        }
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.inner.live.get()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.inner.pending.get().is_some()
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        self.inner.cancel();
    }
}
